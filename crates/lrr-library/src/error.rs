//! Library gateway error types.

use thiserror::Error;

/// Result type for library operations.
pub type LibraryResult<T> = Result<T, LibraryError>;

/// Errors that can occur while talking to the media pool.
#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("Resolve is not reachable: {0}")]
    Unavailable(String),

    #[error("No project is currently open")]
    NoProject,

    #[error("{method} failed: {message}")]
    CallFailed { method: String, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Request rejected: {0}")]
    RequestFailed(String),

    #[error("Bridge error {0}: {1}")]
    ServerError(u16, String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LibraryError {
    pub fn call_failed(method: impl Into<String>, message: impl Into<String>) -> Self {
        Self::CallFailed {
            method: method.into(),
            message: message.into(),
        }
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    /// Map a non-success HTTP status from the bridge.
    pub fn from_http_status(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        match status {
            404 => Self::NotFound(body),
            409 => Self::NoProject,
            400..=499 => Self::RequestFailed(body),
            503 => Self::Unavailable(body),
            _ => Self::ServerError(status, body),
        }
    }

    /// The host itself could not be reached (as opposed to a rejected call).
    pub fn is_connection_error(&self) -> bool {
        match self {
            LibraryError::Unavailable(_) => true,
            LibraryError::Network(e) => e.is_connect() || e.is_timeout(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_http_status() {
        assert!(matches!(LibraryError::from_http_status(404, "x"), LibraryError::NotFound(_)));
        assert!(matches!(LibraryError::from_http_status(409, "x"), LibraryError::NoProject));
        assert!(matches!(LibraryError::from_http_status(422, "x"), LibraryError::RequestFailed(_)));
        assert!(matches!(LibraryError::from_http_status(500, "x"), LibraryError::ServerError(500, _)));
        assert!(LibraryError::from_http_status(503, "starting").is_connection_error());
    }
}
