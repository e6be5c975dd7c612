//! Worker error types.

use thiserror::Error;

pub type WorkerResult<T> = Result<T, WorkerError>;

/// Errors that abort a whole job.
///
/// Per-file and per-clip problems are contained inside the processor and
/// never surface here.
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Failed to create folder {name:?} under {parent}")]
    FolderCreation { parent: String, name: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Library error: {0}")]
    Library(#[from] lrr_library::LibraryError),

    #[error("Queue error: {0}")]
    Queue(#[from] lrr_queue::QueueError),
}

impl WorkerError {
    pub fn folder_creation(parent: impl ToString, name: impl Into<String>) -> Self {
        Self::FolderCreation {
            parent: parent.to_string(),
            name: name.into(),
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// The library went away; later jobs in the same run would fail too.
    pub fn is_connection_lost(&self) -> bool {
        matches!(self, WorkerError::Library(e) if e.is_connection_error())
    }
}

/// Render an error with its `source()` chain (`outer: inner: root`).
///
/// Causes already spelled out by their parent's message are not repeated.
pub fn error_chain(error: &(dyn std::error::Error + 'static)) -> String {
    let mut rendered = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let message = cause.to_string();
        if !rendered.ends_with(&message) {
            rendered.push_str(": ");
            rendered.push_str(&message);
        }
        source = cause.source();
    }
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_chain_skips_repeated_causes() {
        let err = WorkerError::from(lrr_queue::QueueError::Read {
            path: "/q/job.json".into(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        });
        assert_eq!(
            error_chain(&err),
            "Queue error: Failed to read job /q/job.json: denied"
        );
    }

    #[test]
    fn test_connection_lost() {
        let err = WorkerError::from(lrr_library::LibraryError::Unavailable("down".into()));
        assert!(err.is_connection_lost());
        assert!(!WorkerError::folder_creation("folder-0", "Collections").is_connection_lost());
    }
}
