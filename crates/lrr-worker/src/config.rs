//! Worker configuration.

use std::path::PathBuf;
use std::str::FromStr;

use crate::bins::BinLayout;
use crate::error::WorkerError;

/// Which media pool implementation the worker drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LibraryBackend {
    /// The scripting bridge running inside Resolve
    #[default]
    Bridge,
    /// In-process library; nothing reaches Resolve (dry run)
    Memory,
}

impl FromStr for LibraryBackend {
    type Err = WorkerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bridge" | "resolve" => Ok(LibraryBackend::Bridge),
            "memory" | "dry-run" => Ok(LibraryBackend::Memory),
            other => Err(WorkerError::config_error(format!(
                "unknown LIBRARY_BACKEND {other:?} (expected \"bridge\" or \"memory\")"
            ))),
        }
    }
}

/// Worker configuration.
#[derive(Debug, Clone, Default)]
pub struct WorkerConfig {
    /// Media pool backend
    pub library_backend: LibraryBackend,
    /// Explicit DNG converter executable; discovery runs when unset
    pub converter_path: Option<PathBuf>,
    /// Names of the two top-level bins
    pub layout: BinLayout,
}

impl WorkerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Result<Self, WorkerError> {
        let library_backend = match std::env::var("LIBRARY_BACKEND") {
            Ok(value) if !value.trim().is_empty() => value.parse()?,
            _ => LibraryBackend::default(),
        };

        let defaults = BinLayout::default();
        Ok(Self {
            library_backend,
            converter_path: std::env::var("DNG_CONVERTER_PATH")
                .ok()
                .filter(|s| !s.is_empty())
                .map(PathBuf::from),
            layout: BinLayout {
                collections_root: std::env::var("LRR_COLLECTIONS_BIN")
                    .ok()
                    .filter(|s| !s.trim().is_empty())
                    .unwrap_or(defaults.collections_root),
                source_root: std::env::var("LRR_SOURCE_BIN")
                    .ok()
                    .filter(|s| !s.trim().is_empty())
                    .unwrap_or(defaults.source_root),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_parsing() {
        assert_eq!("bridge".parse::<LibraryBackend>().unwrap(), LibraryBackend::Bridge);
        assert_eq!(" Memory ".parse::<LibraryBackend>().unwrap(), LibraryBackend::Memory);
        assert!(matches!(
            "sqlite".parse::<LibraryBackend>(),
            Err(WorkerError::ConfigError(_))
        ));
    }

    #[test]
    fn test_default_config() {
        let config = WorkerConfig::default();
        assert_eq!(config.library_backend, LibraryBackend::Bridge);
        assert!(config.converter_path.is_none());
        assert_eq!(config.layout.collections_root, "Collections");
        assert_eq!(config.layout.source_root, "Source Photos");
    }
}
