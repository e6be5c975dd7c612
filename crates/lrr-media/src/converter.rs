//! RAW conversion seam and the Adobe DNG Converter implementation.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::command::{ConverterRunner, DngCommand};
use crate::error::{MediaError, MediaResult};

/// Suffix appended to converted files so they never collide with a DNG
/// the photographer already had next to the RAW.
pub const CONVERTED_SUFFIX: &str = "_2d";

/// Executable name searched on `PATH` as a last resort.
const CONVERTER_BINARY: &str = "Adobe DNG Converter";

/// Converts a camera RAW file into an intermediate format the host can import.
#[async_trait]
pub trait RawConverter: Send + Sync {
    /// Short name for logging.
    fn name(&self) -> &str;

    /// Convert `raw_path`, returning the path of the converted file.
    async fn convert(&self, raw_path: &Path) -> MediaResult<PathBuf>;
}

/// Paths the converter may leave behind for `raw_path`:
/// `(<stem>.dng, <stem>_2d.dng)`, both in the RAW file's directory.
pub fn dng_output_paths(raw_path: &Path) -> (PathBuf, PathBuf) {
    let dir = raw_path.parent().unwrap_or_else(|| Path::new(""));
    let stem = raw_path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();

    (
        dir.join(format!("{stem}.dng")),
        dir.join(format!("{stem}{CONVERTED_SUFFIX}.dng")),
    )
}

/// Adobe DNG Converter driven through its command line interface.
#[derive(Debug, Clone)]
pub struct DngConverter {
    runner: ConverterRunner,
}

impl DngConverter {
    /// Use a specific converter executable.
    pub fn new(executable: impl AsRef<Path>) -> Self {
        Self {
            runner: ConverterRunner::new(executable),
        }
    }

    /// Locate the converter.
    ///
    /// Checks `override_path` first, then the vendor's default install
    /// locations, then `PATH`.
    pub fn discover(override_path: Option<&Path>) -> MediaResult<Self> {
        if let Some(path) = override_path {
            if path.is_file() {
                info!("Using DNG converter from override: {}", path.display());
                return Ok(Self::new(path));
            }
            warn!(
                "Configured DNG converter does not exist: {}, searching default locations",
                path.display()
            );
        }

        if let Some(path) = Self::well_known_locations()
            .into_iter()
            .find(|candidate| candidate.is_file())
        {
            info!("Found DNG converter: {}", path.display());
            return Ok(Self::new(path));
        }

        which::which(CONVERTER_BINARY)
            .map(Self::new)
            .map_err(|_| MediaError::ConverterNotFound)
    }

    /// Default install locations for the current platform.
    pub fn well_known_locations() -> Vec<PathBuf> {
        if cfg!(target_os = "windows") {
            vec![
                PathBuf::from(r"C:\Program Files\Adobe\Adobe DNG Converter\Adobe DNG Converter.exe"),
                PathBuf::from(
                    r"C:\Program Files (x86)\Adobe\Adobe DNG Converter\Adobe DNG Converter.exe",
                ),
            ]
        } else {
            vec![PathBuf::from(
                "/Applications/Adobe DNG Converter.app/Contents/MacOS/Adobe DNG Converter",
            )]
        }
    }

    pub fn executable(&self) -> &Path {
        self.runner.program()
    }
}

#[async_trait]
impl RawConverter for DngConverter {
    fn name(&self) -> &str {
        "Adobe DNG Converter"
    }

    async fn convert(&self, raw_path: &Path) -> MediaResult<PathBuf> {
        if !tokio::fs::try_exists(raw_path).await.unwrap_or(false) {
            return Err(MediaError::FileNotFound(raw_path.to_path_buf()));
        }

        let source_dir = raw_path.parent().unwrap_or_else(|| Path::new("."));
        let (expected, renamed) = dng_output_paths(raw_path);

        // Stale outputs from an earlier run would be mistaken for fresh ones.
        for stale in [&expected, &renamed] {
            if let Err(e) = tokio::fs::remove_file(stale).await {
                if e.kind() != std::io::ErrorKind::NotFound {
                    debug!("Could not remove stale {}: {}", stale.display(), e);
                }
            }
        }

        info!("Converting: {} -> DNG", raw_path.display());
        self.runner.run(&DngCommand::new(raw_path, source_dir)).await?;

        if tokio::fs::try_exists(&expected).await.unwrap_or(false) {
            return match tokio::fs::rename(&expected, &renamed).await {
                Ok(()) => Ok(renamed),
                Err(e) => {
                    warn!("Failed to rename DNG {}: {}", expected.display(), e);
                    Ok(expected)
                }
            };
        }

        if tokio::fs::try_exists(&renamed).await.unwrap_or(false) {
            return Ok(renamed);
        }

        Err(MediaError::OutputMissing(expected))
    }
}
