//! Moving job files between queue directories.

use std::io;
use std::path::Path;

use tokio::fs;
use tracing::{debug, warn};

/// EXDEV on Linux and macOS.
const CROSS_DEVICE_ERRNO: i32 = 18;

/// Move `src` to `dst`, replacing any existing `dst`.
///
/// Tries a rename first. When the directories sit on different filesystems
/// (a synced config directory mounted elsewhere, for instance) the file is
/// copied next to `dst` under a temporary name, renamed into place, and the
/// source removed.
pub async fn move_replacing(src: &Path, dst: &Path) -> io::Result<()> {
    match fs::rename(src, dst).await {
        Ok(()) => Ok(()),
        Err(e) if e.raw_os_error() == Some(CROSS_DEVICE_ERRNO) => {
            debug!(
                "Cross-device move, copying instead: {} -> {}",
                src.display(),
                dst.display()
            );
            let staging = dst.with_extension("partial");
            fs::copy(src, &staging).await?;
            if let Err(e) = fs::rename(&staging, dst).await {
                let _ = fs::remove_file(&staging).await;
                return Err(e);
            }
            if let Err(e) = fs::remove_file(src).await {
                warn!("Moved {} but could not remove it: {}", src.display(), e);
            }
            Ok(())
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_move_replaces_existing() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("job.json");
        let dst = dir.path().join("processed.json");
        fs::write(&src, b"new").await.unwrap();
        fs::write(&dst, b"old").await.unwrap();

        move_replacing(&src, &dst).await.unwrap();

        assert!(!src.exists());
        assert_eq!(fs::read_to_string(&dst).await.unwrap(), "new");
    }

    #[tokio::test]
    async fn test_move_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        let result = move_replacing(&dir.path().join("gone.json"), &dir.path().join("x.json")).await;
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::NotFound);
    }
}
