//! Job queue backed by two directories.
//!
//! The Lightroom plugin drops one JSON document per job into `queue/`.
//! Completed jobs are moved to `processed/` under the same file name; failed
//! jobs stay where they are and are picked up again on the next run.

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use directories::BaseDirs;
use tracing::{debug, info};

use lrr_models::{Job, JobId};

use crate::error::{QueueError, QueueResult};
use crate::fs_utils::move_replacing;

/// Directory name shared with the Lightroom plugin.
pub const APP_DIR_NAME: &str = "LightroomToResolve";

/// Queue configuration.
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// Directory the plugin writes job files into
    pub pending_dir: PathBuf,
    /// Directory completed job files are moved to
    pub processed_dir: PathBuf,
}

impl QueueConfig {
    /// Queue rooted at `root` (`<root>/queue`, `<root>/processed`).
    pub fn with_root(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            pending_dir: root.join("queue"),
            processed_dir: root.join("processed"),
        }
    }

    /// Platform default: `%APPDATA%` on Windows, `~/Library/Application Support`
    /// on macOS, `~/.config` elsewhere, each followed by [`APP_DIR_NAME`].
    pub fn platform_default() -> QueueResult<Self> {
        let base = BaseDirs::new().ok_or(QueueError::NoConfigDir)?;
        Ok(Self::with_root(base.config_dir().join(APP_DIR_NAME)))
    }

    /// Create config from environment variables (`LRR_QUEUE_ROOT` overrides
    /// the platform default).
    pub fn from_env() -> QueueResult<Self> {
        match std::env::var("LRR_QUEUE_ROOT") {
            Ok(root) if !root.is_empty() => Ok(Self::with_root(root)),
            _ => Self::platform_default(),
        }
    }
}

/// A job file waiting in the pending directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingJob {
    pub path: PathBuf,
    pub file_name: String,
    pub modified: DateTime<Utc>,
}

impl PendingJob {
    pub fn id(&self) -> JobId {
        JobId::from_file_name(&self.file_name)
    }

    fn submission_order(&self, other: &Self) -> Ordering {
        self.modified
            .cmp(&other.modified)
            .then_with(|| self.file_name.cmp(&other.file_name))
    }
}

/// File-based job queue.
#[derive(Debug, Clone)]
pub struct JobQueue {
    config: QueueConfig,
}

impl JobQueue {
    pub fn new(config: QueueConfig) -> Self {
        Self { config }
    }

    /// Create from environment variables.
    pub fn from_env() -> QueueResult<Self> {
        Ok(Self::new(QueueConfig::from_env()?))
    }

    pub fn config(&self) -> &QueueConfig {
        &self.config
    }

    /// Create the queue directories if they are missing.
    pub async fn init(&self) -> QueueResult<()> {
        tokio::fs::create_dir_all(&self.config.pending_dir).await?;
        tokio::fs::create_dir_all(&self.config.processed_dir).await?;
        debug!(
            "Queue directories ready: {}, {}",
            self.config.pending_dir.display(),
            self.config.processed_dir.display()
        );
        Ok(())
    }

    /// Pending `*.json` job files, oldest first.
    pub async fn pending(&self) -> QueueResult<Vec<PendingJob>> {
        let mut jobs = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.config.pending_dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            let file_name = entry.file_name().to_string_lossy().to_string();
            if !file_name.ends_with(".json") {
                continue;
            }
            let metadata = entry.metadata().await?;
            if !metadata.is_file() {
                continue;
            }
            jobs.push(PendingJob {
                path: entry.path(),
                file_name,
                modified: DateTime::<Utc>::from(metadata.modified()?),
            });
        }

        jobs.sort_by(PendingJob::submission_order);
        Ok(jobs)
    }

    /// Read and parse a pending job.
    pub async fn load(&self, pending: &PendingJob) -> QueueResult<Job> {
        let bytes = tokio::fs::read(&pending.path)
            .await
            .map_err(|source| QueueError::Read {
                path: pending.path.clone(),
                source,
            })?;

        let job = Job::from_json_slice(&bytes).map_err(|source| QueueError::Parse {
            path: pending.path.clone(),
            source,
        })?;

        Ok(job.with_id(pending.id()))
    }

    /// Move a completed job into the processed directory, replacing any
    /// earlier file of the same name.
    pub async fn archive(&self, pending: &PendingJob) -> QueueResult<PathBuf> {
        tokio::fs::create_dir_all(&self.config.processed_dir).await?;
        let destination = self.config.processed_dir.join(&pending.file_name);

        move_replacing(&pending.path, &destination)
            .await
            .map_err(|e| {
                QueueError::archive_failed(format!(
                    "{} -> {}: {}",
                    pending.path.display(),
                    destination.display(),
                    e
                ))
            })?;

        info!(job_id = %pending.id(), "Archived job to {}", destination.display());
        Ok(destination)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, SystemTime};

    fn write_job(dir: &Path, name: &str, body: &str, age_secs: u64) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, body).unwrap();
        let modified = SystemTime::now() - Duration::from_secs(age_secs);
        std::fs::File::options()
            .write(true)
            .open(&path)
            .unwrap()
            .set_modified(modified)
            .unwrap();
        path
    }

    async fn queue() -> (tempfile::TempDir, JobQueue) {
        let dir = tempfile::tempdir().unwrap();
        let queue = JobQueue::new(QueueConfig::with_root(dir.path()));
        queue.init().await.unwrap();
        (dir, queue)
    }

    #[tokio::test]
    async fn test_pending_sorted_by_modification_time() {
        let (_dir, queue) = queue().await;
        let pending_dir = queue.config().pending_dir.clone();

        write_job(&pending_dir, "b.json", "{}", 10);
        write_job(&pending_dir, "a.json", "{}", 5);
        write_job(&pending_dir, "c.json", "{}", 60);
        write_job(&pending_dir, "notes.txt", "ignore me", 100);
        std::fs::create_dir(pending_dir.join("dir.json")).unwrap();

        let names: Vec<_> = queue
            .pending()
            .await
            .unwrap()
            .into_iter()
            .map(|job| job.file_name)
            .collect();

        assert_eq!(names, vec!["c.json", "b.json", "a.json"]);
    }

    #[tokio::test]
    async fn test_load_assigns_id_from_file_name() {
        let (_dir, queue) = queue().await;
        write_job(
            &queue.config().pending_dir,
            "job_42.json",
            r#"{"sourceType":"TIFF","files":["/p/a.tif"]}"#,
            0,
        );

        let pending = queue.pending().await.unwrap();
        let job = queue.load(&pending[0]).await.unwrap();

        assert_eq!(job.id.as_str(), "job_42");
        assert_eq!(job.files.len(), 1);
    }

    #[tokio::test]
    async fn test_load_rejects_malformed_json() {
        let (_dir, queue) = queue().await;
        write_job(&queue.config().pending_dir, "broken.json", "{ not json", 0);

        let pending = queue.pending().await.unwrap();
        assert!(matches!(
            queue.load(&pending[0]).await,
            Err(QueueError::Parse { .. })
        ));
    }

    #[tokio::test]
    async fn test_archive_moves_into_processed() {
        let (_dir, queue) = queue().await;
        write_job(&queue.config().pending_dir, "done.json", "{}", 0);
        std::fs::write(queue.config().processed_dir.join("done.json"), "older").unwrap();

        let pending = queue.pending().await.unwrap();
        let archived = queue.archive(&pending[0]).await.unwrap();

        assert_eq!(archived, queue.config().processed_dir.join("done.json"));
        assert_eq!(std::fs::read_to_string(&archived).unwrap(), "{}");
        assert!(queue.pending().await.unwrap().is_empty());
    }

    #[test]
    fn test_with_root_layout() {
        let config = QueueConfig::with_root("/tmp/lrr");
        assert_eq!(config.pending_dir, PathBuf::from("/tmp/lrr/queue"));
        assert_eq!(config.processed_dir, PathBuf::from("/tmp/lrr/processed"));
    }
}
