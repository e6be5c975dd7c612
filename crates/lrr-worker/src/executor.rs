//! Job executor.
//!
//! Drains the queue once, oldest job first. Jobs that fail stay queued and
//! are attempted again on the next run. Losing the connection to the
//! library ends the pass early and leaves every remaining job queued.

use tracing::{error, info, warn};

use lrr_queue::{JobQueue, PendingJob};

use crate::error::{error_chain, WorkerResult};
use crate::metrics;
use crate::processor::{JobOutcome, JobProcessor};

/// Result of one pass over the queue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainSummary {
    /// Jobs processed and archived
    pub completed: usize,
    /// Jobs left in the queue
    pub failed: usize,
}

/// What happened to one job file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Execution {
    Archived,
    LeftQueued,
    ConnectionLost,
}

/// Job executor that processes jobs from the queue.
pub struct JobExecutor {
    queue: JobQueue,
    processor: JobProcessor,
}

impl JobExecutor {
    pub fn new(queue: JobQueue, processor: JobProcessor) -> Self {
        Self { queue, processor }
    }

    /// Process every pending job, one at a time.
    ///
    /// Only failing to read the queue directory itself is an error; job
    /// failures are logged and counted.
    pub async fn run_once(&self) -> WorkerResult<DrainSummary> {
        self.queue.init().await?;

        let pending = self.queue.pending().await?;
        if pending.is_empty() {
            info!("Queue is empty");
            return Ok(DrainSummary::default());
        }
        info!("Found {} pending job(s)", pending.len());

        let mut summary = DrainSummary::default();
        for (index, job_file) in pending.iter().enumerate() {
            match self.execute(job_file).await {
                Execution::Archived => summary.completed += 1,
                Execution::LeftQueued => summary.failed += 1,
                Execution::ConnectionLost => {
                    let remaining = pending.len() - index;
                    error!(remaining, "Lost connection to the library, leaving remaining jobs queued");
                    summary.failed += remaining;
                    break;
                }
            }
        }

        info!(
            completed = summary.completed,
            failed = summary.failed,
            "Queue drained"
        );
        Ok(summary)
    }

    /// Run one job file.
    async fn execute(&self, pending: &PendingJob) -> Execution {
        info!(job_id = %pending.id(), "Processing {}", pending.file_name);

        let job = match self.queue.load(pending).await {
            Ok(job) => job,
            Err(e) => {
                error!(job_id = %pending.id(), "Error processing {}: {}", pending.file_name, error_chain(&e));
                metrics::record_job("error");
                return Execution::LeftQueued;
            }
        };

        match self.processor.process(&job).await {
            Ok(JobOutcome::Completed(report)) => match self.queue.archive(pending).await {
                Ok(_) => {
                    info!(
                        job_id = %job.id,
                        timelines = report.timelines_created(),
                        "Job completed: {}", pending.file_name
                    );
                    metrics::record_job("completed");
                    Execution::Archived
                }
                Err(e) => {
                    error!(job_id = %job.id, "Job completed but could not be archived: {}", error_chain(&e));
                    metrics::record_job("error");
                    Execution::LeftQueued
                }
            },
            Ok(JobOutcome::Failed(reason)) => {
                warn!(job_id = %job.id, "Job failed: {} ({})", pending.file_name, reason);
                metrics::record_job("failed");
                Execution::LeftQueued
            }
            Err(e) => {
                error!(
                    job_id = %job.id,
                    error = ?e,
                    "Error processing {}: {}", pending.file_name, error_chain(&e)
                );
                metrics::record_job("error");
                if e.is_connection_lost() {
                    Execution::ConnectionLost
                } else {
                    Execution::LeftQueued
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lrr_library::InMemoryLibrary;
    use lrr_queue::QueueConfig;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_empty_queue() {
        let dir = tempfile::tempdir().unwrap();
        let executor = JobExecutor::new(
            JobQueue::new(QueueConfig::with_root(dir.path())),
            JobProcessor::new(Arc::new(InMemoryLibrary::permissive()), None),
        );

        let summary = executor.run_once().await.unwrap();
        assert_eq!(summary, DrainSummary::default());
        assert!(dir.path().join("queue").is_dir());
        assert!(dir.path().join("processed").is_dir());
    }

    #[tokio::test]
    async fn test_unreadable_job_stays_queued() {
        let dir = tempfile::tempdir().unwrap();
        let queue = JobQueue::new(QueueConfig::with_root(dir.path()));
        queue.init().await.unwrap();
        std::fs::write(queue.config().pending_dir.join("bad.json"), "{ nope").unwrap();

        let executor = JobExecutor::new(
            queue,
            JobProcessor::new(Arc::new(InMemoryLibrary::permissive()), None),
        );

        let summary = executor.run_once().await.unwrap();
        assert_eq!(summary, DrainSummary { completed: 0, failed: 1 });
        assert!(dir.path().join("queue/bad.json").exists());
    }

    fn write_job(queue: &JobQueue, file_name: &str, body: &str) {
        std::fs::write(queue.config().pending_dir.join(file_name), body).unwrap();
    }

    #[tokio::test]
    async fn test_rejected_bin_leaves_job_queued() {
        let dir = tempfile::tempdir().unwrap();
        let queue = JobQueue::new(QueueConfig::with_root(dir.path()));
        queue.init().await.unwrap();
        write_job(&queue, "job_1.json", r#"{ "files": ["/shoot/A/one.tif"] }"#);

        let library = Arc::new(InMemoryLibrary::permissive().reject_folder("Source Photos"));
        let executor = JobExecutor::new(queue, JobProcessor::new(library.clone(), None));

        let summary = executor.run_once().await.unwrap();
        assert_eq!(summary, DrainSummary { completed: 0, failed: 1 });
        assert!(dir.path().join("queue/job_1.json").exists());
        assert!(!dir.path().join("processed/job_1.json").exists());
        assert!(library.timelines().is_empty());
    }

    #[tokio::test]
    async fn test_lost_connection_stops_the_drain() {
        let dir = tempfile::tempdir().unwrap();
        let queue = JobQueue::new(QueueConfig::with_root(dir.path()));
        queue.init().await.unwrap();
        write_job(&queue, "job_1.json", r#"{ "files": ["/shoot/A/one.tif"] }"#);
        write_job(&queue, "job_2.json", r#"{ "files": ["/shoot/A/two.tif"] }"#);

        let executor = JobExecutor::new(
            queue,
            JobProcessor::new(Arc::new(InMemoryLibrary::permissive().disconnected()), None),
        );

        let summary = executor.run_once().await.unwrap();
        assert_eq!(summary, DrainSummary { completed: 0, failed: 2 });
        assert!(dir.path().join("queue/job_1.json").exists());
        assert!(dir.path().join("queue/job_2.json").exists());
    }
}
