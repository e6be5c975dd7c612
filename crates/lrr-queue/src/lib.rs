//! File-based job queue.
//!
//! This crate provides:
//! - Per-OS queue location shared with the Lightroom export plugin
//! - Pending job listing in submission (modification time) order
//! - Best-effort job loading
//! - Archiving of completed jobs into the processed directory

pub mod error;
pub mod fs_utils;
pub mod queue;

pub use error::{QueueError, QueueResult};
pub use queue::{JobQueue, PendingJob, QueueConfig, APP_DIR_NAME};
