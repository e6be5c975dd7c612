//! Lightroom-to-Resolve job worker.
//!
//! This crate provides:
//! - Idempotent bin hierarchy resolution
//! - Identity tracking of files across RAW conversion
//! - Orientation-aware timeline synthesis
//! - The per-job processor and the queue drain loop

pub mod bins;
pub mod config;
pub mod error;
pub mod executor;
pub mod identity;
pub mod logging;
pub mod metrics;
pub mod processor;
pub mod timeline;

pub use bins::{BinLayout, BinResolver, JobBins};
pub use config::{LibraryBackend, WorkerConfig};
pub use error::{WorkerError, WorkerResult};
pub use executor::{DrainSummary, JobExecutor};
pub use identity::{FileIdentity, IdentityMatch, IdentityTracker};
pub use logging::JobLogger;
pub use processor::{FailureReason, JobOutcome, JobProcessor, JobReport, SkipReason, SkippedFile};
pub use timeline::{plan_timeline, CreatedTimeline, TimelineSynthesizer};
