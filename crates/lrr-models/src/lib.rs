//! Shared data models for the Lightroom-to-Resolve worker.
//!
//! This crate provides Serde-serializable types for:
//! - Job files dropped into the queue by the Lightroom plugin
//! - Per-file orientation metadata
//! - Clip resolutions and derived timeline specifications

pub mod job;
pub mod orientation;
pub mod resolution;
pub mod timeline;
pub mod utils;

// Re-export common types
pub use job::{FileEntry, Job, JobId, SourceType, DEFAULT_BIN_PATH, DEFAULT_SOURCE_BIN};
pub use orientation::Orientation;
pub use resolution::{Resolution, ResolutionParseError};
pub use timeline::TimelineSpec;
pub use utils::{extension_lowercase, file_name, file_stem, parent_dir_name};
