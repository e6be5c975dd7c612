//! RAW-to-DNG conversion for the Lightroom-to-Resolve worker.
//!
//! This crate provides:
//! - The [`RawConverter`] seam the job pipeline converts through
//! - Adobe DNG Converter discovery (override, install locations, `PATH`)
//! - Type-safe converter command building and execution

pub mod command;
pub mod converter;
pub mod error;

pub use command::{ConverterRunner, DngCommand};
pub use converter::{dng_output_paths, DngConverter, RawConverter, CONVERTED_SUFFIX};
pub use error::{MediaError, MediaResult};
