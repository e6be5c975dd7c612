//! Worker counters, recorded through the `metrics` facade.
//!
//! No exporter is installed by the binary; an embedding process can install
//! a recorder to collect these.

use metrics::counter;

/// Metric names as constants for consistency.
pub mod names {
    pub const JOBS_TOTAL: &str = "lrr_jobs_total";
    pub const TIMELINES_CREATED_TOTAL: &str = "lrr_timelines_created_total";
    pub const CONVERSIONS_TOTAL: &str = "lrr_conversions_total";
}

/// Record a finished job attempt (`completed`, `failed` or `error`).
pub fn record_job(outcome: &'static str) {
    counter!(names::JOBS_TOTAL, "outcome" => outcome).increment(1);
}

pub fn record_timeline_created() {
    counter!(names::TIMELINES_CREATED_TOTAL).increment(1);
}

/// Record one RAW conversion attempt.
pub fn record_conversion(success: bool) {
    let outcome = if success { "success" } else { "failure" };
    counter!(names::CONVERSIONS_TOTAL, "outcome" => outcome).increment(1);
}
