//! Structured job logging.
//!
//! Every event carries the job ID so a run over several jobs can be split
//! back apart. Gateway and converter events nest under [`JobLogger::span`].

use tracing::{error, info, warn, Span};

use lrr_library::ClipId;
use lrr_models::{Job, JobId};

use crate::processor::{FailureReason, JobReport, SkipReason, SkippedFile};
use crate::timeline::CreatedTimeline;

/// Job logger for one photo import.
#[derive(Debug, Clone)]
pub struct JobLogger {
    job_id: String,
}

impl JobLogger {
    pub fn new(job_id: &JobId) -> Self {
        Self {
            job_id: job_id.to_string(),
        }
    }

    pub fn span(&self) -> Span {
        tracing::info_span!("photo_import", job_id = %self.job_id)
    }

    pub fn log_received(&self, job: &Job) {
        info!(
            job_id = %self.job_id,
            files = job.files.len(),
            source_type = %job.source_type,
            bin = %job.bin_path,
            "Job started"
        );
    }

    pub fn log_skip(&self, skipped: &SkippedFile) {
        match &skipped.reason {
            SkipReason::NotRaw => info!(
                job_id = %self.job_id,
                path = %skipped.path,
                "Skipping non-RAW file in RAW job"
            ),
            SkipReason::ConversionFailed(message) => warn!(
                job_id = %self.job_id,
                path = %skipped.path,
                "Conversion failed: {}", message
            ),
        }
    }

    pub fn log_conversion(&self, raw: &str, dng: &str, converter: &str) {
        info!(job_id = %self.job_id, path = raw, dng, "Converted with {}", converter);
    }

    pub fn log_conversions(&self, converted: usize, attempted: usize) {
        info!(
            job_id = %self.job_id,
            "{}",
            conversion_summary(converted, attempted)
        );
    }

    pub fn log_import(&self, clips: usize) {
        info!(job_id = %self.job_id, clips, "Imported {} clip(s)", clips);
    }

    pub fn log_timeline(&self, created: &CreatedTimeline, vertical: bool) {
        info!(
            job_id = %self.job_id,
            timeline = %created.name,
            width = created.spec.width,
            height = created.spec.height,
            rotation = created.spec.rotation_angle,
            vertical,
            "Created timeline"
        );
    }

    pub fn log_clip_failed(&self, clip: &ClipId, message: &str) {
        warn!(job_id = %self.job_id, clip = %clip, "Skipping clip: {}", message);
    }

    pub fn log_warning(&self, message: &str) {
        warn!(job_id = %self.job_id, "{}", message);
    }

    pub fn log_failure(&self, reason: FailureReason) {
        error!(job_id = %self.job_id, "Job failed: {}", reason);
    }

    pub fn log_completion(&self, report: &JobReport) {
        info!(
            job_id = %self.job_id,
            timelines = report.timelines_created(),
            failed_clips = report.failed_clips.len(),
            "Job completed: {}",
            report_summary(report)
        );
    }
}

/// `"Converted 2 of 3 RAW file(s)"`, counting only files sent to the converter.
pub fn conversion_summary(converted: usize, attempted: usize) -> String {
    format!("Converted {} of {} RAW file(s)", converted, attempted)
}

/// One-line summary of a completed job.
pub fn report_summary(report: &JobReport) -> String {
    let mut summary = format!(
        "{} timeline(s) from {} clip(s)",
        report.timelines_created(),
        report.imported
    );
    if !report.failed_clips.is_empty() {
        summary.push_str(&format!(", {} clip(s) without a timeline", report.failed_clips.len()));
    }
    if !report.skipped_files.is_empty() {
        summary.push_str(&format!(", {} file(s) skipped", report.skipped_files.len()));
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_summary_mentions_only_what_happened() {
        let mut report = JobReport {
            imported: 2,
            timelines: vec!["IMG_1".into(), "IMG_2".into()],
            ..JobReport::default()
        };
        assert_eq!(report_summary(&report), "2 timeline(s) from 2 clip(s)");

        report.timelines.pop();
        report.failed_clips.push(ClipId::new("clip-1"));
        report.skipped_files.push(SkippedFile {
            path: "/r/IMG_3.jpg".into(),
            reason: SkipReason::NotRaw,
        });
        assert_eq!(
            report_summary(&report),
            "1 timeline(s) from 2 clip(s), 1 clip(s) without a timeline, 1 file(s) skipped"
        );
    }

    #[test]
    fn test_conversion_summary() {
        assert_eq!(conversion_summary(1, 2), "Converted 1 of 2 RAW file(s)");
    }
}
