//! Job processing: convert, import, and build timelines.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use tracing::Instrument;

use lrr_library::{clip_props, AssetLibrary, ClipId};
use lrr_media::RawConverter;
use lrr_models::{extension_lowercase, Job};

use crate::bins::{BinLayout, BinResolver};
use crate::error::WorkerResult;
use crate::identity::IdentityTracker;
use crate::logging::JobLogger;
use crate::metrics;
use crate::timeline::{CreatedTimeline, TimelineSynthesizer};

/// Extensions a RAW job passes over instead of converting.
pub const RAW_SKIP_EXTENSIONS: [&str; 8] = [
    ".jpg", ".jpeg", ".png", ".tif", ".tiff", ".psd", ".mp4", ".mov",
];

/// Why a job ended without a usable result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    /// RAW job with no DNG converter installed
    ConverterUnavailable,
    /// Every input was skipped or failed to convert
    NothingToImport,
    /// The library imported none of the files
    NothingImported,
    /// No clip produced a timeline
    NoTimelinesCreated,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FailureReason::ConverterUnavailable => "DNG converter not available for RAW job",
            FailureReason::NothingToImport => "no files to import",
            FailureReason::NothingImported => "no clips were imported",
            FailureReason::NoTimelinesCreated => "no timelines were created",
        })
    }
}

/// Why an input file was left out of the import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Already a format the library imports directly
    NotRaw,
    ConversionFailed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub path: String,
    pub reason: SkipReason,
}

/// What a completed job did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobReport {
    /// Clips the library imported
    pub imported: usize,
    /// Names of the timelines created, in clip order
    pub timelines: Vec<String>,
    pub skipped_files: Vec<SkippedFile>,
    /// RAW files handed to the converter
    pub conversions_attempted: usize,
    /// Clips that did not get a timeline
    pub failed_clips: Vec<ClipId>,
}

impl JobReport {
    pub fn timelines_created(&self) -> usize {
        self.timelines.len()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome {
    Completed(JobReport),
    Failed(FailureReason),
}

/// Runs one job against the media pool.
#[derive(Clone)]
pub struct JobProcessor {
    library: Arc<dyn AssetLibrary>,
    converter: Option<Arc<dyn RawConverter>>,
    layout: BinLayout,
}

impl JobProcessor {
    /// `converter` is `None` when no DNG converter is installed; RAW jobs then fail.
    pub fn new(library: Arc<dyn AssetLibrary>, converter: Option<Arc<dyn RawConverter>>) -> Self {
        Self {
            library,
            converter,
            layout: BinLayout::default(),
        }
    }

    pub fn with_layout(mut self, layout: BinLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Process a job.
    ///
    /// Per-file and per-clip problems are logged and recorded in the report.
    /// `Err` means the job could not get at the media pool at all (root
    /// folder, bin creation, import call) or lost the connection midway.
    pub async fn process(&self, job: &Job) -> WorkerResult<JobOutcome> {
        let logger = JobLogger::new(&job.id);
        let span = logger.span();
        self.process_inner(job, &logger).instrument(span).await
    }

    async fn process_inner(&self, job: &Job, logger: &JobLogger) -> WorkerResult<JobOutcome> {
        logger.log_received(job);

        let mut identities = IdentityTracker::from_entries(&job.files);
        let mut report = JobReport::default();

        let import_paths = if job.is_raw() {
            let Some(converter) = self.converter.as_deref() else {
                logger.log_failure(FailureReason::ConverterUnavailable);
                return Ok(JobOutcome::Failed(FailureReason::ConverterUnavailable));
            };
            convert_raw_files(converter, job, &mut identities, &mut report, logger).await
        } else {
            job.input_paths().map(str::to_string).collect::<Vec<_>>()
        };

        if import_paths.is_empty() {
            logger.log_failure(FailureReason::NothingToImport);
            return Ok(JobOutcome::Failed(FailureReason::NothingToImport));
        }

        let bins = BinResolver::new(self.library.as_ref())
            .resolve_job_bins(&self.layout, job)
            .await?;
        if !self.library.set_current_folder(&bins.source_bin).await? {
            logger.log_warning("Could not select source bin; media lands in the current folder");
        }

        let clips = self.library.import_media(&import_paths).await?;
        if clips.is_empty() {
            logger.log_failure(FailureReason::NothingImported);
            return Ok(JobOutcome::Failed(FailureReason::NothingImported));
        }
        report.imported = clips.len();
        logger.log_import(clips.len());

        let synthesizer = TimelineSynthesizer::new(self.library.as_ref(), bins.timeline_bin);
        for clip in &clips {
            match self.build_timeline(&synthesizer, clip, &identities).await {
                Ok(Some((created, vertical))) => {
                    logger.log_timeline(&created, vertical);
                    metrics::record_timeline_created();
                    report.timelines.push(created.name);
                }
                Ok(None) => {
                    logger.log_clip_failed(clip, "timeline was not created");
                    report.failed_clips.push(clip.clone());
                }
                Err(e) if e.is_connection_lost() => return Err(e),
                Err(e) => {
                    logger.log_clip_failed(clip, &e.to_string());
                    report.failed_clips.push(clip.clone());
                }
            }
        }

        if report.timelines.is_empty() {
            logger.log_failure(FailureReason::NoTimelinesCreated);
            return Ok(JobOutcome::Failed(FailureReason::NoTimelinesCreated));
        }

        logger.log_completion(&report);
        Ok(JobOutcome::Completed(report))
    }

    async fn build_timeline(
        &self,
        synthesizer: &TimelineSynthesizer<'_>,
        clip: &ClipId,
        identities: &IdentityTracker,
    ) -> WorkerResult<Option<(CreatedTimeline, bool)>> {
        let file_path = self
            .library
            .clip_property(clip, clip_props::FILE_PATH)
            .await?
            .unwrap_or_default();
        let identity = identities.lookup(&file_path);
        let created = synthesizer.synthesize(clip, &identity).await?;
        Ok(created.map(|created| (created, identity.is_vertical)))
    }
}

/// Convert a RAW job's inputs, returning the paths to import.
///
/// Skip-listed files and failed conversions are recorded in `report` and
/// left out. Skip-listed files do not count as conversion attempts.
async fn convert_raw_files(
    converter: &dyn RawConverter,
    job: &Job,
    identities: &mut IdentityTracker,
    report: &mut JobReport,
    logger: &JobLogger,
) -> Vec<String> {
    let mut converted = Vec::with_capacity(job.files.len());

    for path in job.input_paths() {
        let skip = extension_lowercase(path)
            .is_some_and(|ext| RAW_SKIP_EXTENSIONS.contains(&ext.as_str()));
        if skip {
            let skipped = SkippedFile {
                path: path.to_string(),
                reason: SkipReason::NotRaw,
            };
            logger.log_skip(&skipped);
            report.skipped_files.push(skipped);
            continue;
        }

        report.conversions_attempted += 1;
        match converter.convert(Path::new(path)).await {
            Ok(dng) => {
                metrics::record_conversion(true);
                let dng = dng.to_string_lossy().to_string();
                logger.log_conversion(path, &dng, converter.name());
                identities.carry_over(path, dng.clone());
                converted.push(dng);
            }
            Err(e) => {
                metrics::record_conversion(false);
                let skipped = SkippedFile {
                    path: path.to_string(),
                    reason: SkipReason::ConversionFailed(e.to_string()),
                };
                logger.log_skip(&skipped);
                report.skipped_files.push(skipped);
            }
        }
    }

    logger.log_conversions(converted.len(), report.conversions_attempted);
    converted
}
