//! Lightroom-to-Resolve queue worker binary.
//!
//! Drains the job queue once and exits.

use std::sync::Arc;

use anyhow::Context;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use lrr_library::{AssetLibrary, BridgeClient, BridgeConfig, InMemoryLibrary};
use lrr_media::{DngConverter, RawConverter};
use lrr_queue::JobQueue;
use lrr_worker::{DrainSummary, JobExecutor, JobProcessor, LibraryBackend, WorkerConfig};

const DEFAULT_LOG_DIRECTIVES: &str = "lrr_worker=info,lrr_media=info,lrr_library=info,lrr_queue=info";

#[tokio::main(flavor = "current_thread")]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    info!("Starting lrr-worker");

    match run().await {
        Ok(summary) => info!(
            completed = summary.completed,
            failed = summary.failed,
            "lrr-worker finished"
        ),
        Err(e) => {
            error!("lrr-worker failed: {:#}", e);
            std::process::exit(1);
        }
    }
}

fn init_tracing() {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_DIRECTIVES));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }
}

async fn run() -> anyhow::Result<DrainSummary> {
    let config = WorkerConfig::from_env()?;
    info!("Worker config: {:?}", config);

    let queue = JobQueue::from_env().context("Failed to locate the job queue")?;
    info!("Queue: {}", queue.config().pending_dir.display());

    let converter: Option<Arc<dyn RawConverter>> =
        match DngConverter::discover(config.converter_path.as_deref()) {
            Ok(converter) => {
                info!("DNG converter: {}", converter.executable().display());
                Some(Arc::new(converter))
            }
            Err(e) => {
                warn!("{}; RAW jobs will fail until it is installed", e);
                None
            }
        };

    match config.library_backend {
        LibraryBackend::Bridge => {
            let bridge = BridgeClient::connect(BridgeConfig::from_env())
                .await
                .context("Could not connect to DaVinci Resolve")?;
            let library: Arc<dyn AssetLibrary> = Arc::new(bridge);
            drain(queue, library, converter, &config).await
        }
        LibraryBackend::Memory => {
            info!("Dry run: jobs are processed against an in-memory media pool");
            let memory = Arc::new(InMemoryLibrary::permissive());
            let summary = drain(queue, memory.clone(), converter, &config).await?;
            for timeline in memory.timelines() {
                info!(
                    timeline = %timeline.name,
                    bin = %timeline.folder_path,
                    settings = ?timeline.settings,
                    "Dry-run timeline"
                );
            }
            Ok(summary)
        }
    }
}

async fn drain(
    queue: JobQueue,
    library: Arc<dyn AssetLibrary>,
    converter: Option<Arc<dyn RawConverter>>,
    config: &WorkerConfig,
) -> anyhow::Result<DrainSummary> {
    let processor = JobProcessor::new(library, converter).with_layout(config.layout.clone());
    let summary = JobExecutor::new(queue, processor)
        .run_once()
        .await
        .context("Failed to drain the job queue")?;
    Ok(summary)
}
