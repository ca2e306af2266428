//! Command implementation for the processor binary
//!
//! Reads one notification, assembles the pipeline from configuration and
//! command-line options, runs it and reports the outcome.

use crate::cli::args::{Args, Mode, StoreKind};
use crate::config::Config;
use crate::constants::env;
use crate::event::ObjectEvent;
use crate::models::{PipelineOutcome, ProcessingReport};
use crate::pipeline::EventPipeline;
use crate::sinks::{HttpSearchIndex, LogSearchIndex, RecorderMetricsSink, SearchIndex};
use crate::storage::{LocalObjectStore, ObjectStore, S3ObjectStore};
use crate::validator::PresenceValidatorLoader;

use anyhow::{Context, Result};
use colored::*;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tracing::{debug, info};

/// Run the processor for one notification
pub async fn run(args: Args) -> Result<PipelineOutcome> {
    let env_verbose = std::env::var(env::VERBOSE_OUTPUT).as_deref() == Ok("TRUE");
    setup_logging(&args, env_verbose);

    let config = load_config(&args)?;
    let event = read_event(&args.event).await?;

    let recorder = PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install metrics recorder")?;

    let pipeline = build_pipeline(&args, config).await?;
    let outcome = pipeline.handle(&event).await.with_context(|| {
        format!(
            "Failed to process s3://{}/{}",
            event.container, event.key
        )
    })?;

    print_summary(&event, &outcome);

    if let Some(path) = &args.metrics_textfile {
        write_metrics(&recorder, path).await?;
    }

    Ok(outcome)
}

/// Set up structured logging to stderr
pub fn setup_logging(args: &Args, env_verbose: bool) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level(env_verbose);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("bucket_event_processor={}", log_level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_writer(std::io::stderr),
        )
        .init();

    debug!("Logging initialized at level: {}", log_level);
}

/// Build configuration from the environment with command-line overrides
pub fn load_config(args: &Args) -> Result<Config> {
    let config = Config::from_lookup(|name| {
        args.override_for(name)
            .or_else(|| std::env::var(name).ok())
    })
    .context("Failed to load configuration")?;

    match args.mode {
        Mode::Validate => config.validate_for_validation(),
        Mode::Catalog => config.validate(),
    }
    .context("Invalid configuration")?;

    Ok(config)
}

async fn read_event(source: &str) -> Result<ObjectEvent> {
    let raw = if source == "-" {
        let mut raw = String::new();
        tokio::io::stdin()
            .read_to_string(&mut raw)
            .await
            .context("Failed to read event from stdin")?;
        raw
    } else {
        tokio::fs::read_to_string(source)
            .await
            .with_context(|| format!("Failed to read event file {}", source))?
    };

    ObjectEvent::from_json(&raw).context("Failed to parse event")
}

async fn build_pipeline(args: &Args, config: Config) -> Result<EventPipeline> {
    let store: Arc<dyn ObjectStore> = match args.store {
        StoreKind::S3 => Arc::new(S3ObjectStore::from_env().await),
        StoreKind::Local => {
            let root = args
                .local_root
                .clone()
                .context("--local-root is required for the local store")?;
            Arc::new(LocalObjectStore::new(root))
        }
    };

    let index: Arc<dyn SearchIndex> = match &config.search.endpoint {
        Some(endpoint) => Arc::new(HttpSearchIndex::new(
            endpoint.clone(),
            config.search.index_name.clone(),
        )),
        None => {
            info!("No search endpoint configured, logging metadata documents");
            Arc::new(LogSearchIndex)
        }
    };

    let pipeline = EventPipeline::new(
        Arc::new(config),
        store,
        index,
        Arc::new(RecorderMetricsSink),
    );

    Ok(match args.mode {
        Mode::Validate => pipeline.with_validation(Arc::new(PresenceValidatorLoader)),
        Mode::Catalog => pipeline,
    })
}

async fn write_metrics(recorder: &PrometheusHandle, path: &std::path::Path) -> Result<()> {
    tokio::fs::write(path, recorder.render())
        .await
        .with_context(|| format!("Failed to write metrics to {}", path.display()))?;
    debug!("Wrote metrics to {}", path.display());
    Ok(())
}

fn print_summary(event: &ObjectEvent, outcome: &PipelineOutcome) {
    match outcome {
        PipelineOutcome::Skipped(reason) => {
            println!("\n{}", "Object Skipped".bright_yellow().bold());
            println!("   • Object: s3://{}/{}", event.container, event.key);
            println!("   • Reason: {}", reason);
        }
        PipelineOutcome::Completed(report) => print_report(report),
    }
    println!();
}

fn print_report(report: &ProcessingReport) {
    println!("\n{}", "Processing Summary".bright_green().bold());
    println!("   • Object: s3://{}/{}", report.container, report.key);
    println!("   • Metadata fields: {}", report.metadata.len());

    if let Some(summary) = &report.summary {
        let status = if summary.passed() {
            "PASSED".bright_green().bold()
        } else {
            "FAILED".bright_red().bold()
        };
        println!("   • Validation: {}", status);
        println!(
            "   • Records: {} ({} valid, {} invalid)",
            summary.total_records.to_string().bright_white().bold(),
            summary.valid_messages(),
            summary.error_messages
        );
        println!(
            "   • Checks failed: {} of {}",
            summary.failed_checks, summary.total_checks
        );
    }

    println!("   • Metrics emitted: {}", report.emissions.len());
    for emission in &report.emissions {
        println!(
            "      {} {} = {}",
            emission.namespace.dimmed(),
            emission.metric_name,
            emission.value
        );
    }
}
