//! Event pipeline orchestration.
//!
//! Sequences one object event through fetching, record streaming, prefix
//! matching, validation, metadata derivation and emission. The catalog
//! variant built by [`EventPipeline::new`] derives metadata and counters from
//! the key alone; [`EventPipeline::with_validation`] adds record validation
//! against the configuration stored under the matched prefix.

pub mod emissions;
pub mod metadata;
pub mod staging;
pub mod streaming;
pub mod validation;

#[cfg(test)]
pub mod tests;

use self::{
    emissions::{EmissionRules, derive_emissions},
    metadata::{ExtractionPolicy, KeyMetadataExtractor, has_positional_segments},
    staging::StagedFile,
    streaming::stream_records,
    validation::{aggregate, log_summary},
};

use crate::config::Config;
use crate::constants::{STAGED_CONFIG_PREFIX, STAGED_OBJECT_PREFIX, fields};
use crate::error::{ProcessorError, Result};
use crate::event::ObjectEvent;
use crate::models::{
    KeyMetadata, MetricEmission, ObjectDescriptor, PipelineOutcome, PipelineStage,
    ProcessingReport, RecordQueue, SkipReason, ValidationSummary,
};
use crate::sinks::{MetricsSink, SearchIndex};
use crate::storage::ObjectStore;
use crate::validator::ValidatorLoader;

use std::sync::Arc;
use tokio::task;
use tracing::{debug, error, info, warn};

/// Current stage of one event, logged on every transition
#[derive(Debug)]
struct StageTracker<'a> {
    stage: PipelineStage,
    event: &'a ObjectEvent,
}

impl<'a> StageTracker<'a> {
    fn new(event: &'a ObjectEvent) -> Self {
        debug!(
            "{}/{}: entering {}",
            event.container,
            event.key,
            PipelineStage::Fetching
        );
        Self {
            stage: PipelineStage::Fetching,
            event,
        }
    }

    fn advance(&mut self, next: PipelineStage) {
        debug!(
            "{}/{}: {} -> {}",
            self.event.container, self.event.key, self.stage, next
        );
        self.stage = next;
    }

    fn fail(&mut self, err: &ProcessorError) {
        error!(
            "Processing failed in stage {} for container '{}' key '{}': {}",
            self.stage, self.event.container, self.event.key, err
        );
        self.stage = PipelineStage::Failed;
    }
}

/// Processes object events against injected storage and sinks
#[derive(Clone)]
pub struct EventPipeline {
    config: Arc<Config>,
    store: Arc<dyn ObjectStore>,
    index: Arc<dyn SearchIndex>,
    metrics: Arc<dyn MetricsSink>,
    validation: Option<Arc<dyn ValidatorLoader>>,
    extractor: KeyMetadataExtractor,
}

impl EventPipeline {
    /// Create the catalog pipeline, which derives metadata from keys only
    pub fn new(
        config: Arc<Config>,
        store: Arc<dyn ObjectStore>,
        index: Arc<dyn SearchIndex>,
        metrics: Arc<dyn MetricsSink>,
    ) -> Self {
        let extractor = KeyMetadataExtractor::new(config.environment.clone());
        Self {
            config,
            store,
            index,
            metrics,
            validation: None,
            extractor,
        }
    }

    /// Validate records with validators built by `loader`
    pub fn with_validation(mut self, loader: Arc<dyn ValidatorLoader>) -> Self {
        self.validation = Some(loader);
        self
    }

    pub fn is_validating(&self) -> bool {
        self.validation.is_some()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Handle one object event
    pub async fn handle(&self, event: &ObjectEvent) -> Result<PipelineOutcome> {
        info!("Processing s3://{}/{}", event.container, event.key);
        let mut tracker = StageTracker::new(event);

        let result = match &self.validation {
            Some(loader) => self.run_validating(event, loader, &mut tracker).await,
            None => self.run_catalog(event, &mut tracker).await,
        };

        match &result {
            Ok(PipelineOutcome::Completed(_)) => tracker.advance(PipelineStage::Done),
            Ok(PipelineOutcome::Skipped(reason)) => {
                debug!("{}/{}: skipped, {}", event.container, event.key, reason);
            }
            Err(e) => tracker.fail(e),
        }
        result
    }

    async fn run_catalog(
        &self,
        event: &ObjectEvent,
        tracker: &mut StageTracker<'_>,
    ) -> Result<PipelineOutcome> {
        let descriptor = self.store.head_object(&event.container, &event.key).await?;

        tracker.advance(PipelineStage::Deriving);
        let policy = ExtractionPolicy::for_dataset(descriptor.dataset());
        if policy == ExtractionPolicy::PositionalSegment && !has_positional_segments(&descriptor.key)
        {
            warn!(
                "Ignoring '{}': {}",
                descriptor.key,
                SkipReason::InsufficientKeyDepth
            );
            return Ok(PipelineOutcome::Skipped(SkipReason::InsufficientKeyDepth));
        }

        let metadata = self.extractor.extract(&descriptor, &policy);
        let role = self.config.role_of(&descriptor.container);
        let emissions = derive_emissions(EmissionRules::Catalog, role, &metadata, None)?;

        tracker.advance(PipelineStage::Emitting);
        self.emit(&descriptor, &metadata, &emissions).await?;

        Ok(PipelineOutcome::Completed(ProcessingReport {
            container: descriptor.container,
            key: descriptor.key,
            metadata,
            summary: None,
            emissions,
        }))
    }

    async fn run_validating(
        &self,
        event: &ObjectEvent,
        loader: &Arc<dyn ValidatorLoader>,
        tracker: &mut StageTracker<'_>,
    ) -> Result<PipelineOutcome> {
        let descriptor = self.store.head_object(&event.container, &event.key).await?;

        tracker.advance(PipelineStage::Classifying);
        let records = self.stage_records(&descriptor, tracker).await?;

        tracker.advance(PipelineStage::MatchingPrefix);
        let Some(prefix) = self.config.match_prefix(&descriptor.key) else {
            warn!("File path '{}' not found in known prefixes", descriptor.key);
            return Ok(PipelineOutcome::Skipped(SkipReason::NoPrefixMatch));
        };
        if descriptor.key.matches('/').count() <= prefix.matches('/').count() + 1 {
            let reason = SkipReason::PrefixRoot {
                prefix: prefix.to_string(),
            };
            warn!("Ignoring '{}': {}", descriptor.key, reason);
            return Ok(PipelineOutcome::Skipped(reason));
        }

        debug!("Key '{}' matched prefix '{}'", descriptor.key, prefix);
        let mut metadata = self
            .extractor
            .extract(&descriptor, &ExtractionPolicy::PrefixRelative);
        let message_count = records.len();

        tracker.advance(PipelineStage::Validating);
        let summary = self
            .validate_records(&descriptor.container, prefix, records, loader)
            .await?;
        log_summary(
            &summary,
            &descriptor.key,
            metadata.get_str(fields::DATA_TYPE).unwrap_or_default(),
            self.config.verbose,
        );

        tracker.advance(PipelineStage::Deriving);
        metadata.insert(fields::MESSAGE_COUNT, message_count);
        let role = self.config.role_of(&descriptor.container);
        let emissions = derive_emissions(
            EmissionRules::Validation,
            role,
            &metadata,
            Some(summary.record_counts()),
        )?;

        tracker.advance(PipelineStage::Emitting);
        self.emit(&descriptor, &metadata, &emissions).await?;

        Ok(PipelineOutcome::Completed(ProcessingReport {
            container: descriptor.container,
            key: descriptor.key,
            metadata,
            summary: Some(summary),
            emissions,
        }))
    }

    /// Download the object, classify it and read its records
    async fn stage_records(
        &self,
        descriptor: &ObjectDescriptor,
        tracker: &mut StageTracker<'_>,
    ) -> Result<RecordQueue> {
        let staged = StagedFile::create(&self.config.staging_dir, STAGED_OBJECT_PREFIX)?;
        self.store
            .download_object(&descriptor.container, &descriptor.key, staged.path())
            .await?;

        tracker.advance(PipelineStage::Streaming);
        let path = staged.path().to_path_buf();
        let (compression, records) = task::spawn_blocking(move || stream_records(&path)).await??;
        debug!(
            "Read {} records from {} object",
            records.len(),
            if compression.is_compressed() { "gzip" } else { "plain" }
        );

        drop(staged);
        Ok(records)
    }

    /// Stage the prefix configuration, build the validator and aggregate results
    async fn validate_records(
        &self,
        container: &str,
        prefix: &str,
        records: RecordQueue,
        loader: &Arc<dyn ValidatorLoader>,
    ) -> Result<ValidationSummary> {
        let staged = StagedFile::create(&self.config.staging_dir, STAGED_CONFIG_PREFIX)?;
        let config_key = self.config.validation_config_key(prefix);
        debug!("Fetching validation configuration {}", config_key);
        self.store
            .download_object(container, &config_key, staged.path())
            .await?;

        let loader = Arc::clone(loader);
        let path = staged.path().to_path_buf();
        let summary = task::spawn_blocking(move || {
            let validator = loader.load(&path)?;
            aggregate(records, validator.as_ref())
        })
        .await??;

        drop(staged);
        Ok(summary)
    }

    /// Index the metadata, then publish every emission in order
    async fn emit(
        &self,
        descriptor: &ObjectDescriptor,
        metadata: &KeyMetadata,
        emissions: &[MetricEmission],
    ) -> Result<()> {
        self.index.index(&descriptor.container, metadata).await?;
        for emission in emissions {
            self.metrics.put_metric_data(emission).await?;
        }
        debug!(
            "Published metadata and {} metric emissions for {}",
            emissions.len(),
            descriptor.key
        );
        Ok(())
    }
}
