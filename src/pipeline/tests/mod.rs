//! Test utilities and mock collaborators for pipeline testing
//!
//! Recording sinks capture what the pipeline published, a stub validator
//! returns canned results, and helpers lay out objects in a directory-backed
//! store.

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::config::Config;
use crate::error::{ProcessorError, Result};
use crate::models::{
    FieldValidationResult, KeyMetadata, MetricEmission, ObjectDescriptor, RecordQueue,
    RecordValidationResult,
};
use crate::sinks::{MetricsSink, SearchIndex};
use crate::validator::{FieldValidator, ValidatorLoader};

// Test modules
mod aggregation_tests;
mod emission_tests;

pub const SUBMISSIONS: &str = "submissions";
pub const CURATED: &str = "curated";

/// Descriptor with fixed timestamps and etag
pub fn descriptor(container: &str, key: &str, content_length: u64) -> ObjectDescriptor {
    ObjectDescriptor {
        container: container.to_string(),
        key: key.to_string(),
        content_length,
        content_type: "application/json".to_string(),
        last_modified: Utc.with_ymd_and_hms(2023, 5, 17, 12, 30, 0).unwrap(),
        etag: "\"5d41402abc4b2a76b9719d911017c592\"".to_string(),
    }
}

/// Configuration for pipeline tests staging under `staging_dir`
pub fn test_config(staging_dir: &Path, prefixes: &[&str]) -> Config {
    Config {
        environment: "test".to_string(),
        submissions_container: SUBMISSIONS.to_string(),
        curated_container: CURATED.to_string(),
        ..Config::default()
    }
    .with_prefixes(prefixes.iter().map(|prefix| prefix.to_string()).collect())
    .with_staging_dir(staging_dir.to_path_buf())
}

/// Write an object into a directory-backed store rooted at `root`
pub fn put_object(root: &Path, container: &str, key: &str, content: &[u8]) {
    let path = root.join(container).join(key);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

/// Gzip-compress `content`
pub fn gzip(content: &[u8]) -> Vec<u8> {
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(content).unwrap();
    encoder.finish().unwrap()
}

/// Record result with `total` fields of which the first `invalid` fail
pub fn record_result(total: usize, invalid: usize) -> RecordValidationResult {
    RecordValidationResult::new(
        (0..total)
            .map(|i| {
                let path = format!("field{}", i);
                if i < invalid {
                    FieldValidationResult::invalid(path, "value is null")
                } else {
                    FieldValidationResult::valid(path)
                }
            })
            .collect(),
    )
}

/// Search index that records every document
#[derive(Debug, Default)]
pub struct RecordingIndex {
    pub documents: Mutex<Vec<(String, KeyMetadata)>>,
    pub fail: bool,
}

impl RecordingIndex {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn documents(&self) -> Vec<(String, KeyMetadata)> {
        self.documents.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchIndex for RecordingIndex {
    async fn index(&self, document_type: &str, body: &KeyMetadata) -> Result<()> {
        if self.fail {
            return Err(ProcessorError::SearchIndex {
                document_type: document_type.to_string(),
                reason: "service unavailable".to_string(),
            });
        }
        self.documents
            .lock()
            .unwrap()
            .push((document_type.to_string(), body.clone()));
        Ok(())
    }
}

/// Metrics sink that records emissions, optionally failing after a number of calls
#[derive(Debug, Default)]
pub struct RecordingMetrics {
    pub emissions: Mutex<Vec<MetricEmission>>,
    pub fail_after: Option<usize>,
}

impl RecordingMetrics {
    pub fn failing_after(calls: usize) -> Self {
        Self {
            fail_after: Some(calls),
            ..Self::default()
        }
    }

    pub fn emissions(&self) -> Vec<MetricEmission> {
        self.emissions.lock().unwrap().clone()
    }
}

#[async_trait]
impl MetricsSink for RecordingMetrics {
    async fn put_metric_data(&self, emission: &MetricEmission) -> Result<()> {
        let mut emissions = self.emissions.lock().unwrap();
        if self.fail_after.is_some_and(|limit| emissions.len() >= limit) {
            return Err(ProcessorError::MetricsSink {
                metric: emission.metric_name.clone(),
                reason: "throttled".to_string(),
            });
        }
        emissions.push(emission.clone());
        Ok(())
    }
}

/// Validator returning canned results regardless of input
#[derive(Debug, Clone, Default)]
pub struct StubValidator {
    pub results: Vec<RecordValidationResult>,
}

impl FieldValidator for StubValidator {
    fn validate_all(&self, _records: RecordQueue) -> Result<Vec<RecordValidationResult>> {
        Ok(self.results.clone())
    }
}

/// Validator that always fails
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingValidator;

impl FieldValidator for FailingValidator {
    fn validate_all(&self, _records: RecordQueue) -> Result<Vec<RecordValidationResult>> {
        Err(ProcessorError::validator("schema engine crashed"))
    }
}

/// Loader handing out a [`StubValidator`] and recording the configuration it read
#[derive(Debug, Default)]
pub struct StubLoader {
    pub validator: StubValidator,
    pub loaded: Mutex<Vec<String>>,
    /// Replace the staged configuration with a directory so its removal fails
    pub block_cleanup: bool,
}

impl StubLoader {
    pub fn new(results: Vec<RecordValidationResult>) -> Arc<Self> {
        Arc::new(Self {
            validator: StubValidator { results },
            ..Self::default()
        })
    }

    pub fn blocking_cleanup(results: Vec<RecordValidationResult>) -> Arc<Self> {
        Arc::new(Self {
            validator: StubValidator { results },
            block_cleanup: true,
            ..Self::default()
        })
    }
}

impl ValidatorLoader for StubLoader {
    fn load(&self, config_path: &Path) -> Result<Box<dyn FieldValidator>> {
        let content = std::fs::read_to_string(config_path)?;
        self.loaded.lock().unwrap().push(content);
        if self.block_cleanup {
            std::fs::remove_file(config_path)?;
            std::fs::create_dir(config_path)?;
        }
        Ok(Box::new(self.validator.clone()))
    }
}
