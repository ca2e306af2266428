//! Core data structures for bucket event processing.
//!
//! Defines the object descriptor, key metadata document, record queue,
//! validation results, metric emissions and pipeline outcomes. Every value is
//! created for one event and dropped once that event has been handled.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, VecDeque};
use std::fmt;

/// Head metadata of one stored object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectDescriptor {
    pub container: String,
    pub key: String,
    pub content_length: u64,
    pub content_type: String,
    pub last_modified: DateTime<Utc>,
    pub etag: String,
}

impl ObjectDescriptor {
    /// First `/`-delimited segment of the key
    pub fn dataset(&self) -> &str {
        self.key.split('/').next().unwrap_or_default()
    }
}

/// Metadata document derived from an object key, indexed once per event
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyMetadata(Map<String, Value>);

impl KeyMetadata {
    pub fn new() -> Self {
        Self(Map::new())
    }

    pub fn insert(&mut self, field: &str, value: impl Into<Value>) {
        self.0.insert(field.to_string(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// String value of a field, `None` when absent or not a string
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(Value::as_str)
    }

    pub fn get_u64(&self, field: &str) -> Option<u64> {
        self.0.get(field).and_then(Value::as_u64)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl fmt::Display for KeyMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Value::Object(self.0.clone()))
    }
}

/// Ordered text records read from one object
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordQueue {
    records: VecDeque<String>,
}

impl RecordQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: String) {
        self.records.push_back(record);
    }

    pub fn pop(&mut self) -> Option<String> {
        self.records.pop_front()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.records.iter()
    }
}

impl IntoIterator for RecordQueue {
    type Item = String;
    type IntoIter = std::collections::vec_deque::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl FromIterator<String> for RecordQueue {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

/// Outcome of checking one field of one record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldValidationResult {
    pub field_path: String,
    pub valid: bool,
    pub details: Option<String>,
}

impl FieldValidationResult {
    pub fn valid(field_path: impl Into<String>) -> Self {
        Self {
            field_path: field_path.into(),
            valid: true,
            details: None,
        }
    }

    pub fn invalid(field_path: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            field_path: field_path.into(),
            valid: false,
            details: Some(details.into()),
        }
    }

    /// Error description counted by the validation summary
    pub fn error_description(&self) -> String {
        format!(
            "Invalid field '{}' due to {}",
            self.field_path,
            self.details.as_deref().unwrap_or_default()
        )
    }
}

/// Field results of one record, in validator order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordValidationResult {
    pub field_validations: Vec<FieldValidationResult>,
}

impl RecordValidationResult {
    pub fn new(field_validations: Vec<FieldValidationResult>) -> Self {
        Self { field_validations }
    }

    pub fn is_valid(&self) -> bool {
        self.field_validations.iter().all(|field| field.valid)
    }

    pub fn invalid_fields(&self) -> impl Iterator<Item = &FieldValidationResult> {
        self.field_validations.iter().filter(|field| !field.valid)
    }
}

/// Folded validation outcome of one object
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationSummary {
    pub total_records: usize,
    /// Records with at least one invalid field
    pub error_messages: usize,
    pub total_checks: usize,
    pub failed_checks: usize,
    pub error_counts: BTreeMap<String, usize>,
}

impl ValidationSummary {
    pub fn valid_messages(&self) -> usize {
        self.total_records - self.error_messages
    }

    pub fn passed(&self) -> bool {
        self.failed_checks == 0
    }

    pub fn record_counts(&self) -> RecordCounts {
        RecordCounts {
            valid: self.valid_messages(),
            invalid: self.error_messages,
        }
    }
}

/// Valid and invalid record counts feeding the metrics deriver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordCounts {
    pub valid: usize,
    pub invalid: usize,
}

/// Role of a container, resolved against the configured container names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerRole {
    Submissions,
    Curated,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetricUnit {
    Count,
}

impl MetricUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricUnit::Count => "Count",
        }
    }
}

/// One counter to publish
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricEmission {
    pub namespace: String,
    pub metric_name: String,
    pub dimensions: Vec<(String, String)>,
    pub value: u64,
    pub unit: MetricUnit,
}

impl MetricEmission {
    pub fn count(
        namespace: &str,
        metric_name: &str,
        dimensions: Vec<(String, String)>,
        value: u64,
    ) -> Self {
        Self {
            namespace: namespace.to_string(),
            metric_name: metric_name.to_string(),
            dimensions,
            value,
            unit: MetricUnit::Count,
        }
    }
}

/// Stages of one pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Fetching,
    Classifying,
    Streaming,
    MatchingPrefix,
    Validating,
    Deriving,
    Emitting,
    Done,
    Failed,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Fetching => "FETCHING",
            PipelineStage::Classifying => "CLASSIFYING",
            PipelineStage::Streaming => "STREAMING",
            PipelineStage::MatchingPrefix => "MATCHING_PREFIX",
            PipelineStage::Validating => "VALIDATING",
            PipelineStage::Deriving => "DERIVING",
            PipelineStage::Emitting => "EMITTING",
            PipelineStage::Done => "DONE",
            PipelineStage::Failed => "FAILED",
        };
        f.write_str(name)
    }
}

/// Why an object was ignored without error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// No configured prefix matches the key
    NoPrefixMatch,
    /// The object sits directly under the matched prefix root
    PrefixRoot { prefix: String },
    /// Positional extraction needs provider and data type segments
    InsufficientKeyDepth,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoPrefixMatch => write!(f, "file path not found in known prefixes"),
            SkipReason::PrefixRoot { prefix } => {
                write!(f, "file in root directory of prefix '{}' is ignored", prefix)
            }
            SkipReason::InsufficientKeyDepth => {
                write!(f, "key has no provider and data type segments")
            }
        }
    }
}

/// Everything produced and published for one event
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessingReport {
    pub container: String,
    pub key: String,
    pub metadata: KeyMetadata,
    pub summary: Option<ValidationSummary>,
    pub emissions: Vec<MetricEmission>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PipelineOutcome {
    Completed(ProcessingReport),
    Skipped(SkipReason),
}
