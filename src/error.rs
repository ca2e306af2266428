//! Error handling for bucket event processing.
//!
//! Every fatal condition of an invocation maps to one variant here. Recognized
//! non-matches are not errors; they are reported through
//! [`crate::models::PipelineOutcome::Skipped`].

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed event: {reason}")]
    MalformedEvent { reason: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Object not found: {container}/{key}")]
    ObjectNotFound { container: String, key: String },

    #[error("Access denied to object {container}/{key}")]
    AccessDenied { container: String, key: String },

    #[error("Object store {operation} failed for {container}/{key}: {reason}")]
    Storage {
        operation: &'static str,
        container: String,
        key: String,
        reason: String,
    },

    #[error("Failed to decode records in {path}: {reason}")]
    Decode { path: PathBuf, reason: String },

    #[error("Invalid validation configuration {path}: {reason}")]
    ValidationConfig { path: PathBuf, reason: String },

    #[error("Field validator failed: {reason}")]
    Validator { reason: String },

    #[error("Metadata field '{field}' required for metric '{metric}' is missing")]
    MissingMetadataField { field: String, metric: String },

    #[error("Search index request failed for document type {document_type}: {reason}")]
    SearchIndex {
        document_type: String,
        reason: String,
    },

    #[error("Metrics sink failed for metric '{metric}': {reason}")]
    MetricsSink { metric: String, reason: String },

    #[error("Background task failed: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

impl ProcessorError {
    pub fn malformed_event(reason: impl Into<String>) -> Self {
        Self::MalformedEvent {
            reason: reason.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn storage(
        operation: &'static str,
        container: impl Into<String>,
        key: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Storage {
            operation,
            container: container.into(),
            key: key.into(),
            reason: reason.into(),
        }
    }

    pub fn validator(reason: impl Into<String>) -> Self {
        Self::Validator {
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ProcessorError>;
