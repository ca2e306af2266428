//! Bucket Event Processor Library
//!
//! Handles object-storage write notifications: fetches the written object,
//! detects gzip compression, streams its records through a field validator,
//! aggregates the validation outcome, derives metadata from the object key and
//! publishes the results as a search-index document and counter metrics.
//!
//! This library provides:
//! - Notification parsing for SNS-wrapped and bare S3 events
//! - S3 and directory-backed object stores
//! - Record streaming with gzip detection and staged-file cleanup
//! - Validation aggregation over a pluggable field validator
//! - Key metadata extraction and metric derivation per dataset
//! - Search index and metrics sinks

pub mod config;
pub mod constants;
pub mod error;
pub mod event;
pub mod models;
pub mod pipeline;
pub mod sinks;
pub mod storage;
pub mod validator;

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use crate::config::Config;
pub use error::{ProcessorError, Result};
pub use event::ObjectEvent;
pub use models::{KeyMetadata, MetricEmission, PipelineOutcome, SkipReason, ValidationSummary};
pub use pipeline::EventPipeline;
