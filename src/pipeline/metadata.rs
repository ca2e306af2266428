//! Key metadata extraction
//!
//! Builds the metadata document of an object from its head metadata and key.
//! Which dataset-specific fields are added depends on the [`ExtractionPolicy`]
//! chosen by the caller; nothing here inspects state beyond the inputs.

use crate::constants::{BYTES_PER_MIB, DATASET_CV, DATASET_WAZE, KEY_MARKERS, fields};
use crate::models::{KeyMetadata, ObjectDescriptor};

/// How dataset-specific fields are derived from a key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionPolicy {
    /// Values following `type=`, `table=` and `state=` markers
    SegmentMarker,
    /// Key segments 1 and 2 as provider and data type
    PositionalSegment,
    /// Last two key segments, for keys under a known prefix
    PrefixRelative,
    /// Base fields only
    BaseOnly,
}

impl ExtractionPolicy {
    /// Policy used for objects handled without a known prefix
    pub fn for_dataset(dataset: &str) -> Self {
        match dataset {
            DATASET_WAZE => ExtractionPolicy::SegmentMarker,
            DATASET_CV => ExtractionPolicy::PositionalSegment,
            _ => ExtractionPolicy::BaseOnly,
        }
    }
}

#[derive(Debug, Clone)]
pub struct KeyMetadataExtractor {
    environment: String,
}

impl KeyMetadataExtractor {
    pub fn new(environment: impl Into<String>) -> Self {
        Self {
            environment: environment.into(),
        }
    }

    pub fn extract(&self, descriptor: &ObjectDescriptor, policy: &ExtractionPolicy) -> KeyMetadata {
        let mut metadata = self.base_fields(descriptor);
        let key = descriptor.key.as_str();

        match policy {
            ExtractionPolicy::SegmentMarker => add_marker_fields(&mut metadata, key),
            ExtractionPolicy::PositionalSegment => add_positional_fields(&mut metadata, key),
            ExtractionPolicy::PrefixRelative => add_prefix_relative_fields(&mut metadata, key),
            ExtractionPolicy::BaseOnly => {}
        }

        metadata
    }

    fn base_fields(&self, descriptor: &ObjectDescriptor) -> KeyMetadata {
        let mut metadata = KeyMetadata::new();
        metadata.insert(fields::KEY, descriptor.key.clone());
        metadata.insert(fields::CONTENT_LENGTH, descriptor.content_length);
        metadata.insert(
            fields::SIZE_MIB,
            descriptor.content_length as f64 / BYTES_PER_MIB,
        );
        metadata.insert(fields::LAST_MODIFIED, descriptor.last_modified.to_rfc3339());
        metadata.insert(fields::CONTENT_TYPE, descriptor.content_type.clone());
        metadata.insert(fields::ETAG, descriptor.etag.clone());
        metadata.insert(fields::DATASET, descriptor.dataset());
        metadata.insert(fields::ENVIRONMENT, self.environment.clone());
        metadata
    }
}

/// Text following `marker` up to the next `/` or the end of the key
pub fn marker_value<'a>(key: &'a str, marker: &str) -> Option<&'a str> {
    let start = key.find(marker)? + marker.len();
    let rest = &key[start..];
    Some(rest.split('/').next().unwrap_or(rest))
}

/// Whether a key has the provider and data type segments the positional policy reads
pub fn has_positional_segments(key: &str) -> bool {
    key.split('/').nth(2).is_some()
}

fn add_marker_fields(metadata: &mut KeyMetadata, key: &str) {
    for (marker, field) in KEY_MARKERS {
        if let Some(value) = marker_value(key, marker) {
            metadata.insert(field, value);
        }
    }
}

fn add_positional_fields(metadata: &mut KeyMetadata, key: &str) {
    let segments: Vec<&str> = key.split('/').collect();
    if let [_, provider, data_type, ..] = segments.as_slice() {
        metadata.insert(fields::DATA_PROVIDER, *provider);
        metadata.insert(fields::DATA_TYPE, *data_type);
    }
}

fn add_prefix_relative_fields(metadata: &mut KeyMetadata, key: &str) {
    let segments: Vec<&str> = key.split('/').collect();
    match segments.as_slice() {
        [.., provider, data_type] => {
            metadata.insert(fields::DATA_PROVIDER, *provider);
            metadata.insert(fields::DATA_TYPE, *data_type);
        }
        _ => metadata.insert(fields::DATA_PROVIDER, key),
    }
}
