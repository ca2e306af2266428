//! Application constants for the bucket event processor
//!
//! Metadata field names, dataset names, metric namespaces and environment
//! variable names used throughout the pipeline.

// =============================================================================
// Datasets
// =============================================================================

/// Dataset keyed by `type=`/`table=`/`state=` path markers
pub const DATASET_WAZE: &str = "waze";

/// Dataset keyed by provider and data type path segments
pub const DATASET_CV: &str = "cv";

/// Curated manifests never produce metrics
pub const DATASET_MANIFEST: &str = "manifest";

// =============================================================================
// Metadata Document Fields
// =============================================================================

/// Field names of the search-index metadata document
pub mod fields {
    pub const KEY: &str = "key";
    pub const CONTENT_LENGTH: &str = "ContentLength";
    pub const SIZE_MIB: &str = "SizeMiB";
    pub const LAST_MODIFIED: &str = "LastModified";
    pub const CONTENT_TYPE: &str = "ContentType";
    pub const ETAG: &str = "ETag";
    pub const DATASET: &str = "Dataset";
    pub const ENVIRONMENT: &str = "Environment";
    pub const STATE: &str = "State";
    pub const TRAFFIC_TYPE: &str = "TrafficType";
    pub const TABLE_NAME: &str = "TableName";
    pub const DATA_PROVIDER: &str = "DataProvider";
    pub const DATA_TYPE: &str = "DataType";
    pub const MESSAGE_COUNT: &str = "MessageCount";
}

/// Key markers of the segment-marker policy, paired with their metadata field
pub const KEY_MARKERS: &[(&str, &str)] = &[
    ("type=", fields::TRAFFIC_TYPE),
    ("table=", fields::TABLE_NAME),
    ("state=", fields::STATE),
];

// =============================================================================
// Metrics
// =============================================================================

/// Metric namespaces and names published per processed object
pub mod metrics {
    pub const WAZE_SUBMISSIONS_NAMESPACE: &str = "dot-sdc-waze-submissions-bucket-metric";
    pub const WAZE_SUBMISSIONS_METRIC: &str = "Counts by state and traffic type";

    pub const WAZE_ZERO_BYTE_NAMESPACE: &str = "dot-sdc-waze-zero-byte-submissions-metric";
    pub const WAZE_ZERO_BYTE_METRIC: &str = "Zero Byte Submissions by State and traffic type";

    pub const CV_SUBMISSIONS_NAMESPACE: &str = "dot-sdc-cv-submissions-bucket-metric";
    pub const CV_OBJECT_COUNT_METRIC: &str = "Counts by provider and datatype";
    pub const CV_VALID_COUNT_METRIC: &str = "Valid counts by provider and datatype";
    pub const CV_INVALID_COUNT_METRIC: &str = "Invalid counts by provider and datatype";
    pub const CV_FILE_COUNT_METRIC: &str = "Data file count by provider and datatype";

    pub const WAZE_CURATED_NAMESPACE: &str = "dot-sdc-waze-curated-bucket-metric";
    pub const WAZE_CURATED_METRIC: &str = "Counts by state and table name";

    /// Label carrying the namespace when emitting through the `metrics` facade
    pub const NAMESPACE_LABEL: &str = "namespace";
    pub const UNIT_LABEL: &str = "unit";
}

/// Size of a gzip archive wrapping an empty waze submission
pub const ZERO_BYTE_SUBMISSION_LENGTH: u64 = 166;

// =============================================================================
// Files and Formats
// =============================================================================

/// Gzip magic number
pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Validation configuration object stored under each known prefix
pub const VALIDATION_CONFIG_NAME: &str = "config.ini";

/// Name prefixes of staged downloads
pub const STAGED_OBJECT_PREFIX: &str = "localFile-";
pub const STAGED_CONFIG_PREFIX: &str = "config-";

/// Default search index receiving metadata documents
pub const DEFAULT_INDEX_NAME: &str = "metadata";

/// Bytes per mebibyte
pub const BYTES_PER_MIB: f64 = 1024.0 * 1024.0;

// =============================================================================
// Environment Variables
// =============================================================================

pub mod env {
    pub const ENVIRONMENT_NAME: &str = "ENVIRONMENT_NAME";
    pub const SUBMISSIONS_BUCKET_NAME: &str = "SUBMISSIONS_BUCKET_NAME";
    pub const CURATED_BUCKET_NAME: &str = "CURATED_BUCKET_NAME";
    pub const STATIC_PREFIXES: &str = "STATIC_PREFIXES";
    pub const VERBOSE_OUTPUT: &str = "VERBOSE_OUTPUT";
    pub const ELASTICSEARCH_ENDPOINT: &str = "ELASTICSEARCH_ENDPOINT";
    pub const STAGING_DIR: &str = "STAGING_DIR";
}
