//! Metric derivation
//!
//! Maps container role, dataset and record counts to the counters published for
//! one object. Combinations without a rule produce no emissions.

use crate::constants::metrics::*;
use crate::constants::{DATASET_CV, DATASET_MANIFEST, DATASET_WAZE, ZERO_BYTE_SUBMISSION_LENGTH, fields};
use crate::error::{ProcessorError, Result};
use crate::models::{ContainerRole, KeyMetadata, MetricEmission, RecordCounts};

/// Rule set a pipeline variant derives counters with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmissionRules {
    /// Submissions and curated counters derived from key markers and segments
    Catalog,
    /// Only the `cv` submissions counters, which carry record counts
    Validation,
}

pub fn derive_emissions(
    rules: EmissionRules,
    role: ContainerRole,
    metadata: &KeyMetadata,
    counts: Option<RecordCounts>,
) -> Result<Vec<MetricEmission>> {
    let dataset = metadata.get_str(fields::DATASET).unwrap_or_default();

    match (rules, role, dataset) {
        (_, ContainerRole::Submissions, DATASET_CV) => cv_submission(metadata, counts),
        (EmissionRules::Catalog, ContainerRole::Submissions, DATASET_WAZE) => {
            waze_submission(metadata)
        }
        (EmissionRules::Catalog, ContainerRole::Curated, dataset) if dataset != DATASET_MANIFEST => {
            let dimensions = dimensions(metadata, WAZE_CURATED_METRIC, &[fields::STATE, fields::TABLE_NAME])?;
            Ok(vec![MetricEmission::count(
                WAZE_CURATED_NAMESPACE,
                WAZE_CURATED_METRIC,
                dimensions,
                1,
            )])
        }
        _ => Ok(Vec::new()),
    }
}

fn waze_submission(metadata: &KeyMetadata) -> Result<Vec<MetricEmission>> {
    let dimensions = dimensions(
        metadata,
        WAZE_SUBMISSIONS_METRIC,
        &[fields::STATE, fields::TRAFFIC_TYPE],
    )?;

    let mut emissions = vec![MetricEmission::count(
        WAZE_SUBMISSIONS_NAMESPACE,
        WAZE_SUBMISSIONS_METRIC,
        dimensions.clone(),
        1,
    )];
    if metadata.get_u64(fields::CONTENT_LENGTH) == Some(ZERO_BYTE_SUBMISSION_LENGTH) {
        emissions.push(MetricEmission::count(
            WAZE_ZERO_BYTE_NAMESPACE,
            WAZE_ZERO_BYTE_METRIC,
            dimensions,
            1,
        ));
    }
    Ok(emissions)
}

// Without validation counts only the per-file counters apply.
fn cv_submission(metadata: &KeyMetadata, counts: Option<RecordCounts>) -> Result<Vec<MetricEmission>> {
    let dimensions = dimensions(
        metadata,
        CV_OBJECT_COUNT_METRIC,
        &[fields::DATA_PROVIDER, fields::DATA_TYPE],
    )?;

    let mut emissions = vec![MetricEmission::count(
        CV_SUBMISSIONS_NAMESPACE,
        CV_OBJECT_COUNT_METRIC,
        dimensions.clone(),
        1,
    )];
    if let Some(counts) = counts {
        emissions.push(MetricEmission::count(
            CV_SUBMISSIONS_NAMESPACE,
            CV_VALID_COUNT_METRIC,
            dimensions.clone(),
            counts.valid as u64,
        ));
        emissions.push(MetricEmission::count(
            CV_SUBMISSIONS_NAMESPACE,
            CV_INVALID_COUNT_METRIC,
            dimensions.clone(),
            counts.invalid as u64,
        ));
    }
    emissions.push(MetricEmission::count(
        CV_SUBMISSIONS_NAMESPACE,
        CV_FILE_COUNT_METRIC,
        dimensions,
        1,
    ));
    Ok(emissions)
}

/// Dimension pairs read from metadata, in the given order
fn dimensions(metadata: &KeyMetadata, metric: &str, names: &[&str]) -> Result<Vec<(String, String)>> {
    names
        .iter()
        .map(|name| {
            metadata
                .get_str(name)
                .map(|value| (name.to_string(), value.to_string()))
                .ok_or_else(|| ProcessorError::MissingMetadataField {
                    field: name.to_string(),
                    metric: metric.to_string(),
                })
        })
        .collect()
}
