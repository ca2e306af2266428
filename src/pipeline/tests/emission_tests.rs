//! Tests for metric derivation

use super::{CURATED, SUBMISSIONS, descriptor};
use crate::constants::{fields, metrics::*};
use crate::error::ProcessorError;
use crate::error::Result;
use crate::models::{ContainerRole, KeyMetadata, MetricEmission, RecordCounts};
use crate::pipeline::emissions::{EmissionRules, derive_emissions};
use crate::pipeline::metadata::{ExtractionPolicy, KeyMetadataExtractor};

fn metadata(container: &str, key: &str, content_length: u64) -> KeyMetadata {
    let descriptor = descriptor(container, key, content_length);
    let policy = ExtractionPolicy::for_dataset(descriptor.dataset());
    KeyMetadataExtractor::new("test").extract(&descriptor, &policy)
}

fn catalog(
    role: ContainerRole,
    metadata: &KeyMetadata,
    counts: Option<RecordCounts>,
) -> Result<Vec<MetricEmission>> {
    derive_emissions(EmissionRules::Catalog, role, metadata, counts)
}

const WAZE_KEY: &str = "waze/type=alert/state=VA/2023/file1";

#[test]
fn test_waze_zero_byte_submission_emits_two() {
    let metadata = metadata(SUBMISSIONS, WAZE_KEY, 166);

    let emissions = catalog(ContainerRole::Submissions, &metadata, None).unwrap();

    assert_eq!(emissions.len(), 2);
    assert_eq!(emissions[0].namespace, WAZE_SUBMISSIONS_NAMESPACE);
    assert_eq!(emissions[0].metric_name, WAZE_SUBMISSIONS_METRIC);
    assert_eq!(emissions[1].namespace, WAZE_ZERO_BYTE_NAMESPACE);
    assert_eq!(emissions[1].metric_name, WAZE_ZERO_BYTE_METRIC);
    for emission in &emissions {
        assert_eq!(emission.value, 1);
        assert_eq!(
            emission.dimensions,
            vec![
                ("State".to_string(), "VA".to_string()),
                ("TrafficType".to_string(), "alert".to_string()),
            ]
        );
    }
}

#[test]
fn test_waze_submission_emits_one() {
    let metadata = metadata(SUBMISSIONS, WAZE_KEY, 167);

    let emissions = catalog(ContainerRole::Submissions, &metadata, None).unwrap();

    assert_eq!(emissions.len(), 1);
    assert_eq!(emissions[0].metric_name, WAZE_SUBMISSIONS_METRIC);
}

#[test]
fn test_curated_manifest_emits_nothing() {
    let metadata = metadata(CURATED, "manifest/state=VA/table=events/list", 10);

    let emissions = catalog(ContainerRole::Curated, &metadata, None).unwrap();

    assert!(emissions.is_empty());
}

#[test]
fn test_curated_emits_state_and_table() {
    let metadata = metadata(CURATED, "waze/state=VA/table=alerts/part-0001", 10);

    let emissions = catalog(ContainerRole::Curated, &metadata, None).unwrap();

    assert_eq!(emissions.len(), 1);
    assert_eq!(emissions[0].namespace, WAZE_CURATED_NAMESPACE);
    assert_eq!(
        emissions[0].dimensions,
        vec![
            ("State".to_string(), "VA".to_string()),
            ("TableName".to_string(), "alerts".to_string()),
        ]
    );
}

#[test]
fn test_cv_submission_with_counts_emits_four() {
    let mut metadata = metadata(SUBMISSIONS, "cv/thea/BSM/file1", 4096);
    metadata.insert(fields::MESSAGE_COUNT, 10);
    let counts = RecordCounts {
        valid: 7,
        invalid: 3,
    };

    let emissions = catalog(ContainerRole::Submissions, &metadata, Some(counts)).unwrap();

    let named: Vec<(&str, u64)> = emissions
        .iter()
        .map(|e| (e.metric_name.as_str(), e.value))
        .collect();
    assert_eq!(
        named,
        vec![
            (CV_OBJECT_COUNT_METRIC, 1),
            (CV_VALID_COUNT_METRIC, 7),
            (CV_INVALID_COUNT_METRIC, 3),
            (CV_FILE_COUNT_METRIC, 1),
        ]
    );
    assert!(emissions.iter().all(|e| e.namespace == CV_SUBMISSIONS_NAMESPACE));
    assert_eq!(
        emissions[0].dimensions,
        vec![
            ("DataProvider".to_string(), "thea".to_string()),
            ("DataType".to_string(), "BSM".to_string()),
        ]
    );
}

#[test]
fn test_cv_submission_without_counts_emits_per_file_counts() {
    let metadata = metadata(SUBMISSIONS, "cv/thea/BSM/file1", 4096);

    let emissions = catalog(ContainerRole::Submissions, &metadata, None).unwrap();

    let names: Vec<&str> = emissions.iter().map(|e| e.metric_name.as_str()).collect();
    assert_eq!(names, vec![CV_OBJECT_COUNT_METRIC, CV_FILE_COUNT_METRIC]);
}

#[test]
fn test_missing_dimension_is_error() {
    let metadata = metadata(SUBMISSIONS, "waze/type=alert/file1", 10);

    match catalog(ContainerRole::Submissions, &metadata, None) {
        Err(ProcessorError::MissingMetadataField { field, metric }) => {
            assert_eq!(field, "State");
            assert_eq!(metric, WAZE_SUBMISSIONS_METRIC);
        }
        other => panic!("Expected missing field error, got {:?}", other),
    }
}

#[test]
fn test_other_container_emits_nothing() {
    let metadata = metadata("archive", WAZE_KEY, 166);

    let emissions = catalog(ContainerRole::Other, &metadata, None).unwrap();

    assert!(emissions.is_empty());
}

#[test]
fn test_validation_rules_only_cover_cv_submissions() {
    let waze = metadata(SUBMISSIONS, "waze/2023/file1", 166);
    let curated = metadata(CURATED, "cv/providerA/typeX/2023/file1", 10);
    let mut cv = curated.clone();
    cv.insert(fields::DATA_PROVIDER, "2023");
    cv.insert(fields::DATA_TYPE, "file1");
    let counts = Some(RecordCounts {
        valid: 4,
        invalid: 1,
    });

    let rules = EmissionRules::Validation;
    assert!(derive_emissions(rules, ContainerRole::Submissions, &waze, counts).unwrap().is_empty());
    assert!(derive_emissions(rules, ContainerRole::Curated, &curated, counts).unwrap().is_empty());
    assert_eq!(
        derive_emissions(rules, ContainerRole::Submissions, &cv, counts).unwrap().len(),
        4
    );
}
