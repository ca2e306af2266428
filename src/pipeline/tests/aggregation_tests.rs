//! Tests for validation aggregation

use super::{FailingValidator, StubValidator, record_result};
use crate::error::ProcessorError;
use crate::models::{FieldValidationResult, RecordQueue, RecordValidationResult, ValidationSummary};
use crate::pipeline::validation::aggregate;

fn queue(count: usize) -> RecordQueue {
    (0..count).map(|i| format!("{{\"id\": {}}}", i)).collect()
}

#[test]
fn test_summary_counts_distinct_failures() {
    let results = vec![
        record_result(4, 0),
        record_result(4, 0),
        RecordValidationResult::new(vec![
            FieldValidationResult::invalid("metadata.recordType", "field is missing"),
            FieldValidationResult::valid("metadata.time"),
            FieldValidationResult::invalid("payload.speed", "value is null"),
            FieldValidationResult::valid("payload.id"),
        ]),
        record_result(4, 0),
        RecordValidationResult::new(vec![
            FieldValidationResult::valid("metadata.recordType"),
            FieldValidationResult::valid("metadata.time"),
            FieldValidationResult::valid("payload.speed"),
            FieldValidationResult::invalid("payload.id", "value is not of type integer"),
        ]),
    ];

    let summary = ValidationSummary::from_results(&results);

    assert_eq!(summary.total_records, 5);
    assert_eq!(summary.error_messages, 2);
    assert_eq!(summary.valid_messages(), 3);
    assert_eq!(summary.total_checks, 20);
    assert_eq!(summary.failed_checks, 3);
    assert!(!summary.passed());
    assert_eq!(summary.error_counts.len(), 3);
    assert!(summary.error_counts.values().all(|count| *count == 1));
    assert_eq!(
        summary
            .error_counts
            .get("Invalid field 'metadata.recordType' due to field is missing"),
        Some(&1)
    );
}

#[test]
fn test_summary_accumulates_repeated_descriptions() {
    let results = vec![record_result(4, 1), record_result(4, 2), record_result(4, 1)];

    let summary = ValidationSummary::from_results(&results);

    assert_eq!(summary.error_messages, 3);
    assert_eq!(summary.failed_checks, 4);
    assert_eq!(summary.error_counts.len(), 2);
    assert_eq!(
        summary.error_counts.get("Invalid field 'field0' due to value is null"),
        Some(&3)
    );
    assert_eq!(
        summary.error_counts.get("Invalid field 'field1' due to value is null"),
        Some(&1)
    );
}

#[test]
fn test_aggregate_all_valid_passes() {
    let validator = StubValidator {
        results: vec![record_result(3, 0); 4],
    };

    let summary = aggregate(queue(4), &validator).unwrap();

    assert!(summary.passed());
    assert_eq!(summary.total_records, 4);
    assert_eq!(summary.total_checks, 12);
    assert!(summary.error_counts.is_empty());
    let counts = summary.record_counts();
    assert_eq!((counts.valid, counts.invalid), (4, 0));
}

#[test]
fn test_aggregate_counts_only_returned_results() {
    let validator = StubValidator {
        results: vec![record_result(2, 0), record_result(2, 1)],
    };

    let summary = aggregate(queue(5), &validator).unwrap();

    assert_eq!(summary.total_records, 2);
    assert_eq!(summary.error_messages, 1);
    assert_eq!(summary.total_checks, 4);
}

#[test]
fn test_aggregate_propagates_validator_error() {
    let result = aggregate(queue(2), &FailingValidator);

    assert!(matches!(result, Err(ProcessorError::Validator { .. })));
}

#[test]
fn test_aggregate_empty_queue() {
    let summary = aggregate(RecordQueue::new(), &StubValidator::default()).unwrap();

    assert_eq!(summary, ValidationSummary::default());
    assert!(summary.passed());
}
