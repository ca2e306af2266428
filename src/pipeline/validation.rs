//! Validation aggregation
//!
//! Submits a record queue to a [`FieldValidator`] and folds the returned
//! record results into a [`ValidationSummary`].

use crate::error::Result;
use crate::models::{RecordQueue, RecordValidationResult, ValidationSummary};
use crate::validator::FieldValidator;
use tracing::{debug, info, warn};

impl ValidationSummary {
    /// Fold record results into counts and error-description occurrences
    pub fn from_results(results: &[RecordValidationResult]) -> Self {
        let mut summary = ValidationSummary::default();

        for result in results {
            summary.total_records += 1;
            summary.total_checks += result.field_validations.len();

            if !result.is_valid() {
                summary.error_messages += 1;
                for field in result.invalid_fields() {
                    summary.failed_checks += 1;
                    *summary
                        .error_counts
                        .entry(field.error_description())
                        .or_insert(0) += 1;
                }
            }
        }

        summary
    }
}

/// Validate a queue and summarize the outcome
///
/// Counts cover only the results the validator returned: when it returns fewer
/// results than records were submitted, the missing records are left out of
/// every count.
pub fn aggregate(records: RecordQueue, validator: &dyn FieldValidator) -> Result<ValidationSummary> {
    let submitted = records.len();
    let results = validator.validate_all(records)?;

    if results.len() != submitted {
        debug!(
            "Validator returned {} results for {} records; counting returned results only",
            results.len(),
            submitted
        );
    }

    Ok(ValidationSummary::from_results(&results))
}

/// Log the outcome of validating one object
pub fn log_summary(summary: &ValidationSummary, object: &str, data_type: &str, verbose: bool) {
    if summary.failed_checks > 0 {
        warn!(
            "Validation has FAILED for file '{}' of type '{}'. Detected {} errors out of {} total validation checks.",
            object, data_type, summary.failed_checks, summary.total_checks
        );
        if verbose {
            for (error, occurrences) in &summary.error_counts {
                warn!("[Error: '{}', Occurrences: '{}']", error, occurrences);
            }
        }
    } else {
        info!(
            "Validation has PASSED for file '{}' of type '{}'. Detected no errors and performed {} total validation checks.",
            object, data_type, summary.total_checks
        );
    }

    info!(
        "[CANARY FINISHED] Validation complete, detected {} errors out of {} validations.",
        summary.failed_checks, summary.total_checks
    );
}
