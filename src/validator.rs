//! Field validator contract and the built-in presence validator.
//!
//! The pipeline consumes validation through [`FieldValidator`]: the whole
//! record queue goes in, one [`RecordValidationResult`] per record comes out in
//! order. A [`ValidatorLoader`] builds a validator from the configuration file
//! staged for the matched prefix.
//!
//! [`PresenceValidator`] reads an INI file in which every section names a
//! dotted JSON field path that each record must carry, optionally with a
//! `Type` key (`string`, `number`, `integer`, `boolean`, `object`, `array`).

use crate::error::{ProcessorError, Result};
use crate::models::{FieldValidationResult, RecordQueue, RecordValidationResult};
use ::config::{File, FileFormat, Source};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

pub trait FieldValidator: Send + Sync {
    fn validate_all(&self, records: RecordQueue) -> Result<Vec<RecordValidationResult>>;
}

pub trait ValidatorLoader: Send + Sync {
    fn load(&self, config_path: &Path) -> Result<Box<dyn FieldValidator>>;
}

/// JSON value kinds a field rule can require
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Number,
    Integer,
    Boolean,
    Object,
    Array,
}

impl FieldType {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "string" => Some(FieldType::String),
            "number" | "decimal" => Some(FieldType::Number),
            "integer" => Some(FieldType::Integer),
            "boolean" => Some(FieldType::Boolean),
            "object" => Some(FieldType::Object),
            "array" => Some(FieldType::Array),
            _ => None,
        }
    }

    fn matches(&self, value: &Value) -> bool {
        match self {
            FieldType::String => value.is_string(),
            FieldType::Number => value.is_number(),
            FieldType::Integer => value.is_i64() || value.is_u64(),
            FieldType::Boolean => value.is_boolean(),
            FieldType::Object => value.is_object(),
            FieldType::Array => value.is_array(),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Integer => "integer",
            FieldType::Boolean => "boolean",
            FieldType::Object => "object",
            FieldType::Array => "array",
        }
    }
}

/// Keys of one INI section
#[derive(Debug, Deserialize)]
struct RuleSection {
    #[serde(rename = "Type", alias = "type")]
    field_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRule {
    pub path: String,
    pub field_type: Option<FieldType>,
}

/// Checks that every configured field is present, non-null and of the expected type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceValidator {
    rules: Vec<FieldRule>,
}

impl PresenceValidator {
    pub fn new(rules: Vec<FieldRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[FieldRule] {
        &self.rules
    }

    /// Parse rules from INI text, one rule per section in file order
    pub fn from_ini(source: &str) -> std::result::Result<Self, String> {
        let sections = File::from_str(source, FileFormat::Ini)
            .collect()
            .map_err(|e| e.to_string())?;

        let mut rules = Vec::with_capacity(sections.len());
        for (path, value) in sections {
            let section: RuleSection = value
                .try_deserialize()
                .map_err(|e| format!("section '{}': {}", path, e))?;
            let field_type = match section.field_type {
                Some(name) => Some(
                    FieldType::parse(&name)
                        .ok_or_else(|| format!("section '{}': unknown type '{}'", path, name))?,
                ),
                None => None,
            };
            rules.push(FieldRule { path, field_type });
        }

        Ok(Self { rules })
    }

    fn validate_record(&self, record: &str) -> RecordValidationResult {
        let document: Value = match serde_json::from_str(record) {
            Ok(document) => document,
            Err(e) => {
                return RecordValidationResult::new(vec![FieldValidationResult::invalid(
                    "record",
                    format!("record is not valid JSON: {}", e),
                )]);
            }
        };

        let field_validations = self
            .rules
            .iter()
            .map(|rule| match lookup(&document, &rule.path) {
                None => FieldValidationResult::invalid(&rule.path, "field is missing"),
                Some(Value::Null) => FieldValidationResult::invalid(&rule.path, "value is null"),
                Some(value) => match rule.field_type {
                    Some(expected) if !expected.matches(value) => FieldValidationResult::invalid(
                        &rule.path,
                        format!("value is not of type {}", expected.name()),
                    ),
                    _ => FieldValidationResult::valid(&rule.path),
                },
            })
            .collect();

        RecordValidationResult::new(field_validations)
    }
}

fn lookup<'a>(document: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(document, |value, segment| value.get(segment))
}

impl FieldValidator for PresenceValidator {
    fn validate_all(&self, records: RecordQueue) -> Result<Vec<RecordValidationResult>> {
        Ok(records
            .into_iter()
            .map(|record| self.validate_record(&record))
            .collect())
    }
}

/// Loads a [`PresenceValidator`] from a staged INI file
#[derive(Debug, Default, Clone, Copy)]
pub struct PresenceValidatorLoader;

impl ValidatorLoader for PresenceValidatorLoader {
    fn load(&self, config_path: &Path) -> Result<Box<dyn FieldValidator>> {
        let source = std::fs::read_to_string(config_path)?;
        let validator =
            PresenceValidator::from_ini(&source).map_err(|reason| ProcessorError::ValidationConfig {
                path: config_path.to_path_buf(),
                reason,
            })?;
        Ok(Box::new(validator))
    }
}
