//! Object-storage write notifications.
//!
//! Extracts the container name and decoded object key from either an SNS
//! envelope wrapping an S3 notification or a bare S3 notification.

use crate::error::{ProcessorError, Result};
use serde::Deserialize;
use tracing::{error, info};

/// Container and key named by one write notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectEvent {
    pub container: String,
    pub key: String,
}

#[derive(Deserialize)]
struct SnsEnvelope {
    #[serde(rename = "Records")]
    records: Vec<SnsRecord>,
}

#[derive(Deserialize)]
struct SnsRecord {
    #[serde(rename = "Sns")]
    sns: SnsMessage,
}

#[derive(Deserialize)]
struct SnsMessage {
    #[serde(rename = "Message")]
    message: String,
}

#[derive(Deserialize)]
struct S3Notification {
    #[serde(rename = "Records")]
    records: Vec<S3Record>,
}

#[derive(Deserialize)]
struct S3Record {
    s3: S3Entity,
}

#[derive(Deserialize)]
struct S3Entity {
    bucket: S3Bucket,
    object: S3Object,
}

#[derive(Deserialize)]
struct S3Bucket {
    name: String,
}

#[derive(Deserialize)]
struct S3Object {
    key: String,
}

impl ObjectEvent {
    /// Parse a notification document
    pub fn from_json(raw: &str) -> Result<Self> {
        let event = parse_notification(raw).inspect_err(|e| {
            error!("Failed to process the event: {}", e);
        })?;

        info!("Bucket name: {}", event.container);
        info!("Object key: {}", event.key);
        Ok(event)
    }
}

fn parse_notification(raw: &str) -> Result<ObjectEvent> {
    let value: serde_json::Value = serde_json::from_str(raw)
        .map_err(|e| ProcessorError::malformed_event(format!("invalid JSON: {}", e)))?;

    let is_sns = value
        .pointer("/Records/0/Sns")
        .is_some_and(|sns| !sns.is_null());

    let notification: S3Notification = if is_sns {
        let envelope: SnsEnvelope = serde_json::from_value(value)
            .map_err(|e| ProcessorError::malformed_event(format!("invalid SNS envelope: {}", e)))?;
        let record = envelope
            .records
            .into_iter()
            .next()
            .ok_or_else(|| ProcessorError::malformed_event("SNS envelope has no records"))?;
        serde_json::from_str(&record.sns.message).map_err(|e| {
            ProcessorError::malformed_event(format!("invalid S3 notification in SNS message: {}", e))
        })?
    } else {
        serde_json::from_value(value).map_err(|e| {
            ProcessorError::malformed_event(format!("invalid S3 notification: {}", e))
        })?
    };

    let record = notification
        .records
        .into_iter()
        .next()
        .ok_or_else(|| ProcessorError::malformed_event("S3 notification has no records"))?;

    Ok(ObjectEvent {
        container: record.s3.bucket.name,
        key: decode_key(&record.s3.object.key)?,
    })
}

/// Decode a form-urlencoded object key (`+` is a space)
pub fn decode_key(raw: &str) -> Result<String> {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_str(&format!("key={}", raw))
        .map_err(|e| ProcessorError::malformed_event(format!("unparsable key '{}': {}", raw, e)))?;

    match pairs.as_slice() {
        [(_, key)] => Ok(key.clone()),
        _ => Err(ProcessorError::malformed_event(format!(
            "unparsable key '{}'",
            raw
        ))),
    }
}
