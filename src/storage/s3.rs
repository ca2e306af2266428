//! S3-backed object store.

use super::ObjectStore;
use crate::error::{ProcessorError, Result};
use crate::models::ObjectDescriptor;
use async_trait::async_trait;
use aws_sdk_s3::Client as S3Client;
use aws_sdk_s3::operation::get_object::GetObjectError;
use aws_sdk_s3::operation::head_object::HeadObjectError;
use chrono::{DateTime, Utc};
use std::path::Path;
use tracing::{debug, error};

pub struct S3ObjectStore {
    client: S3Client,
}

impl S3ObjectStore {
    pub fn new(client: S3Client) -> Self {
        Self { client }
    }

    /// Build a client from the ambient AWS configuration
    pub async fn from_env() -> Self {
        let config = aws_config::load_from_env().await;
        Self::new(S3Client::new(&config))
    }
}

// The SDK error kinds do not cover permission failures, so those are matched on the
// rendered error.
fn classify_failure(
    operation: &'static str,
    container: &str,
    key: &str,
    rendered: String,
) -> ProcessorError {
    if rendered.contains("AccessDenied") || rendered.contains("Forbidden") {
        ProcessorError::AccessDenied {
            container: container.to_string(),
            key: key.to_string(),
        }
    } else {
        ProcessorError::storage(operation, container, key, rendered)
    }
}

fn not_found(container: &str, key: &str) -> ProcessorError {
    ProcessorError::ObjectNotFound {
        container: container.to_string(),
        key: key.to_string(),
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn head_object(&self, container: &str, key: &str) -> Result<ObjectDescriptor> {
        let head = self
            .client
            .head_object()
            .bucket(container)
            .key(key)
            .send()
            .await
            .map_err(|sdk_error| {
                error!(
                    "Error getting object {} from bucket {}. Make sure they exist and the necessary permissions have been granted.",
                    key, container
                );
                let rendered = format!("{sdk_error:?}");
                match sdk_error.into_service_error() {
                    HeadObjectError::NotFound(_) => not_found(container, key),
                    _ => classify_failure("head", container, key, rendered),
                }
            })?;

        let last_modified = head
            .last_modified()
            .and_then(|at| DateTime::<Utc>::from_timestamp(at.secs(), at.subsec_nanos()))
            .ok_or_else(|| {
                ProcessorError::storage("head", container, key, "no last-modified timestamp")
            })?;

        Ok(ObjectDescriptor {
            container: container.to_string(),
            key: key.to_string(),
            content_length: head.content_length().unwrap_or_default().max(0) as u64,
            content_type: head.content_type().unwrap_or_default().to_string(),
            last_modified,
            etag: head.e_tag().unwrap_or_default().to_string(),
        })
    }

    async fn download_object(&self, container: &str, key: &str, local_path: &Path) -> Result<()> {
        let object = self
            .client
            .get_object()
            .bucket(container)
            .key(key)
            .send()
            .await
            .map_err(|sdk_error| {
                let rendered = format!("{sdk_error:?}");
                match sdk_error.into_service_error() {
                    GetObjectError::NoSuchKey(_) => not_found(container, key),
                    _ => classify_failure("download", container, key, rendered),
                }
            })?;

        let body = object.body.collect().await.map_err(|e| {
            ProcessorError::storage("download", container, key, format!("body read failed: {e}"))
        })?;
        let bytes = body.into_bytes();
        tokio::fs::write(local_path, &bytes).await?;

        debug!(
            "Downloaded s3://{}/{} ({} bytes) to {}",
            container,
            key,
            bytes.len(),
            local_path.display()
        );
        Ok(())
    }
}
