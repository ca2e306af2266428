//! Directory-backed object store.
//!
//! Each container is a directory under the root and each key a relative path
//! inside it. ETags are the quoted MD5 of the content, as S3 reports for
//! single-part uploads.

use super::ObjectStore;
use crate::error::{ProcessorError, Result};
use crate::models::ObjectDescriptor;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tracing::debug;

const DEFAULT_CONTENT_TYPE: &str = "binary/octet-stream";

#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    root: PathBuf,
}

impl LocalObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve an object path, refusing keys that escape the container
    fn object_path(&self, container: &str, key: &str) -> Result<PathBuf> {
        let relative = Path::new(key);
        let escapes = relative
            .components()
            .any(|component| !matches!(component, Component::Normal(_)));

        if key.is_empty() || container.is_empty() || escapes {
            return Err(ProcessorError::storage(
                "resolve",
                container,
                key,
                "key is not a relative object path",
            ));
        }

        Ok(self.root.join(container).join(relative))
    }

    fn map_io_error(
        operation: &'static str,
        container: &str,
        key: &str,
        error: std::io::Error,
    ) -> ProcessorError {
        match error.kind() {
            std::io::ErrorKind::NotFound => ProcessorError::ObjectNotFound {
                container: container.to_string(),
                key: key.to_string(),
            },
            std::io::ErrorKind::PermissionDenied => ProcessorError::AccessDenied {
                container: container.to_string(),
                key: key.to_string(),
            },
            _ => ProcessorError::storage(operation, container, key, error.to_string()),
        }
    }
}

fn content_type_for(key: &str) -> &'static str {
    match Path::new(key).extension().and_then(|ext| ext.to_str()) {
        Some("gz") => "application/gzip",
        Some("json") => "application/json",
        Some("csv") => "text/csv",
        Some("txt") | Some("ini") => "text/plain",
        _ => DEFAULT_CONTENT_TYPE,
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn head_object(&self, container: &str, key: &str) -> Result<ObjectDescriptor> {
        let path = self.object_path(container, key)?;
        let metadata = fs::metadata(&path)
            .await
            .map_err(|e| Self::map_io_error("head", container, key, e))?;
        if !metadata.is_file() {
            return Err(ProcessorError::ObjectNotFound {
                container: container.to_string(),
                key: key.to_string(),
            });
        }

        let content = fs::read(&path)
            .await
            .map_err(|e| Self::map_io_error("head", container, key, e))?;
        let last_modified: DateTime<Utc> = metadata
            .modified()
            .map(DateTime::<Utc>::from)
            .map_err(|e| Self::map_io_error("head", container, key, e))?;

        Ok(ObjectDescriptor {
            container: container.to_string(),
            key: key.to_string(),
            content_length: metadata.len(),
            content_type: content_type_for(key).to_string(),
            last_modified,
            etag: format!("\"{:x}\"", md5::compute(&content)),
        })
    }

    async fn download_object(&self, container: &str, key: &str, local_path: &Path) -> Result<()> {
        let path = self.object_path(container, key)?;
        let bytes = fs::copy(&path, local_path)
            .await
            .map_err(|e| Self::map_io_error("download", container, key, e))?;
        debug!(
            "Copied {} bytes from {} to {}",
            bytes,
            path.display(),
            local_path.display()
        );
        Ok(())
    }
}
