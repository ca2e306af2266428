//! Object store access.
//!
//! The pipeline only needs head metadata and a download to a local path, so the
//! store is a small async trait with an S3 implementation and a directory-backed
//! implementation for local runs and tests.

pub mod local;
pub mod s3;

pub use local::LocalObjectStore;
pub use s3::S3ObjectStore;

use crate::error::Result;
use crate::models::ObjectDescriptor;
use async_trait::async_trait;
use std::path::Path;

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch head metadata of an object
    async fn head_object(&self, container: &str, key: &str) -> Result<ObjectDescriptor>;

    /// Download an object, overwriting `local_path`
    async fn download_object(&self, container: &str, key: &str, local_path: &Path) -> Result<()>;
}
