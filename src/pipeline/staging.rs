//! Local staging of downloaded objects.
//!
//! A [`StagedFile`] owns one uniquely named file in the staging directory and
//! removes it when dropped, whatever happened while it was in use.

use crate::error::Result;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug)]
pub struct StagedFile {
    path: PathBuf,
}

impl StagedFile {
    /// Reserve a new staged file named `<prefix><random>` in `staging_dir`
    pub fn create(staging_dir: &Path, prefix: &str) -> Result<Self> {
        let file = tempfile::Builder::new()
            .prefix(prefix)
            .tempfile_in(staging_dir)?;
        let path = file.into_temp_path().keep().map_err(|e| e.error)?;
        debug!("Staging download at {}", path.display());
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!("Removed staged file {}", self.path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove staged file {}: {}", self.path.display(), e),
        }
    }
}
