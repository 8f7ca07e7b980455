//! # Rename Module
//!
//! Applies a single hash-based rename, or skips it in dry-run mode.
//!
//! Only `std::fs::rename` is used: the rename either happens completely or
//! not at all, so a failure always leaves the source where it was. Missing
//! destination directories are not created and cross-device moves are not
//! emulated with copy+delete.

use crate::error::ImageHashError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A planned rename
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameOperation {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub dry_run: bool,
}

impl RenameOperation {
    pub fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>, dry_run: bool) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            dry_run,
        }
    }

    /// The `source -> destination` line shown to users
    pub fn announcement(&self) -> String {
        format!("{} -> {}", self.source.display(), self.destination.display())
    }
}

/// What executing a [`RenameOperation`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenameOutcome {
    /// The file was moved
    Renamed,
    /// Dry run: nothing was touched
    Skipped,
}

/// Executes rename operations
pub struct RenameExecutor;

impl RenameExecutor {
    /// Perform the rename unless the operation is a dry run.
    pub fn execute(op: &RenameOperation) -> Result<RenameOutcome, ImageHashError> {
        if op.dry_run {
            debug!(source = %op.source.display(), destination = %op.destination.display(), "dry run, rename skipped");
            return Ok(RenameOutcome::Skipped);
        }

        rename_file(&op.source, &op.destination)?;
        info!(source = %op.source.display(), destination = %op.destination.display(), "renamed");

        Ok(RenameOutcome::Renamed)
    }
}

fn rename_file(source: &Path, destination: &Path) -> Result<(), ImageHashError> {
    fs::rename(source, destination).map_err(|e| ImageHashError::RenameFailed {
        source_path: source.to_path_buf(),
        destination: destination.to_path_buf(),
        source: e,
    })
}
