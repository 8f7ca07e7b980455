//! Event type definitions for progress reporting.

use crate::core::hasher::HashAlgorithmKind;
use crate::core::rename::RenameOperation;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All events emitted while a batch runs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Batch-level events
    Batch(BatchEvent),
    /// Per-file hashing events
    Hash(HashEvent),
    /// Per-file rename events
    Rename(RenameEvent),
}

/// Batch-level events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum BatchEvent {
    /// The batch has started
    Started {
        total_files: usize,
        algorithm: HashAlgorithmKind,
    },
    /// Every file was processed (some may have failed under the continue policy)
    Completed { summary: BatchSummary },
    /// A file failed and the rest of the batch was abandoned
    Aborted { path: PathBuf, message: String },
}

/// Summary of a finished batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Files hashed successfully
    pub hashed: usize,
    /// Files renamed (zero in dry-run mode)
    pub renamed: usize,
    /// Files that failed
    pub failed: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

/// Events during hashing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum HashEvent {
    /// Progress update, sent before each file is decoded
    Progress(HashProgress),
    /// A file was hashed
    FileHashed { path: PathBuf, hash: String },
    /// A file could not be decoded or hashed
    Error { path: PathBuf, message: String },
}

/// Progress information during hashing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashProgress {
    /// Number of files finished so far
    pub completed: usize,
    /// Total number of files in the batch
    pub total: usize,
    /// File about to be processed
    pub current_path: PathBuf,
}

/// Events during renaming
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RenameEvent {
    /// A rename is about to be attempted (or skipped, in a dry run)
    Planned(RenameOperation),
    /// The file was renamed
    Renamed { source: PathBuf, destination: PathBuf },
    /// The rename failed; the source is untouched
    Error { destination: PathBuf, message: String },
}

impl RenameEvent {
    /// The `source -> destination` line for a planned rename
    pub fn announcement(&self) -> Option<String> {
        match self {
            RenameEvent::Planned(op) => Some(op.announcement()),
            _ => None,
        }
    }
}
