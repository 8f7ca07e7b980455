//! # Core Module
//!
//! The hashing and renaming engine, free of any terminal I/O.
//!
//! ## Modules
//! - `hasher` - Decodes images and computes perceptual hashes
//! - `template` - Derives new file names from a hash and a template
//! - `rename` - Performs (or dry-runs) a single rename
//! - `batch` - Runs the whole thing over a list of files
//! - `reporter` - Formats batch results for output

pub mod batch;
pub mod hasher;
pub mod rename;
pub mod reporter;
pub mod template;

// Re-export commonly used types
pub use batch::{BatchProcessor, BatchResult, FailurePolicy};
pub use hasher::{compute_hash, HashAlgorithmKind};
pub use rename::{RenameExecutor, RenameOperation};
pub use template::{derive_name, Template};
