//! # Batch Module
//!
//! Hashes a list of image files and optionally renames each one after its
//! hash.
//!
//! ## Per-file Stages
//! 1. **Decode** - read the file into pixels
//! 2. **Hash** - run the configured algorithm
//! 3. **Rename** (optional) - derive the new name from the template, announce
//!    it, then rename (skipped in dry-run mode)
//!
//! Files are processed one at a time, in the order given. By default the
//! first failure ends the batch; see [`FailurePolicy`].

mod executor;

pub use executor::{
    BatchBuilder, BatchConfig, BatchProcessor, BatchResult, FailurePolicy, FileFailure,
    FileOutcome,
};
