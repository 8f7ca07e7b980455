//! # imagehash-cli
//!
//! Perceptual image hashing with hash-based renaming.
//!
//! Computes a content-derived fingerprint for each image file and, on
//! request, renames the file after it using a naming template such as
//! `{path}/{hash}{ext}`.
//!
//! ## Architecture
//! The library holds the engine; the `imagehash` binary is a thin shell:
//! - `core` - Hashing, templating, renaming and batch processing
//! - `events` - Event-driven progress and rename announcements
//! - `error` - Error types with paths and causes

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{ImageHashError, Result};

use tracing_subscriber::EnvFilter;

/// Initialize tracing for the application.
///
/// Logs go to stderr so they never mix with hashes on stdout. `RUST_LOG`
/// wins over `verbose` when set.
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    // A second call (tests, embedding) keeps the first subscriber
    let _ = tracing::subscriber::set_global_default(subscriber);
}
