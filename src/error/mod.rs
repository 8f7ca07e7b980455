//! # Error Module
//!
//! Error types for hashing and renaming images.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Include context** - the path involved and the underlying cause
//! - **Usage errors early** - bad algorithm names and settings are reported
//!   before any file is opened

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum ImageHashError {
    #[error("Unknown hash type: {name} (expected one of: average, perceptual, difference, wavelet)")]
    UnknownAlgorithm { name: String },

    #[error("Could not open image {path}: {source}")]
    FileError {
        path: PathBuf,
        #[source]
        source: HashError,
    },

    #[error("Could not rename {source_path} to {destination}: {source}")]
    RenameFailed {
        source_path: PathBuf,
        destination: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ImageHashError {
    /// The file this error is about, if any
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            ImageHashError::FileError { path, .. } => Some(path),
            ImageHashError::RenameFailed { destination, .. } => Some(destination),
            ImageHashError::UnknownAlgorithm { .. } | ImageHashError::Config(_) => None,
        }
    }
}

/// Errors that occur while decoding or hashing a single image
#[derive(Error, Debug)]
pub enum HashError {
    #[error("failed to decode: {reason}")]
    DecodeError { path: PathBuf, reason: String },

    #[error("image has no pixels")]
    EmptyImage { path: PathBuf },

    #[error("hash computation failed: {0}")]
    ComputationFailed(String),

    #[error("{source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, ImageHashError>;
