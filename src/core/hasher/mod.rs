//! # Hasher Module
//!
//! Computes perceptual hashes for images.
//!
//! ## Supported Algorithms
//! - **aHash (Average Hash)** - Fastest, good for exact duplicates
//! - **pHash (Perceptual Hash)** - Most robust, handles edits well
//! - **dHash (Difference Hash)** - Best balance of speed and accuracy
//! - **wHash (Wavelet Hash)** - Haar wavelet based, ignores overall brightness
//!
//! ## How It Works
//! 1. Resize image to a small size (8x8 by default)
//! 2. Convert to grayscale
//! 3. Compute hash bits from pixel relationships
//! 4. Render the bits as lowercase hex
//!
//! ## Example
//! ```
//! use image::{DynamicImage, Rgb, RgbImage};
//! use imagehash_cli::core::hasher::{HashAlgorithmKind, HasherConfig, PerceptualHash};
//!
//! let image = DynamicImage::ImageRgb8(RgbImage::from_fn(64, 64, |x, _| {
//!     if x < 32 { Rgb([0, 0, 0]) } else { Rgb([255, 255, 255]) }
//! }));
//!
//! let hasher = HasherConfig::new()
//!     .algorithm(HashAlgorithmKind::Wavelet)
//!     .hash_size(16)
//!     .build()
//!     .unwrap();
//!
//! let hash = hasher.hash_image(&image).unwrap();
//! assert_eq!(hash.bit_count(), 256);
//! assert_eq!(hash.to_hex().len(), 64);
//! ```

mod algorithms;
pub mod fast_decode;
pub mod fast_resize;
mod traits;

pub use algorithms::{AverageHasher, DifferenceHasher, PerceptualHasher, WaveletHasher};
pub use fast_decode::{FastDecoder, ImageDecoder};
pub use traits::{HashAlgorithm, HashAlgorithmKind, ImageHashValue, PerceptualHash};

use crate::error::{HashError, ImageHashError};
use image::DynamicImage;

/// Hash size used when none is configured: 8x8 = 64 bits
pub const DEFAULT_HASH_SIZE: u32 = 8;

/// Largest accepted hash size (4096 bits)
pub const MAX_HASH_SIZE: u32 = 64;

/// Configuration builder for hashers
#[derive(Debug, Clone)]
pub struct HasherConfig {
    /// Hash size (width and height of the bit grid)
    hash_size: u32,
    /// Algorithm to use
    algorithm: HashAlgorithmKind,
}

impl HasherConfig {
    /// Create a new hasher configuration with defaults
    pub fn new() -> Self {
        Self {
            hash_size: DEFAULT_HASH_SIZE,
            algorithm: HashAlgorithmKind::Average,
        }
    }

    /// Set the hash size.
    ///
    /// - 8: 64 bits, fast, good for most uses
    /// - 16: 256 bits, more accurate
    ///
    /// The wavelet hash needs a power of two.
    pub fn hash_size(mut self, size: u32) -> Self {
        self.hash_size = size;
        self
    }

    /// Set the hash algorithm
    pub fn algorithm(mut self, algorithm: HashAlgorithmKind) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Check the settings without building anything
    pub fn validate(&self) -> Result<(), ImageHashError> {
        if !(2..=MAX_HASH_SIZE).contains(&self.hash_size) {
            return Err(ImageHashError::Config(format!(
                "hash size must be between 2 and {}, got {}",
                MAX_HASH_SIZE, self.hash_size
            )));
        }

        if self.algorithm == HashAlgorithmKind::Wavelet && !self.hash_size.is_power_of_two() {
            return Err(ImageHashError::Config(format!(
                "wavelet hash size must be a power of two, got {}",
                self.hash_size
            )));
        }

        Ok(())
    }

    /// Build the hasher
    pub fn build(self) -> Result<Box<dyn HashAlgorithm>, ImageHashError> {
        self.validate()?;
        Ok(instantiate(self.algorithm, self.hash_size))
    }
}

impl Default for HasherConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Hash one decoded image with the default hash size, returning the hex string.
pub fn compute_hash(
    image: &DynamicImage,
    algorithm: HashAlgorithmKind,
) -> Result<String, HashError> {
    let hasher = instantiate(algorithm, DEFAULT_HASH_SIZE);
    Ok(hasher.hash_image(image)?.to_hex())
}

/// The one place an algorithm kind turns into an implementation
fn instantiate(algorithm: HashAlgorithmKind, hash_size: u32) -> Box<dyn HashAlgorithm> {
    match algorithm {
        HashAlgorithmKind::Average => Box::new(AverageHasher::new(hash_size)),
        HashAlgorithmKind::Perceptual => Box::new(PerceptualHasher::new(hash_size)),
        HashAlgorithmKind::Difference => Box::new(DifferenceHasher::new(hash_size)),
        HashAlgorithmKind::Wavelet => Box::new(WaveletHasher::new(hash_size)),
    }
}
