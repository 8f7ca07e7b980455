//! Average Hash (aHash) implementation.
//!
//! aHash works by:
//! 1. Resizing the image to hash_size x hash_size
//! 2. Converting to grayscale
//! 3. Computing the mean brightness
//! 4. For each pixel: if brighter than the mean, set bit to 1, else 0

use super::super::traits::{HashAlgorithm, HashAlgorithmKind, ImageHashValue};
use crate::error::HashError;
use image::imageops::FilterType;
use image::DynamicImage;

/// Average Hash (aHash) implementation
pub struct AverageHasher {
    /// Size of the hash (width and height)
    hash_size: u32,
}

impl AverageHasher {
    pub fn new(hash_size: u32) -> Self {
        Self { hash_size }
    }
}

impl HashAlgorithm for AverageHasher {
    fn hash_image(&self, image: &DynamicImage) -> Result<ImageHashValue, HashError> {
        let gray = image
            .resize_exact(self.hash_size, self.hash_size, FilterType::Lanczos3)
            .to_luma8();

        let total: u64 = gray.pixels().map(|p| p[0] as u64).sum();
        let mean = total as f64 / (self.hash_size * self.hash_size) as f64;

        let bits = gray.pixels().map(|p| p[0] as f64 > mean);

        Ok(ImageHashValue::from_bits(bits))
    }

    fn kind(&self) -> HashAlgorithmKind {
        HashAlgorithmKind::Average
    }
}
