//! Trait definitions for perceptual hashing.

use crate::error::{HashError, ImageHashError};
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A computed perceptual hash
pub trait PerceptualHash: Clone + Send + Sync {
    /// Get the raw hash bytes
    fn as_bytes(&self) -> &[u8];

    /// Get the hash as a hexadecimal string
    fn to_hex(&self) -> String {
        self.as_bytes()
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect()
    }

    /// Get the total number of bits in this hash
    fn bit_count(&self) -> u32 {
        (self.as_bytes().len() * 8) as u32
    }
}

/// Available hash algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HashAlgorithmKind {
    /// Average Hash (aHash) - Fast, good for exact duplicates
    Average,
    /// Perceptual Hash (pHash) - Most robust, handles edits well
    Perceptual,
    /// Difference Hash (dHash) - Good balance of speed and accuracy
    Difference,
    /// Wavelet Hash (wHash) - Haar wavelet low band, robust to brightness shifts
    Wavelet,
}

impl HashAlgorithmKind {
    /// Every algorithm, in the order they are listed to users
    pub const ALL: [HashAlgorithmKind; 4] = [
        HashAlgorithmKind::Average,
        HashAlgorithmKind::Perceptual,
        HashAlgorithmKind::Difference,
        HashAlgorithmKind::Wavelet,
    ];

    /// The identifier used on the command line
    pub fn name(&self) -> &'static str {
        match self {
            HashAlgorithmKind::Average => "average",
            HashAlgorithmKind::Perceptual => "perceptual",
            HashAlgorithmKind::Difference => "difference",
            HashAlgorithmKind::Wavelet => "wavelet",
        }
    }
}

impl FromStr for HashAlgorithmKind {
    type Err = ImageHashError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "average" => Ok(HashAlgorithmKind::Average),
            // "perception" is the name older releases used
            "perceptual" | "perception" => Ok(HashAlgorithmKind::Perceptual),
            "difference" => Ok(HashAlgorithmKind::Difference),
            "wavelet" => Ok(HashAlgorithmKind::Wavelet),
            _ => Err(ImageHashError::UnknownAlgorithm {
                name: name.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for HashAlgorithmKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Trait for hash algorithm implementations
pub trait HashAlgorithm: Send + Sync {
    /// Compute a hash from an already-loaded image
    fn hash_image(&self, image: &DynamicImage) -> Result<ImageHashValue, HashError>;

    /// Get the algorithm kind
    fn kind(&self) -> HashAlgorithmKind;
}

/// Concrete hash value type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageHashValue {
    /// The raw hash bytes
    bytes: Vec<u8>,
}

impl ImageHashValue {
    /// Create a new hash value
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Pack a row-major bit sequence into bytes, most significant bit first.
    ///
    /// A trailing partial byte is padded with zero bits.
    pub fn from_bits<I>(bits: I) -> Self
    where
        I: IntoIterator<Item = bool>,
    {
        let mut bytes = Vec::new();
        let mut current_byte: u8 = 0;
        let mut bit_position = 0;

        for bit in bits {
            if bit {
                current_byte |= 1 << (7 - bit_position);
            }

            bit_position += 1;

            if bit_position == 8 {
                bytes.push(current_byte);
                current_byte = 0;
                bit_position = 0;
            }
        }

        if bit_position > 0 {
            bytes.push(current_byte);
        }

        Self { bytes }
    }
}

impl PerceptualHash for ImageHashValue {
    fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl std::fmt::Display for ImageHashValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}
