//! Wavelet Hash (wHash) implementation.
//!
//! wHash works by:
//! 1. Resizing the image to a power-of-two square, as large as the
//!    smaller image side allows (never smaller than hash_size)
//! 2. Converting to grayscale, scaled to 0.0..=1.0
//! 3. Removing the overall brightness: a full Haar decomposition with the
//!    single lowest band zeroed, then reconstructed
//! 4. Decomposing again until the low band is hash_size x hash_size
//! 5. Setting a bit for every low-band coefficient above their median
//!
//! hash_size must be a power of two.

use super::super::fast_resize::resize_to_grayscale;
use super::super::traits::{HashAlgorithm, HashAlgorithmKind, ImageHashValue};
use crate::error::HashError;
use image::DynamicImage;
use std::f64::consts::FRAC_1_SQRT_2;

/// Wavelet Hash (wHash) implementation using the Haar wavelet
pub struct WaveletHasher {
    hash_size: u32,
}

impl WaveletHasher {
    pub fn new(hash_size: u32) -> Self {
        Self { hash_size }
    }

    /// Side of the square the image is resized to before decomposition
    fn image_scale(&self, width: u32, height: u32) -> u32 {
        let smaller = width.min(height).max(1);
        let natural = 1u32 << (31 - smaller.leading_zeros());
        natural.max(self.hash_size)
    }
}

impl HashAlgorithm for WaveletHasher {
    fn hash_image(&self, image: &DynamicImage) -> Result<ImageHashValue, HashError> {
        if self.hash_size < 2 || !self.hash_size.is_power_of_two() {
            return Err(HashError::ComputationFailed(format!(
                "wavelet hash size must be a power of two, got {}",
                self.hash_size
            )));
        }

        let scale = self.image_scale(image.width(), image.height());
        let gray = resize_to_grayscale(image, scale, scale)?;

        let n = scale as usize;
        let mut pixels: Vec<f64> = gray.pixels().map(|p| p[0] as f64 / 255.0).collect();

        let max_level = scale.trailing_zeros();
        haar_forward(&mut pixels, n, max_level);
        pixels[0] = 0.0;
        haar_inverse(&mut pixels, n, max_level);

        let level = max_level - self.hash_size.trailing_zeros();
        haar_forward(&mut pixels, n, level);

        let hs = self.hash_size as usize;
        let low_band: Vec<f64> = (0..hs)
            .flat_map(|y| pixels[y * n..y * n + hs].iter().copied())
            .collect();

        let median = median(&low_band);
        let bits = low_band.iter().map(|&v| v > median);

        Ok(ImageHashValue::from_bits(bits))
    }

    fn kind(&self) -> HashAlgorithmKind {
        HashAlgorithmKind::Wavelet
    }
}

/// Apply `levels` rounds of the 2D Haar transform to the top-left corner of
/// an `n` x `n` row-major buffer. Each round halves the low band.
fn haar_forward(data: &mut [f64], n: usize, levels: u32) {
    let mut size = n;
    let mut scratch = vec![0.0; n];
    for _ in 0..levels {
        haar_step(data, n, size, &mut scratch);
        size /= 2;
    }
}

/// Undo `levels` rounds of [`haar_forward`].
fn haar_inverse(data: &mut [f64], n: usize, levels: u32) {
    if levels == 0 {
        return;
    }
    let mut size = n >> (levels - 1);
    let mut scratch = vec![0.0; n];
    for _ in 0..levels {
        haar_inverse_step(data, n, size, &mut scratch);
        size *= 2;
    }
}

fn haar_step(data: &mut [f64], stride: usize, size: usize, scratch: &mut [f64]) {
    let half = size / 2;

    for y in 0..size {
        let row = &mut data[y * stride..y * stride + size];
        for i in 0..half {
            let (a, b) = (row[2 * i], row[2 * i + 1]);
            scratch[i] = (a + b) * FRAC_1_SQRT_2;
            scratch[half + i] = (a - b) * FRAC_1_SQRT_2;
        }
        row.copy_from_slice(&scratch[..size]);
    }

    for x in 0..size {
        for i in 0..half {
            let (a, b) = (data[2 * i * stride + x], data[(2 * i + 1) * stride + x]);
            scratch[i] = (a + b) * FRAC_1_SQRT_2;
            scratch[half + i] = (a - b) * FRAC_1_SQRT_2;
        }
        for (i, value) in scratch[..size].iter().enumerate() {
            data[i * stride + x] = *value;
        }
    }
}

fn haar_inverse_step(data: &mut [f64], stride: usize, size: usize, scratch: &mut [f64]) {
    let half = size / 2;

    for x in 0..size {
        for i in 0..half {
            let (low, high) = (data[i * stride + x], data[(half + i) * stride + x]);
            scratch[2 * i] = (low + high) * FRAC_1_SQRT_2;
            scratch[2 * i + 1] = (low - high) * FRAC_1_SQRT_2;
        }
        for (i, value) in scratch[..size].iter().enumerate() {
            data[i * stride + x] = *value;
        }
    }

    for y in 0..size {
        let row = &mut data[y * stride..y * stride + size];
        for i in 0..half {
            let (low, high) = (row[i], row[half + i]);
            scratch[2 * i] = (low + high) * FRAC_1_SQRT_2;
            scratch[2 * i + 1] = (low - high) * FRAC_1_SQRT_2;
        }
        row.copy_from_slice(&scratch[..size]);
    }
}

fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::super::traits::PerceptualHash;
    use image::{ImageBuffer, Rgb};

    fn create_solid_image(value: u8) -> DynamicImage {
        let img = ImageBuffer::from_fn(100, 100, |_, _| Rgb([value, value, value]));
        DynamicImage::ImageRgb8(img)
    }

    fn create_half_and_half() -> DynamicImage {
        let img = ImageBuffer::from_fn(100, 100, |x, _| {
            if x < 50 {
                Rgb([0, 0, 0])
            } else {
                Rgb([255, 255, 255])
            }
        });
        DynamicImage::ImageRgb8(img)
    }

    #[test]
    fn haar_round_trip_restores_input() {
        let original: Vec<f64> = (0..64).map(|i| (i * 7 % 13) as f64).collect();
        let mut data = original.clone();

        haar_forward(&mut data, 8, 3);
        haar_inverse(&mut data, 8, 3);

        for (a, b) in original.iter().zip(&data) {
            assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn haar_low_band_holds_the_mean() {
        let mut data = vec![2.0; 16];
        haar_forward(&mut data, 4, 2);

        // Orthonormal Haar: DC = mean * n
        assert!((data[0] - 8.0).abs() < 1e-9);
        assert!(data[1..].iter().all(|v| v.abs() < 1e-9));
    }

    #[test]
    fn median_of_even_count_averages_middle() {
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), 2.5);
        assert_eq!(median(&[3.0, 1.0, 2.0]), 2.0);
    }

    #[test]
    fn image_scale_is_power_of_two() {
        let hasher = WaveletHasher::new(8);
        assert_eq!(hasher.image_scale(100, 300), 64);
        assert_eq!(hasher.image_scale(4, 4), 8);
        assert_eq!(hasher.image_scale(128, 128), 128);
    }

    #[test]
    fn identical_images_produce_identical_hash() {
        let hasher = WaveletHasher::new(8);
        let image = create_half_and_half();

        assert_eq!(
            hasher.hash_image(&image).unwrap(),
            hasher.hash_image(&image).unwrap()
        );
    }

    #[test]
    fn overall_brightness_does_not_matter() {
        let dim = ImageBuffer::from_fn(100, 100, |x, _| {
            if x < 50 {
                Rgb([40u8, 40, 40])
            } else {
                Rgb([200, 200, 200])
            }
        });
        let hasher = WaveletHasher::new(8);

        assert_eq!(
            hasher.hash_image(&DynamicImage::ImageRgb8(dim)).unwrap(),
            hasher.hash_image(&create_half_and_half()).unwrap()
        );
    }

    #[test]
    fn bright_right_half_sets_right_bits() {
        let hash = WaveletHasher::new(8).hash_image(&create_half_and_half()).unwrap();
        assert_eq!(hash.to_hex(), "0f0f0f0f0f0f0f0f");
    }

    #[test]
    fn non_power_of_two_size_is_rejected() {
        let result = WaveletHasher::new(6).hash_image(&create_solid_image(10));
        assert!(matches!(result, Err(HashError::ComputationFailed(_))));
    }

    #[test]
    fn kind_returns_wavelet() {
        assert_eq!(WaveletHasher::new(8).kind(), HashAlgorithmKind::Wavelet);
    }
}
