//! SIMD-accelerated grayscale downscaling.
//!
//! Every in-crate hash starts by shrinking the image to a few dozen pixels
//! of luma. fast_image_resize does this 5-14x faster than the image crate,
//! using AVX2/NEON when available.

use crate::error::HashError;
use fast_image_resize::{images::Image, FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer};
use image::{DynamicImage, GrayImage};

/// Reusable grayscale resizer
pub struct GrayResizer {
    resizer: Resizer,
    options: ResizeOptions,
}

impl GrayResizer {
    pub fn new() -> Self {
        Self {
            resizer: Resizer::new(),
            // Bilinear is plenty for hash-sized targets
            options: ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Bilinear)),
        }
    }

    /// Convert to luma, then resize to exactly `width` x `height`.
    pub fn resize(
        &mut self,
        image: &DynamicImage,
        width: u32,
        height: u32,
    ) -> Result<GrayImage, HashError> {
        if width == 0 || height == 0 {
            return Err(HashError::ComputationFailed(format!(
                "cannot resize to {}x{}",
                width, height
            )));
        }

        // Grayscale first: one channel is a third of the work
        let gray = image.to_luma8();
        let (src_width, src_height) = gray.dimensions();

        if src_width == 0 || src_height == 0 {
            return Err(HashError::ComputationFailed(
                "source image has no pixels".to_string(),
            ));
        }

        if (src_width, src_height) == (width, height) {
            return Ok(gray);
        }

        let src = Image::from_vec_u8(src_width, src_height, gray.into_raw(), PixelType::U8)
            .map_err(|e| HashError::ComputationFailed(format!("resize source: {}", e)))?;
        let mut dst = Image::new(width, height, PixelType::U8);

        self.resizer
            .resize(&src, &mut dst, &self.options)
            .map_err(|e| HashError::ComputationFailed(format!("resize: {}", e)))?;

        GrayImage::from_raw(width, height, dst.into_vec()).ok_or_else(|| {
            HashError::ComputationFailed("resized buffer has the wrong length".to_string())
        })
    }
}

impl Default for GrayResizer {
    fn default() -> Self {
        Self::new()
    }
}

/// One-off resize for callers that don't keep a resizer around
pub fn resize_to_grayscale(
    image: &DynamicImage,
    width: u32,
    height: u32,
) -> Result<GrayImage, HashError> {
    GrayResizer::new().resize(image, width, height)
}
