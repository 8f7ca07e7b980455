//! Hash algorithm implementations.

mod average;
mod difference;
mod perceptual;
mod wavelet;

pub use average::AverageHasher;
pub use difference::DifferenceHasher;
pub use perceptual::PerceptualHasher;
pub use wavelet::WaveletHasher;
