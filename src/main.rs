//! # imagehash CLI
//!
//! Command-line interface for perceptual image hashing.
//!
//! ## Usage
//! ```bash
//! imagehash photo.jpg
//! imagehash --hash wavelet *.png
//! imagehash --rename --dry-run --template '{path}/{name}-{hash}{ext}' photo.jpg
//! ```

mod cli;

use std::process::ExitCode;

fn main() -> ExitCode {
    cli::run()
}
