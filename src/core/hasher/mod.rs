//! # Hasher Module
//!
//! Computes DCT perceptual fingerprints for images.
//!
//! ## How It Works
//! 1. Decode the file (zune-jpeg for JPEG, image crate otherwise)
//! 2. Resize to a 32×32 RGB image and convert each pixel to luma
//! 3. Run a 2-D DCT and threshold the 8×8 low-frequency block at its median
//! 4. Repeat step 3 on the mirrored matrix to catch flipped copies
//!
//! ## Performance
//! - `fast_image_resize` for SIMD resizing
//! - DCT tables are built once per [`ImageHasher`] and shared read-only
//! - Every worker owns a [`HashWorkspace`] so the hot path does not
//!   allocate or synchronize
//!
//! ## Example
//! ```rust,ignore
//! use photo_quarantine::core::hasher::HasherConfig;
//!
//! let hasher = HasherConfig::new().side(32).block(8).build()?;
//! let mut workspace = hasher.workspace();
//! let fingerprint = hasher.hash_file(&path, &mut workspace)?;
//! ```

mod batch;
mod dct;
mod decode;
mod resize;
mod types;

pub use batch::{BatchConfig, BatchHasher, BatchOutcome, SkippedFile, PROGRESS_INTERVAL};
pub use dct::{DctHasher, DctScratch};
pub use decode::FastDecoder;
pub use resize::{luma, GrayMatrix, GrayscaleResizer};
pub use types::{FingerprintMap, HashPair, ImageFingerprint, StageTimings};

use crate::error::HashError;
use image::DynamicImage;
use std::path::Path;
use std::time::Instant;

/// Default matrix side fed to the DCT
pub const DEFAULT_SIDE: u32 = 32;

/// Default side of the low-frequency block (64 bits)
pub const DEFAULT_BLOCK: u32 = 8;

/// Configuration builder for hashers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HasherConfig {
    /// Side of the grayscale matrix (N)
    side: u32,
    /// Side of the AC block turned into bits (K)
    block: u32,
}

impl HasherConfig {
    /// Create a new hasher configuration with defaults (32×32, 8×8 block)
    pub fn new() -> Self {
        Self {
            side: DEFAULT_SIDE,
            block: DEFAULT_BLOCK,
        }
    }

    /// Set the grayscale matrix side
    pub fn side(mut self, side: u32) -> Self {
        self.side = side;
        self
    }

    /// Set the AC block side. `block * block` bits must fit in a `u64`.
    pub fn block(mut self, block: u32) -> Self {
        self.block = block;
        self
    }

    fn validate(&self) -> Result<(), HashError> {
        if self.block == 0 || self.block > 8 {
            return Err(HashError::InvalidConfig(format!(
                "block {} must be between 1 and 8",
                self.block
            )));
        }
        if self.side < self.block + 1 {
            return Err(HashError::InvalidConfig(format!(
                "side {} is too small for a {}x{} block after the DC term",
                self.side, self.block, self.block
            )));
        }
        Ok(())
    }

    /// Build the hasher
    pub fn build(self) -> Result<ImageHasher, HashError> {
        self.validate()?;
        Ok(ImageHasher {
            config: self,
            dct: DctHasher::new(self.side as usize, self.block as usize),
        })
    }
}

impl Default for HasherConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-worker buffers: a resizer and DCT scratch space
pub struct HashWorkspace {
    resizer: GrayscaleResizer,
    scratch: DctScratch,
}

/// Decodes, resizes and hashes image files.
///
/// Holds only immutable tables, so it is shared by reference across workers.
#[derive(Debug, Clone)]
pub struct ImageHasher {
    config: HasherConfig,
    dct: DctHasher,
}

impl ImageHasher {
    pub fn config(&self) -> HasherConfig {
        self.config
    }

    /// Fresh buffers for one worker
    pub fn workspace(&self) -> HashWorkspace {
        HashWorkspace {
            resizer: GrayscaleResizer::new(self.config.side),
            scratch: DctScratch::new(self.config.side as usize, self.config.block as usize),
        }
    }

    /// Produce the grayscale matrix for an already decoded image
    pub fn grayscale(
        &self,
        path: &Path,
        image: &DynamicImage,
        workspace: &mut HashWorkspace,
    ) -> Result<GrayMatrix, HashError> {
        workspace.resizer.grayscale(path, image)
    }

    /// Hash an already decoded image
    pub fn hash_image(
        &self,
        path: &Path,
        image: &DynamicImage,
        workspace: &mut HashWorkspace,
    ) -> Result<HashPair, HashError> {
        let matrix = self.grayscale(path, image, workspace)?;
        Ok(self.dct.hash_matrix_with(&matrix, &mut workspace.scratch))
    }

    /// Hash a file
    pub fn hash_file(
        &self,
        path: &Path,
        workspace: &mut HashWorkspace,
    ) -> Result<ImageFingerprint, HashError> {
        self.hash_file_timed(path, workspace)
            .map(|(fingerprint, _)| fingerprint)
    }

    /// Hash a file and report how long each stage took
    pub fn hash_file_timed(
        &self,
        path: &Path,
        workspace: &mut HashWorkspace,
    ) -> Result<(ImageFingerprint, StageTimings), HashError> {
        let started = Instant::now();
        let image = FastDecoder::decode(path)?;
        if image.width() == 0 || image.height() == 0 {
            return Err(HashError::EmptyImage {
                path: path.to_path_buf(),
            });
        }
        let decoded = Instant::now();

        let matrix = self.grayscale(path, &image, workspace)?;
        drop(image);
        let resized = Instant::now();

        let hashes = self.dct.hash_matrix_with(&matrix, &mut workspace.scratch);
        let hashed = Instant::now();

        let timings = StageTimings {
            decode: decoded - started,
            resize: resized - decoded,
            dct: hashed - resized,
        };

        Ok((ImageFingerprint::new(path.to_path_buf(), hashes), timings))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};
    use tempfile::TempDir;

    fn pattern_image(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(ImageBuffer::from_fn(width, height, |x, y| {
            Rgb([
                ((x * 7 + y * 3) % 256) as u8,
                ((x * y) % 256) as u8,
                ((x ^ y) * 4 % 256) as u8,
            ])
        }))
    }

    #[test]
    fn config_defaults_to_32_and_8() {
        let config = HasherConfig::new();
        assert_eq!(config.side, 32);
        assert_eq!(config.block, 8);
    }

    #[test]
    fn config_rejects_oversized_block() {
        assert!(HasherConfig::new().block(9).build().is_err());
        assert!(HasherConfig::new().block(0).build().is_err());
    }

    #[test]
    fn config_rejects_side_without_room_for_block() {
        assert!(HasherConfig::new().side(8).block(8).build().is_err());
        assert!(HasherConfig::new().side(9).block(8).build().is_ok());
    }

    #[test]
    fn hashing_same_file_twice_is_identical() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("pattern.png");
        pattern_image(120, 80).save(&path).unwrap();

        let hasher = HasherConfig::new().build().unwrap();
        let mut workspace = hasher.workspace();

        let first = hasher.hash_file(&path, &mut workspace).unwrap();
        let second = hasher.hash_file(&path, &mut hasher.workspace()).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.path, path);
    }

    #[test]
    fn hash_file_matches_hash_image() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("pattern.png");
        let image = pattern_image(64, 64);
        image.save(&path).unwrap();

        let hasher = HasherConfig::new().build().unwrap();
        let mut workspace = hasher.workspace();

        let from_file = hasher.hash_file(&path, &mut workspace).unwrap();
        let from_image = hasher.hash_image(&path, &image, &mut workspace).unwrap();

        assert_eq!(from_file.hashes(), from_image);
    }

    #[test]
    fn corrupt_file_is_a_decode_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.jpg");
        std::fs::write(&path, b"not an image").unwrap();

        let hasher = HasherConfig::new().build().unwrap();
        let result = hasher.hash_file(&path, &mut hasher.workspace());

        assert!(matches!(result, Err(HashError::Decode { .. })));
    }
}
