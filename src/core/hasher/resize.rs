//! Resizing to a square luma matrix.
//!
//! Uses fast_image_resize (SIMD) on the RGB image, then converts each
//! resized pixel to luma with the Rec. 601 weights.

use crate::error::HashError;
use fast_image_resize::{images::Image, FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer};
use image::DynamicImage;
use std::path::Path;

/// Square grayscale sample matrix, row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrayMatrix {
    side: usize,
    pixels: Vec<u8>,
}

impl GrayMatrix {
    /// Wrap `pixels` as a `side`×`side` matrix. Returns `None` on a size mismatch.
    pub fn from_pixels(side: usize, pixels: Vec<u8>) -> Option<Self> {
        (side > 0 && pixels.len() == side * side).then_some(Self { side, pixels })
    }

    pub fn side(&self) -> usize {
        self.side
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Horizontal mirror: every row reversed
    pub fn mirrored(&self) -> Self {
        let mut pixels = self.pixels.clone();
        for row in pixels.chunks_exact_mut(self.side) {
            row.reverse();
        }
        Self {
            side: self.side,
            pixels,
        }
    }
}

/// `0.299R + 0.587G + 0.114B`, truncated
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    (r as f64 * 0.299 + g as f64 * 0.587 + b as f64 * 0.114) as u8
}

/// Produces fixed-size grayscale matrices from decoded images.
///
/// Holds a reusable `Resizer`, so keep one per worker.
pub struct GrayscaleResizer {
    side: u32,
    resizer: Resizer,
    options: ResizeOptions,
}

impl GrayscaleResizer {
    pub fn new(side: u32) -> Self {
        Self {
            side,
            resizer: Resizer::new(),
            options: ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::CatmullRom)),
        }
    }

    pub fn side(&self) -> u32 {
        self.side
    }

    /// Resize `image` to `side`×`side` and convert it to luma.
    ///
    /// `path` only labels the error.
    pub fn grayscale(&mut self, path: &Path, image: &DynamicImage) -> Result<GrayMatrix, HashError> {
        let rgb = image.to_rgb8();
        let (src_width, src_height) = rgb.dimensions();

        if src_width == 0 || src_height == 0 {
            return Err(HashError::EmptyImage {
                path: path.to_path_buf(),
            });
        }

        let decode_error = |reason: String| HashError::Decode {
            path: path.to_path_buf(),
            reason,
        };

        let src_image = Image::from_vec_u8(src_width, src_height, rgb.into_raw(), PixelType::U8x3)
            .map_err(|e| decode_error(format!("failed to wrap source image: {}", e)))?;
        let mut dst_image = Image::new(self.side, self.side, PixelType::U8x3);

        self.resizer
            .resize(&src_image, &mut dst_image, &self.options)
            .map_err(|e| decode_error(format!("resize failed: {}", e)))?;

        let pixels: Vec<u8> = dst_image
            .buffer()
            .chunks_exact(3)
            .map(|p| luma(p[0], p[1], p[2]))
            .collect();

        GrayMatrix::from_pixels(self.side as usize, pixels)
            .ok_or_else(|| decode_error("resized buffer has the wrong length".to_string()))
    }
}
