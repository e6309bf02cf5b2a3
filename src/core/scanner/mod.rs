//! # Scanner Module
//!
//! Finds the image files sitting directly inside a folder.
//!
//! ## Supported Formats
//! - JPEG (.jpg, .jpeg)
//! - PNG (.png)
//! - BMP (.bmp)
//! - WebP (.webp)
//! - HEIC (.heic) - iPhone photos
//!
//! Extensions are matched case-insensitively. Subdirectories (including
//! the `dupe` quarantine folder) are never entered.
//!
//! ## Example
//! ```rust,ignore
//! use photo_quarantine::core::scanner::FolderScanner;
//!
//! let photos = FolderScanner::new().scan(Path::new("/Users/me/Pictures"))?;
//! ```

mod filter;
mod walker;

pub use filter::ImageFilter;
pub use walker::FolderScanner;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Represents a discovered photo file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhotoFile {
    /// Path to the photo file
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
    /// Detected image format
    pub format: ImageFormat,
}

/// Image formats accepted by the scanner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Bmp,
    WebP,
    Heic,
    Unknown,
}

impl ImageFormat {
    /// Detect format from file extension
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "jpg" | "jpeg" => ImageFormat::Jpeg,
            "png" => ImageFormat::Png,
            "bmp" => ImageFormat::Bmp,
            "webp" => ImageFormat::WebP,
            "heic" => ImageFormat::Heic,
            _ => ImageFormat::Unknown,
        }
    }

    /// Check if this format is supported
    pub fn is_supported(&self) -> bool {
        !matches!(self, ImageFormat::Unknown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_format_from_extension_lowercase() {
        assert_eq!(ImageFormat::from_extension("jpg"), ImageFormat::Jpeg);
        assert_eq!(ImageFormat::from_extension("jpeg"), ImageFormat::Jpeg);
        assert_eq!(ImageFormat::from_extension("png"), ImageFormat::Png);
        assert_eq!(ImageFormat::from_extension("bmp"), ImageFormat::Bmp);
        assert_eq!(ImageFormat::from_extension("webp"), ImageFormat::WebP);
        assert_eq!(ImageFormat::from_extension("heic"), ImageFormat::Heic);
    }

    #[test]
    fn image_format_from_extension_uppercase() {
        assert_eq!(ImageFormat::from_extension("JPG"), ImageFormat::Jpeg);
        assert_eq!(ImageFormat::from_extension("PnG"), ImageFormat::Png);
        assert_eq!(ImageFormat::from_extension("HEIC"), ImageFormat::Heic);
    }

    #[test]
    fn formats_outside_the_allow_list_are_unknown() {
        assert_eq!(ImageFormat::from_extension("gif"), ImageFormat::Unknown);
        assert_eq!(ImageFormat::from_extension("tiff"), ImageFormat::Unknown);
        assert_eq!(ImageFormat::from_extension("heif"), ImageFormat::Unknown);
        assert!(!ImageFormat::Unknown.is_supported());
        assert!(ImageFormat::Jpeg.is_supported());
    }
}
