//! Extension allow-list for the scanner.

use super::ImageFormat;
use std::path::Path;

/// Decides whether a file looks like a supported image
#[derive(Debug, Clone, Default)]
pub struct ImageFilter;

impl ImageFilter {
    pub fn new() -> Self {
        Self
    }

    /// Check if a file should be included
    pub fn should_include(&self, path: &Path) -> bool {
        self.get_format(path).is_supported()
    }

    /// Get the image format for a path
    pub fn get_format(&self, path: &Path) -> ImageFormat {
        path.extension()
            .and_then(|e| e.to_str())
            .map(ImageFormat::from_extension)
            .unwrap_or(ImageFormat::Unknown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_includes_every_allowed_extension() {
        let filter = ImageFilter::new();
        for name in ["a.jpg", "a.jpeg", "a.png", "a.bmp", "a.webp", "a.heic"] {
            assert!(filter.should_include(Path::new(name)), "{name}");
        }
    }

    #[test]
    fn filter_ignores_case() {
        let filter = ImageFilter::new();
        assert!(filter.should_include(Path::new("/photos/IMG_1234.HEIC")));
        assert!(filter.should_include(Path::new("/photos/image.JPEG")));
    }

    #[test]
    fn filter_excludes_non_images() {
        let filter = ImageFilter::new();
        assert!(!filter.should_include(Path::new("/photos/document.pdf")));
        assert!(!filter.should_include(Path::new("/photos/clip.mp4")));
        assert!(!filter.should_include(Path::new("/photos/anim.gif")));
    }

    #[test]
    fn filter_handles_no_extension() {
        let filter = ImageFilter::new();
        assert!(!filter.should_include(Path::new("/photos/no_extension")));
        assert!(!filter.should_include(Path::new("/photos/.jpg")));
    }
}
