//! Single-level folder enumeration using walkdir.

use super::{filter::ImageFilter, PhotoFile};
use crate::error::ScanError;
use std::path::Path;
use walkdir::WalkDir;

/// Lists supported images directly inside one folder
#[derive(Debug, Clone, Default)]
pub struct FolderScanner {
    filter: ImageFilter,
}

impl FolderScanner {
    pub fn new() -> Self {
        Self {
            filter: ImageFilter::new(),
        }
    }

    /// Return the supported images in `folder`, sorted by path.
    ///
    /// Entries that cannot be read are logged and skipped; only a missing
    /// or unreadable `folder` itself is an error.
    pub fn scan(&self, folder: &Path) -> Result<Vec<PhotoFile>, ScanError> {
        if !folder.is_dir() {
            return Err(ScanError::DirectoryNotFound {
                path: folder.to_path_buf(),
            });
        }

        let walker = WalkDir::new(folder)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name();

        let mut photos = Vec::new();

        for entry_result in walker {
            let entry = match entry_result {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => {
                    return Err(ScanError::ReadDirectory {
                        path: folder.to_path_buf(),
                        source: e.into(),
                    });
                }
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry in {}: {}", folder.display(), e);
                    continue;
                }
            };

            if !entry.file_type().is_file() || !self.filter.should_include(entry.path()) {
                continue;
            }

            let size = match entry.metadata() {
                Ok(metadata) => metadata.len(),
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", entry.path().display(), e);
                    continue;
                }
            };

            photos.push(PhotoFile {
                path: entry.path().to_path_buf(),
                size,
                format: self.filter.get_format(entry.path()),
            });
        }

        tracing::debug!("Found {} images in {}", photos.len(), folder.display());
        Ok(photos)
    }
}
