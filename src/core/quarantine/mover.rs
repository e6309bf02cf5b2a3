//! Moves similarity groups into the quarantine folder.

use super::{parse_group_index, quarantine_dir, quarantine_name};
use crate::core::comparator::SimilarityGroup;
use crate::error::QuarantineError;
use crate::events::LogSink;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// One file that was moved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovedFile {
    pub from: PathBuf,
    pub to: PathBuf,
    pub group_index: u64,
}

/// Result of a quarantine move
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MoveReport {
    pub dupe_dir: PathBuf,
    /// Index given to the first group of this run
    pub first_index: u64,
    pub groups_moved: usize,
    pub files_moved: usize,
    pub moved: Vec<MovedFile>,
    /// One line per file that could not be moved
    pub errors: Vec<String>,
    pub duration_ms: u64,
}

/// Moves files into `dupe` under collision-safe group-indexed names
pub struct QuarantineMover;

impl QuarantineMover {
    /// Move every member of `groups` to `base/dupe/S<n>__<name>`.
    ///
    /// Indices continue after the highest one already present in `dupe`.
    /// An existing file with the destination name is replaced. A file that
    /// cannot be moved is logged and skipped.
    pub fn move_to_quarantine(
        base: &Path,
        groups: &[SimilarityGroup],
        log: &dyn LogSink,
    ) -> Result<MoveReport, QuarantineError> {
        let start = Instant::now();

        if !base.is_dir() {
            return Err(QuarantineError::DirectoryNotFound {
                path: base.to_path_buf(),
            });
        }

        let dupe_dir = quarantine_dir(base);
        let first_index = Self::next_group_index(&dupe_dir)?;

        // Every group needs its own index, so refuse before moving anything
        if let Some(extra) = (groups.len() as u64).checked_sub(1) {
            if first_index.checked_add(extra).is_none() {
                return Err(QuarantineError::IndexExhausted { path: dupe_dir });
            }
        }

        fs::create_dir_all(&dupe_dir).map_err(|e| QuarantineError::CreateDirectory {
            path: dupe_dir.clone(),
            source: e,
        })?;
        let mut report = MoveReport {
            dupe_dir: dupe_dir.clone(),
            first_index,
            ..Default::default()
        };

        for (offset, group) in groups.iter().enumerate() {
            let index = first_index + offset as u64;
            let mut moved_any = false;

            for source in &group.members {
                match Self::move_member(source, &dupe_dir, index) {
                    Ok(dest) => {
                        tracing::debug!("{} -> {}", source.display(), dest.display());
                        moved_any = true;
                        report.files_moved += 1;
                        report.moved.push(MovedFile {
                            from: source.clone(),
                            to: dest,
                            group_index: index,
                        });
                    }
                    Err(e) => {
                        tracing::warn!("{}", e);
                        log.log(&format!("Move failed: {}", e));
                        report.errors.push(e.to_string());
                    }
                }
            }

            if moved_any {
                report.groups_moved += 1;
            }
        }

        report.duration_ms = start.elapsed().as_millis() as u64;

        log.log(&format!(
            "Moved {} files in {} groups to {} (S{} onward)",
            report.files_moved,
            report.groups_moved,
            dupe_dir.display(),
            first_index
        ));

        Ok(report)
    }

    /// `max(n) + 1` over files named `S<n>__*` in `dupe_dir`, or 1 when there
    /// are none (or the folder does not exist yet).
    ///
    /// Fails with `IndexExhausted` when `max(n)` is already `u64::MAX`.
    pub fn next_group_index(dupe_dir: &Path) -> Result<u64, QuarantineError> {
        if !dupe_dir.is_dir() {
            return Ok(1);
        }

        let read_error = |e: io::Error| QuarantineError::ReadDirectory {
            path: dupe_dir.to_path_buf(),
            source: e,
        };

        let mut highest = 0u64;
        for entry in fs::read_dir(dupe_dir).map_err(read_error)? {
            let entry = entry.map_err(read_error)?;
            if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                continue;
            }
            if let Some(index) = entry.file_name().to_str().and_then(parse_group_index) {
                highest = highest.max(index);
            }
        }

        highest
            .checked_add(1)
            .ok_or_else(|| QuarantineError::IndexExhausted {
                path: dupe_dir.to_path_buf(),
            })
    }

    fn move_member(source: &Path, dupe_dir: &Path, index: u64) -> Result<PathBuf, QuarantineError> {
        let name = source
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| QuarantineError::Move {
                from: source.to_path_buf(),
                to: dupe_dir.to_path_buf(),
                source: io::Error::new(io::ErrorKind::InvalidInput, "file name is not valid UTF-8"),
            })?;
        let dest = dupe_dir.join(quarantine_name(index, name));

        if dest.exists() {
            fs::remove_file(&dest).map_err(|e| QuarantineError::Delete {
                path: dest.clone(),
                source: e,
            })?;
        }

        move_file(source, &dest).map_err(|e| QuarantineError::Move {
            from: source.to_path_buf(),
            to: dest.clone(),
            source: e,
        })?;

        Ok(dest)
    }
}

/// Rename, falling back to copy + verify + delete across filesystems
pub(crate) fn move_file(source: &Path, dest: &Path) -> io::Result<()> {
    fs::rename(source, dest).or_else(|rename_error| {
        if !source.is_file() {
            return Err(rename_error);
        }

        let source_size = fs::metadata(source)?.len();
        fs::copy(source, dest)?;

        let dest_size = fs::metadata(dest)?.len();
        if dest_size != source_size {
            let _ = fs::remove_file(dest);
            return Err(io::Error::other(format!(
                "copy verification failed: source {} bytes, dest {} bytes",
                source_size, dest_size
            )));
        }

        fs::remove_file(source)
    })
}
