//! Maintenance over a folder of quarantined files.
//!
//! - **Prune** keeps the largest file of every `S<n>__` group
//! - **Rename** strips every `S<n>__` prefix again
//!
//! Both are idempotent: a second run finds nothing left to do.

use super::mover::move_file;
use super::{parse_group_index, strip_prefixes};
use crate::error::QuarantineError;
use crate::events::LogSink;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Result of a prune run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PruneReport {
    /// Groups with two or more files that were reduced to one
    pub groups_kept: usize,
    pub files_deleted: usize,
    /// One line per kept group, then a summary line
    pub logs: Vec<String>,
    /// Files that could not be deleted
    pub errors: Vec<String>,
}

/// Result of a rename run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameReport {
    pub renamed: usize,
    /// `old → new`, one line per renamed file
    pub logs: Vec<String>,
    pub errors: Vec<String>,
}

struct Candidate {
    path: PathBuf,
    name: String,
    size: u64,
}

/// Prune and rename operations on a quarantine folder
pub struct QuarantineCurator;

impl QuarantineCurator {
    /// For every `S<n>__` group with at least two files, keep the largest
    /// (ties go to the smallest name) and delete the rest.
    pub fn prune(folder: &Path, log: &dyn LogSink) -> Result<PruneReport, QuarantineError> {
        Self::prune_with(folder, log, &|path: &Path| fs::remove_file(path))
    }

    fn prune_with(
        folder: &Path,
        log: &dyn LogSink,
        remove: &dyn Fn(&Path) -> io::Result<()>,
    ) -> Result<PruneReport, QuarantineError> {
        let mut groups: BTreeMap<u64, Vec<Candidate>> = BTreeMap::new();

        for (path, name) in list_files(folder)? {
            let Some(index) = parse_group_index(&name) else {
                continue;
            };
            let size = match fs::metadata(&path) {
                Ok(metadata) => metadata.len(),
                Err(e) => {
                    tracing::warn!("Cannot stat {}: {}", path.display(), e);
                    continue;
                }
            };
            groups
                .entry(index)
                .or_default()
                .push(Candidate { path, name, size });
        }

        let mut report = PruneReport::default();

        for (index, mut files) in groups {
            if files.len() < 2 {
                continue;
            }

            files.sort_by(|a, b| b.size.cmp(&a.size).then_with(|| a.name.cmp(&b.name)));
            let (keep, rest) = files.split_at(1);

            for file in rest {
                match remove(&file.path) {
                    Ok(()) => {
                        tracing::debug!("Deleted {}", file.path.display());
                        report.files_deleted += 1;
                    }
                    Err(e) => {
                        let line = QuarantineError::Delete {
                            path: file.path.clone(),
                            source: e,
                        }
                        .to_string();
                        tracing::warn!("{}", line);
                        log.log(&line);
                        report.errors.push(line);
                    }
                }
            }

            report.groups_kept += 1;
            let line = format!("S{:03} kept {}", index, keep[0].name);
            log.log(&line);
            report.logs.push(line);
        }

        let summary = format!(
            "Kept {} groups, deleted {} duplicate files",
            report.groups_kept, report.files_deleted
        );
        tracing::info!("{}", summary);
        log.log(&summary);
        report.logs.push(summary);

        Ok(report)
    }

    /// Strip every `S<n>__` prefix, in any case and position, from the file
    /// names in `folder`.
    ///
    /// If the stripped name is taken, `_renamed` (then `_renamed_2`, ...) is
    /// inserted before the extension.
    pub fn rename(folder: &Path, log: &dyn LogSink) -> Result<RenameReport, QuarantineError> {
        let mut report = RenameReport::default();

        for (path, name) in list_files(folder)? {
            let stripped = strip_prefixes(&name);
            if stripped == name.as_str() {
                continue;
            }
            if stripped.is_empty() {
                let line = format!("Skipped {}: nothing left after removing the prefix", name);
                log.log(&line);
                report.errors.push(line);
                continue;
            }

            let target = free_name(folder, &stripped);
            match move_file(&path, &target) {
                Ok(()) => {
                    let line = format!("{} → {}", name, display_name(&target));
                    tracing::debug!("{}", line);
                    log.log(&line);
                    report.logs.push(line);
                    report.renamed += 1;
                }
                Err(e) => {
                    let line = QuarantineError::Rename {
                        from: path.clone(),
                        to: target,
                        source: e,
                    }
                    .to_string();
                    tracing::warn!("{}", line);
                    log.log(&line);
                    report.errors.push(line);
                }
            }
        }

        tracing::info!("Renamed {} files in {}", report.renamed, folder.display());

        Ok(report)
    }
}

/// Regular files directly inside `folder`, sorted by name
fn list_files(folder: &Path) -> Result<Vec<(PathBuf, String)>, QuarantineError> {
    if !folder.is_dir() {
        return Err(QuarantineError::DirectoryNotFound {
            path: folder.to_path_buf(),
        });
    }

    let read_error = |e: io::Error| QuarantineError::ReadDirectory {
        path: folder.to_path_buf(),
        source: e,
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(folder).map_err(read_error)? {
        let entry = entry.map_err(read_error)?;
        if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) => files.push((entry.path(), name)),
            Err(raw) => tracing::warn!("Skipping non UTF-8 file name {:?}", raw),
        }
    }

    files.sort_by(|a, b| a.1.cmp(&b.1));
    Ok(files)
}

/// First of `name`, `stem_renamed.ext`, `stem_renamed_2.ext`, ... not present in `folder`
fn free_name(folder: &Path, name: &str) -> PathBuf {
    let candidate = folder.join(name);
    if !candidate.exists() {
        return candidate;
    }

    let as_path = Path::new(name);
    let stem = as_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(name);
    let ext = as_path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e))
        .unwrap_or_default();

    let mut attempt = 1u32;
    loop {
        let suffix = if attempt == 1 {
            "_renamed".to_string()
        } else {
            format!("_renamed_{}", attempt)
        };
        let candidate = folder.join(format!("{}{}{}", stem, suffix, ext));
        if !candidate.exists() {
            return candidate;
        }
        attempt += 1;
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
