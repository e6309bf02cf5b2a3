//! Parallel fingerprinting of a whole folder.
//!
//! Files are hashed on a dedicated rayon pool that leaves two cores free
//! for the host. A failure on one file is logged and the file is left out;
//! it never stops the batch.

use super::{HasherConfig, ImageFingerprint, ImageHasher, StageTimings};
use super::types::FingerprintMap;
use crate::core::scanner::FolderScanner;
use crate::error::{PhotoQuarantineError, Result};
use crate::events::{LogSink, ProgressSink};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Progress is reported every this many completed files (plus once at the end)
pub const PROGRESS_INTERVAL: usize = 5;

/// `max(1, available cores - 2)`
pub fn default_worker_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .saturating_sub(2)
        .max(1)
}

/// Configuration for a [`BatchHasher`]
#[derive(Debug, Clone, Default)]
pub struct BatchConfig {
    /// Hash parameters
    pub hasher: HasherConfig,
    /// Worker threads (None = `max(1, cores - 2)`)
    pub workers: Option<usize>,
}

/// A file that could not be fingerprinted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Everything a batch run produced
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Successfully hashed files
    pub fingerprints: FingerprintMap,
    /// Files that failed, with the reason
    pub skipped: Vec<SkippedFile>,
    /// Number of candidate files found
    pub total_files: usize,
    /// Time spent per stage, summed over all workers
    pub timings: StageTimings,
    /// Wall-clock duration of the batch
    pub duration: Duration,
}

/// Serializes throttled progress reports so they never go backwards
struct ProgressTracker<'a> {
    sink: &'a dyn ProgressSink,
    total: usize,
    done: AtomicUsize,
    last_reported: Mutex<usize>,
}

impl<'a> ProgressTracker<'a> {
    fn new(sink: &'a dyn ProgressSink, total: usize) -> Self {
        Self {
            sink,
            total,
            done: AtomicUsize::new(0),
            last_reported: Mutex::new(0),
        }
    }

    fn complete_one(&self) {
        let current = self.done.fetch_add(1, Ordering::SeqCst) + 1;
        if current % PROGRESS_INTERVAL != 0 && current != self.total {
            return;
        }

        let mut last = self
            .last_reported
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if current > *last {
            *last = current;
            self.sink.report(current, self.total);
        }
    }
}

/// Hashes every supported image in a folder in parallel
pub struct BatchHasher {
    hasher: ImageHasher,
    scanner: FolderScanner,
    pool: ThreadPool,
    workers: usize,
}

impl BatchHasher {
    pub fn new(config: BatchConfig) -> Result<Self> {
        let hasher = config.hasher.build()?;
        let workers = config.workers.unwrap_or_else(default_worker_count).max(1);
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("phash-worker-{}", i))
            .build()?;

        Ok(Self {
            hasher,
            scanner: FolderScanner::new(),
            pool,
            workers,
        })
    }

    /// Number of worker threads in the pool
    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn hasher(&self) -> &ImageHasher {
        &self.hasher
    }

    /// Fingerprint every supported image directly inside `folder`.
    ///
    /// Only a missing folder is an error; unreadable images are logged
    /// through `log` and left out of the map.
    pub fn compute_fingerprints(
        &self,
        folder: &Path,
        progress: &dyn ProgressSink,
        log: &dyn LogSink,
    ) -> Result<FingerprintMap> {
        self.compute_with_stats(folder, progress, log)
            .map(|outcome| outcome.fingerprints)
    }

    /// Like [`compute_fingerprints`](Self::compute_fingerprints), keeping the
    /// skipped files and stage timings.
    pub fn compute_with_stats(
        &self,
        folder: &Path,
        progress: &dyn ProgressSink,
        log: &dyn LogSink,
    ) -> Result<BatchOutcome> {
        let files: Vec<PathBuf> = self
            .scanner
            .scan(folder)
            .map_err(PhotoQuarantineError::from)?
            .into_iter()
            .map(|photo| photo.path)
            .collect();

        log.log(&format!(
            "Hashing {} images in {} with {} workers",
            files.len(),
            folder.display(),
            self.workers
        ));

        Ok(self.hash_files(&files, progress, log))
    }

    /// Fingerprint an explicit list of files.
    pub fn hash_files(
        &self,
        files: &[PathBuf],
        progress: &dyn ProgressSink,
        log: &dyn LogSink,
    ) -> BatchOutcome {
        let started = Instant::now();
        let total = files.len();

        if total == 0 {
            progress.report(0, 0);
            return BatchOutcome::default();
        }

        let tracker = ProgressTracker::new(progress, total);

        let results: Vec<std::result::Result<(ImageFingerprint, StageTimings), SkippedFile>> =
            self.pool.install(|| {
                files
                    .par_iter()
                    .map_init(
                        || self.hasher.workspace(),
                        |workspace, path| {
                            let result = self.hash_one(path, workspace, log);
                            tracker.complete_one();
                            result
                        },
                    )
                    .collect()
            });

        let mut outcome = BatchOutcome {
            total_files: total,
            ..Default::default()
        };

        for result in results {
            match result {
                Ok((fingerprint, timings)) => {
                    outcome.timings += timings;
                    outcome
                        .fingerprints
                        .insert(fingerprint.path.clone(), fingerprint.hashes());
                }
                Err(skipped) => outcome.skipped.push(skipped),
            }
        }

        outcome.duration = started.elapsed();

        log.log(&format!(
            "Hashed {} of {} images ({} skipped) in {:.2}s; decode {} ms, resize {} ms, dct {} ms",
            outcome.fingerprints.len(),
            total,
            outcome.skipped.len(),
            outcome.duration.as_secs_f64(),
            outcome.timings.decode.as_millis(),
            outcome.timings.resize.as_millis(),
            outcome.timings.dct.as_millis(),
        ));

        outcome
    }

    fn hash_one(
        &self,
        path: &Path,
        workspace: &mut super::HashWorkspace,
        log: &dyn LogSink,
    ) -> std::result::Result<(ImageFingerprint, StageTimings), SkippedFile> {
        let attempt = panic::catch_unwind(AssertUnwindSafe(|| {
            self.hasher.hash_file_timed(path, workspace)
        }));

        let reason = match attempt {
            Ok(Ok(result)) => {
                tracing::debug!("Hashed {}", path.display());
                return Ok(result);
            }
            Ok(Err(e)) => e.to_string(),
            Err(payload) => {
                // The workspace may be half-written after a panic
                *workspace = self.hasher.workspace();
                let message = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                format!("decoder panicked on {}: {}", path.display(), message)
            }
        };

        tracing::warn!("Skipping {}: {}", path.display(), reason);
        log.log(&format!("Skipped {}: {}", path.display(), reason));

        Err(SkippedFile {
            path: path.to_path_buf(),
            reason,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::NullSink;
    use image::{DynamicImage, ImageBuffer, Rgb};
    use std::fs;
    use tempfile::TempDir;

    fn write_noise_png(path: &Path, seed: u32) {
        let mut state = seed;
        let image = ImageBuffer::from_fn(48, 48, |_, _| {
            state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            let v = (state >> 24) as u8;
            Rgb([v, v.wrapping_mul(3), v.wrapping_add(40)])
        });
        DynamicImage::ImageRgb8(image).save(path).unwrap();
    }

    fn batch(workers: usize) -> BatchHasher {
        BatchHasher::new(BatchConfig {
            workers: Some(workers),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn default_worker_count_is_at_least_one() {
        assert!(default_worker_count() >= 1);
    }

    #[test]
    fn zero_workers_is_clamped_to_one() {
        assert_eq!(batch(0).workers(), 1);
    }

    #[test]
    fn empty_folder_reports_once_and_returns_empty_map() {
        let temp_dir = TempDir::new().unwrap();
        let reports = Mutex::new(Vec::new());
        let progress = |done: usize, total: usize| reports.lock().unwrap().push((done, total));

        let map = batch(2)
            .compute_fingerprints(temp_dir.path(), &progress, &NullSink)
            .unwrap();

        assert!(map.is_empty());
        assert_eq!(*reports.lock().unwrap(), vec![(0, 0)]);
    }

    #[test]
    fn progress_is_throttled_monotonic_and_final_once() {
        let temp_dir = TempDir::new().unwrap();
        for i in 0..12 {
            write_noise_png(&temp_dir.path().join(format!("img{:02}.png", i)), i);
        }

        let reports = Mutex::new(Vec::new());
        let progress = |done: usize, total: usize| reports.lock().unwrap().push((done, total));

        batch(4)
            .compute_fingerprints(temp_dir.path(), &progress, &NullSink)
            .unwrap();

        let reports = reports.into_inner().unwrap();
        assert!(reports.windows(2).all(|w| w[0].0 < w[1].0));
        assert!(reports.iter().all(|&(done, total)| total == 12
            && (done % PROGRESS_INTERVAL == 0 || done == 12)));
        assert_eq!(reports.iter().filter(|&&(done, _)| done == 12).count(), 1);
        assert_eq!(reports.last(), Some(&(12, 12)));
    }

    #[test]
    fn corrupt_files_are_logged_and_skipped() {
        let temp_dir = TempDir::new().unwrap();
        write_noise_png(&temp_dir.path().join("good.png"), 1);
        fs::write(temp_dir.path().join("bad.jpg"), b"not an image").unwrap();

        let lines = Mutex::new(Vec::new());
        let log = |line: &str| lines.lock().unwrap().push(line.to_string());

        let outcome = batch(2)
            .compute_with_stats(temp_dir.path(), &NullSink, &log)
            .unwrap();

        assert_eq!(outcome.total_files, 2);
        assert_eq!(outcome.fingerprints.len(), 1);
        assert!(outcome.fingerprints.contains_key(&temp_dir.path().join("good.png")));
        assert_eq!(outcome.skipped.len(), 1);
        assert!(outcome.skipped[0].path.ends_with("bad.jpg"));
        assert!(lines
            .lock()
            .unwrap()
            .iter()
            .any(|line| line.contains("bad.jpg")));
    }

    #[test]
    fn results_do_not_depend_on_worker_count() {
        let temp_dir = TempDir::new().unwrap();
        for i in 0..6 {
            write_noise_png(&temp_dir.path().join(format!("img{}.png", i)), i * 17);
        }

        let single = batch(1)
            .compute_fingerprints(temp_dir.path(), &NullSink, &NullSink)
            .unwrap();
        let parallel = batch(4)
            .compute_fingerprints(temp_dir.path(), &NullSink, &NullSink)
            .unwrap();

        assert_eq!(single, parallel);
    }

    #[test]
    fn missing_folder_is_an_error() {
        let result = batch(1).compute_fingerprints(
            Path::new("/nonexistent/folder/98765"),
            &NullSink,
            &NullSink,
        );
        assert!(result.is_err());
    }
}
