//! Pipeline execution implementation.

use crate::core::comparator::{PivotGrouper, SimilarityGroup};
use crate::core::hasher::{BatchConfig, BatchHasher, HasherConfig, SkippedFile, StageTimings};
use crate::core::quarantine::{MoveReport, QuarantineMover};
use crate::error::Result;
use crate::events::{
    null_sender, Event, EventSender, HashEvent, LogSink, PipelineEvent, PipelinePhase,
    PipelineSummary,
};
use std::path::PathBuf;
use std::time::Instant;

/// Similarity a candidate needs to join a pivot's group
pub const DEFAULT_THRESHOLD: f64 = 0.98;

/// Result of pipeline execution
#[derive(Debug)]
pub struct PipelineResult {
    /// Groups found, in pivot order
    pub groups: Vec<SimilarityGroup>,
    /// Candidate images found in the folder
    pub total_photos: usize,
    /// Images that were fingerprinted
    pub hashed: usize,
    /// Images that could not be fingerprinted
    pub skipped: Vec<SkippedFile>,
    /// What the quarantine step did (None on a dry run or when nothing matched)
    pub moved: Option<MoveReport>,
    /// Time spent per hashing stage
    pub timings: StageTimings,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl PipelineResult {
    /// Number of images that ended up in a group
    pub fn grouped_photos(&self) -> usize {
        self.groups.iter().map(SimilarityGroup::len).sum()
    }
}

/// Configuration for the pipeline
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Folder to scan (non-recursive)
    pub folder: PathBuf,
    /// Grouping threshold in `[0.0, 1.0]` (higher = stricter)
    pub threshold: f64,
    /// Hash parameters
    pub hasher: HasherConfig,
    /// Worker threads for hashing (None = cores - 2)
    pub workers: Option<usize>,
    /// Find groups without moving anything
    pub dry_run: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            folder: PathBuf::new(),
            threshold: DEFAULT_THRESHOLD,
            hasher: HasherConfig::default(),
            workers: None,
            dry_run: false,
        }
    }
}

/// Builder for pipeline configuration
pub struct PipelineBuilder {
    config: PipelineConfig,
}

impl PipelineBuilder {
    /// Create a new pipeline builder
    pub fn new() -> Self {
        Self {
            config: PipelineConfig::default(),
        }
    }

    /// Folder to deduplicate
    pub fn folder(mut self, folder: impl Into<PathBuf>) -> Self {
        self.config.folder = folder.into();
        self
    }

    /// Set the grouping threshold
    pub fn threshold(mut self, threshold: f64) -> Self {
        self.config.threshold = threshold;
        self
    }

    /// Set the hash parameters
    pub fn hasher(mut self, hasher: HasherConfig) -> Self {
        self.config.hasher = hasher;
        self
    }

    /// Override the number of hashing threads
    pub fn workers(mut self, workers: usize) -> Self {
        self.config.workers = Some(workers);
        self
    }

    /// Report groups without moving files
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.config.dry_run = dry_run;
        self
    }

    /// Build the pipeline
    pub fn build(self) -> Pipeline {
        Pipeline {
            config: self.config,
        }
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The duplicate quarantine pipeline
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a new pipeline builder
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the pipeline without events
    pub fn run(&self) -> Result<PipelineResult> {
        self.run_with_events(&null_sender())
    }

    /// Run the pipeline with event reporting
    pub fn run_with_events(&self, events: &EventSender) -> Result<PipelineResult> {
        let start_time = Instant::now();
        let folder = &self.config.folder;

        // Reject a bad threshold before spending time on hashing
        let grouper = PivotGrouper::new(self.config.threshold)?;
        let batch = BatchHasher::new(BatchConfig {
            hasher: self.config.hasher,
            workers: self.config.workers,
        })?;

        events.send(Event::Pipeline(PipelineEvent::Started {
            folder: folder.clone(),
        }));

        // Phase 1: Hashing
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Hashing,
        }));

        let outcome = batch.compute_with_stats(folder, events, events)?;

        for skipped in &outcome.skipped {
            events.send(Event::Hash(HashEvent::Skipped {
                path: skipped.path.clone(),
                message: skipped.reason.clone(),
            }));
        }
        events.send(Event::Hash(HashEvent::Completed {
            total_hashed: outcome.fingerprints.len(),
            skipped: outcome.skipped.len(),
        }));

        // Phase 2: Grouping
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Grouping,
        }));

        let groups = grouper.group(&outcome.fingerprints);
        tracing::info!(
            "Found {} groups at threshold {}",
            groups.len(),
            grouper.threshold()
        );
        events.log(&format!(
            "Found {} groups among {} images",
            groups.len(),
            outcome.fingerprints.len()
        ));

        // Phase 3: Quarantine
        let moved = if self.config.dry_run || groups.is_empty() {
            None
        } else {
            events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
                phase: PipelinePhase::Quarantining,
            }));
            Some(QuarantineMover::move_to_quarantine(folder, &groups, events)?)
        };

        let duration_ms = start_time.elapsed().as_millis() as u64;

        let result = PipelineResult {
            groups,
            total_photos: outcome.total_files,
            hashed: outcome.fingerprints.len(),
            skipped: outcome.skipped,
            moved,
            timings: outcome.timings,
            duration_ms,
        };

        events.send(Event::Pipeline(PipelineEvent::Completed {
            summary: PipelineSummary {
                total_photos: result.total_photos,
                hashed: result.hashed,
                skipped: result.skipped.len(),
                groups: result.groups.len(),
                grouped_photos: result.grouped_photos(),
                files_moved: result.moved.as_ref().map_or(0, |m| m.files_moved),
                duration_ms,
            },
        }));

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CompareError, PhotoQuarantineError};
    use crate::events::EventChannel;
    use tempfile::TempDir;

    #[test]
    fn pipeline_builder_creates_pipeline() {
        let pipeline = Pipeline::builder()
            .folder("/photos")
            .threshold(0.9)
            .workers(3)
            .dry_run(true)
            .build();

        assert_eq!(pipeline.config.folder, PathBuf::from("/photos"));
        assert_eq!(pipeline.config.threshold, 0.9);
        assert_eq!(pipeline.config.workers, Some(3));
        assert!(pipeline.config.dry_run);
    }

    #[test]
    fn default_threshold_is_strict() {
        assert_eq!(Pipeline::builder().build().config.threshold, DEFAULT_THRESHOLD);
    }

    #[test]
    fn pipeline_handles_empty_directory() {
        let temp_dir = TempDir::new().unwrap();

        let result = Pipeline::builder()
            .folder(temp_dir.path())
            .build()
            .run()
            .unwrap();

        assert_eq!(result.total_photos, 0);
        assert!(result.groups.is_empty());
        assert!(result.moved.is_none());
        assert!(!temp_dir.path().join("dupe").exists());
    }

    #[test]
    fn invalid_threshold_fails_before_hashing() {
        let temp_dir = TempDir::new().unwrap();

        let result = Pipeline::builder()
            .folder(temp_dir.path())
            .threshold(1.5)
            .build()
            .run();

        assert!(matches!(
            result,
            Err(PhotoQuarantineError::Compare(CompareError::InvalidThreshold { .. }))
        ));
    }

    #[test]
    fn missing_folder_is_an_error() {
        let result = Pipeline::builder()
            .folder("/nonexistent/photos/11223")
            .build()
            .run();

        assert!(matches!(result, Err(PhotoQuarantineError::Scan(_))));
    }

    #[test]
    fn emits_phases_in_order() {
        let temp_dir = TempDir::new().unwrap();
        let (sender, receiver) = EventChannel::new();

        Pipeline::builder()
            .folder(temp_dir.path())
            .build()
            .run_with_events(&sender)
            .unwrap();
        drop(sender);

        let phases: Vec<PipelinePhase> = receiver
            .iter()
            .filter_map(|event| match event {
                Event::Pipeline(PipelineEvent::PhaseChanged { phase }) => Some(phase),
                _ => None,
            })
            .collect();

        assert_eq!(phases, vec![PipelinePhase::Hashing, PipelinePhase::Grouping]);
    }
}
