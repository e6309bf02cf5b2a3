//! Event type definitions for progress reporting.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All events emitted by the pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Pipeline lifecycle events
    Pipeline(PipelineEvent),
    /// Hashing phase events
    Hash(HashEvent),
    /// A free-form log line
    Log { line: String },
}

/// Pipeline lifecycle events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PipelineEvent {
    /// Pipeline has started
    Started { folder: PathBuf },
    /// Moved to a new phase
    PhaseChanged { phase: PipelinePhase },
    /// Pipeline completed successfully
    Completed { summary: PipelineSummary },
}

/// Phases of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelinePhase {
    Hashing,
    Grouping,
    Quarantining,
}

/// Summary of a completed pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSummary {
    pub total_photos: usize,
    pub hashed: usize,
    pub skipped: usize,
    pub groups: usize,
    pub grouped_photos: usize,
    pub files_moved: usize,
    pub duration_ms: u64,
}

/// Events during the hashing phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum HashEvent {
    /// Progress update during hashing
    Progress(HashProgress),
    /// A file could not be hashed and was left out
    Skipped { path: PathBuf, message: String },
    /// Hashing completed
    Completed { total_hashed: usize, skipped: usize },
}

/// Progress information during hashing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashProgress {
    /// Number of files processed so far
    pub completed: usize,
    /// Total number of files to process
    pub total: usize,
}

impl HashProgress {
    /// Completion as a percentage (100 for an empty batch)
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        self.completed as f64 / self.total as f64 * 100.0
    }
}
