//! # Pipeline Module
//!
//! Orchestrates the full duplicate quarantine workflow.
//!
//! ## Pipeline Stages
//! 1. **Hash** - Fingerprint every image directly inside the folder
//! 2. **Group** - Cluster fingerprints around pivots
//! 3. **Quarantine** - Move each group into `dupe` (skipped on a dry run)
//!
//! ## Parallelism
//! Only hashing is parallel (rayon). Grouping and moving run afterwards on
//! the calling thread, so concurrent runs never race on the `dupe` index.

mod executor;

pub use executor::{Pipeline, PipelineBuilder, PipelineConfig, PipelineResult, DEFAULT_THRESHOLD};
