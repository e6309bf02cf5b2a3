//! # Core Module
//!
//! The UI-agnostic duplicate quarantine engine.
//!
//! ## Modules
//! - `scanner` - Lists candidate images in a folder
//! - `hasher` - Computes DCT perceptual fingerprints in parallel
//! - `comparator` - Scores fingerprints and clusters them
//! - `quarantine` - Moves groups into `dupe`, prunes and renames
//! - `pipeline` - Orchestrates the full workflow

pub mod comparator;
pub mod hasher;
pub mod pipeline;
pub mod quarantine;
pub mod scanner;

// Re-export commonly used types
pub use comparator::{compare, MatchType, SimilarityGroup};
pub use hasher::{BatchHasher, FingerprintMap, HashPair, ImageFingerprint};
pub use quarantine::{QuarantineCurator, QuarantineMover};
pub use scanner::PhotoFile;
