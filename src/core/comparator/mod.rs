//! # Comparator Module
//!
//! Scores fingerprint pairs and clusters similar images.
//!
//! ## How It Works
//! 1. Similarity is `1 - hamming(a, b) / 64`
//! 2. A pivot attracts every remaining image whose normal or flipped hash
//!    is close enough to the pivot's normal hash
//! 3. Pivots that attract nothing are dropped
//!
//! ## Distance Classes
//! | Distance | Classification |
//! |----------|---------------|
//! | 0        | Exact match   |
//! | 1-4      | Near-exact    |
//! | 5-10     | Similar       |
//! | 11+      | Maybe similar |

mod grouper;

pub use grouper::{group, PivotGrouper, SimilarityGroup};

use serde::{Deserialize, Serialize};

/// Number of bits in a fingerprint
pub const HASH_BITS: u32 = 64;

/// Number of differing bits between two hashes
pub fn hamming_distance(a: u64, b: u64) -> u32 {
    (a ^ b).count_ones()
}

/// Similarity of two hashes in `[0.0, 1.0]`; `1.0` only when they are equal
pub fn compare(a: u64, b: u64) -> f64 {
    1.0 - hamming_distance(a, b) as f64 / HASH_BITS as f64
}

/// Classification of match types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchType {
    /// Distance = 0, identical perceptual content
    Exact,
    /// Distance 1-4, virtually identical
    NearExact,
    /// Distance 5-10, likely duplicates
    Similar,
    /// Distance 11+, possibly related
    MaybeSimilar,
}

impl MatchType {
    /// Classify based on Hamming distance
    pub fn from_distance(distance: u32) -> Self {
        match distance {
            0 => MatchType::Exact,
            1..=4 => MatchType::NearExact,
            5..=10 => MatchType::Similar,
            _ => MatchType::MaybeSimilar,
        }
    }

    /// Classify a similarity score from [`compare`]
    pub fn from_similarity(similarity: f64) -> Self {
        let distance = ((1.0 - similarity) * HASH_BITS as f64).round().max(0.0) as u32;
        Self::from_distance(distance)
    }
}

impl std::fmt::Display for MatchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchType::Exact => write!(f, "Exact Match"),
            MatchType::NearExact => write!(f, "Near-Exact Match"),
            MatchType::Similar => write!(f, "Similar"),
            MatchType::MaybeSimilar => write!(f, "Possibly Similar"),
        }
    }
}
