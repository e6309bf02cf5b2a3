//! Greedy pivot clustering.
//!
//! The first remaining image (in path order) becomes a pivot and pulls in
//! every remaining image whose normal or flipped hash is within the
//! threshold of the pivot's *normal* hash. Matches are never re-examined,
//! so this is not transitive: A~B and B~C with A≁C gives `{A, B}` and
//! leaves C on its own.

use super::{compare, MatchType};
use crate::core::hasher::{FingerprintMap, HashPair};
use crate::error::CompareError;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

/// A cluster of at least two similar images
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityGroup {
    /// Sequential id within one grouping run, starting at 1
    pub id: u32,
    /// Members in the order they were attracted; the pivot comes first
    pub members: Vec<PathBuf>,
    /// Class of the weakest match to the pivot
    pub match_type: MatchType,
}

impl SimilarityGroup {
    /// The image every other member was compared against
    pub fn pivot(&self) -> &Path {
        &self.members[0]
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Clusters fingerprints around pivots
#[derive(Debug, Clone, Copy)]
pub struct PivotGrouper {
    threshold: f64,
}

impl PivotGrouper {
    /// `threshold` must be within `[0.0, 1.0]`
    pub fn new(threshold: f64) -> Result<Self, CompareError> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(CompareError::InvalidThreshold { value: threshold });
        }
        Ok(Self { threshold })
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Similarity used to decide membership
    pub fn similarity(pivot: &HashPair, candidate: &HashPair) -> f64 {
        compare(pivot.normal, candidate.normal).max(compare(pivot.normal, candidate.flipped))
    }

    /// Partition `fingerprints` into disjoint groups. Singletons are dropped.
    pub fn group(&self, fingerprints: &FingerprintMap) -> Vec<SimilarityGroup> {
        let mut remaining: VecDeque<(&PathBuf, &HashPair)> = fingerprints.iter().collect();
        let mut groups = Vec::new();
        let mut next_id = 1u32;

        while let Some((pivot_path, pivot)) = remaining.pop_front() {
            let mut members = vec![pivot_path.clone()];
            let mut weakest = 1.0f64;

            remaining.retain(|&(path, hashes)| {
                let similarity = Self::similarity(pivot, hashes);
                if similarity >= self.threshold {
                    members.push(path.clone());
                    weakest = weakest.min(similarity);
                    false
                } else {
                    true
                }
            });

            if members.len() > 1 {
                tracing::debug!(
                    "Group {} around {} has {} members",
                    next_id,
                    pivot_path.display(),
                    members.len()
                );
                groups.push(SimilarityGroup {
                    id: next_id,
                    members,
                    match_type: MatchType::from_similarity(weakest),
                });
                next_id += 1;
            }
        }

        groups
    }
}

/// Validate `threshold` and group `fingerprints` with a [`PivotGrouper`]
pub fn group(
    fingerprints: &FingerprintMap,
    threshold: f64,
) -> Result<Vec<SimilarityGroup>, CompareError> {
    Ok(PivotGrouper::new(threshold)?.group(fingerprints))
}
