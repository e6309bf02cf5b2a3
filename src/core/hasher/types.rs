//! Fingerprint value types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::AddAssign;
use std::path::PathBuf;
use std::time::Duration;

/// The two 64-bit hashes computed for one image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HashPair {
    /// Hash of the image as stored on disk
    pub normal: u64,
    /// Hash of the horizontally mirrored image
    pub flipped: u64,
}

impl HashPair {
    pub fn new(normal: u64, flipped: u64) -> Self {
        Self { normal, flipped }
    }
}

/// A computed fingerprint for one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageFingerprint {
    pub path: PathBuf,
    pub normal_hash: u64,
    pub flipped_hash: u64,
}

impl ImageFingerprint {
    pub fn new(path: PathBuf, hashes: HashPair) -> Self {
        Self {
            path,
            normal_hash: hashes.normal,
            flipped_hash: hashes.flipped,
        }
    }

    pub fn hashes(&self) -> HashPair {
        HashPair::new(self.normal_hash, self.flipped_hash)
    }
}

/// Fingerprints of one batch, keyed by file path.
///
/// Ordered by path so grouping walks it in a reproducible order.
pub type FingerprintMap = BTreeMap<PathBuf, HashPair>;

/// Wall-clock time spent in each hashing stage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageTimings {
    pub decode: Duration,
    pub resize: Duration,
    pub dct: Duration,
}

impl StageTimings {
    pub fn total(&self) -> Duration {
        self.decode + self.resize + self.dct
    }
}

impl AddAssign for StageTimings {
    fn add_assign(&mut self, other: Self) {
        self.decode += other.decode;
        self.resize += other.resize;
        self.dct += other.dct;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_round_trips_hash_pair() {
        let pair = HashPair::new(0xDEAD_BEEF, 0x1234);
        let fingerprint = ImageFingerprint::new(PathBuf::from("/a.jpg"), pair);

        assert_eq!(fingerprint.normal_hash, 0xDEAD_BEEF);
        assert_eq!(fingerprint.flipped_hash, 0x1234);
        assert_eq!(fingerprint.hashes(), pair);
    }

    #[test]
    fn timings_accumulate() {
        let mut total = StageTimings::default();
        total += StageTimings {
            decode: Duration::from_millis(5),
            resize: Duration::from_millis(2),
            dct: Duration::from_millis(1),
        };
        total += StageTimings {
            decode: Duration::from_millis(5),
            ..Default::default()
        };

        assert_eq!(total.decode, Duration::from_millis(10));
        assert_eq!(total.total(), Duration::from_millis(13));
    }
}
