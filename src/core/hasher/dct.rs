//! DCT-based perceptual hash.
//!
//! 1. Run a separable 2-D DCT-II over the `N×N` luma matrix (rows, then columns)
//! 2. Keep the `K×K` block of low-frequency AC terms at rows/cols `1..=K`
//! 3. Set bit `i` when coefficient `i` (row-major) is above the block median
//!
//! The same steps on the row-mirrored matrix give the flipped hash, which
//! lets left-right mirrored copies match.
//!
//! Arithmetic is single precision throughout so hashes stay bit-compatible
//! with fingerprints recorded by earlier builds.

use super::resize::GrayMatrix;
use super::types::HashPair;
use std::f64::consts::PI;

/// Working buffers for one hash computation.
///
/// Allocate one per worker and pass it to [`DctHasher::hash_matrix_with`].
#[derive(Debug, Clone)]
pub struct DctScratch {
    input: Vec<f32>,
    temp: Vec<f32>,
    coefficients: Vec<f32>,
    block: Vec<f32>,
    sorted: Vec<f32>,
}

impl DctScratch {
    pub fn new(side: usize, block: usize) -> Self {
        let len = side * side;
        Self {
            input: vec![0.0; len],
            temp: vec![0.0; len],
            coefficients: vec![0.0; len],
            block: Vec::with_capacity(block * block),
            sorted: Vec::with_capacity(block * block),
        }
    }

    fn ensure(&mut self, side: usize) {
        let len = side * side;
        if self.input.len() != len {
            self.input.resize(len, 0.0);
            self.temp.resize(len, 0.0);
            self.coefficients.resize(len, 0.0);
        }
    }
}

/// Precomputed DCT tables for one matrix size. Immutable, so one instance
/// can be shared by every worker.
#[derive(Debug, Clone)]
pub struct DctHasher {
    side: usize,
    block: usize,
    /// `cos[k * side + i] = cos((2i + 1)kπ / 2N)`
    cos: Vec<f32>,
    alpha: Vec<f32>,
}

impl DctHasher {
    /// Build tables for an `side`×`side` input hashed over a `block`×`block`
    /// AC window. Callers validate sizes through `HasherConfig`.
    pub fn new(side: usize, block: usize) -> Self {
        let n = side as f64;

        let mut cos = vec![0.0f32; side * side];
        for k in 0..side {
            for i in 0..side {
                cos[k * side + i] = (((2 * i + 1) as f64 * k as f64 * PI) / (2.0 * n)).cos() as f32;
            }
        }

        let mut alpha = vec![(2.0 / n).sqrt() as f32; side];
        alpha[0] = (1.0 / n).sqrt() as f32;

        Self {
            side,
            block,
            cos,
            alpha,
        }
    }

    pub fn side(&self) -> usize {
        self.side
    }

    /// Hash a matrix and its mirror with freshly allocated buffers
    pub fn hash_matrix(&self, matrix: &GrayMatrix) -> HashPair {
        let mut scratch = DctScratch::new(self.side, self.block);
        self.hash_matrix_with(matrix, &mut scratch)
    }

    /// Hash a matrix and its mirror, reusing `scratch`
    pub fn hash_matrix_with(&self, matrix: &GrayMatrix, scratch: &mut DctScratch) -> HashPair {
        debug_assert_eq!(matrix.side(), self.side);

        let normal = self.hash_plane(matrix.pixels(), scratch);
        let flipped = self.hash_plane(matrix.mirrored().pixels(), scratch);
        HashPair::new(normal, flipped)
    }

    /// Full `N×N` coefficient grid, row-major (row = vertical frequency)
    pub fn coefficients(&self, matrix: &GrayMatrix) -> Vec<f32> {
        let mut scratch = DctScratch::new(self.side, self.block);
        self.transform(matrix.pixels(), &mut scratch);
        scratch.coefficients
    }

    fn hash_plane(&self, gray: &[u8], scratch: &mut DctScratch) -> u64 {
        self.transform(gray, scratch);

        let n = self.side;
        scratch.block.clear();
        for v in 1..=self.block {
            let row = &scratch.coefficients[v * n..(v + 1) * n];
            scratch.block.extend_from_slice(&row[1..=self.block]);
        }

        let median = median(&scratch.block, &mut scratch.sorted);

        let mut hash = 0u64;
        for (i, &c) in scratch.block.iter().enumerate() {
            if c > median {
                hash |= 1u64 << i;
            }
        }
        hash
    }

    fn transform(&self, gray: &[u8], scratch: &mut DctScratch) {
        let n = self.side;
        scratch.ensure(n);

        for (dst, &src) in scratch.input.iter_mut().zip(gray) {
            *dst = src as f32;
        }

        // Rows
        for y in 0..n {
            let row = &scratch.input[y * n..(y + 1) * n];
            for u in 0..n {
                let basis = &self.cos[u * n..(u + 1) * n];
                let mut sum = 0.0f32;
                for x in 0..n {
                    sum += row[x] * basis[x];
                }
                scratch.temp[y * n + u] = self.alpha[u] * sum;
            }
        }

        // Columns
        for u in 0..n {
            for v in 0..n {
                let basis = &self.cos[v * n..(v + 1) * n];
                let mut sum = 0.0f32;
                for y in 0..n {
                    sum += scratch.temp[y * n + u] * basis[y];
                }
                scratch.coefficients[v * n + u] = self.alpha[v] * sum;
            }
        }
    }
}

/// Median of `values`; the mean of the two middle values for an even count.
fn median(values: &[f32], sorted: &mut Vec<f32>) -> f32 {
    sorted.clear();
    sorted.extend_from_slice(values);
    sorted.sort_by(f32::total_cmp);

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) * 0.5
    } else {
        sorted[mid]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Deterministic pseudo-random matrix (LCG)
    fn noise_matrix(side: usize, seed: u32) -> GrayMatrix {
        let mut state = seed;
        let pixels = (0..side * side)
            .map(|_| {
                state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
                (state >> 24) as u8
            })
            .collect();
        GrayMatrix::from_pixels(side, pixels).unwrap()
    }

    fn cosine_matrix(side: usize, u0: usize, v0: usize) -> GrayMatrix {
        let n = side as f64;
        let mut pixels = Vec::with_capacity(side * side);
        for y in 0..side {
            for x in 0..side {
                let cx = ((2 * x + 1) as f64 * u0 as f64 * PI / (2.0 * n)).cos();
                let cy = ((2 * y + 1) as f64 * v0 as f64 * PI / (2.0 * n)).cos();
                pixels.push((128.0 + 100.0 * cx * cy).round() as u8);
            }
        }
        GrayMatrix::from_pixels(side, pixels).unwrap()
    }

    #[test]
    fn median_of_even_count_averages_middle_pair() {
        let mut sorted = Vec::new();
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0], &mut sorted), 2.5);
    }

    #[test]
    fn median_of_odd_count_is_middle_value() {
        let mut sorted = Vec::new();
        assert_eq!(median(&[5.0, 1.0, 3.0], &mut sorted), 3.0);
    }

    #[test]
    fn constant_image_energy_is_all_dc() {
        let hasher = DctHasher::new(32, 8);
        let matrix = GrayMatrix::from_pixels(32, vec![10; 32 * 32]).unwrap();

        let coefficients = hasher.coefficients(&matrix);

        // Orthonormal scaling: DC = N * value
        assert!((coefficients[0] - 320.0).abs() < 0.01);
        assert!(coefficients[1..].iter().all(|c| c.abs() < 0.01));
    }

    #[test]
    fn single_basis_function_lands_on_its_coefficient() {
        let hasher = DctHasher::new(32, 8);
        let matrix = cosine_matrix(32, 3, 5);

        let coefficients = hasher.coefficients(&matrix);

        let (peak, _) = coefficients
            .iter()
            .enumerate()
            .skip(1)
            .max_by(|a, b| a.1.abs().total_cmp(&b.1.abs()))
            .unwrap();
        assert_eq!(peak, 5 * 32 + 3);
    }

    #[test]
    fn hashing_is_deterministic() {
        let hasher = DctHasher::new(32, 8);
        let matrix = noise_matrix(32, 7);

        assert_eq!(hasher.hash_matrix(&matrix), hasher.hash_matrix(&matrix));
    }

    #[test]
    fn reused_scratch_matches_fresh_scratch() {
        let hasher = DctHasher::new(32, 8);
        let mut scratch = DctScratch::new(32, 8);

        let first = noise_matrix(32, 1);
        let second = noise_matrix(32, 2);

        hasher.hash_matrix_with(&first, &mut scratch);
        let reused = hasher.hash_matrix_with(&second, &mut scratch);

        assert_eq!(reused, hasher.hash_matrix(&second));
    }

    #[test]
    fn half_of_the_bits_are_set() {
        let hasher = DctHasher::new(32, 8);
        let hashes = hasher.hash_matrix(&noise_matrix(32, 42));

        assert_eq!(hashes.normal.count_ones(), 32);
        assert_eq!(hashes.flipped.count_ones(), 32);
    }

    #[test]
    fn mirrored_matrix_swaps_normal_and_flipped() {
        let hasher = DctHasher::new(32, 8);
        let matrix = noise_matrix(32, 99);

        let original = hasher.hash_matrix(&matrix);
        let mirrored = hasher.hash_matrix(&matrix.mirrored());

        assert_eq!(mirrored.normal, original.flipped);
        assert_eq!(mirrored.flipped, original.normal);
    }

    #[test]
    fn different_images_hash_differently() {
        let hasher = DctHasher::new(32, 8);

        let a = hasher.hash_matrix(&noise_matrix(32, 1));
        let b = hasher.hash_matrix(&noise_matrix(32, 2));

        assert!((a.normal ^ b.normal).count_ones() > 8);
    }

    #[test]
    fn smaller_block_uses_fewer_bits() {
        let hasher = DctHasher::new(16, 4);
        let hashes = hasher.hash_matrix(&noise_matrix(16, 5));

        assert_eq!(hashes.normal >> 16, 0);
        assert_eq!(hashes.normal.count_ones(), 8);
    }
}
