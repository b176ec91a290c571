//! The 64-bit perceptual signature and its distance function.

use image::imageops::FilterType;
use image::RgbImage;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::dct::{dct_2d, PLANE_SIZE};

/// Side length of the low-frequency DCT block; the hash has
/// `HASH_SIZE * HASH_SIZE` = 64 bits.
const HASH_SIZE: usize = 8;

/// Compact 64-bit perceptual fingerprint of a frame.
///
/// Produced by [`PerceptualHash::compute`]; compared with
/// [`PerceptualHash::distance`]. The bit layout is row-major over the 8x8
/// low-frequency DCT block, bit set when the coefficient exceeds the block
/// median.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PerceptualHash(u64);

impl PerceptualHash {
    /// Compute the perceptual hash of an RGB frame.
    ///
    /// Deterministic: the same pixel data always yields the same hash.
    pub fn compute(frame: &RgbImage) -> Self {
        let small = image::imageops::resize(
            frame,
            PLANE_SIZE as u32,
            PLANE_SIZE as u32,
            FilterType::Lanczos3,
        );

        // ITU-R 601-2 luma transform, matching common "convert to L" behavior.
        let mut plane = Vec::with_capacity(PLANE_SIZE * PLANE_SIZE);
        for pixel in small.pixels() {
            let [r, g, b] = pixel.0;
            plane.push(0.299 * f64::from(r) + 0.587 * f64::from(g) + 0.114 * f64::from(b));
        }

        let coeffs = dct_2d(&plane);

        // Low-frequency block, row-major.
        let mut block = [0.0f64; HASH_SIZE * HASH_SIZE];
        for y in 0..HASH_SIZE {
            for x in 0..HASH_SIZE {
                block[y * HASH_SIZE + x] = coeffs[y * PLANE_SIZE + x];
            }
        }

        let median = median_of(&block);

        let mut bits = 0u64;
        for (idx, coeff) in block.iter().enumerate() {
            if *coeff > median {
                bits |= 1u64 << idx;
            }
        }

        PerceptualHash(bits)
    }

    /// Reconstruct a hash from its raw 64-bit representation.
    pub const fn from_bits(bits: u64) -> Self {
        PerceptualHash(bits)
    }

    /// Raw 64-bit representation of the hash.
    pub const fn bits(&self) -> u64 {
        self.0
    }

    /// Hamming distance to another hash: the number of differing bits,
    /// in `0..=64`. Symmetric; smaller means more visually similar.
    pub const fn distance(&self, other: &PerceptualHash) -> u32 {
        (self.0 ^ other.0).count_ones()
    }
}

impl fmt::Display for PerceptualHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Median of a 64-element block (mean of the two middle order statistics).
fn median_of(block: &[f64; HASH_SIZE * HASH_SIZE]) -> f64 {
    let mut sorted = *block;
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    (sorted[mid - 1] + sorted[mid]) / 2.0
}
