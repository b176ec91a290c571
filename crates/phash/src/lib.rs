//! # Framesift Perceptual Hashing
//!
//! This crate provides the perceptual image fingerprint used as the first,
//! cheapest stage of duplicate detection. It takes an RGB frame and produces
//! a compact 64-bit signature that is robust to minor pixel changes
//! (re-encoding, mild noise, small brightness shifts) while remaining
//! sensitive to actual content changes.
//!
//! ## Contract
//!
//! - The hash is a pure function of the frame's pixel content and this
//!   crate's algorithm version. No I/O, no clocks, no global state.
//! - Two hashes are compared with [`PerceptualHash::distance`], a Hamming
//!   distance in `0..=64`; smaller means more visually similar.
//! - The hash is a *coarse* signal. It is intended as a cheap pre-filter in
//!   front of embedding comparison, never as the sole duplicate decision.
//!
//! Invariant: for the same pixel data, the hash is bit identical across
//! runs and platforms.
//!
//! ## Algorithm
//!
//! The classic DCT pHash: the frame is downscaled to a 32x32 luma plane, a
//! 2-D DCT-II is applied, the 8x8 low-frequency block is extracted, and
//! each coefficient is thresholded against the block median to yield one
//! bit. Low frequencies capture the coarse structure of the image, which is
//! what survives re-encoding and small edits.
//!
//! ## Example
//!
//! ```
//! use image::RgbImage;
//! use phash::PerceptualHash;
//!
//! let frame = RgbImage::from_fn(64, 64, |x, y| image::Rgb([(x * 4) as u8, (y * 4) as u8, 0]));
//! let a = PerceptualHash::compute(&frame);
//! let b = PerceptualHash::compute(&frame);
//! assert_eq!(a.distance(&b), 0);
//! ```

mod dct;
mod signature;

pub use crate::signature::PerceptualHash;

/// Current perceptual hash algorithm version for this crate.
///
/// This value must be bumped whenever the effective algorithm (downscale
/// filter, DCT layout, thresholding) changes in a way that can affect
/// produced hashes.
pub const PHASH_VERSION: u16 = 1;

/// Human-readable algorithm identifier.
pub const PHASH_ALGORITHM: &str = "dct64_v1";
