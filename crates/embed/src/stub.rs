//! Deterministic offline embedder.

use fxhash::hash64;
use image::RgbImage;

use crate::normalize::l2_normalize_in_place;
use crate::{EmbedConfig, EmbedError, EmbeddingModel};

/// Deterministic stub embedder used by tests and model-free deployments.
///
/// The input is hashed and the seed expanded into a reproducible
/// pseudo-random unit vector. Distinct inputs land on near-orthogonal
/// directions (rescaled similarity around 0.5), identical inputs on the
/// exact same vector: the spread a real CLIP model gives the duplicate
/// detector's thresholds, with zero model cost.
pub struct StubEmbedder {
    dim: usize,
    normalize: bool,
}

impl StubEmbedder {
    pub fn new(cfg: &EmbedConfig) -> Self {
        Self {
            dim: cfg.dim,
            normalize: cfg.normalize,
        }
    }

    /// Convenience constructor for tests and demos.
    pub fn with_dim(dim: usize) -> Self {
        Self {
            dim,
            normalize: true,
        }
    }

    fn vector_from_seed(&self, seed: u64) -> Vec<f32> {
        // xorshift64* stream; the multiplier decorrelates nearby seeds.
        let mut state = seed.wrapping_mul(0x9E37_79B9_7F4A_7C15) | 1;
        let mut v = Vec::with_capacity(self.dim);
        for _ in 0..self.dim {
            state ^= state >> 12;
            state ^= state << 25;
            state ^= state >> 27;
            let bits = state.wrapping_mul(0x2545_F491_4F6C_DD1D);
            // Top 24 bits mapped onto [-1, 1).
            v.push(((bits >> 40) as f32 / 8_388_608.0) - 1.0);
        }
        if self.normalize {
            l2_normalize_in_place(&mut v);
        }
        v
    }
}

impl EmbeddingModel for StubEmbedder {
    fn dim(&self) -> usize {
        self.dim
    }

    fn embed_image(&self, frame: &RgbImage) -> Result<Vec<f32>, EmbedError> {
        let mut seed = hash64(frame.as_raw());
        seed ^= (u64::from(frame.width()) << 32) | u64::from(frame.height());
        Ok(self.vector_from_seed(seed))
    }

    fn embed_text(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        Ok(self.vector_from_seed(hash64(text.as_bytes())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn dot(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }

    #[test]
    fn same_text_same_vector() {
        let embedder = StubEmbedder::with_dim(128);
        let a = embedder.embed_text("a cat on a sofa").unwrap();
        let b = embedder.embed_text("a cat on a sofa").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn same_frame_same_vector() {
        let embedder = StubEmbedder::with_dim(128);
        let frame = RgbImage::from_pixel(16, 16, Rgb([200, 10, 10]));
        assert_eq!(
            embedder.embed_image(&frame).unwrap(),
            embedder.embed_image(&frame).unwrap()
        );
    }

    #[test]
    fn vectors_are_unit_norm() {
        let embedder = StubEmbedder::with_dim(768);
        let v = embedder.embed_text("normalize me").unwrap();
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-4, "norm {norm}");
    }

    #[test]
    fn distinct_inputs_are_nearly_orthogonal() {
        let embedder = StubEmbedder::with_dim(256);
        let a = embedder.embed_text("sunset over the ocean").unwrap();
        let b = embedder.embed_text("city traffic at night").unwrap();
        // Random unit vectors in dim 256: |dot| concentrates near 0.
        assert!(dot(&a, &b).abs() < 0.4, "dot {}", dot(&a, &b));
    }

    #[test]
    fn distinct_frames_are_nearly_orthogonal() {
        let embedder = StubEmbedder::with_dim(256);
        let red = RgbImage::from_pixel(8, 8, Rgb([255, 0, 0]));
        let blue = RgbImage::from_pixel(8, 8, Rgb([0, 0, 255]));
        let a = embedder.embed_image(&red).unwrap();
        let b = embedder.embed_image(&blue).unwrap();
        assert!(dot(&a, &b).abs() < 0.4);
    }

    #[test]
    fn respects_configured_dimension() {
        let embedder = StubEmbedder::with_dim(37);
        assert_eq!(embedder.dim(), 37);
        assert_eq!(embedder.embed_text("x").unwrap().len(), 37);
    }
}
