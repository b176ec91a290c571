//! On-disk encoding of the vector artifact.
//!
//! The artifact is a schema-versioned record serialized with bincode and
//! compressed with zstd. Dense f32 vectors compress poorly compared to
//! text, but the frame records that share the directory do, and one codec
//! for the binary artifact keeps the layout uniform and self-describing.

use std::fs;
use std::path::Path;

use bincode::config::standard;
use bincode::serde::{decode_from_slice, encode_to_vec};
use serde::{Deserialize, Serialize};
use zstd::{decode_all, encode_all};

use crate::StoreError;

/// Zstd level for the vector artifact; 0 selects the codec default.
const COMPRESSION_LEVEL: i32 = 0;

/// Serialized form of the vector side of the store.
#[derive(Serialize, Deserialize)]
pub(crate) struct StoredVectors {
    /// Schema version for compatibility checks when loading.
    pub schema_version: u16,
    /// Embedding dimension every vector must have.
    pub dim: usize,
    /// All stored vectors, in insertion order.
    pub vectors: Vec<Vec<f32>>,
}

impl StoredVectors {
    pub(crate) fn write(&self, path: &Path) -> Result<(), StoreError> {
        let encoded =
            encode_to_vec(self, standard()).map_err(|e| StoreError::Encode(e.to_string()))?;
        let compressed = encode_all(encoded.as_slice(), COMPRESSION_LEVEL)
            .map_err(|e| StoreError::Encode(e.to_string()))?;
        fs::write(path, compressed)?;
        Ok(())
    }

    pub(crate) fn read(path: &Path) -> Result<Self, StoreError> {
        let compressed = fs::read(path)?;
        let encoded =
            decode_all(compressed.as_slice()).map_err(|e| StoreError::Decode(e.to_string()))?;
        let (stored, _): (StoredVectors, usize) = decode_from_slice(&encoded, standard())
            .map_err(|e| StoreError::Decode(e.to_string()))?;
        if stored.schema_version != crate::STORE_SCHEMA_VERSION {
            return Err(StoreError::Decode(format!(
                "unsupported schema version {}",
                stored.schema_version
            )));
        }
        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn write_read_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vectors.bin");

        let stored = StoredVectors {
            schema_version: crate::STORE_SCHEMA_VERSION,
            dim: 3,
            vectors: vec![vec![1.0, 0.0, 0.0], vec![0.0, 0.5, 0.5]],
        };
        stored.write(&path).unwrap();

        let loaded = StoredVectors::read(&path).unwrap();
        assert_eq!(loaded.dim, 3);
        assert_eq!(loaded.vectors, stored.vectors);
    }

    #[test]
    fn unknown_schema_version_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vectors.bin");

        let stored = StoredVectors {
            schema_version: 99,
            dim: 2,
            vectors: vec![],
        };
        stored.write(&path).unwrap();

        assert!(matches!(
            StoredVectors::read(&path),
            Err(StoreError::Decode(_))
        ));
    }
}
