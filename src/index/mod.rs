//! Flat L2 nearest-neighbor index
//!
//! Exhaustive search over a dense row-major vector table, plus a small
//! binary on-disk format. Distances are squared Euclidean; ordering is
//! identical to true L2 and no absolute distances leave this module.
//!
//! The index carries vectors only. Chunk metadata lives in a parallel JSON
//! artifact whose ordering must stay aligned with the vector ordering; the
//! two are always persisted and loaded together.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// File magic for the persisted index blob ("PCI1")
const INDEX_MAGIC: u32 = 0x50434931;

/// Header: magic u32 + dim u32 + count u32, little-endian
const HEADER_LEN: usize = 12;

/// Chunk metadata persisted alongside the index, order-aligned with it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMeta {
    pub page: u32,
    pub text: String,
}

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("corrupt index blob: {0}")]
    Corrupt(String),
}

/// In-memory flat index over fixed-dimension f32 vectors
#[derive(Debug, Clone)]
pub struct FlatL2Index {
    dim: usize,
    /// Row-major vector data, `len == dim * count`
    data: Vec<f32>,
}

impl FlatL2Index {
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            data: Vec::new(),
        }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of indexed vectors
    pub fn len(&self) -> usize {
        if self.dim == 0 {
            0
        } else {
            self.data.len() / self.dim
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn add(&mut self, vector: &[f32]) -> Result<(), IndexError> {
        if vector.len() != self.dim {
            return Err(IndexError::DimensionMismatch {
                expected: self.dim,
                actual: vector.len(),
            });
        }
        self.data.extend_from_slice(vector);
        Ok(())
    }

    pub fn add_all(&mut self, vectors: &[Vec<f32>]) -> Result<(), IndexError> {
        for vector in vectors {
            self.add(vector)?;
        }
        Ok(())
    }

    /// Return up to `k` nearest vectors as `(ordinal, squared_distance)`,
    /// ascending by distance. Fewer than `k` results when the index holds
    /// fewer vectors; ties break on the lower ordinal for determinism.
    pub fn search(&self, query: &[f32], k: usize) -> Vec<(usize, f32)> {
        if k == 0 || self.is_empty() || query.len() != self.dim {
            return Vec::new();
        }

        let mut scored: Vec<(usize, f32)> = self
            .data
            .chunks_exact(self.dim)
            .enumerate()
            .map(|(ordinal, row)| {
                let dist: f32 = row
                    .iter()
                    .zip(query.iter())
                    .map(|(a, b)| (a - b) * (a - b))
                    .sum();
                (ordinal, dist)
            })
            .collect();

        scored.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal).then(a.0.cmp(&b.0)));
        scored.truncate(k);
        scored
    }

    // ------------------------------------------------------------------
    // Serialization
    // ------------------------------------------------------------------

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buffer = Vec::with_capacity(HEADER_LEN + self.data.len() * 4);
        buffer.extend_from_slice(&INDEX_MAGIC.to_le_bytes());
        buffer.extend_from_slice(&(self.dim as u32).to_le_bytes());
        buffer.extend_from_slice(&(self.len() as u32).to_le_bytes());
        for &val in &self.data {
            buffer.extend_from_slice(&val.to_le_bytes());
        }
        buffer
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, IndexError> {
        if bytes.len() < HEADER_LEN {
            return Err(IndexError::Corrupt("file too short".to_string()));
        }

        let magic = u32::from_le_bytes(bytes[0..4].try_into().expect("sized slice"));
        if magic != INDEX_MAGIC {
            return Err(IndexError::Corrupt("invalid magic".to_string()));
        }
        let dim = u32::from_le_bytes(bytes[4..8].try_into().expect("sized slice")) as usize;
        let count = u32::from_le_bytes(bytes[8..12].try_into().expect("sized slice")) as usize;

        let expected = HEADER_LEN + dim * count * 4;
        if bytes.len() != expected {
            return Err(IndexError::Corrupt(format!(
                "expected {} bytes for {} vectors of dim {}, found {}",
                expected,
                count,
                dim,
                bytes.len()
            )));
        }

        let data = bytes[HEADER_LEN..]
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes(b.try_into().expect("sized slice")))
            .collect();

        Ok(Self { dim, data })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_index() -> FlatL2Index {
        let mut index = FlatL2Index::new(3);
        index
            .add_all(&[
                vec![0.0, 0.0, 0.0],
                vec![1.0, 0.0, 0.0],
                vec![0.0, 2.0, 0.0],
                vec![3.0, 3.0, 3.0],
            ])
            .unwrap();
        index
    }

    #[test]
    fn len_tracks_additions() {
        let index = sample_index();
        assert_eq!(index.len(), 4);
        assert_eq!(index.dim(), 3);
        assert!(FlatL2Index::new(3).is_empty());
    }

    #[test]
    fn rejects_wrong_dimension() {
        let mut index = FlatL2Index::new(3);
        let result = index.add(&[1.0, 2.0]);
        assert!(matches!(result, Err(IndexError::DimensionMismatch { expected: 3, actual: 2 })));
    }

    #[test]
    fn search_orders_by_ascending_distance() {
        let index = sample_index();
        let hits = index.search(&[0.9, 0.0, 0.0], 4);

        assert_eq!(hits.len(), 4);
        assert_eq!(hits[0].0, 1); // closest to (1,0,0)
        assert_eq!(hits[1].0, 0);
        for pair in hits.windows(2) {
            assert!(pair[0].1 <= pair[1].1);
        }
    }

    #[test]
    fn search_caps_at_index_size() {
        let index = sample_index();
        assert_eq!(index.search(&[0.0, 0.0, 0.0], 10).len(), 4);
        assert!(index.search(&[0.0, 0.0, 0.0], 0).is_empty());
        assert!(FlatL2Index::new(3).search(&[0.0, 0.0, 0.0], 5).is_empty());
    }

    #[test]
    fn exact_match_has_zero_distance() {
        let index = sample_index();
        let hits = index.search(&[0.0, 2.0, 0.0], 1);
        assert_eq!(hits[0].0, 2);
        assert_eq!(hits[0].1, 0.0);
    }

    #[test]
    fn bytes_round_trip() {
        let index = sample_index();
        let restored = FlatL2Index::from_bytes(&index.to_bytes()).unwrap();

        assert_eq!(restored.dim(), index.dim());
        assert_eq!(restored.len(), index.len());
        assert_eq!(restored.search(&[0.9, 0.0, 0.0], 4), index.search(&[0.9, 0.0, 0.0], 4));
    }

    #[test]
    fn rejects_corrupt_blobs() {
        assert!(matches!(FlatL2Index::from_bytes(b"xx"), Err(IndexError::Corrupt(_))));
        assert!(matches!(
            FlatL2Index::from_bytes(&[0u8; HEADER_LEN]),
            Err(IndexError::Corrupt(_))
        ));

        let mut truncated = sample_index().to_bytes();
        truncated.pop();
        assert!(matches!(FlatL2Index::from_bytes(&truncated), Err(IndexError::Corrupt(_))));
    }
}
