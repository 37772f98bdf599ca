//! Dense pairwise similarity matrix
//!
//! Built once from unit-length TF-IDF vectors; `M[i][j]` is their dot
//! product, i.e. cosine similarity. Rows are computed in parallel, but each
//! entry has a fixed summation order, so the matrix is identical across runs.

use crate::vector::SparseVector;
use rayon::prelude::*;

/// N×N symmetric similarity matrix stored row-major
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrix {
    n: usize,
    data: Vec<f32>,
}

impl SimilarityMatrix {
    /// Compute all pairwise similarities.
    ///
    /// The diagonal is exactly 1.0 for items with at least one weighted token
    /// and 0.0 for items without any; off-diagonal entries are clamped to [0, 1].
    pub fn build(vectors: &[SparseVector]) -> Self {
        let n = vectors.len();
        let mut data = vec![0.0f32; n * n];

        if n > 0 {
            data.par_chunks_mut(n).enumerate().for_each(|(i, row)| {
                let vi = &vectors[i];
                if vi.is_empty() {
                    return;
                }
                for (j, cell) in row.iter_mut().enumerate() {
                    *cell = if i == j {
                        1.0
                    } else {
                        vi.dot(&vectors[j]).clamp(0.0, 1.0)
                    };
                }
            });
        }

        Self { n, data }
    }

    /// Number of rows (and columns)
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.n
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    #[inline]
    pub fn row(&self, i: usize) -> Option<&[f32]> {
        if i < self.n {
            Some(&self.data[i * self.n..(i + 1) * self.n])
        } else {
            None
        }
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> Option<f32> {
        if i < self.n && j < self.n {
            Some(self.data[i * self.n + j])
        } else {
            None
        }
    }

    /// Raw row-major storage
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }
}
