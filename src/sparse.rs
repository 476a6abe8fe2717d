//! A minimal COO/triplet sparse matrix.
//!
//! The Hessian reduction's per-thread scratch is a triplet buffer; merging
//! concatenates those buffers and constructs the sparse matrix once at the
//! end, avoiding mid-loop structural modifications to a shared container.
//! Entries accumulate as unsorted `(row, col, value)` triplets and are only
//! coalesced on request (`to_dense`, or a future CSR conversion a linear
//! solver would want), never during the reduction itself.

use crate::math::{DMatrix, Real};

#[cfg_attr(feature = "serde-serialize", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Triplet {
    pub row: usize,
    pub col: usize,
    pub value: Real,
}

/// A symmetric-or-not sparse matrix stored as an unreduced triplet list.
///
/// Duplicate `(row, col)` entries are additive, matching the local-to-global
/// scatter's "write/add at global row" semantics.
#[cfg_attr(feature = "serde-serialize", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug)]
pub struct SparseMatrix {
    pub nrows: usize,
    pub ncols: usize,
    pub triplets: Vec<Triplet>,
}

impl SparseMatrix {
    pub fn zeros(nrows: usize, ncols: usize) -> Self {
        Self {
            nrows,
            ncols,
            triplets: Vec::new(),
        }
    }

    pub fn push(&mut self, row: usize, col: usize, value: Real) {
        debug_assert!(row < self.nrows && col < self.ncols);
        self.triplets.push(Triplet { row, col, value });
    }

    pub fn extend(&mut self, other: impl IntoIterator<Item = Triplet>) {
        self.triplets.extend(other);
    }

    /// Concatenates per-thread triplet buffers into one matrix: the final
    /// serial pass after a parallel reduction. No summation happens here;
    /// duplicates are resolved lazily by consumers (e.g. `to_dense`).
    pub fn merge(nrows: usize, ncols: usize, buffers: Vec<Vec<Triplet>>) -> Self {
        let mut triplets = Vec::with_capacity(buffers.iter().map(Vec::len).sum());
        for buf in buffers {
            triplets.extend(buf);
        }
        Self {
            nrows,
            ncols,
            triplets,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.triplets.is_empty()
    }

    /// Materializes a dense matrix, summing duplicate entries. Intended for
    /// tests and for small local blocks; never called on the full global
    /// Hessian in a production solver, which would instead feed `triplets`
    /// to its own sparse factorization.
    pub fn to_dense(&self) -> DMatrix<Real> {
        let mut dense = DMatrix::zeros(self.nrows, self.ncols);
        for t in &self.triplets {
            dense[(t.row, t.col)] += t.value;
        }
        dense
    }
}
