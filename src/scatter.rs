//! Local-to-global scatter.
//!
//! Maps a per-pair local vector/matrix (2-4 vertices, each with `dim`
//! components) into the global `n * dim` dof space. This is pure index
//! arithmetic; it never allocates the global container itself.

use crate::math::{DVector, Real};
use crate::sparse::Triplet;

/// Adds `local[k * dim + j]` into `global[vertex_indices[k] * dim + j]` for
/// every local row. `local.len()` must equal `vertex_indices.len() * dim`.
pub fn scatter_local_vector(local: &[Real], vertex_indices: &[usize], dim: usize, global: &mut DVector<Real>) {
    debug_assert_eq!(local.len(), vertex_indices.len() * dim);
    for (k, &global_vertex) in vertex_indices.iter().enumerate() {
        for j in 0..dim {
            global[global_vertex * dim + j] += local[k * dim + j];
        }
    }
}

/// Maps a dense local Hessian (`ℓ·dim` square) into global triplets, applying
/// the same `k·dim + j -> iₖ·dim + j` mapping symmetrically to rows and
/// columns.
pub fn scatter_local_triplets(
    local: &nalgebra::DMatrix<Real>,
    vertex_indices: &[usize],
    dim: usize,
    out: &mut Vec<Triplet>,
) {
    let local_dofs = vertex_indices.len() * dim;
    debug_assert_eq!(local.nrows(), local_dofs);
    debug_assert_eq!(local.ncols(), local_dofs);

    let global_row = |local_row: usize| -> usize {
        let k = local_row / dim;
        let j = local_row % dim;
        vertex_indices[k] * dim + j
    };

    for local_row in 0..local_dofs {
        for local_col in 0..local_dofs {
            let value = local[(local_row, local_col)];
            if value != 0.0 {
                out.push(Triplet {
                    row: global_row(local_row),
                    col: global_row(local_col),
                    value,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::DMatrix;

    #[test]
    fn vector_scatter_adds_into_correct_global_rows() {
        let mut global = DVector::zeros(9); // 3 vertices * dim 3
        let local = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        scatter_local_vector(&local, &[2, 0], 3, &mut global);
        assert_eq!(global[6], 1.0);
        assert_eq!(global[7], 2.0);
        assert_eq!(global[8], 3.0);
        assert_eq!(global[0], 4.0);
        assert_eq!(global[1], 5.0);
        assert_eq!(global[2], 6.0);
    }

    #[test]
    fn vector_scatter_accumulates_on_repeated_vertex() {
        let mut global = DVector::zeros(3);
        scatter_local_vector(&[1.0, 0.0, 0.0], &[0], 3, &mut global);
        scatter_local_vector(&[1.0, 0.0, 0.0], &[0], 3, &mut global);
        assert_eq!(global[0], 2.0);
    }

    #[test]
    fn triplet_scatter_maps_rows_and_columns() {
        let local = DMatrix::<Real>::identity(4, 4); // 2 vertices, dim 2
        let mut out = Vec::new();
        scatter_local_triplets(&local, &[3, 1], 2, &mut out);
        assert_eq!(out.len(), 4); // only the diagonal entries are nonzero
        assert!(out.iter().any(|t| t.row == 6 && t.col == 6 && t.value == 1.0));
        assert!(out.iter().any(|t| t.row == 2 && t.col == 2 && t.value == 1.0));
    }
}
