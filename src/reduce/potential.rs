//! Constraint reduction: potential, gradient, Hessian, and shape-derivative,
//! each a sum of small per-pair local contributions scattered into the
//! global dof space.
//!
//! Every reduction below follows the same shape: a per-thread accumulator
//! (or, sequentially, a running fold) that each constraint only ever
//! contributes to, finished by one serial merge. No shared mutable
//! container is touched mid-loop.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::constraint::Constraint;
use crate::math::{DMatrix, DVector, Real};
use crate::mesh::CollisionMesh;
use crate::scatter::{scatter_local_triplets, scatter_local_vector};
use crate::sparse::{SparseMatrix, Triplet};

/// Sum of every constraint's local potential. Empty input is the identity
/// element, `0`.
pub fn compute_barrier_potential(mesh: &CollisionMesh, v: &DMatrix<Real>, constraints: &[Constraint], dhat: Real) -> Real {
    #[cfg(feature = "parallel")]
    {
        constraints.par_iter().map(|c| c.potential(mesh, v, dhat)).sum()
    }
    #[cfg(not(feature = "parallel"))]
    {
        constraints.iter().map(|c| c.potential(mesh, v, dhat)).sum()
    }
}

/// Dense global gradient, length `mesh.num_dofs()`. Empty input is the zero
/// vector.
pub fn compute_barrier_potential_gradient(
    mesh: &CollisionMesh,
    v: &DMatrix<Real>,
    constraints: &[Constraint],
    dhat: Real,
) -> DVector<Real> {
    let n = mesh.num_dofs();
    let dim = mesh.dim;

    let accumulate = |mut acc: DVector<Real>, c: &Constraint| -> DVector<Real> {
        let local = c.local_gradient(mesh, v, dhat);
        let indices = c.vertex_indices(mesh);
        scatter_local_vector(local.as_slice(), indices.as_slice(), dim, &mut acc);
        acc
    };

    #[cfg(feature = "parallel")]
    {
        constraints
            .par_iter()
            .fold(|| DVector::zeros(n), accumulate)
            .reduce(|| DVector::zeros(n), |a, b| a + b)
    }
    #[cfg(not(feature = "parallel"))]
    {
        constraints.iter().fold(DVector::zeros(n), accumulate)
    }
}

/// Global sparse Hessian, assembled from per-pair triplets: merging
/// concatenates buffers and constructs the sparse matrix once.
/// `project_to_psd` clamps each local block before scatter.
pub fn compute_barrier_potential_hessian(
    mesh: &CollisionMesh,
    v: &DMatrix<Real>,
    constraints: &[Constraint],
    dhat: Real,
    project_to_psd: bool,
) -> SparseMatrix {
    let n = mesh.num_dofs();
    let dim = mesh.dim;

    let accumulate = |mut acc: Vec<Triplet>, c: &Constraint| -> Vec<Triplet> {
        let local = c.local_hessian(mesh, v, dhat, project_to_psd);
        let indices = c.vertex_indices(mesh);
        scatter_local_triplets(&local, indices.as_slice(), dim, &mut acc);
        acc
    };

    let buffers: Vec<Vec<Triplet>> = {
        #[cfg(feature = "parallel")]
        {
            constraints.par_iter().fold(Vec::new, accumulate).collect()
        }
        #[cfg(not(feature = "parallel"))]
        {
            vec![constraints.iter().fold(Vec::new(), accumulate)]
        }
    };

    SparseMatrix::merge(n, n, buffers)
}

/// `H(V)` with `project_to_psd = false`, plus the rank-update term
/// `Σᵢ (Sᵢᵀ ∇φᵢ / wᵢ) · (∂wᵢ/∂V)ᵀ`.
pub fn compute_barrier_shape_derivative(
    mesh: &CollisionMesh,
    v: &DMatrix<Real>,
    constraints: &[Constraint],
    dhat: Real,
) -> SparseMatrix {
    let n = mesh.num_dofs();
    let dim = mesh.dim;

    let accumulate = |mut acc: Vec<Triplet>, c: &Constraint| -> Vec<Triplet> {
        let local = c.local_hessian(mesh, v, dhat, false);
        let indices = c.vertex_indices(mesh);
        scatter_local_triplets(&local, indices.as_slice(), dim, &mut acc);
        push_rank_update_triplets(c, mesh, v, dhat, &mut acc);
        acc
    };

    let buffers: Vec<Vec<Triplet>> = {
        #[cfg(feature = "parallel")]
        {
            constraints.par_iter().fold(Vec::new, accumulate).collect()
        }
        #[cfg(not(feature = "parallel"))]
        {
            vec![constraints.iter().fold(Vec::new(), accumulate)]
        }
    };

    SparseMatrix::merge(n, n, buffers)
}

fn push_rank_update_triplets(c: &Constraint, mesh: &CollisionMesh, v: &DMatrix<Real>, dhat: Real, out: &mut Vec<Triplet>) {
    debug_assert!(c.weight != 0.0);
    let dim = mesh.dim;
    let local_grad = c.local_gradient(mesh, v, dhat);
    let indices = c.vertex_indices(mesh);

    for (k, &vertex) in indices.iter().enumerate() {
        for j in 0..dim {
            let row = vertex * dim + j;
            let scaled = local_grad[k * dim + j] / c.weight;
            if scaled == 0.0 {
                continue;
            }
            for &(col, dw) in &c.weight_gradient.entries {
                if dw != 0.0 {
                    out.push(Triplet { row, col, value: scaled * dw });
                }
            }
        }
    }
}
