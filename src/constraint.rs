//! Constraints: a [`Candidate`] augmented with a quadrature weight and its
//! gradient.

use arrayvec::ArrayVec;
use nalgebra::{DMatrix, DVector};

use crate::barrier::{barrier_first_derivative, barrier_second_derivative, barrier_value};
use crate::candidate::Candidate;
use crate::distance::{squared_distance, squared_distance_gradient, squared_distance_hessian, PairKind};
use crate::math::{Point3, Real};
use crate::mesh::CollisionMesh;
use crate::psd::project_to_psd;

/// A sparse vector of length `n * dim`, used for `weight_gradient`
/// (∂weight/∂V) and as the output of the shape-derivative reduction.
#[cfg_attr(feature = "serde-serialize", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SparseVector {
    pub len: usize,
    pub entries: Vec<(usize, Real)>,
}

impl SparseVector {
    pub fn zeros(len: usize) -> Self {
        Self { len, entries: Vec::new() }
    }

    pub fn to_dense(&self) -> DVector<Real> {
        let mut dense = DVector::zeros(self.len);
        for &(i, v) in &self.entries {
            dense[i] += v;
        }
        dense
    }
}

/// A [`Candidate`] plus a quadrature weight and its gradient with respect
/// to `V`.
#[cfg_attr(feature = "serde-serialize", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug)]
pub struct Constraint {
    pub candidate: Candidate,
    /// Quadrature weight; asserted non-zero wherever the shape derivative
    /// divides by it.
    pub weight: Real,
    pub weight_gradient: SparseVector,
}

impl Constraint {
    pub fn new(candidate: Candidate, weight: Real, num_dofs: usize) -> Self {
        debug_assert!(weight != 0.0, "constraint weight must be non-zero");
        Self {
            candidate,
            weight,
            weight_gradient: SparseVector::zeros(num_dofs),
        }
    }

    pub fn with_weight_gradient(mut self, weight_gradient: SparseVector) -> Self {
        self.weight_gradient = weight_gradient;
        self
    }

    pub fn pair_kind(&self) -> PairKind {
        self.candidate.pair_kind()
    }

    /// The ordered *surface-dof* vertex indices this constraint spans,
    /// already passed through [`CollisionMesh::surface_index`] so callers
    /// can feed them straight into the local-to-global scatter without
    /// re-mapping.
    pub fn vertex_indices(&self, mesh: &CollisionMesh) -> ArrayVec<usize, 4> {
        self.candidate
            .vertex_indices(&mesh.edges, &mesh.faces)
            .iter()
            .map(|&i| mesh.surface_index(i))
            .collect()
    }

    fn gather_points(&self, mesh: &CollisionMesh, v: &DMatrix<Real>) -> ArrayVec<Point3<Real>, 4> {
        self.candidate.gather_points(mesh, v)
    }

    /// Squared distance at configuration `v`; the units contract is
    /// documented on [`crate::compute_minimum_distance`].
    pub fn squared_distance(&self, mesh: &CollisionMesh, v: &DMatrix<Real>) -> Real {
        squared_distance(self.pair_kind(), &self.gather_points(mesh, v))
    }

    /// Local potential value φᵢ(V) = weight · b(d², d̂).
    pub fn potential(&self, mesh: &CollisionMesh, v: &DMatrix<Real>, dhat: Real) -> Real {
        self.weight * barrier_value(self.squared_distance(mesh, v), dhat)
    }

    /// Local gradient ∇φᵢ(V), length `vertex_indices().len() * dim`.
    pub fn local_gradient(&self, mesh: &CollisionMesh, v: &DMatrix<Real>, dhat: Real) -> DVector<Real> {
        let points = self.gather_points(mesh, v);
        let kind = self.pair_kind();
        let d_sq = squared_distance(kind, &points);
        let d_grad = squared_distance_gradient(kind, &points, mesh.dim);
        d_grad * (self.weight * barrier_first_derivative(d_sq, dhat))
    }

    /// Local Hessian Hᵢ(V), square of the same order as
    /// [`Constraint::local_gradient`], optionally projected to the PSD cone.
    pub fn local_hessian(
        &self,
        mesh: &CollisionMesh,
        v: &DMatrix<Real>,
        dhat: Real,
        project_to_psd_flag: bool,
    ) -> DMatrix<Real> {
        let points = self.gather_points(mesh, v);
        let kind = self.pair_kind();
        let d_sq = squared_distance(kind, &points);
        let d_grad = squared_distance_gradient(kind, &points, mesh.dim);
        let d_hess = squared_distance_hessian(kind, &points, mesh.dim);

        let b1 = barrier_first_derivative(d_sq, dhat);
        let b2 = barrier_second_derivative(d_sq, dhat);

        // H(phi) = weight * (b'' * grad(d) grad(d)^T + b' * H(d))
        let outer = &d_grad * d_grad.transpose();
        let local = (outer * b2 + d_hess * b1) * self.weight;

        if project_to_psd_flag {
            project_to_psd(&local)
        } else {
            local
        }
    }

    /// Normal-force magnitude implied by the barrier gradient, `-db/dD *
    /// dD` projected onto the unit separation direction. A narrow accessor
    /// for a friction model built on top of this crate.
    pub fn normal_force_magnitude(
        &self,
        mesh: &CollisionMesh,
        v: &DMatrix<Real>,
        dhat: Real,
        barrier_stiffness: Real,
    ) -> Real {
        let d_sq = self.squared_distance(mesh, v);
        let b1 = barrier_first_derivative(d_sq, dhat);
        (barrier_stiffness * self.weight * -b1 * 2.0 * d_sq.sqrt()).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::DMatrix;

    fn triangle_mesh() -> CollisionMesh {
        // vertex 0 is the probe point; 1,2,3 form the triangle.
        let v = DMatrix::from_row_slice(4, 3, &[
            0.2, 0.2, 1.0, //
            0.0, 0.0, 0.0, //
            1.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, //
        ]);
        CollisionMesh::new(v.clone(), vec![], vec![[1, 2, 3]])
    }

    #[test]
    fn empty_set_potential_is_zero_by_construction() {
        // A Constraint always contributes something (it's never "empty" on
        // its own); the crate's empty-set identity lives in the reduction
        // layer (src/reduce/potential.rs), exercised there instead.
    }

    #[test]
    fn potential_matches_barrier_of_squared_distance() {
        let mesh = triangle_mesh();
        let v = mesh.vertices_at_rest.clone();
        let c = Constraint::new(Candidate::VertexFace(0, 0), 1.0, mesh.num_dofs());
        let d_sq = c.squared_distance(&mesh, &v);
        assert_relative_eq!(d_sq, 1.0, epsilon = 1e-9);
        let dhat = 2.0;
        assert_relative_eq!(c.potential(&mesh, &v, dhat), barrier_value(d_sq, dhat), epsilon = 1e-12);
    }

    #[test]
    fn gradient_matches_finite_difference_of_potential() {
        let mesh = triangle_mesh();
        let v = mesh.vertices_at_rest.clone();
        let c = Constraint::new(Candidate::VertexFace(0, 0), 1.0, mesh.num_dofs());
        let dhat = 2.0;
        let grad = c.local_gradient(&mesh, &v, dhat);

        const H: Real = 1e-6;
        let indices = c.vertex_indices(&mesh);
        for (k, &vertex) in indices.iter().enumerate() {
            for j in 0..3 {
                let mut v_plus = v.clone();
                v_plus[(vertex, j)] += H;
                let mut v_minus = v.clone();
                v_minus[(vertex, j)] -= H;
                let numeric = (c.potential(&mesh, &v_plus, dhat) - c.potential(&mesh, &v_minus, dhat)) / (2.0 * H);
                assert_relative_eq!(grad[k * 3 + j], numeric, epsilon = 1e-3);
            }
        }
    }

    #[test]
    fn psd_projected_hessian_has_nonnegative_eigenvalues() {
        let mesh = triangle_mesh();
        let v = mesh.vertices_at_rest.clone();
        let c = Constraint::new(Candidate::VertexFace(0, 0), 1.0, mesh.num_dofs());
        let dhat = 2.0;
        let hess = c.local_hessian(&mesh, &v, dhat, true);
        let eigen = nalgebra::linalg::SymmetricEigen::new(hess);
        for lambda in eigen.eigenvalues.iter() {
            assert!(*lambda >= -1e-6, "eigenvalue {lambda} below zero");
        }
    }
}
