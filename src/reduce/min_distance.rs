//! Minimum-distance reduction.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::constraint::Constraint;
use crate::math::{DMatrix, Real};
use crate::mesh::CollisionMesh;

/// Minimum squared distance over `constraints`, or `+∞` for an empty set.
/// The returned scalar is *squared* distance, matching the contract every
/// other distance-producing function in this crate keeps.
pub fn compute_minimum_distance(mesh: &CollisionMesh, v: &DMatrix<Real>, constraints: &[Constraint]) -> Real {
    #[cfg(feature = "parallel")]
    {
        constraints
            .par_iter()
            .map(|c| c.squared_distance(mesh, v))
            .reduce(|| Real::INFINITY, Real::min)
    }
    #[cfg(not(feature = "parallel"))]
    {
        constraints
            .iter()
            .map(|c| c.squared_distance(mesh, v))
            .fold(Real::INFINITY, Real::min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate::Candidate;
    use approx::assert_relative_eq;

    fn triangle_mesh() -> CollisionMesh {
        let v = DMatrix::from_row_slice(4, 3, &[
            0.2, 0.2, 1.0, //
            0.0, 0.0, 0.0, //
            1.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, //
        ]);
        CollisionMesh::new(v, vec![], vec![[1, 2, 3]])
    }

    #[test]
    fn empty_set_is_infinity() {
        let mesh = triangle_mesh();
        let v = mesh.vertices_at_rest.clone();
        assert_eq!(compute_minimum_distance(&mesh, &v, &[]), Real::INFINITY);
    }

    #[test]
    fn single_constraint_matches_its_own_distance() {
        let mesh = triangle_mesh();
        let v = mesh.vertices_at_rest.clone();
        let c = Constraint::new(Candidate::VertexFace(0, 0), 1.0, mesh.num_dofs());
        assert_relative_eq!(compute_minimum_distance(&mesh, &v, &[c]), 1.0, epsilon = 1e-9);
    }
}
