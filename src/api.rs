//! The crate's public function surface.
//!
//! Every function here is a thin wrapper: dimension-dispatching and
//! broad-phase plumbing live here, while the actual numerics live in
//! [`crate::ccd`], [`crate::reduce`], and [`crate::intersection`].

use crate::broad_phase::BroadPhase;
use crate::candidate::Candidate;
use crate::ccd::{ccd, CcdParams, CcdResult};
use crate::constraint::Constraint;
use crate::distance::PairKind;
use crate::math::{lift_2d_to_3d, DMatrix, DVector, Point2, Point3, Real};
use crate::mesh::CollisionMesh;
use crate::reduce;
use crate::sparse::SparseMatrix;

/// Largest per-vertex displacement between `v0` and `v1`, used as the broad
/// phase's inflation radius: any pair that could close to zero distance
/// within the step must have had overlapping (inflated) bounds at `t=0`.
fn max_vertex_displacement(v0: &DMatrix<Real>, v1: &DMatrix<Real>, dim: usize) -> Real {
    let mut max = 0.0;
    for i in 0..v0.nrows() {
        let mut d_sq = 0.0;
        for j in 0..dim {
            let d = v1[(i, j)] - v0[(i, j)];
            d_sq += d * d;
        }
        max = Real::max(max, d_sq.sqrt());
    }
    max
}

/// Point-point CCD, specialised to `PairKind::VertexVertex`.
pub fn point_point_ccd(p0: Point3<Real>, q0: Point3<Real>, p1: Point3<Real>, q1: Point3<Real>, params: &CcdParams) -> CcdResult {
    ccd(PairKind::VertexVertex, &[p0, q0], &[p1, q1], params)
}

/// Point-edge CCD in 3D.
pub fn point_edge_ccd(
    p0: Point3<Real>,
    a0: Point3<Real>,
    b0: Point3<Real>,
    p1: Point3<Real>,
    a1: Point3<Real>,
    b1: Point3<Real>,
    params: &CcdParams,
) -> CcdResult {
    ccd(PairKind::VertexEdge, &[p0, a0, b0], &[p1, a1, b1], params)
}

/// Point-edge CCD in 2D: lifted to 3D with `z=0` and dispatched to the same
/// degenerate edge-edge call the 3D kernel uses.
pub fn point_edge_ccd_2d(
    p0: Point2<Real>,
    a0: Point2<Real>,
    b0: Point2<Real>,
    p1: Point2<Real>,
    a1: Point2<Real>,
    b1: Point2<Real>,
    params: &CcdParams,
) -> CcdResult {
    point_edge_ccd(
        lift_2d_to_3d(p0),
        lift_2d_to_3d(a0),
        lift_2d_to_3d(b0),
        lift_2d_to_3d(p1),
        lift_2d_to_3d(a1),
        lift_2d_to_3d(b1),
        params,
    )
}

/// Point-triangle CCD.
pub fn point_triangle_ccd(
    p0: Point3<Real>,
    t0_0: Point3<Real>,
    t1_0: Point3<Real>,
    t2_0: Point3<Real>,
    p1: Point3<Real>,
    t0_1: Point3<Real>,
    t1_1: Point3<Real>,
    t2_1: Point3<Real>,
    params: &CcdParams,
) -> CcdResult {
    ccd(PairKind::VertexFace, &[p0, t0_0, t1_0, t2_0], &[p1, t0_1, t1_1, t2_1], params)
}

/// Edge-edge CCD.
pub fn edge_edge_ccd(
    a0_0: Point3<Real>,
    a1_0: Point3<Real>,
    b0_0: Point3<Real>,
    b1_0: Point3<Real>,
    a0_1: Point3<Real>,
    a1_1: Point3<Real>,
    b0_1: Point3<Real>,
    b1_1: Point3<Real>,
    params: &CcdParams,
) -> CcdResult {
    ccd(PairKind::EdgeEdge, &[a0_0, a1_0, b0_0, b1_0], &[a0_1, a1_1, b0_1, b1_1], params)
}

fn broad_phase_candidates(mesh: &CollisionMesh, v0: &DMatrix<Real>, v1: &DMatrix<Real>, broad_phase: &dyn BroadPhase) -> Vec<Candidate> {
    let inflation_radius = max_vertex_displacement(v0, v1, mesh.dim);
    broad_phase.build_candidates(mesh, v0, v1, inflation_radius)
}

/// Largest α∈[0,1] such that the step from `v0` to `v1` stays collision-free.
///
/// `min_distance` is the minimum separation enforced as a safety margin
/// independent of the conservative-rescaling inflation. `0.0` imposes no
/// extra floor beyond what conservative rescaling already provides.
pub fn compute_collision_free_stepsize(
    mesh: &CollisionMesh,
    v0: &DMatrix<Real>,
    v1: &DMatrix<Real>,
    broad_phase: &dyn BroadPhase,
    min_distance: Real,
    tolerance: Real,
    max_iterations: u32,
) -> Real {
    let candidates = broad_phase_candidates(mesh, v0, v1, broad_phase);
    reduce::compute_collision_free_stepsize(mesh, v0, v1, &candidates, min_distance, tolerance, max_iterations)
}

/// Whether the full step from `v0` to `v1` is collision-free.
pub fn is_step_collision_free(
    mesh: &CollisionMesh,
    v0: &DMatrix<Real>,
    v1: &DMatrix<Real>,
    broad_phase: &dyn BroadPhase,
    min_distance: Real,
    tolerance: Real,
    max_iterations: u32,
) -> bool {
    compute_collision_free_stepsize(mesh, v0, v1, broad_phase, min_distance, tolerance, max_iterations) >= 1.0
}

/// Sum of every constraint's barrier potential.
pub fn compute_barrier_potential(mesh: &CollisionMesh, v: &DMatrix<Real>, constraints: &[Constraint], dhat: Real) -> Real {
    reduce::compute_barrier_potential(mesh, v, constraints, dhat)
}

/// Dense global gradient of the barrier potential.
pub fn compute_barrier_potential_gradient(
    mesh: &CollisionMesh,
    v: &DMatrix<Real>,
    constraints: &[Constraint],
    dhat: Real,
) -> DVector<Real> {
    reduce::compute_barrier_potential_gradient(mesh, v, constraints, dhat)
}

/// Sparse global Hessian of the barrier potential. `project_to_psd` set to
/// `true` clamps each local block to the positive-semidefinite cone first.
pub fn compute_barrier_potential_hessian(
    mesh: &CollisionMesh,
    v: &DMatrix<Real>,
    constraints: &[Constraint],
    dhat: Real,
    project_to_psd: bool,
) -> SparseMatrix {
    reduce::compute_barrier_potential_hessian(mesh, v, constraints, dhat, project_to_psd)
}

/// Shape derivative of the barrier potential.
pub fn compute_barrier_shape_derivative(mesh: &CollisionMesh, v: &DMatrix<Real>, constraints: &[Constraint], dhat: Real) -> SparseMatrix {
    reduce::compute_barrier_shape_derivative(mesh, v, constraints, dhat)
}

/// Minimum squared distance over `constraints`, or `+∞` when empty.
pub fn compute_minimum_distance(mesh: &CollisionMesh, v: &DMatrix<Real>, constraints: &[Constraint]) -> Real {
    reduce::compute_minimum_distance(mesh, v, constraints)
}

/// Whether `mesh` at positions `v` contains a self-intersection. The
/// broad phase this narrow phase runs over is this crate's own
/// conservative-inflated sweep rather than a host-supplied one:
/// intersection candidates are edge-edge/edge-face pairs, a different
/// shape than the `Candidate` the CCD path consumes.
pub fn has_intersections(mesh: &CollisionMesh, v: &DMatrix<Real>) -> bool {
    crate::intersection::has_intersections(mesh, v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broad_phase::BruteForce;
    use crate::candidate::Candidate;

    #[test]
    fn stationary_step_is_collision_free() {
        let v = DMatrix::from_row_slice(2, 3, &[0.0, 0.0, 0.0, 5.0, 0.0, 0.0]);
        let mesh = CollisionMesh::new(v.clone(), vec![], vec![]);
        assert!(is_step_collision_free(&mesh, &v, &v, &BruteForce, 0.0, 1e-6, 1_000_000));
        assert_eq!(compute_collision_free_stepsize(&mesh, &v, &v, &BruteForce, 0.0, 1e-6, 1_000_000), 1.0);
    }

    #[test]
    fn empty_mesh_never_intersects() {
        let v = DMatrix::<Real>::zeros(0, 3);
        let mesh = CollisionMesh::new(v.clone(), vec![], vec![]);
        assert!(!has_intersections(&mesh, &v));
    }

    #[test]
    fn minimum_distance_matches_direct_reduction() {
        let v = DMatrix::from_row_slice(2, 3, &[0.0, 0.0, 0.0, 3.0, 4.0, 0.0]);
        let mesh = CollisionMesh::new(v.clone(), vec![], vec![]);
        let c = Constraint::new(Candidate::VertexVertex(0, 1), 1.0, mesh.num_dofs());
        assert_eq!(compute_minimum_distance(&mesh, &v, &[c]), 25.0);
    }
}
