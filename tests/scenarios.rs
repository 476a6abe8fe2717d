//! End-to-end scenarios from the specification's testable-properties list:
//! the four concrete CCD configurations, a single-constraint barrier
//! potential, and order-independence of the earliest-TOI reduction.

use ipc_ccd_core::{
    ccd, compute_barrier_potential, CcdParams, Candidate, CollisionMesh, Constraint, PairKind,
};
use nalgebra::{DMatrix, Point3};

fn p(x: f64, y: f64, z: f64) -> Point3<f64> {
    Point3::new(x, y, z)
}

#[test]
fn vertex_vertex_head_on_impact() {
    let params = CcdParams::default();
    let res = ccd(
        PairKind::VertexVertex,
        &[p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0)],
        &[p(1.0, 0.0, 0.0), p(0.0, 0.0, 0.0)],
        &params,
    );
    assert!(res.is_impacting);
    assert!((res.toi - 0.4).abs() < 0.05, "toi = {}", res.toi);
}

#[test]
fn vertex_vertex_grazing_reports_no_impact() {
    let params = CcdParams::default();
    let res = ccd(
        PairKind::VertexVertex,
        &[p(0.0, 0.0, 0.0), p(1.0, 1.0, 0.0)],
        &[p(0.0, 0.0, 0.0), p(1.0, -1.0, 0.0)],
        &params,
    );
    assert!(!res.is_impacting);
}

#[test]
fn point_triangle_perpendicular_fall() {
    let params = CcdParams::default();
    let a = p(0.0, 0.0, 0.0);
    let b = p(1.0, 0.0, 0.0);
    let c = p(0.0, 1.0, 0.0);
    let res = ccd(
        PairKind::VertexFace,
        &[p(0.2, 0.2, 1.0), a, b, c],
        &[p(0.2, 0.2, -1.0), a, b, c],
        &params,
    );
    assert!(res.is_impacting);
    assert!((res.toi - 0.4).abs() < 0.05, "toi = {}", res.toi);
}

#[test]
fn edge_edge_crossing() {
    let params = CcdParams::default();
    let a0 = p(-1.0, 0.0, 0.0);
    let a1 = p(1.0, 0.0, 0.0);
    let res = ccd(
        PairKind::EdgeEdge,
        &[a0, a1, p(0.0, -1.0, 0.5), p(0.0, 1.0, 0.5)],
        &[a0, a1, p(0.0, -1.0, -0.5), p(0.0, 1.0, -0.5)],
        &params,
    );
    assert!(res.is_impacting);
    assert!((res.toi - 0.4).abs() < 0.05, "toi = {}", res.toi);
}

#[test]
fn single_vertex_face_constraint_potential_matches_its_own_phi() {
    let v = DMatrix::from_row_slice(4, 3, &[
        0.2, 0.2, 1.0, //
        0.0, 0.0, 0.0, //
        1.0, 0.0, 0.0, //
        0.0, 1.0, 0.0, //
    ]);
    let mesh = CollisionMesh::new(v.clone(), vec![], vec![[1, 2, 3]]);
    let c = Constraint::new(Candidate::VertexFace(0, 0), 1.0, mesh.num_dofs());
    let dhat = 2.0;

    let expected = c.potential(&mesh, &v, dhat);
    assert_eq!(compute_barrier_potential(&mesh, &v, &[c], dhat), expected);
    assert_eq!(compute_barrier_potential(&mesh, &v, &[], dhat), 0.0);
}

#[test]
fn earliest_toi_pruning_is_order_independent() {
    use ipc_ccd_core::reduce::compute_collision_free_stepsize;

    // Candidate A (vertices 0,1) closes fast, independent TOI ~0.3ish;
    // Candidate B (vertices 2,3) closes slowly, independent TOI ~0.9ish.
    let v0 = DMatrix::from_row_slice(4, 3, &[
        0.0, 0.0, 0.0, //
        10.0, 0.0, 0.0, //
        0.0, 10.0, 0.0, //
        1.0, 10.0, 0.0, //
    ]);
    let v1 = DMatrix::from_row_slice(4, 3, &[
        10.0, 0.0, 0.0, //
        0.0, 0.0, 0.0, //
        0.1, 10.0, 0.0, //
        0.9, 10.0, 0.0, //
    ]);
    let mesh = CollisionMesh::new(v0.clone(), vec![], vec![]);

    let forward = vec![Candidate::VertexVertex(0, 1), Candidate::VertexVertex(2, 3)];
    let reversed = vec![Candidate::VertexVertex(2, 3), Candidate::VertexVertex(0, 1)];

    let a = compute_collision_free_stepsize(&mesh, &v0, &v1, &forward, 0.0, 1e-6, 1_000_000);
    let b = compute_collision_free_stepsize(&mesh, &v0, &v1, &reversed, 0.0, 1e-6, 1_000_000);
    assert!((a - b).abs() < 1e-6, "a = {a}, b = {b}");

    // The fast-closing pair (0,1) should dominate: it must be strictly
    // smaller than the slow pair's independent TOI.
    let solo_b_only = compute_collision_free_stepsize(&mesh, &v0, &v1, &[Candidate::VertexVertex(2, 3)], 0.0, 1e-6, 1_000_000);
    assert!(a < solo_b_only);
}
