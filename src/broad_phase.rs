//! The broad-phase interface.
//!
//! The core only ever consumes a `Vec<Candidate>`; it never implements a
//! hash grid, BVH, sweep-and-prune, or GPU sweep pass. [`BroadPhaseMethod`]
//! exists purely as the enum tag describing which implementation produced a
//! candidate list; [`BruteForce`] is a reference implementation used by
//! this crate's own tests and by hosts with no broad phase of their own.
//! Every pair within the inflation radius is reported unconditionally, with
//! no incremental touch tracking.

use crate::candidate::Candidate;
use crate::math::{DMatrix, Real};
use crate::mesh::CollisionMesh;

/// Tag identifying which broad-phase implementation produced a candidate
/// list. The core never branches on this value; it is carried only so a
/// host can log/report which broad phase was used.
#[cfg_attr(feature = "serde-serialize", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BroadPhaseMethod {
    BruteForce,
    HashGrid,
    SpatialHash,
    Bvh,
    SweepAndPrune,
    SweepAndTinyQueueGpu,
}

/// Implemented by a host's broad phase; the core calls only this trait.
pub trait BroadPhase {
    fn build_candidates(&self, mesh: &CollisionMesh, v0: &DMatrix<Real>, v1: &DMatrix<Real>, inflation_radius: Real) -> Vec<Candidate>;
}

/// An unconditional O(V·E + V·F + E²) reference broad phase: every
/// vertex-edge, edge-edge, and vertex-face pair whose swept bounding boxes
/// (inflated by `inflation_radius`) overlap is reported. Not meant for
/// production-size meshes; it exists so the crate's public API and its
/// test suite do not require a host-supplied broad phase to exercise the
/// narrow phase end to end.
pub struct BruteForce;

impl BroadPhase for BruteForce {
    fn build_candidates(&self, mesh: &CollisionMesh, v0: &DMatrix<Real>, v1: &DMatrix<Real>, inflation_radius: Real) -> Vec<Candidate> {
        let mut candidates = Vec::new();
        let n = mesh.num_vertices();

        let vertex_aabb = |i: usize| -> (Real, Real, Real, Real, Real, Real) {
            let (mut xmin, mut ymin, mut zmin) = (Real::INFINITY, Real::INFINITY, Real::INFINITY);
            let (mut xmax, mut ymax, mut zmax) = (Real::NEG_INFINITY, Real::NEG_INFINITY, Real::NEG_INFINITY);
            for v in [v0, v1] {
                let x = v[(i, 0)];
                let y = v[(i, 1)];
                let z = if mesh.dim == 3 { v[(i, 2)] } else { 0.0 };
                xmin = xmin.min(x);
                ymin = ymin.min(y);
                zmin = zmin.min(z);
                xmax = xmax.max(x);
                ymax = ymax.max(y);
                zmax = zmax.max(z);
            }
            (xmin - inflation_radius, ymin - inflation_radius, zmin - inflation_radius,
             xmax + inflation_radius, ymax + inflation_radius, zmax + inflation_radius)
        };

        let edge_aabb = |e: [usize; 2]| -> (Real, Real, Real, Real, Real, Real) {
            let a = vertex_aabb(e[0]);
            let b = vertex_aabb(e[1]);
            (a.0.min(b.0), a.1.min(b.1), a.2.min(b.2), a.3.max(b.3), a.4.max(b.4), a.5.max(b.5))
        };

        let overlaps = |a: (Real, Real, Real, Real, Real, Real), b: (Real, Real, Real, Real, Real, Real)| -> bool {
            a.0 <= b.3 && b.0 <= a.3 && a.1 <= b.4 && b.1 <= a.4 && a.2 <= b.5 && b.2 <= a.5
        };

        for vi in 0..n {
            let va = vertex_aabb(vi);
            for (ei, &edge) in mesh.edges.iter().enumerate() {
                if edge.contains(&vi) {
                    continue;
                }
                if overlaps(va, edge_aabb(edge)) {
                    candidates.push(Candidate::VertexEdge(vi, ei));
                }
            }
            for (fi, &face) in mesh.faces.iter().enumerate() {
                if face.contains(&vi) {
                    continue;
                }
                let fa = {
                    let a = vertex_aabb(face[0]);
                    let b = vertex_aabb(face[1]);
                    let c = vertex_aabb(face[2]);
                    (
                        a.0.min(b.0).min(c.0), a.1.min(b.1).min(c.1), a.2.min(b.2).min(c.2),
                        a.3.max(b.3).max(c.3), a.4.max(b.4).max(c.4), a.5.max(b.5).max(c.5),
                    )
                };
                if overlaps(va, fa) {
                    candidates.push(Candidate::VertexFace(vi, fi));
                }
            }
        }

        for (i, &e1) in mesh.edges.iter().enumerate() {
            for (j, &e2) in mesh.edges.iter().enumerate().skip(i + 1) {
                if e1.iter().any(|v| e2.contains(v)) {
                    continue;
                }
                if overlaps(edge_aabb(e1), edge_aabb(e2)) {
                    candidates.push(Candidate::EdgeEdge(i, j));
                }
            }
        }

        candidates
    }
}
