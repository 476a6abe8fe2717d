//! Mesh self-intersection test.
//!
//! Builds its own conservative-inflated broad phase directly over the
//! mesh's edge/face AABBs. Intersection candidates are edge-edge (2D) or
//! edge-face (3D) pairs, a different shape than the vertex/edge/face
//! `Candidate` the CCD path consumes, so this does not go through
//! [`crate::broad_phase::BroadPhase`].

use crate::math::{DMatrix, Real};
use crate::mesh::CollisionMesh;

type Aabb = (Real, Real, Real, Real, Real, Real);

fn vertex_position(v: &DMatrix<Real>, dim: usize, i: usize) -> (Real, Real, Real) {
    let z = if dim == 3 { v[(i, 2)] } else { 0.0 };
    (v[(i, 0)], v[(i, 1)], z)
}

fn point_aabb(v: &DMatrix<Real>, dim: usize, i: usize, radius: Real) -> Aabb {
    let (x, y, z) = vertex_position(v, dim, i);
    (x - radius, y - radius, z - radius, x + radius, y + radius, z + radius)
}

fn merge_aabb(a: Aabb, b: Aabb) -> Aabb {
    (a.0.min(b.0), a.1.min(b.1), a.2.min(b.2), a.3.max(b.3), a.4.max(b.4), a.5.max(b.5))
}

fn aabb_overlaps(a: Aabb, b: Aabb) -> bool {
    a.0 <= b.3 && b.0 <= a.3 && a.1 <= b.4 && b.1 <= a.4 && a.2 <= b.5 && b.2 <= a.5
}

fn bbox_diagonal(v: &DMatrix<Real>, dim: usize) -> Real {
    let n = v.nrows();
    if n == 0 {
        return 0.0;
    }
    let mut aabb = point_aabb(v, dim, 0, 0.0);
    for i in 1..n {
        aabb = merge_aabb(aabb, point_aabb(v, dim, i, 0.0));
    }
    let dx = aabb.3 - aabb.0;
    let dy = aabb.4 - aabb.1;
    let dz = aabb.5 - aabb.2;
    (dx * dx + dy * dy + dz * dz).sqrt()
}

/// `true` if the mesh described by `mesh.edges`/`mesh.faces` at positions
/// `v` contains a self-intersection, tested via the exact predicate for the
/// mesh's dimensionality. An empty edge/face table can never intersect.
pub fn has_intersections(mesh: &CollisionMesh, v: &DMatrix<Real>) -> bool {
    let dim = mesh.dim;
    let radius = 0.01 * bbox_diagonal(v, dim);

    let edge_aabb = |e: [usize; 2], r: Real| -> Aabb {
        merge_aabb(point_aabb(v, dim, e[0], r), point_aabb(v, dim, e[1], r))
    };

    if dim == 2 {
        for (i, &e1) in mesh.edges.iter().enumerate() {
            let aabb1 = edge_aabb(e1, radius);
            for &e2 in mesh.edges.iter().skip(i + 1) {
                if e1.iter().any(|x| e2.contains(x)) {
                    continue;
                }
                if !aabb_overlaps(aabb1, edge_aabb(e2, radius)) {
                    continue;
                }
                let (ax, ay, _) = vertex_position(v, dim, e1[0]);
                let (bx, by, _) = vertex_position(v, dim, e1[1]);
                let (cx, cy, _) = vertex_position(v, dim, e2[0]);
                let (dx, dy, _) = vertex_position(v, dim, e2[1]);
                if segments_intersect_2d((ax, ay), (bx, by), (cx, cy), (dx, dy)) {
                    return true;
                }
            }
        }
    } else {
        for &e in &mesh.edges {
            let e_aabb = edge_aabb(e, radius);
            for &f in &mesh.faces {
                if e.iter().any(|x| f.contains(x)) {
                    continue;
                }
                let f_aabb = merge_aabb(
                    merge_aabb(point_aabb(v, dim, f[0], radius), point_aabb(v, dim, f[1], radius)),
                    point_aabb(v, dim, f[2], radius),
                );
                if !aabb_overlaps(e_aabb, f_aabb) {
                    continue;
                }
                let p0 = vertex_position(v, dim, e[0]);
                let p1 = vertex_position(v, dim, e[1]);
                let a = vertex_position(v, dim, f[0]);
                let b = vertex_position(v, dim, f[1]);
                let c = vertex_position(v, dim, f[2]);
                if segment_intersects_triangle_3d(p0, p1, a, b, c) {
                    return true;
                }
            }
        }
    }

    false
}

fn orient_2d(a: (Real, Real), b: (Real, Real), c: (Real, Real)) -> Real {
    (b.0 - a.0) * (c.1 - a.1) - (b.1 - a.1) * (c.0 - a.0)
}

/// Exact (up to floating point) proper-or-touching segment-segment
/// intersection in 2D via orientation tests.
fn segments_intersect_2d(a: (Real, Real), b: (Real, Real), c: (Real, Real), d: (Real, Real)) -> bool {
    let d1 = orient_2d(c, d, a);
    let d2 = orient_2d(c, d, b);
    let d3 = orient_2d(a, b, c);
    let d4 = orient_2d(a, b, d);

    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0)) && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0)) {
        return true;
    }

    fn on_segment(p: (Real, Real), q: (Real, Real), r: (Real, Real)) -> bool {
        q.0 <= p.0.max(r.0) && q.0 >= p.0.min(r.0) && q.1 <= p.1.max(r.1) && q.1 >= p.1.min(r.1)
    }

    if d1 == 0.0 && on_segment(c, a, d) {
        return true;
    }
    if d2 == 0.0 && on_segment(c, b, d) {
        return true;
    }
    if d3 == 0.0 && on_segment(a, c, b) {
        return true;
    }
    if d4 == 0.0 && on_segment(a, d, b) {
        return true;
    }

    false
}

/// Möller-Trumbore ray-triangle intersection, restricted to the segment's
/// parameter range `t ∈ [0, 1]` rather than an unbounded ray.
fn segment_intersects_triangle_3d(
    p0: (Real, Real, Real),
    p1: (Real, Real, Real),
    a: (Real, Real, Real),
    b: (Real, Real, Real),
    c: (Real, Real, Real),
) -> bool {
    use crate::math::Vector3;

    let origin = Vector3::new(p0.0, p0.1, p0.2);
    let dir = Vector3::new(p1.0 - p0.0, p1.1 - p0.1, p1.2 - p0.2);
    let va = Vector3::new(a.0, a.1, a.2);
    let vb = Vector3::new(b.0, b.1, b.2);
    let vc = Vector3::new(c.0, c.1, c.2);

    let edge1 = vb - va;
    let edge2 = vc - va;
    let pvec = dir.cross(&edge2);
    let det = edge1.dot(&pvec);

    const EPS: Real = 1e-12;
    if det.abs() < EPS {
        return false;
    }
    let inv_det = 1.0 / det;
    let tvec = origin - va;
    let u = tvec.dot(&pvec) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return false;
    }
    let qvec = tvec.cross(&edge1);
    let w = dir.dot(&qvec) * inv_det;
    if w < 0.0 || u + w > 1.0 {
        return false;
    }
    let t = edge2.dot(&qvec) * inv_det;
    (0.0..=1.0).contains(&t)
}
