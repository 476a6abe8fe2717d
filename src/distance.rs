//! Distance primitives: closed-form squared-distance *values* (point to
//! point/segment/triangle, segment to segment), plus gradients and
//! Hessians obtained by central finite differencing the value function
//! rather than by hand-deriving the symbolic derivative of each of the
//! four variants' closest-point case analysis.
//!
//! A production deployment would swap the two derivative functions below
//! for a symbolic or autodiff backend; every caller in this crate only
//! depends on the [`PairKind::squared_distance`]/`_gradient`/`_hessian`
//! contract, so that swap is confined to this file.

use arrayvec::ArrayVec;
use nalgebra::{DMatrix, DVector};

use crate::math::{Point3, Real};

/// Which of the four primitive-pair shapes `points` describes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PairKind {
    VertexVertex,
    VertexEdge,
    EdgeEdge,
    VertexFace,
}

impl PairKind {
    pub fn num_points(&self) -> usize {
        match self {
            PairKind::VertexVertex => 2,
            PairKind::VertexEdge => 3,
            PairKind::EdgeEdge | PairKind::VertexFace => 4,
        }
    }
}

/// Squared distance between the two primitives described by `kind`/`points`.
pub fn squared_distance(kind: PairKind, points: &[Point3<Real>]) -> Real {
    debug_assert_eq!(points.len(), kind.num_points());
    match kind {
        PairKind::VertexVertex => (points[0] - points[1]).norm_squared(),
        PairKind::VertexEdge => point_segment_squared_distance(&points[0], &points[1], &points[2]),
        PairKind::EdgeEdge => segment_segment_squared_distance(&points[0], &points[1], &points[2], &points[3]),
        PairKind::VertexFace => point_triangle_squared_distance(&points[0], &points[1], &points[2], &points[3]),
    }
}

/// Central finite-difference gradient of `squared_distance` with respect to
/// the first `dim` components of every point (the remaining components,
/// `z` when `dim == 2`, are held fixed at the lift value and excluded from
/// the returned vector).
pub fn squared_distance_gradient(kind: PairKind, points: &[Point3<Real>], dim: usize) -> DVector<Real> {
    const H: Real = 1e-6;
    let n = points.len();
    let mut grad = DVector::zeros(n * dim);
    let mut perturbed: ArrayVec<Point3<Real>, 4> = points.iter().copied().collect();
    for k in 0..n {
        for j in 0..dim {
            let original = perturbed[k][j];
            perturbed[k][j] = original + H;
            let f_plus = squared_distance(kind, &perturbed);
            perturbed[k][j] = original - H;
            let f_minus = squared_distance(kind, &perturbed);
            perturbed[k][j] = original;
            grad[k * dim + j] = (f_plus - f_minus) / (2.0 * H);
        }
    }
    grad
}

/// Central finite-difference Hessian of `squared_distance`, symmetrized by
/// averaging with its own transpose to cancel finite-difference asymmetry.
pub fn squared_distance_hessian(kind: PairKind, points: &[Point3<Real>], dim: usize) -> DMatrix<Real> {
    const H: Real = 1e-4;
    let n = points.len();
    let size = n * dim;
    let mut hess = DMatrix::zeros(size, size);
    let mut perturbed: ArrayVec<Point3<Real>, 4> = points.iter().copied().collect();

    for k in 0..n {
        for j in 0..dim {
            let original = perturbed[k][j];
            perturbed[k][j] = original + H;
            let g_plus = squared_distance_gradient(kind, &perturbed, dim);
            perturbed[k][j] = original - H;
            let g_minus = squared_distance_gradient(kind, &perturbed, dim);
            perturbed[k][j] = original;
            let row = k * dim + j;
            for col in 0..size {
                hess[(row, col)] = (g_plus[col] - g_minus[col]) / (2.0 * H);
            }
        }
    }
    &hess * 0.5 + hess.transpose() * 0.5
}

fn point_segment_squared_distance(p: &Point3<Real>, a: &Point3<Real>, b: &Point3<Real>) -> Real {
    let ab = b - a;
    let denom = ab.norm_squared();
    let t = if denom <= Real::EPSILON {
        0.0
    } else {
        ((p - a).dot(&ab) / denom).clamp(0.0, 1.0)
    };
    let closest = a + ab * t;
    (p - closest).norm_squared()
}

fn point_triangle_squared_distance(p: &Point3<Real>, a: &Point3<Real>, b: &Point3<Real>, c: &Point3<Real>) -> Real {
    // Ericson, "Real-Time Collision Detection" §5.1.5: barycentric closest
    // point on a triangle via Voronoi region tests against the edges.
    let ab = b - a;
    let ac = c - a;
    let ap = p - a;

    let d1 = ab.dot(&ap);
    let d2 = ac.dot(&ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return (p - a).norm_squared();
    }

    let bp = p - b;
    let d3 = ab.dot(&bp);
    let d4 = ac.dot(&bp);
    if d3 >= 0.0 && d4 <= d3 {
        return (p - b).norm_squared();
    }

    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        let v = d1 / (d1 - d3);
        let closest = a + ab * v;
        return (p - closest).norm_squared();
    }

    let cp = p - c;
    let d5 = ab.dot(&cp);
    let d6 = ac.dot(&cp);
    if d6 >= 0.0 && d5 <= d6 {
        return (p - c).norm_squared();
    }

    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        let w = d2 / (d2 - d6);
        let closest = a + ac * w;
        return (p - closest).norm_squared();
    }

    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
        let closest = b + (c - b) * w;
        return (p - closest).norm_squared();
    }

    let denom = 1.0 / (va + vb + vc);
    let v = vb * denom;
    let w = vc * denom;
    let closest = a + ab * v + ac * w;
    (p - closest).norm_squared()
}

fn segment_segment_squared_distance(a0: &Point3<Real>, a1: &Point3<Real>, b0: &Point3<Real>, b1: &Point3<Real>) -> Real {
    // Ericson §5.1.9, `ClosestPtSegmentSegment`, robust to parallel/degenerate
    // segments via the usual clamp-and-reclamp scheme.
    let d1 = a1 - a0;
    let d2 = b1 - b0;
    let r = a0 - b0;
    let a = d1.norm_squared();
    let e = d2.norm_squared();
    let f = d2.dot(&r);

    const EPS: Real = 1e-12;

    let (s, t): (Real, Real) = if a <= EPS && e <= EPS {
        (0.0, 0.0)
    } else if a <= EPS {
        (0.0, (f / e).clamp(0.0, 1.0))
    } else {
        let c = d1.dot(&r);
        if e <= EPS {
            ((-c / a).clamp(0.0, 1.0), 0.0)
        } else {
            let b = d1.dot(&d2);
            let denom = a * e - b * b;
            let mut s = if denom.abs() > EPS {
                ((b * f - c * e) / denom).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let mut t = (b * s + f) / e;
            if t < 0.0 {
                t = 0.0;
                s = (-c / a).clamp(0.0, 1.0);
            } else if t > 1.0 {
                t = 1.0;
                s = ((b - c) / a).clamp(0.0, 1.0);
            }
            (s, t)
        }
    };

    let closest_a = a0 + d1 * s;
    let closest_b = b0 + d2 * t;
    (closest_a - closest_b).norm_squared()
}
