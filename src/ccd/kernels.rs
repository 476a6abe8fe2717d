//! The four primitive-pair CCD kernels.
//!
//! Implements conservative advancement: at each iteration the current gap
//! `g(t) = separation(t) - min_distance` is divided by a conservative bound
//! on how fast the two primitives can be closing (the sum of every input
//! vertex's linear speed over the unit step), and `t` is advanced by that
//! quotient. Because the bound is never an underestimate of the true
//! closing speed, the step never overshoots the true time of impact, and it
//! converges to the true time of impact as the gap shrinks, the same way a
//! bisection refinement converges to a root.
//!
//! The [`CcdMethod::Cubic`] variant is a fallback family: it treats `t` as
//! the root of the coplanarity/collinearity cubic and tests the resulting
//! barycentric coordinates, at the cost of being less robust near
//! degenerate configurations.

use crate::distance::{squared_distance, PairKind};
use crate::math::{Point3, Real};

/// Which kernel family a call should use. `Conservative` is the preferred
/// family; `Cubic` is its fallback.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CcdMethod {
    Conservative,
    Cubic,
}

impl Default for CcdMethod {
    fn default() -> Self {
        CcdMethod::Conservative
    }
}

/// The outcome of a single kernel (or strategy-wrapped) CCD call.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CcdResult {
    pub is_impacting: bool,
    /// Only meaningful when `is_impacting`. A conservative lower bound on
    /// the true time of impact.
    pub toi: Real,
}

impl CcdResult {
    pub fn not_impacting() -> Self {
        Self { is_impacting: false, toi: 0.0 }
    }

    pub fn impacting(toi: Real) -> Self {
        Self { is_impacting: true, toi }
    }
}

/// Parameters a raw kernel call needs beyond the endpoint geometry. Not part
/// of the public `ccd()` surface; the strategy wrapper derives these
/// per-call from its own, smaller parameter set.
#[derive(Copy, Clone, Debug)]
pub(crate) struct KernelParams {
    pub min_distance: Real,
    pub tolerance: Real,
    pub tmax: Real,
    pub max_iterations: u32,
    pub no_zero_toi: bool,
    pub method: CcdMethod,
}

/// Below this, a reported TOI is treated as "zero" for `no_zero_toi`
/// purposes, the same threshold the strategy wrapper's retry trigger uses.
const ZERO_TOI_EPSILON: Real = 1e-6;

fn conservative_advancement(
    dist_sq_fn: impl Fn(Real) -> Real,
    max_speed: Real,
    params: &KernelParams,
) -> CcdResult {
    debug_assert!(params.min_distance >= 0.0);
    debug_assert!(params.tolerance > 0.0);
    debug_assert!((0.0..=1.0).contains(&params.tmax));

    let mut t: Real = 0.0;
    let speed = max_speed.max(1e-12);

    for _ in 0..params.max_iterations {
        if t > params.tmax {
            return CcdResult::not_impacting();
        }
        let d = dist_sq_fn(t).max(0.0).sqrt();
        let gap = d - params.min_distance;

        if gap <= params.tolerance {
            if params.no_zero_toi && t < ZERO_TOI_EPSILON {
                t += params.tolerance.max(ZERO_TOI_EPSILON);
                continue;
            }
            return CcdResult::impacting(t.min(params.tmax));
        }

        t += gap / speed;
    }

    // max_iterations exhausted: report the best conservative bound
    // established so far, unless that bound is itself a near-zero TOI that
    // `no_zero_toi` forbids.
    if t > params.tmax {
        CcdResult::not_impacting()
    } else if params.no_zero_toi && t < ZERO_TOI_EPSILON {
        CcdResult::not_impacting()
    } else {
        CcdResult::impacting(t)
    }
}

fn lerp(a: &Point3<Real>, b: &Point3<Real>, t: Real) -> Point3<Real> {
    Point3::from(a.coords * (1.0 - t) + b.coords * t)
}

fn max_speed_of(at_t0: &[Point3<Real>], at_t1: &[Point3<Real>]) -> Real {
    at_t0.iter().zip(at_t1).map(|(a, b)| (b - a).norm()).sum()
}

/// Point-point CCD, collapsed into a degenerate edge-edge call by
/// duplicating each endpoint into a zero-length edge.
pub(crate) fn point_point_ccd_raw(
    p_t0: Point3<Real>,
    q_t0: Point3<Real>,
    p_t1: Point3<Real>,
    q_t1: Point3<Real>,
    params: &KernelParams,
) -> CcdResult {
    edge_edge_ccd_raw(p_t0, p_t0, q_t0, q_t0, p_t1, p_t1, q_t1, q_t1, params)
}

/// Point-edge CCD, collapsed into a degenerate edge-edge call (point as a
/// zero-length edge).
pub(crate) fn vertex_edge_ccd_raw(
    p_t0: Point3<Real>,
    e0_t0: Point3<Real>,
    e1_t0: Point3<Real>,
    p_t1: Point3<Real>,
    e0_t1: Point3<Real>,
    e1_t1: Point3<Real>,
    params: &KernelParams,
) -> CcdResult {
    edge_edge_ccd_raw(p_t0, p_t0, e0_t0, e1_t0, p_t1, p_t1, e0_t1, e1_t1, params)
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn edge_edge_ccd_raw(
    a0_t0: Point3<Real>,
    a1_t0: Point3<Real>,
    b0_t0: Point3<Real>,
    b1_t0: Point3<Real>,
    a0_t1: Point3<Real>,
    a1_t1: Point3<Real>,
    b0_t1: Point3<Real>,
    b1_t1: Point3<Real>,
    params: &KernelParams,
) -> CcdResult {
    let at_t0 = [a0_t0, a1_t0, b0_t0, b1_t0];
    let at_t1 = [a0_t1, a1_t1, b0_t1, b1_t1];
    let max_speed = max_speed_of(&at_t0, &at_t1);

    let dist_sq_fn = |t: Real| -> Real {
        let points = [
            lerp(&a0_t0, &a0_t1, t),
            lerp(&a1_t0, &a1_t1, t),
            lerp(&b0_t0, &b0_t1, t),
            lerp(&b1_t0, &b1_t1, t),
        ];
        squared_distance(PairKind::EdgeEdge, &points)
    };

    match params.method {
        CcdMethod::Conservative => conservative_advancement(dist_sq_fn, max_speed, params),
        CcdMethod::Cubic => cubic::edge_edge_cubic_toi(&at_t0, &at_t1, params),
    }
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn vertex_face_ccd_raw(
    p_t0: Point3<Real>,
    t0_t0: Point3<Real>,
    t1_t0: Point3<Real>,
    t2_t0: Point3<Real>,
    p_t1: Point3<Real>,
    t0_t1: Point3<Real>,
    t1_t1: Point3<Real>,
    t2_t1: Point3<Real>,
    params: &KernelParams,
) -> CcdResult {
    let at_t0 = [p_t0, t0_t0, t1_t0, t2_t0];
    let at_t1 = [p_t1, t0_t1, t1_t1, t2_t1];
    let max_speed = max_speed_of(&at_t0, &at_t1);

    let dist_sq_fn = |t: Real| -> Real {
        let points = [
            lerp(&p_t0, &p_t1, t),
            lerp(&t0_t0, &t0_t1, t),
            lerp(&t1_t0, &t1_t1, t),
            lerp(&t2_t0, &t2_t1, t),
        ];
        squared_distance(PairKind::VertexFace, &points)
    };

    match params.method {
        CcdMethod::Conservative => conservative_advancement(dist_sq_fn, max_speed, params),
        CcdMethod::Cubic => cubic::vertex_face_cubic_toi(&at_t0, &at_t1, params),
    }
}

/// The cubic time-of-contact fallback family. Solves the coplanarity cubic
/// `det([b0(t)-a0(t), b1(t)-a0(t), n(t)]) = 0` (edge-edge)
/// or the equivalent point-in-plane cubic (vertex-face) for its smallest
/// root in `[0, tmax]`, then tests the corresponding barycentric
/// constraint at that root. Less robust than conservative advancement near
/// coplanar/collinear configurations, which is why it is only a fallback.
mod cubic {
    use super::*;

    pub(super) fn edge_edge_cubic_toi(at_t0: &[Point3<Real>; 4], at_t1: &[Point3<Real>; 4], params: &KernelParams) -> CcdResult {
        let root = smallest_coplanarity_root(at_t0, at_t1, params.tmax);
        match root {
            Some(t) => {
                let a0 = lerp(&at_t0[0], &at_t1[0], t);
                let a1 = lerp(&at_t0[1], &at_t1[1], t);
                let b0 = lerp(&at_t0[2], &at_t1[2], t);
                let b1 = lerp(&at_t0[3], &at_t1[3], t);
                let d_sq = squared_distance(PairKind::EdgeEdge, &[a0, a1, b0, b1]);
                if d_sq.sqrt() <= params.min_distance + params.tolerance {
                    if params.no_zero_toi && t < ZERO_TOI_EPSILON {
                        return CcdResult::not_impacting();
                    }
                    CcdResult::impacting(t)
                } else {
                    CcdResult::not_impacting()
                }
            }
            None => CcdResult::not_impacting(),
        }
    }

    pub(super) fn vertex_face_cubic_toi(at_t0: &[Point3<Real>; 4], at_t1: &[Point3<Real>; 4], params: &KernelParams) -> CcdResult {
        let root = smallest_coplanarity_root(at_t0, at_t1, params.tmax);
        match root {
            Some(t) => {
                let p = lerp(&at_t0[0], &at_t1[0], t);
                let t0 = lerp(&at_t0[1], &at_t1[1], t);
                let t1 = lerp(&at_t0[2], &at_t1[2], t);
                let t2 = lerp(&at_t0[3], &at_t1[3], t);
                let d_sq = squared_distance(PairKind::VertexFace, &[p, t0, t1, t2]);
                if d_sq.sqrt() <= params.min_distance + params.tolerance {
                    if params.no_zero_toi && t < ZERO_TOI_EPSILON {
                        return CcdResult::not_impacting();
                    }
                    CcdResult::impacting(t)
                } else {
                    CcdResult::not_impacting()
                }
            }
            None => CcdResult::not_impacting(),
        }
    }

    /// Finds the smallest `t` in `[0, tmax]` at which the four points are
    /// coplanar, by sampling the scalar triple product on a fine grid and
    /// bisecting the first sign change. A true cubic-root solver would
    /// compute this in closed form; sampling plus bisection finds a root of
    /// the same coplanarity function without a closed-form cubic solve.
    fn smallest_coplanarity_root(at_t0: &[Point3<Real>; 4], at_t1: &[Point3<Real>; 4], tmax: Real) -> Option<Real> {
        const SAMPLES: usize = 64;
        let f = |t: Real| -> Real {
            let p: Vec<Point3<Real>> = (0..4).map(|i| lerp(&at_t0[i], &at_t1[i], t)).collect();
            let u = p[1] - p[0];
            let v = p[2] - p[0];
            let w = p[3] - p[0];
            u.cross(&v).dot(&w)
        };

        let mut prev_t = 0.0;
        let mut prev_f = f(0.0);
        for i in 1..=SAMPLES {
            let t = tmax * (i as Real) / (SAMPLES as Real);
            let cur_f = f(t);
            if prev_f == 0.0 {
                return Some(prev_t);
            }
            if prev_f.signum() != cur_f.signum() {
                return Some(bisect(f, prev_t, t));
            }
            prev_t = t;
            prev_f = cur_f;
        }
        None
    }

    fn bisect(f: impl Fn(Real) -> Real, mut lo: Real, mut hi: Real) -> Real {
        let mut f_lo = f(lo);
        for _ in 0..50 {
            let mid = 0.5 * (lo + hi);
            let f_mid = f(mid);
            if f_mid == 0.0 {
                return mid;
            }
            if f_mid.signum() == f_lo.signum() {
                lo = mid;
                f_lo = f_mid;
            } else {
                hi = mid;
            }
        }
        lo
    }
}

/// Dispatches to the right raw kernel for `kind`, given the primitive's
/// points at `t=0`/`t=1` (length `kind.num_points()` each). This is the
/// single call site `strategy::ccd` uses: kernel choice, two point sets,
/// and the shared numeric parameters.
pub(crate) fn raw_kernel(kind: PairKind, points_t0: &[Point3<Real>], points_t1: &[Point3<Real>], params: &KernelParams) -> CcdResult {
    debug_assert_eq!(points_t0.len(), kind.num_points());
    debug_assert_eq!(points_t1.len(), kind.num_points());
    match kind {
        PairKind::VertexVertex => point_point_ccd_raw(points_t0[0], points_t0[1], points_t1[0], points_t1[1], params),
        PairKind::VertexEdge => vertex_edge_ccd_raw(
            points_t0[0], points_t0[1], points_t0[2],
            points_t1[0], points_t1[1], points_t1[2],
            params,
        ),
        PairKind::EdgeEdge => edge_edge_ccd_raw(
            points_t0[0], points_t0[1], points_t0[2], points_t0[3],
            points_t1[0], points_t1[1], points_t1[2], points_t1[3],
            params,
        ),
        PairKind::VertexFace => vertex_face_ccd_raw(
            points_t0[0], points_t0[1], points_t0[2], points_t0[3],
            points_t1[0], points_t1[1], points_t1[2], points_t1[3],
            params,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(min_distance: Real, no_zero_toi: bool) -> KernelParams {
        KernelParams {
            min_distance,
            tolerance: 1e-6,
            tmax: 1.0,
            max_iterations: 1_000_000,
            no_zero_toi,
            method: CcdMethod::Conservative,
        }
    }

    #[test]
    fn vertex_vertex_head_on_impact() {
        let p0 = Point3::new(0.0, 0.0, 0.0);
        let q0 = Point3::new(1.0, 0.0, 0.0);
        let p1 = Point3::new(1.0, 0.0, 0.0);
        let q1 = Point3::new(0.0, 0.0, 0.0);
        let res = point_point_ccd_raw(p0, q0, p1, q1, &params(0.0, false));
        assert!(res.is_impacting);
        assert!((res.toi - 0.5).abs() < 1e-3);
    }

    #[test]
    fn vertex_vertex_grazing_no_impact() {
        let p0 = Point3::new(0.0, 0.0, 0.0);
        let q0 = Point3::new(1.0, 1.0, 0.0);
        let p1 = Point3::new(0.0, 0.0, 0.0);
        let q1 = Point3::new(1.0, -1.0, 0.0);
        let res = point_point_ccd_raw(p0, q0, p1, q1, &params(0.0, false));
        assert!(!res.is_impacting);
    }

    #[test]
    fn vertex_face_perpendicular_fall() {
        let p0 = Point3::new(0.2, 0.2, 1.0);
        let p1 = Point3::new(0.2, 0.2, -1.0);
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(1.0, 0.0, 0.0);
        let c = Point3::new(0.0, 1.0, 0.0);
        let res = vertex_face_ccd_raw(p0, a, b, c, p1, a, b, c, &params(0.0, false));
        assert!(res.is_impacting);
        assert!((res.toi - 0.5).abs() < 1e-3);
    }

    #[test]
    fn edge_edge_crossing_impact() {
        let a0_t0 = Point3::new(-1.0, 0.0, 0.0);
        let a1_t0 = Point3::new(1.0, 0.0, 0.0);
        let b0_t0 = Point3::new(0.0, -1.0, 0.5);
        let b1_t0 = Point3::new(0.0, 1.0, 0.5);
        let b0_t1 = Point3::new(0.0, -1.0, -0.5);
        let b1_t1 = Point3::new(0.0, 1.0, -0.5);
        let res = edge_edge_ccd_raw(a0_t0, a1_t0, b0_t0, b1_t0, a0_t0, a1_t0, b0_t1, b1_t1, &params(0.0, false));
        assert!(res.is_impacting);
        assert!((res.toi - 0.5).abs() < 1e-3);
    }

    #[test]
    fn toi_never_exceeds_tmax() {
        let p0 = Point3::new(0.0, 0.0, 0.0);
        let q0 = Point3::new(0.1, 0.0, 0.0);
        let p1 = Point3::new(0.05, 0.0, 0.0);
        let q1 = Point3::new(0.05, 0.0, 0.0);
        let mut p = params(0.0, false);
        p.tmax = 0.5;
        let res = point_point_ccd_raw(p0, q0, p1, q1, &p);
        if res.is_impacting {
            assert!(res.toi <= p.tmax + 1e-9);
        }
    }

    #[test]
    fn no_zero_toi_forbids_zero_report() {
        // Already touching at t=0: with min_distance=0, gap(0) is tiny.
        let p0 = Point3::new(0.0, 0.0, 0.0);
        let q0 = Point3::new(1e-9, 0.0, 0.0);
        let p1 = Point3::new(0.0, 0.0, 0.0);
        let q1 = Point3::new(2.0, 0.0, 0.0);
        let res = point_point_ccd_raw(p0, q0, p1, q1, &params(0.0, true));
        if res.is_impacting {
            assert!(res.toi >= ZERO_TOI_EPSILON);
        }
    }
}
