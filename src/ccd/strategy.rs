//! The CCD strategy wrapper: conservative rescaling and zero-TOI retry,
//! layered around any of the four raw kernels.

use crate::distance::{squared_distance, PairKind};
use crate::math::{Point3, Real};

use super::kernels::{raw_kernel, CcdMethod, CcdResult, KernelParams};

/// Parameters for the public `ccd()` entry point.
#[derive(Copy, Clone, Debug)]
pub struct CcdParams {
    pub tmax: Real,
    pub tolerance: Real,
    pub max_iterations: u32,
    pub conservative_rescaling: Real,
    pub method: CcdMethod,
    /// A floor on the minimum separation enforced independently of the
    /// conservative rescaling inflation. A GPU-backed broad-and-narrow path
    /// would thread its own minimum separation through this same field
    /// rather than hard-coding it to `0`.
    pub min_distance: Real,
}

impl Default for CcdParams {
    fn default() -> Self {
        Self {
            tmax: 1.0,
            tolerance: 1e-6,
            max_iterations: 1_000_000,
            conservative_rescaling: 0.8,
            method: CcdMethod::Conservative,
            min_distance: 0.0,
        }
    }
}

/// The crate's `ccd(kernel-choice, points@t0, points@t1, tmax, tolerance,
/// max_iterations, conservative_rescaling) -> (bool, toi)` entry point.
/// `kind` selects which of the four primitive-pair kernels to run;
/// `params.method` selects the conservative-advancement or cubic numerical
/// family within that kernel.
///
/// Implements conservative rescaling and the zero-TOI retry around the raw
/// kernel. The retry branch returns its own outcome, not the first call's.
pub fn ccd(kind: PairKind, points_t0: &[Point3<Real>], points_t1: &[Point3<Real>], params: &CcdParams) -> CcdResult {
    debug_assert!(params.conservative_rescaling > 0.0 && params.conservative_rescaling <= 1.0);
    debug_assert!((0.0..=1.0).contains(&params.tmax));

    debug_assert!(params.min_distance >= 0.0);

    let d0 = squared_distance(kind, points_t0).max(0.0).sqrt();

    // Degenerate geometry: the prior step already violated the minimum
    // separation.
    if d0 <= params.min_distance {
        log::warn!("ccd: initial distance is at or below dmin; reporting toi = 0 (unrecoverable prior-step violation)");
        return CcdResult::impacting(0.0);
    }

    let r = params.conservative_rescaling;
    // Inflate the gap above dmin by (1 - r), then add dmin back so the
    // floor is always respected. Reduces to the plain (1 - r) * d0 rule
    // when dmin == 0.
    let min_distance = params.min_distance + (1.0 - r) * (d0 - params.min_distance);

    let call = |min_distance: Real, tolerance: Real, no_zero_toi: bool| -> CcdResult {
        raw_kernel(
            kind,
            points_t0,
            points_t1,
            &KernelParams {
                min_distance,
                tolerance,
                tmax: params.tmax,
                max_iterations: params.max_iterations,
                no_zero_toi,
                method: params.method,
            },
        )
    };

    let first = call(min_distance, params.tolerance, false);

    if !first.is_impacting || first.toi >= 1e-6 {
        return first;
    }

    // Zero-TOI retry.
    let retry = call(0.0, params.tolerance, true);
    match retry.is_impacting {
        true => CcdResult::impacting(retry.toi * r),
        false => retry,
    }
}
