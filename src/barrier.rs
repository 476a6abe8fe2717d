//! The IPC log-barrier function and its scalar derivatives.
//!
//! Operates on *squared* distance throughout rather than distance itself,
//! so the barrier stays smooth all the way down to the activation boundary
//! without a `sqrt` singularity in its derivative chain.
//!
//! `b(D, D̂) = -(D - D̂)² ln(D / D̂)` for `0 < D < D̂`, `0` for `D ≥ D̂`,
//! `+∞` at `D = 0` (degenerate geometry).

use crate::math::Real;

/// Barrier value at squared distance `d_sq`, activation distance `dhat`
/// (not squared; squared internally).
pub fn barrier_value(d_sq: Real, dhat: Real) -> Real {
    debug_assert!(dhat > 0.0);
    let d_hat_sq = dhat * dhat;
    if d_sq >= d_hat_sq {
        0.0
    } else if d_sq <= 0.0 {
        Real::INFINITY
    } else {
        let x = d_sq / d_hat_sq;
        -(d_sq - d_hat_sq).powi(2) * x.ln()
    }
}

/// `db/dD` at squared distance `d_sq`.
pub fn barrier_first_derivative(d_sq: Real, dhat: Real) -> Real {
    debug_assert!(dhat > 0.0);
    let d_hat_sq = dhat * dhat;
    if d_sq >= d_hat_sq {
        0.0
    } else if d_sq <= 0.0 {
        Real::NEG_INFINITY
    } else {
        let x = d_sq / d_hat_sq;
        -2.0 * (d_sq - d_hat_sq) * x.ln() - (d_sq - d_hat_sq).powi(2) / d_sq
    }
}

/// `d²b/dD²` at squared distance `d_sq`.
pub fn barrier_second_derivative(d_sq: Real, dhat: Real) -> Real {
    debug_assert!(dhat > 0.0);
    let d_hat_sq = dhat * dhat;
    if d_sq >= d_hat_sq {
        0.0
    } else if d_sq <= 0.0 {
        Real::INFINITY
    } else {
        let x = d_sq / d_hat_sq;
        let diff = d_sq - d_hat_sq;
        -2.0 * x.ln() - 4.0 * diff / d_sq + diff.powi(2) / (d_sq * d_sq)
    }
}

/// Estimates an initial barrier stiffness `kappa` from the bounding-box
/// diagonal and the current minimum squared distance.
/// Pure, stateless; callers use it only to seed their own line search.
/// It plays no role in the potential/gradient/Hessian formulas above,
/// which are parameterized only by `dhat`.
pub fn suggest_initial_stiffness(bbox_diagonal: Real, min_squared_distance: Real, dhat: Real) -> Real {
    debug_assert!(bbox_diagonal > 0.0);
    debug_assert!(dhat > 0.0);
    let d_sq = min_squared_distance.max(1e-16).min(dhat * dhat * 0.999);
    let h2 = barrier_second_derivative(d_sq, dhat).abs().max(1e-16);
    (bbox_diagonal * bbox_diagonal) / h2
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn zero_outside_activation_band() {
        assert_eq!(barrier_value(1.0, 0.5), 0.0);
        assert_eq!(barrier_first_derivative(1.0, 0.5), 0.0);
        assert_eq!(barrier_second_derivative(1.0, 0.5), 0.0);
    }

    #[test]
    fn diverges_at_zero_distance() {
        assert_eq!(barrier_value(0.0, 0.5), Real::INFINITY);
    }

    #[test]
    fn first_derivative_matches_finite_difference() {
        let dhat = 0.3;
        let d_sq = (0.2 * dhat) * (0.2 * dhat);
        const H: Real = 1e-8;
        let numeric = (barrier_value(d_sq + H, dhat) - barrier_value(d_sq - H, dhat)) / (2.0 * H);
        assert_relative_eq!(barrier_first_derivative(d_sq, dhat), numeric, epsilon = 1e-4);
    }

    #[test]
    fn second_derivative_matches_finite_difference() {
        let dhat = 0.3;
        let d_sq = (0.2 * dhat) * (0.2 * dhat);
        const H: Real = 1e-6;
        let numeric =
            (barrier_first_derivative(d_sq + H, dhat) - barrier_first_derivative(d_sq - H, dhat)) / (2.0 * H);
        assert_relative_eq!(barrier_second_derivative(d_sq, dhat), numeric, epsilon = 1e-2);
    }

    #[test]
    fn continuous_at_activation_boundary() {
        let dhat = 0.4;
        let d_hat_sq = dhat * dhat;
        assert_relative_eq!(barrier_value(d_hat_sq, dhat), 0.0, epsilon = 1e-9);
        assert_relative_eq!(barrier_value(d_hat_sq * 0.999_999, dhat), 0.0, epsilon = 1e-3);
    }
}
