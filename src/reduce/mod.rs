//! The three reduction pipelines: per-thread-accumulate-then-serial-merge
//! over constraint potentials/gradients/Hessians, a shared atomic-min over
//! candidate TOIs, and a plain min over distances.
//!
//! Each function here has a `parallel`-feature build (rayon) and a
//! sequential fallback sharing the same per-item closure, so the two paths
//! cannot silently diverge in semantics: results are order-independent up
//! to rounding.

mod earliest_toi;
mod min_distance;
mod potential;

pub use earliest_toi::compute_collision_free_stepsize;
pub use min_distance::compute_minimum_distance;
pub use potential::{
    compute_barrier_potential, compute_barrier_potential_gradient, compute_barrier_potential_hessian,
    compute_barrier_shape_derivative,
};
