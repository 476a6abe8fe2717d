//! Continuous collision detection and barrier-potential core for an
//! Incremental Potential Contact simulation pipeline.
//!
//! Given two snapshots of a surface mesh (`V₀`, `V₁`) and a set of
//! previously identified close-proximity primitive pairs, this crate
//! answers three questions: the earliest time of impact along the linear
//! interpolation between the two snapshots, the value/gradient/Hessian of
//! an IPC log-barrier potential over a constraint set, and whether a given
//! configuration self-intersects.
//!
//! Broad-phase candidate generation, distance formulas and their symbolic
//! derivatives, mesh I/O, and linear-system solving are named collaborators
//! this crate consumes through narrow interfaces ([`broad_phase::BroadPhase`])
//! rather than implementing.

pub mod api;
pub mod barrier;
pub mod broad_phase;
pub mod candidate;
pub mod ccd;
pub mod constraint;
pub mod distance;
pub mod error;
pub mod intersection;
pub mod math;
pub mod mesh;
pub mod psd;
pub mod reduce;
pub mod scatter;
pub mod sparse;

pub use api::{
    compute_barrier_potential, compute_barrier_potential_gradient, compute_barrier_potential_hessian,
    compute_barrier_shape_derivative, compute_collision_free_stepsize, compute_minimum_distance, edge_edge_ccd,
    has_intersections, is_step_collision_free, point_edge_ccd, point_edge_ccd_2d, point_point_ccd, point_triangle_ccd,
};
pub use broad_phase::{BroadPhase, BroadPhaseMethod, BruteForce};
pub use candidate::Candidate;
pub use ccd::{ccd, CcdMethod, CcdParams, CcdResult};
pub use constraint::{Constraint, SparseVector};
pub use distance::PairKind;
pub use error::{validate_mesh, ValidationError};
pub use math::Real;
pub use mesh::CollisionMesh;
pub use sparse::{SparseMatrix, Triplet};
