//! Continuous collision detection: the pairwise kernels, the
//! conservative-rescaling/zero-TOI-retry strategy wrapper around them, and
//! the parameters shared by both.

mod kernels;
mod strategy;

pub use kernels::{CcdMethod, CcdResult};
pub use strategy::{ccd, CcdParams};
