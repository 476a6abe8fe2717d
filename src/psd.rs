//! Symmetric eigenvalue-clamping, used to project a local Hessian block
//! onto the positive-semidefinite cone.

use nalgebra::DMatrix;
use nalgebra::linalg::SymmetricEigen;

use crate::math::Real;

/// Replaces every negative eigenvalue of the symmetric matrix `m` with `0`
/// and reassembles `V diag(max(λ,0)) Vᵀ`. `m` is assumed square and
/// (numerically) symmetric; only its lower triangle is read by
/// `SymmetricEigen`, matching nalgebra's own contract.
pub fn project_to_psd(m: &DMatrix<Real>) -> DMatrix<Real> {
    debug_assert_eq!(m.nrows(), m.ncols());
    let eigen = SymmetricEigen::new(m.clone());
    let clamped = eigen.eigenvalues.map(|lambda| lambda.max(0.0));
    &eigen.eigenvectors * DMatrix::from_diagonal(&clamped) * eigen.eigenvectors.transpose()
}
