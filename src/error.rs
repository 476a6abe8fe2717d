//! Opt-in precondition validation.
//!
//! The core itself treats precondition violations as caller bugs and
//! enforces them with `assert!`/`debug_assert!`; no function on the hot
//! path returns a `Result`. This module exists purely as an opt-in
//! convenience for hosts (in particular, future foreign-language bindings)
//! that would rather get a catchable error than an abort when wiring up a
//! new mesh. Calling it is never required.

use thiserror::Error;

use crate::mesh::CollisionMesh;

/// A precondition a [`CollisionMesh`] or CCD call is expected to satisfy.
///
/// Returned only by [`validate_mesh`]; the rest of the crate's public
/// surface never returns this type (see module docs).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("dimension must be 2 or 3, got {0}")]
    InvalidDimension(usize),
    #[error("vertex matrix has {actual} columns, expected {expected} (== dim)")]
    VertexWidthMismatch { expected: usize, actual: usize },
    #[error("edge {index} references vertex {vertex}, but the mesh has {vertex_count} vertices")]
    EdgeIndexOutOfRange {
        index: usize,
        vertex: usize,
        vertex_count: usize,
    },
    #[error("face {index} references vertex {vertex}, but the mesh has {vertex_count} vertices")]
    FaceIndexOutOfRange {
        index: usize,
        vertex: usize,
        vertex_count: usize,
    },
    #[error("edge {index} has duplicate vertices ({a}, {a})")]
    DegenerateEdge { index: usize, a: usize },
    #[error("face {index} has duplicate vertices ({a}, {b}, {c})")]
    DegenerateFace { index: usize, a: usize, b: usize, c: usize },
}

/// Checks `CollisionMesh`'s invariants: valid index ranges and no duplicate
/// vertices within an edge/face row.
///
/// This does not check per-call invariants like `0 <= tmax <= 1`; those are
/// local to a single CCD call and are asserted at the call site instead.
pub fn validate_mesh(mesh: &CollisionMesh) -> Result<(), ValidationError> {
    if mesh.dim != 2 && mesh.dim != 3 {
        return Err(ValidationError::InvalidDimension(mesh.dim));
    }
    if mesh.vertices_at_rest.ncols() != mesh.dim {
        return Err(ValidationError::VertexWidthMismatch {
            expected: mesh.dim,
            actual: mesh.vertices_at_rest.ncols(),
        });
    }
    let n = mesh.vertices_at_rest.nrows();
    for (index, e) in mesh.edges.iter().enumerate() {
        for &v in e {
            if v >= n {
                return Err(ValidationError::EdgeIndexOutOfRange {
                    index,
                    vertex: v,
                    vertex_count: n,
                });
            }
        }
        if e[0] == e[1] {
            return Err(ValidationError::DegenerateEdge { index, a: e[0] });
        }
    }
    for (index, f) in mesh.faces.iter().enumerate() {
        for &v in f {
            if v >= n {
                return Err(ValidationError::FaceIndexOutOfRange {
                    index,
                    vertex: v,
                    vertex_count: n,
                });
            }
        }
        if f[0] == f[1] || f[1] == f[2] || f[0] == f[2] {
            return Err(ValidationError::DegenerateFace {
                index,
                a: f[0],
                b: f[1],
                c: f[2],
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::DMatrix;

    fn mesh(dim: usize, n: usize) -> CollisionMesh {
        CollisionMesh::new(DMatrix::zeros(n, dim), vec![], vec![])
    }

    #[test]
    fn rejects_bad_dimension() {
        let mut m = mesh(3, 2);
        m.dim = 4;
        assert_eq!(validate_mesh(&m), Err(ValidationError::InvalidDimension(4)));
    }

    #[test]
    fn rejects_out_of_range_edge() {
        let mut m = mesh(3, 2);
        m.edges.push([0, 5]);
        assert!(matches!(
            validate_mesh(&m),
            Err(ValidationError::EdgeIndexOutOfRange { .. })
        ));
    }

    #[test]
    fn rejects_degenerate_edge() {
        let mut m = mesh(3, 2);
        m.edges.push([0, 0]);
        assert!(matches!(
            validate_mesh(&m),
            Err(ValidationError::DegenerateEdge { .. })
        ));
    }

    #[test]
    fn accepts_well_formed_mesh() {
        let mut m = mesh(3, 4);
        m.edges.push([0, 1]);
        m.faces.push([1, 2, 3]);
        assert!(validate_mesh(&m).is_ok());
    }
}
