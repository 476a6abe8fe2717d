//! Tagged primitive-pair records produced by the (external) broad phase.
//!
//! A [`Candidate`] is ephemeral: produced once per step by a broad phase,
//! consumed by a reduction, then discarded. It never owns geometry, only
//! the indices into `V`/`E`/`F` that identify the pair.

use crate::distance::PairKind;
use crate::math::{lift_2d_to_3d, Point2, Point3, Real};
use crate::mesh::CollisionMesh;

#[cfg_attr(feature = "serde-serialize", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Candidate {
    /// Two vertices, `(i, j)`.
    VertexVertex(usize, usize),
    /// A vertex and an edge, `(vertex, edge)`.
    VertexEdge(usize, usize),
    /// Two edges, `(edge_a, edge_b)`.
    EdgeEdge(usize, usize),
    /// A vertex and a face, `(vertex, face)`.
    VertexFace(usize, usize),
}

impl Candidate {
    /// The ordered list of vertex indices this candidate spans once
    /// resolved against `E`/`F`. `edges` and `faces` are the mesh's
    /// topology tables.
    pub fn vertex_indices(&self, edges: &[[usize; 2]], faces: &[[usize; 3]]) -> arrayvec::ArrayVec<usize, 4> {
        let mut out = arrayvec::ArrayVec::new();
        match *self {
            Candidate::VertexVertex(i, j) => {
                out.push(i);
                out.push(j);
            }
            Candidate::VertexEdge(i, e) => {
                out.push(i);
                out.push(edges[e][0]);
                out.push(edges[e][1]);
            }
            Candidate::EdgeEdge(e1, e2) => {
                out.push(edges[e1][0]);
                out.push(edges[e1][1]);
                out.push(edges[e2][0]);
                out.push(edges[e2][1]);
            }
            Candidate::VertexFace(i, f) => {
                out.push(i);
                out.push(faces[f][0]);
                out.push(faces[f][1]);
                out.push(faces[f][2]);
            }
        }
        out
    }

    /// Local dof-vector length for this variant (`vertex_indices().len() *
    /// dim`).
    pub fn num_vertices(&self) -> usize {
        match self {
            Candidate::VertexVertex(..) => 2,
            Candidate::VertexEdge(..) => 3,
            Candidate::EdgeEdge(..) | Candidate::VertexFace(..) => 4,
        }
    }

    /// Which [`PairKind`] this candidate dispatches to in C1/C2/C3.
    pub fn pair_kind(&self) -> PairKind {
        match self {
            Candidate::VertexVertex(..) => PairKind::VertexVertex,
            Candidate::VertexEdge(..) => PairKind::VertexEdge,
            Candidate::EdgeEdge(..) => PairKind::EdgeEdge,
            Candidate::VertexFace(..) => PairKind::VertexFace,
        }
    }

    /// Resolves this candidate's vertex indices against `mesh` and gathers
    /// their positions from `v`, lifting 2D rows to 3D (z=0) as every
    /// narrow-phase routine in this crate operates in 3D.
    pub fn gather_points(
        &self,
        mesh: &CollisionMesh,
        v: &nalgebra::DMatrix<Real>,
    ) -> arrayvec::ArrayVec<Point3<Real>, 4> {
        self.vertex_indices(&mesh.edges, &mesh.faces)
            .iter()
            .map(|&i| {
                if mesh.dim == 2 {
                    lift_2d_to_3d(Point2::new(v[(i, 0)], v[(i, 1)]))
                } else {
                    Point3::new(v[(i, 0)], v[(i, 1)], v[(i, 2)])
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_edge_indices() {
        let edges = vec![[3, 4]];
        let c = Candidate::VertexEdge(1, 0);
        assert_eq!(c.vertex_indices(&edges, &[]).as_slice(), &[1, 3, 4]);
        assert_eq!(c.num_vertices(), 3);
    }

    #[test]
    fn vertex_face_indices() {
        let faces = vec![[0, 1, 2]];
        let c = Candidate::VertexFace(5, 0);
        assert_eq!(c.vertex_indices(&[], &faces).as_slice(), &[5, 0, 1, 2]);
    }

    #[cfg(feature = "serde-serialize")]
    #[test]
    fn round_trips_through_json() {
        let c = Candidate::VertexFace(5, 0);
        let json = serde_json::to_string(&c).unwrap();
        let back: Candidate = serde_json::from_str(&json).unwrap();
        assert_eq!(c, back);
    }
}
