//! The read-only surface-mesh topology shared by every reduction.
//!
//! `CollisionMesh` holds an edge table `E` and a face table `F` alongside
//! the vertex positions, plus codimensional bookkeeping: interior/
//! volumetric vertices are excluded from the collision dof space, and
//! `full_to_surface` maps a full mesh vertex index to its position in the
//! surface-only dof vector, when the two differ.

use crate::math::{DMatrix, Real};

/// Topology and rest-shape positions of a surface mesh.
///
/// `V`, `E`, `F` outlive any single reduction; this struct owns `E`/`F` and
/// a record of the mesh's dimensionality, but never the time-varying vertex
/// positions `V0`/`V1` passed into a CCD or barrier call; those come from
/// the caller on every invocation.
#[derive(Clone, Debug)]
pub struct CollisionMesh {
    /// Rest-shape positions, `n` rows by `dim` columns. Used only to size
    /// buffers and, where `full_to_surface` is absent, as the identity
    /// mapping between full and surface dof spaces.
    pub vertices_at_rest: DMatrix<Real>,
    /// Ordered vertex-index pairs; never contains a duplicate within a row.
    pub edges: Vec<[usize; 2]>,
    /// Ordered vertex-index triples; never contains a duplicate within a
    /// row. Empty for 2D meshes (no faces in 2D).
    pub faces: Vec<[usize; 3]>,
    /// 2 or 3.
    pub dim: usize,
    /// When `Some`, maps a full-mesh vertex index to its row in the
    /// surface-only dof space consumed by CCD/the barrier reductions. When
    /// `None`, the mesh has no interior (volumetric) vertices and the two
    /// spaces coincide.
    pub full_to_surface: Option<Vec<usize>>,
    /// Number of rows in the surface-only dof space; equal to
    /// `vertices_at_rest.nrows()` when `full_to_surface` is `None`.
    surface_vertex_count: usize,
}

impl CollisionMesh {
    /// Builds a mesh with no codimensional bookkeeping (surface dofs ==
    /// full dofs), inferring `dim` from `vertices_at_rest`'s column count.
    pub fn new(vertices_at_rest: DMatrix<Real>, edges: Vec<[usize; 2]>, faces: Vec<[usize; 3]>) -> Self {
        let dim = vertices_at_rest.ncols();
        let surface_vertex_count = vertices_at_rest.nrows();
        Self {
            vertices_at_rest,
            edges,
            faces,
            dim,
            full_to_surface: None,
            surface_vertex_count,
        }
    }

    /// Builds a mesh where `full_to_surface[i]` gives the surface-dof row
    /// for full-mesh vertex `i` (only the surface vertices participate in
    /// collision constraints; volumetric interior vertices do not).
    /// `surface_vertex_count` is the number of distinct rows `full_to_surface`
    /// maps into, the size of the collision dof space. Generally smaller
    /// than `vertices_at_rest.nrows()`.
    pub fn with_codimensional_map(
        vertices_at_rest: DMatrix<Real>,
        edges: Vec<[usize; 2]>,
        faces: Vec<[usize; 3]>,
        full_to_surface: Vec<usize>,
        surface_vertex_count: usize,
    ) -> Self {
        debug_assert_eq!(full_to_surface.len(), vertices_at_rest.nrows());
        debug_assert!(full_to_surface.iter().all(|&s| s < surface_vertex_count));
        let dim = vertices_at_rest.ncols();
        Self {
            vertices_at_rest,
            edges,
            faces,
            dim,
            full_to_surface: Some(full_to_surface),
            surface_vertex_count,
        }
    }

    /// Number of rows in `vertices_at_rest`, the full-mesh vertex count
    /// the broad phase and candidate/constraint point-gathering index
    /// into. Equal to [`CollisionMesh::num_surface_vertices`] unless the
    /// mesh carries a codimensional map.
    pub fn num_vertices(&self) -> usize {
        self.vertices_at_rest.nrows()
    }

    /// Number of rows of the *collision* dof space: what the barrier
    /// potential's gradient/Hessian are sized against and what
    /// [`CollisionMesh::surface_index`] maps into. Smaller than
    /// `num_vertices()` exactly when the mesh has interior (volumetric)
    /// vertices excluded from collision constraints.
    pub fn num_surface_vertices(&self) -> usize {
        self.surface_vertex_count
    }

    /// Size of the global collision dof vector, `num_surface_vertices() *
    /// dim`.
    pub fn num_dofs(&self) -> usize {
        self.num_surface_vertices() * self.dim
    }

    /// Maps a full-mesh vertex index to its surface-dof row.
    #[inline]
    pub fn surface_index(&self, full_vertex: usize) -> usize {
        match &self.full_to_surface {
            Some(map) => map[full_vertex],
            None => full_vertex,
        }
    }
}
