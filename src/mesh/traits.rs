use nalgebra::{Point3, Vector3};

use crate::geometry::traits::HasScalarType;

/// Opaque, stable identifier of a mesh cell (face or segment).
pub type CellId = i64;

/// Opaque, stable identifier of a mesh vertex.
pub type VertexId = i64;

/// Narrow capability interface a surface mesh must expose to be indexed by a
/// [`crate::spatial_partitioning::bvh::SurfaceBvh`].
///
/// Vertex storage, cell topology and normal computation are the mesh's own
/// responsibility; the tree only ever reads through this trait, and never
/// mutates the mesh.
pub trait MeshSource: HasScalarType {
    type CellIdsIter: Iterator<Item = CellId>;

    /// Number of cells in the mesh.
    fn cell_count(&self) -> usize;

    /// Iterates over every cell id, in an unspecified but stable order.
    fn iter_cells(&self) -> Self::CellIdsIter;

    /// Centroid of the given cell.
    fn cell_centroid(&self, cell: CellId) -> Point3<Self::ScalarType>;

    /// Number of vertices of the given cell (2 for a segment, 3 for a triangle).
    fn cell_vertex_count(&self, cell: CellId) -> u32;

    /// The `i`-th vertex of the given cell, `0 <= i < cell_vertex_count(cell)`.
    fn cell_vertex(&self, cell: CellId, i: u32) -> VertexId;

    /// World-space coordinates of a vertex.
    fn vertex_coords(&self, vertex: VertexId) -> Point3<Self::ScalarType>;

    /// Unit-length outward normal associated with the `edge_index`-th vertex/edge
    /// of the given cell. Only consulted by signed-distance queries.
    fn edge_normal(&self, cell: CellId, edge_index: u32) -> Vector3<Self::ScalarType>;
}
