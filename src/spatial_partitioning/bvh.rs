use nalgebra::{Point3, Vector3};

use crate::{
    geometry::{
        kernels::{dist_point_segment, dist_point_simplex, dist_point_triangle},
        primitives::box3::Box3,
        traits::{scalar, RealNumber},
    },
    mesh::{CellId, MeshSource},
};

#[inline]
fn sentinel_distance<TScalar: RealNumber>() -> TScalar {
    scalar(1.0e18)
}

#[inline]
fn default_tolerance<TScalar: RealNumber>() -> TScalar {
    scalar(1.0e-8)
}

#[inline]
fn sign_of<TScalar: RealNumber>(v: TScalar) -> TScalar {
    if v < TScalar::zero() {
        -TScalar::one()
    } else {
        TScalar::one()
    }
}

/// A single mesh cell as seen by the tree: its opaque label and the centroid
/// used to drive the split. Permuted in place by the builder.
#[derive(Debug, Clone, Copy)]
struct Element<TScalar: RealNumber> {
    label: CellId,
    centroid: Point3<TScalar>,
}

/// A node of the arena. `lchild`/`rchild` are indices into the arena, or a
/// negative sentinel when the child is absent.
#[derive(Debug, Clone, Copy)]
struct Node<TScalar: RealNumber> {
    lchild: isize,
    rchild: isize,
    begin: usize,
    end: usize,
    leaf: bool,
    bbox: Box3<TScalar>,
}

impl<TScalar: RealNumber> Node<TScalar> {
    fn placeholder() -> Self {
        Self {
            lchild: -1,
            rchild: -1,
            begin: 0,
            end: 0,
            leaf: false,
            bbox: Box3::empty(),
        }
    }

    #[inline]
    fn nrange(&self) -> usize {
        self.end - self.begin
    }
}

/// Bounding Volume Hierarchy over the cells of an external [`MeshSource`],
/// used to accelerate nearest-element, distance and projection queries.
///
/// Construction is top-down: each node is split on the axis of largest
/// centroid spread, around the mean centroid of the slice. The tree owns its
/// node arena and its permuted element table; it never owns the mesh, and is
/// read-only for the lifetime of all queries once [`build`](Self::build) has
/// returned.
pub struct SurfaceBvh<'mesh, TMesh: MeshSource> {
    mesh: &'mesh TMesh,
    nodes: Vec<Node<TMesh::ScalarType>>,
    elements: Vec<Element<TMesh::ScalarType>>,
    n_nodes: usize,
    n_leaves: usize,
    max_leaf_size: usize,
    tol: TMesh::ScalarType,
}

impl<'mesh, TMesh: MeshSource> SurfaceBvh<'mesh, TMesh> {
    /// Creates an empty tree over `mesh`. Call [`build`](Self::build) before
    /// issuing queries.
    pub fn new(mesh: &'mesh TMesh) -> Self {
        Self {
            mesh,
            nodes: Vec::new(),
            elements: Vec::new(),
            n_nodes: 0,
            n_leaves: 0,
            max_leaf_size: 1,
            tol: default_tolerance(),
        }
    }

    /// Sets the maximum number of cells a leaf may own. Default is 1. Must be
    /// called before [`build`](Self::build).
    pub fn with_max_leaf_size(mut self, max_leaf_size: usize) -> Self {
        self.max_leaf_size = max_leaf_size.max(1);
        self
    }

    /// Sets the AABB inflation tolerance. Default is `1e-8`.
    pub fn with_tolerance(mut self, tol: TMesh::ScalarType) -> Self {
        self.tol = tol;
        self
    }

    #[inline]
    pub fn set_max_leaf_size(&mut self, max_leaf_size: usize) {
        self.max_leaf_size = max_leaf_size.max(1);
    }

    #[inline]
    pub fn n_nodes(&self) -> usize {
        self.n_nodes
    }

    #[inline]
    pub fn n_leaves(&self) -> usize {
        self.n_leaves
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Resets the tree to empty, releasing the arena and element table, and
    /// restores `max_leaf_size` to its default (1).
    pub fn clean(&mut self) {
        self.reset_storage();
        self.max_leaf_size = 1;
    }

    /// Drops the arena and element table without touching `max_leaf_size`;
    /// used internally by [`build`](Self::build) so a leaf size configured
    /// via [`with_max_leaf_size`](Self::with_max_leaf_size)/[`set_max_leaf_size`](Self::set_max_leaf_size)
    /// before the call survives a rebuild.
    fn reset_storage(&mut self) {
        self.nodes.clear();
        self.elements.clear();
        self.n_nodes = 0;
        self.n_leaves = 0;
    }

    /// Populates the tree from the mesh in one pass: fills the element table
    /// from the mesh provider, then recursively splits it into the arena.
    pub fn build(&mut self) {
        self.reset_storage();

        self.elements = self
            .mesh
            .iter_cells()
            .map(|label| Element {
                label,
                centroid: self.mesh.cell_centroid(label),
            })
            .collect();

        let n_elements = self.elements.len();
        if n_elements == 0 {
            return;
        }

        let root = self.alloc_node();
        debug_assert_eq!(root, 0);
        self.nodes[root].begin = 0;
        self.nodes[root].end = n_elements;

        if n_elements <= 1 {
            self.nodes[root].bbox = self.compute_bbox(root);
            self.nodes[root].leaf = true;
            self.n_leaves = 1;
        } else {
            self.fill(root);
        }

        self.nodes.truncate(self.n_nodes);
        self.nodes.shrink_to_fit();
    }

    /// Amortised arena growth: grows in chunks of `max(10, cell_count)`
    /// elements rather than one node at a time.
    fn alloc_node(&mut self) -> usize {
        if self.nodes.len() <= self.n_nodes {
            let chunk = usize::max(10, self.mesh.cell_count());
            self.nodes.resize(self.nodes.len() + chunk, Node::placeholder());
        }

        let idx = self.n_nodes;
        self.n_nodes += 1;
        idx
    }

    /// Recursive top-down split of `node_idx`'s slice.
    fn fill(&mut self, node_idx: usize) {
        let bbox = self.compute_bbox(node_idx);
        self.nodes[node_idx].bbox = bbox;

        let begin = self.nodes[node_idx].begin;
        let end = self.nodes[node_idx].end;

        if end - begin <= self.max_leaf_size {
            self.nodes[node_idx].leaf = true;
            self.n_leaves += 1;
            return;
        }

        // Mean centroid, re-queried from the mesh provider rather than the
        // cached (and, at this point, already-permuted) element centroids.
        let mut sum = Vector3::<TMesh::ScalarType>::zeros();
        for i in begin..end {
            sum += self.mesh.cell_centroid(self.elements[i].label).coords;
        }
        let count: TMesh::ScalarType = scalar((end - begin) as f64);
        let mean = Point3::from(sum / count);

        let mut centroid_box = Box3::empty();
        for i in begin..end {
            centroid_box.union_point(&self.elements[i].centroid);
        }
        let min_c = *centroid_box.get_min();
        let max_c = *centroid_box.get_max();

        let mut dir = 0usize;
        let mut max_range = max_c[0] - min_c[0];
        for d in 1..3 {
            let range = max_c[d] - min_c[d];
            if range > max_range {
                dir = d;
                max_range = range;
            }
        }

        self.elements[begin..end]
            .sort_by(|a, b| a.centroid[dir].partial_cmp(&b.centroid[dir]).unwrap());

        let first_right = self.find_first_greater(begin, end, mean[dir], dir);

        if first_right <= begin || first_right >= end {
            // Centroids collapse to a single value on every candidate axis:
            // splitting would hand the whole slice to one child and make no
            // progress. Force a leaf instead (may exceed max_leaf_size).
            self.nodes[node_idx].leaf = true;
            self.n_leaves += 1;
            return;
        }

        let left = self.alloc_node();
        self.nodes[left].begin = begin;
        self.nodes[left].end = first_right;
        self.nodes[node_idx].lchild = left as isize;

        let right = self.alloc_node();
        self.nodes[right].begin = first_right;
        self.nodes[right].end = end;
        self.nodes[node_idx].rchild = right as isize;

        self.fill(left);
        self.fill(right);
    }

    /// First index in `[begin, end)` whose centroid's `dir` coordinate is
    /// strictly greater than `mean` — `upper_bound` on the (already sorted)
    /// slice.
    fn find_first_greater(
        &self,
        begin: usize,
        end: usize,
        mean: TMesh::ScalarType,
        dir: usize,
    ) -> usize {
        begin + self.elements[begin..end].partition_point(|e| e.centroid[dir] <= mean)
    }

    /// AABB over every vertex of every cell in the node's slice, inflated by
    /// `tol`.
    fn compute_bbox(&self, node_idx: usize) -> Box3<TMesh::ScalarType> {
        let begin = self.nodes[node_idx].begin;
        let end = self.nodes[node_idx].end;

        let mut bbox = Box3::empty();
        for i in begin..end {
            let label = self.elements[i].label;
            let nv = self.mesh.cell_vertex_count(label);
            for v in 0..nv {
                let vertex = self.mesh.cell_vertex(label, v);
                bbox.union_point(&self.mesh.vertex_coords(vertex));
            }
        }

        bbox.inflated(self.tol)
    }

    /// Distance from `p` to the nearest cell within radius `r`, and that
    /// cell's label. Returns `(1e18, -1)` if no cell is found within `r`.
    pub fn distance(&self, p: &Point3<TMesh::ScalarType>, r: TMesh::ScalarType) -> (TMesh::ScalarType, CellId) {
        let mut r_state = r;
        self.nearest(p, r, &mut r_state)
    }

    /// Batched [`distance`](Self::distance). The search radius is tightened
    /// progressively *across the whole batch*: later points may start from a
    /// radius already narrowed by earlier points, not from `r` again.
    pub fn distance_batch(
        &self,
        points: &[Point3<TMesh::ScalarType>],
        r: TMesh::ScalarType,
    ) -> Vec<(TMesh::ScalarType, CellId)> {
        let mut r_state = r;
        points
            .iter()
            .map(|p| {
                let r_in = r_state;
                self.nearest(p, r_in, &mut r_state)
            })
            .collect()
    }

    /// Shared traversal behind [`distance`](Self::distance) and
    /// [`signed_distance`](Self::signed_distance): descends the tree,
    /// tightening `*r_state` as closer cells are found, and returns the
    /// sentinel if nothing was found within `r_in`.
    fn nearest(
        &self,
        p: &Point3<TMesh::ScalarType>,
        r_in: TMesh::ScalarType,
        r_state: &mut TMesh::ScalarType,
    ) -> (TMesh::ScalarType, CellId) {
        if self.nodes.is_empty() {
            return (sentinel_distance(), -1);
        }

        let mut h = sentinel_distance();
        let mut id: CellId = -1;
        self.distance_recurse(p, 0, &mut h, &mut id, r_state);

        if h > r_in {
            (sentinel_distance(), -1)
        } else {
            (h, id)
        }
    }

    fn distance_recurse(
        &self,
        p: &Point3<TMesh::ScalarType>,
        node_idx: usize,
        h: &mut TMesh::ScalarType,
        id: &mut CellId,
        r: &mut TMesh::ScalarType,
    ) {
        let node = self.nodes[node_idx];

        if node.leaf {
            for i in node.begin..node.end {
                let (d, cell_id) = self.element_distance(p, i);
                if d < *h {
                    *h = d;
                    *id = cell_id;
                    *r = *h;
                }
            }
            return;
        }

        if node.lchild >= 0 {
            let li = node.lchild as usize;
            if self.nodes[li].bbox.inflated(*r).contains_point(p) {
                self.distance_recurse(p, li, h, id, r);
            }
        }

        if node.rchild >= 0 {
            let ri = node.rchild as usize;
            if self.nodes[ri].bbox.inflated(*r).contains_point(p) {
                self.distance_recurse(p, ri, h, id, r);
            }
        }
    }

    /// Distance from `p` to the cell at `elem_idx`, dispatching to the
    /// segment, triangle or general-simplex kernel by vertex count.
    fn element_distance(&self, p: &Point3<TMesh::ScalarType>, elem_idx: usize) -> (TMesh::ScalarType, CellId) {
        let label = self.elements[elem_idx].label;
        let nv = self.mesh.cell_vertex_count(label);

        let d = match nv {
            2 => {
                let a = self.mesh.vertex_coords(self.mesh.cell_vertex(label, 0));
                let b = self.mesh.vertex_coords(self.mesh.cell_vertex(label, 1));
                dist_point_segment(p, &a, &b).0
            }
            3 => {
                let a = self.mesh.vertex_coords(self.mesh.cell_vertex(label, 0));
                let b = self.mesh.vertex_coords(self.mesh.cell_vertex(label, 1));
                let c = self.mesh.vertex_coords(self.mesh.cell_vertex(label, 2));
                dist_point_triangle(p, &a, &b, &c).0
            }
            _ => {
                let vs: Vec<_> = (0..nv)
                    .map(|i| self.mesh.vertex_coords(self.mesh.cell_vertex(label, i)))
                    .collect();
                dist_point_simplex(p, &vs).0
            }
        };

        (d, label)
    }

    /// Signed distance from `p` to the nearest cell within radius `r`, its
    /// label, and the outward pseudo-normal at the closest point.
    pub fn signed_distance(
        &self,
        p: &Point3<TMesh::ScalarType>,
        r: TMesh::ScalarType,
    ) -> (TMesh::ScalarType, CellId, Vector3<TMesh::ScalarType>) {
        let mut r_state = r;
        let (_, id) = self.nearest(p, r, &mut r_state);
        self.orient_or_sentinel(p, id)
    }

    /// Batched [`signed_distance`](Self::signed_distance); shares the same
    /// cross-batch radius tightening as [`distance_batch`](Self::distance_batch).
    pub fn signed_distance_batch(
        &self,
        points: &[Point3<TMesh::ScalarType>],
        r: TMesh::ScalarType,
    ) -> Vec<(TMesh::ScalarType, CellId, Vector3<TMesh::ScalarType>)> {
        let mut r_state = r;
        points
            .iter()
            .map(|p| {
                let r_in = r_state;
                let (_, id) = self.nearest(p, r_in, &mut r_state);
                self.orient_or_sentinel(p, id)
            })
            .collect()
    }

    fn orient_or_sentinel(
        &self,
        p: &Point3<TMesh::ScalarType>,
        id: CellId,
    ) -> (TMesh::ScalarType, CellId, Vector3<TMesh::ScalarType>) {
        if id < 0 {
            return (sentinel_distance(), -1, Vector3::zeros());
        }

        let (signed_d, n_hat) = self.orient(p, id);
        (signed_d, id, n_hat)
    }

    /// Recomputes the closest point and barycentric coordinates on cell
    /// `id`, blends the per-edge outward normals by those coordinates, and
    /// orients the distance by the sign of `dot(normal, P - xP)`.
    fn orient(
        &self,
        p: &Point3<TMesh::ScalarType>,
        id: CellId,
    ) -> (TMesh::ScalarType, Vector3<TMesh::ScalarType>) {
        let nv = self.mesh.cell_vertex_count(id);

        let (d, xp, normal) = match nv {
            2 => {
                let a = self.mesh.vertex_coords(self.mesh.cell_vertex(id, 0));
                let b = self.mesh.vertex_coords(self.mesh.cell_vertex(id, 1));
                let (d, xp, lambda) = dist_point_segment(p, &a, &b);
                let n = self.mesh.edge_normal(id, 0).scale(lambda.x) + self.mesh.edge_normal(id, 1).scale(lambda.y);
                (d, xp, n)
            }
            3 => {
                let a = self.mesh.vertex_coords(self.mesh.cell_vertex(id, 0));
                let b = self.mesh.vertex_coords(self.mesh.cell_vertex(id, 1));
                let c = self.mesh.vertex_coords(self.mesh.cell_vertex(id, 2));
                let (d, xp, lambda) = dist_point_triangle(p, &a, &b, &c);
                let n = self.mesh.edge_normal(id, 0).scale(lambda.x)
                    + self.mesh.edge_normal(id, 1).scale(lambda.y)
                    + self.mesh.edge_normal(id, 2).scale(lambda.z);
                (d, xp, n)
            }
            _ => {
                // General simplices carry no well-defined per-edge normal
                // blend here; degrade to the unsigned kernel.
                let vs: Vec<_> = (0..nv)
                    .map(|i| self.mesh.vertex_coords(self.mesh.cell_vertex(id, i)))
                    .collect();
                let (d, xp, _) = dist_point_simplex(p, &vs);
                (d, xp, Vector3::zeros())
            }
        };

        let diff = p - xp;
        let dist_to_plane = diff.norm();
        let zero = TMesh::ScalarType::zero();

        if dist_to_plane <= zero {
            let n_hat = if normal.norm() > zero {
                normal.normalize()
            } else {
                normal
            };
            return (zero, n_hat);
        }

        let s = sign_of(normal.dot(&diff));
        let signed_d = s * d;
        let n_hat = diff.scale(s / dist_to_plane);

        (signed_d, n_hat)
    }

    /// Projects `p` onto the surface: calls [`signed_distance`](Self::signed_distance)
    /// with a progressively growing radius until a cell is found. Does not
    /// terminate for an empty tree.
    pub fn project(&self, p: &Point3<TMesh::ScalarType>, r: TMesh::ScalarType) -> Point3<TMesh::ScalarType> {
        let mut radius = r;
        loop {
            let (d, id, n) = self.signed_distance(p, radius);
            if id >= 0 {
                return p - n.scale(d);
            }
            radius = radius * scalar(1.5);
        }
    }

    /// Batched [`project`](Self::project). Unlike the distance batches, each
    /// point restarts from `r` — no radius state is carried across the batch.
    pub fn project_batch(
        &self,
        points: &[Point3<TMesh::ScalarType>],
        r: TMesh::ScalarType,
    ) -> Vec<Point3<TMesh::ScalarType>> {
        points.iter().map(|p| self.project(p, r)).collect()
    }

    /// Every cell label of `target` whose subtree path crosses an AABB
    /// within `tol` of a leaf AABB of `self`.
    pub fn select_by_patch<TMesh2>(&self, target: &SurfaceBvh<TMesh2>, tol: TMesh::ScalarType) -> Vec<CellId>
    where
        TMesh2: MeshSource<ScalarType = TMesh::ScalarType>,
    {
        if self.nodes.is_empty() || target.nodes.is_empty() {
            return Vec::new();
        }

        let target_root_bbox = target.nodes[0].bbox;

        let leaf_boxes: Vec<Box3<TMesh::ScalarType>> = self.nodes[..self.n_nodes]
            .iter()
            .filter(|node| node.leaf)
            .map(|node| node.bbox)
            .filter(|bbox| bbox.inflated(tol).overlaps(&target_root_bbox))
            .collect();

        let mut extracted = Vec::new();
        target.extract_target(0, leaf_boxes, tol, &mut extracted);
        extracted
    }

    /// Recursive descent used by [`select_by_patch`](Self::select_by_patch):
    /// `active` is the caller's filtered selection-leaf list, passed by
    /// value so sibling branches each see the parent's filter rather than
    /// each other's.
    fn extract_target(
        &self,
        node_idx: usize,
        active: Vec<Box3<TMesh::ScalarType>>,
        tol: TMesh::ScalarType,
        out: &mut Vec<CellId>,
    ) {
        let node_bbox = self.nodes[node_idx].bbox;

        let filtered: Vec<Box3<TMesh::ScalarType>> = active
            .into_iter()
            .filter(|bbox| bbox.inflated(tol).overlaps(&node_bbox))
            .collect();

        if filtered.is_empty() {
            return;
        }

        let node = self.nodes[node_idx];
        if node.leaf {
            for i in node.begin..node.end {
                out.push(self.elements[i].label);
            }
            return;
        }

        if node.lchild >= 0 {
            self.extract_target(node.lchild as usize, filtered.clone(), tol, out);
        }
        if node.rchild >= 0 {
            self.extract_target(node.rchild as usize, filtered, tol, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::{Point3, Vector3};

    use super::SurfaceBvh;
    use crate::{
        geometry::traits::HasScalarType,
        mesh::{CellId, MeshSource, VertexId},
    };

    /// Minimal in-memory mesh: every cell owns its vertices directly, so
    /// `vertex_coords` can decode the cell index straight out of the id.
    struct TriSoup {
        cells: Vec<Vec<Point3<f64>>>,
        normals: Vec<Vec<Vector3<f64>>>,
    }

    impl TriSoup {
        fn new() -> Self {
            Self { cells: Vec::new(), normals: Vec::new() }
        }

        fn add_triangle(
            &mut self,
            a: Point3<f64>,
            b: Point3<f64>,
            c: Point3<f64>,
            normal: Vector3<f64>,
        ) -> CellId {
            let id = self.cells.len() as CellId;
            self.cells.push(vec![a, b, c]);
            self.normals.push(vec![normal, normal, normal]);
            id
        }

        fn add_segment(&mut self, a: Point3<f64>, b: Point3<f64>) -> CellId {
            let id = self.cells.len() as CellId;
            self.cells.push(vec![a, b]);
            self.normals.push(vec![Vector3::zeros(), Vector3::zeros()]);
            id
        }
    }

    impl HasScalarType for TriSoup {
        type ScalarType = f64;
    }

    impl MeshSource for TriSoup {
        type CellIdsIter = std::ops::Range<CellId>;

        fn cell_count(&self) -> usize {
            self.cells.len()
        }

        fn iter_cells(&self) -> Self::CellIdsIter {
            0..self.cells.len() as CellId
        }

        fn cell_centroid(&self, cell: CellId) -> Point3<f64> {
            let vs = &self.cells[cell as usize];
            let mut sum = Vector3::zeros();
            for v in vs {
                sum += v.coords;
            }
            Point3::from(sum / vs.len() as f64)
        }

        fn cell_vertex_count(&self, cell: CellId) -> u32 {
            self.cells[cell as usize].len() as u32
        }

        fn cell_vertex(&self, cell: CellId, i: u32) -> VertexId {
            (cell << 8) | i as i64
        }

        fn vertex_coords(&self, vertex: VertexId) -> Point3<f64> {
            let cell = (vertex >> 8) as usize;
            let i = (vertex & 0xFF) as usize;
            self.cells[cell][i]
        }

        fn edge_normal(&self, cell: CellId, edge_index: u32) -> Vector3<f64> {
            self.normals[cell as usize][edge_index as usize]
        }
    }

    fn unit_cube() -> TriSoup {
        let mut mesh = TriSoup::new();
        let p = |x: f64, y: f64, z: f64| Point3::new(x, y, z);

        // -x / +x
        mesh.add_triangle(p(0.0, 0.0, 0.0), p(0.0, 1.0, 0.0), p(0.0, 1.0, 1.0), Vector3::new(-1.0, 0.0, 0.0));
        mesh.add_triangle(p(0.0, 0.0, 0.0), p(0.0, 1.0, 1.0), p(0.0, 0.0, 1.0), Vector3::new(-1.0, 0.0, 0.0));
        mesh.add_triangle(p(1.0, 0.0, 0.0), p(1.0, 0.0, 1.0), p(1.0, 1.0, 1.0), Vector3::new(1.0, 0.0, 0.0));
        mesh.add_triangle(p(1.0, 0.0, 0.0), p(1.0, 1.0, 1.0), p(1.0, 1.0, 0.0), Vector3::new(1.0, 0.0, 0.0));

        // -y / +y
        mesh.add_triangle(p(0.0, 0.0, 0.0), p(0.0, 0.0, 1.0), p(1.0, 0.0, 1.0), Vector3::new(0.0, -1.0, 0.0));
        mesh.add_triangle(p(0.0, 0.0, 0.0), p(1.0, 0.0, 1.0), p(1.0, 0.0, 0.0), Vector3::new(0.0, -1.0, 0.0));
        mesh.add_triangle(p(0.0, 1.0, 0.0), p(1.0, 1.0, 0.0), p(1.0, 1.0, 1.0), Vector3::new(0.0, 1.0, 0.0));
        mesh.add_triangle(p(0.0, 1.0, 0.0), p(1.0, 1.0, 1.0), p(0.0, 1.0, 1.0), Vector3::new(0.0, 1.0, 0.0));

        // -z / +z
        mesh.add_triangle(p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(1.0, 1.0, 0.0), Vector3::new(0.0, 0.0, -1.0));
        mesh.add_triangle(p(0.0, 0.0, 0.0), p(1.0, 1.0, 0.0), p(0.0, 1.0, 0.0), Vector3::new(0.0, 0.0, -1.0));
        mesh.add_triangle(p(0.0, 0.0, 1.0), p(0.0, 1.0, 1.0), p(1.0, 1.0, 1.0), Vector3::new(0.0, 0.0, 1.0));
        mesh.add_triangle(p(0.0, 0.0, 1.0), p(1.0, 1.0, 1.0), p(1.0, 0.0, 1.0), Vector3::new(0.0, 0.0, 1.0));

        mesh
    }

    #[test]
    fn s1_single_triangle_signed_distance() {
        let mut mesh = TriSoup::new();
        let tri = mesh.add_triangle(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
        );

        let mut tree = SurfaceBvh::new(&mesh);
        tree.build();

        let (d, id, n) = tree.signed_distance(&Point3::new(0.0, 0.0, 1.0), 10.0);

        assert_eq!(id, tri);
        assert!((d - 1.0).abs() < 1e-9);
        assert!((n - Vector3::new(0.0, 0.0, 1.0)).norm() < 1e-9);
    }

    #[test]
    fn s2_out_of_radius_returns_sentinel() {
        let mut mesh = TriSoup::new();
        mesh.add_triangle(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
        );

        let mut tree = SurfaceBvh::new(&mesh);
        tree.build();

        let (d, id) = tree.distance(&Point3::new(2.0, 0.0, 0.0), 0.5);

        assert_eq!(id, -1);
        assert!(d >= 1.0e18);
    }

    #[test]
    fn s3_nearest_of_two_disjoint_triangles() {
        let mut mesh = TriSoup::new();
        let near = mesh.add_triangle(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
        );
        mesh.add_triangle(
            Point3::new(0.0, 0.0, 10.0),
            Point3::new(1.0, 0.0, 10.0),
            Point3::new(0.0, 1.0, 10.0),
            Vector3::new(0.0, 0.0, 1.0),
        );

        let mut tree = SurfaceBvh::new(&mesh);
        tree.build();

        let (d, id) = tree.distance(&Point3::new(0.0, 0.0, 4.0), 1.0e18);

        assert_eq!(id, near);
        assert!((d - 4.0).abs() < 1e-9);
    }

    #[test]
    fn s4_segment_projection() {
        let mut mesh = TriSoup::new();
        mesh.add_segment(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0));

        let mut tree = SurfaceBvh::new(&mesh);
        tree.build();

        let (d, id) = tree.distance(&Point3::new(0.5, 1.0, 0.0), 1.0e18);

        assert!(id >= 0);
        assert!((d - 1.0).abs() < 1e-9);
    }

    #[test]
    fn s5_cube_center_is_inside_with_half_edge_magnitude() {
        let mesh = unit_cube();
        let mut tree = SurfaceBvh::new(&mesh);
        tree.build();

        let (d, id, _) = tree.signed_distance(&Point3::new(0.5, 0.5, 0.5), 1.0e18);

        assert!(id >= 0);
        assert!(d < 0.0);
        assert!((d.abs() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn s6_select_by_patch_against_self_returns_every_cell_once() {
        let mesh = unit_cube();
        let mut tree = SurfaceBvh::new(&mesh);
        tree.set_max_leaf_size(2);
        tree.build();

        let mut selected = tree.select_by_patch(&tree, 0.0);
        selected.sort_unstable();
        selected.dedup();

        let mut expected: Vec<CellId> = (0..mesh.cell_count() as CellId).collect();
        expected.sort_unstable();

        assert_eq!(selected.len(), mesh.cell_count());
        assert_eq!(selected, expected);
    }

    #[test]
    fn radius_monotonicity() {
        let mut mesh = TriSoup::new();
        mesh.add_triangle(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
        );

        let mut tree = SurfaceBvh::new(&mesh);
        tree.build();

        let p = Point3::new(0.0, 0.0, 4.0);
        let (d_small, id_small) = tree.distance(&p, 1.0);
        let (d_large, _) = tree.distance(&p, 10.0);

        assert_eq!(id_small, -1);
        assert!(d_large <= d_small);
    }

    #[test]
    fn clean_resets_max_leaf_size_to_default() {
        let mut mesh = TriSoup::new();
        for i in 0..6 {
            let x = i as f64;
            mesh.add_triangle(
                Point3::new(x, 0.0, 0.0),
                Point3::new(x + 1.0, 0.0, 0.0),
                Point3::new(x, 1.0, 0.0),
                Vector3::new(0.0, 0.0, 1.0),
            );
        }

        let mut tree = SurfaceBvh::new(&mesh);
        tree.set_max_leaf_size(8);
        tree.build();
        assert_eq!(tree.n_leaves(), 1);

        tree.clean();
        tree.build();
        assert!(tree.n_leaves() > 1);
    }

    #[test]
    fn degenerate_centroids_force_a_leaf_instead_of_looping() {
        let mut mesh = TriSoup::new();
        // Three segments sharing the same centroid but different endpoints:
        // every split axis collapses, so the builder must bail into a leaf
        // rather than recurse forever.
        mesh.add_segment(Point3::new(-1.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0));
        mesh.add_segment(Point3::new(0.0, -1.0, 0.0), Point3::new(0.0, 1.0, 0.0));
        mesh.add_segment(Point3::new(0.0, 0.0, -1.0), Point3::new(0.0, 0.0, 1.0));

        let mut tree = SurfaceBvh::new(&mesh);
        tree.set_max_leaf_size(1);
        tree.build();

        assert_eq!(tree.n_nodes(), 1);
        assert_eq!(tree.n_leaves(), 1);
    }

    #[test]
    fn partition_and_leaf_bound_invariants_hold() {
        let mut mesh = TriSoup::new();
        for i in 0..6 {
            let x = i as f64;
            mesh.add_triangle(
                Point3::new(x, 0.0, 0.0),
                Point3::new(x + 1.0, 0.0, 0.0),
                Point3::new(x, 1.0, 0.0),
                Vector3::new(0.0, 0.0, 1.0),
            );
        }

        let mut tree = SurfaceBvh::new(&mesh);
        tree.set_max_leaf_size(1);
        tree.build();

        assert_eq!(tree.nodes.len(), tree.n_nodes);
        assert_eq!(
            tree.n_leaves,
            tree.nodes[..tree.n_nodes].iter().filter(|n| n.leaf).count()
        );

        for node in &tree.nodes[..tree.n_nodes] {
            if node.leaf {
                assert!(node.nrange() >= 1);
            } else {
                let lchild = node.lchild;
                let rchild = node.rchild;
                assert!(lchild >= 0 || rchild >= 0);

                if lchild >= 0 && rchild >= 0 {
                    let l = &tree.nodes[lchild as usize];
                    let r = &tree.nodes[rchild as usize];
                    assert_eq!(l.begin, node.begin);
                    assert_eq!(l.end, r.begin);
                    assert_eq!(r.end, node.end);
                }
            }
        }
    }
}
