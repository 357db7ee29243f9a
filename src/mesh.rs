//! Half-edge representation of the evolving hull.
//!
//! Vertices, half-edges and faces live in arenas owned by [`Mesh`] and refer to
//! each other through copyable handles. Handles are only meaningful for the
//! build that produced them; every new build clears the arenas.

use crate::conflict::FaceList;
use crate::error::MeshError;
use crate::math::{normalize_in_place, Point, Vector};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct VertexId(pub usize);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) struct HalfEdgeId(pub usize);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) struct FaceId(pub usize);

/// Which bookkeeping structure, if any, currently holds a vertex.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum VertexState {
    /// Inside the current hull estimate, a hull vertex, or not yet classified.
    Unassigned,
    /// In the outside set of the given face.
    Claimed(FaceId),
    /// Orphaned by a deleted face and waiting to be reassigned.
    Unclaimed,
}

#[derive(Clone, Debug)]
pub(crate) struct Vertex {
    pub point: Point,
    /// Compact output index, set for final hull vertices only.
    pub hull_index: Option<usize>,
    pub prev: Option<VertexId>,
    pub next: Option<VertexId>,
    pub state: VertexState,
}

impl Vertex {
    pub fn new(point: Point) -> Self {
        Self {
            point,
            hull_index: None,
            prev: None,
            next: None,
            state: VertexState::Unassigned,
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct HalfEdge {
    pub head: VertexId,
    pub face: FaceId,
    pub next: HalfEdgeId,
    pub prev: HalfEdgeId,
    pub opposite: Option<HalfEdgeId>,
}

/// Lifecycle of a face.
///
/// | from          | to            | when                                   |
/// |---------------|---------------|----------------------------------------|
/// | `Visible`     | `NonConvex`   | first merge pass defers a merge         |
/// | `NonConvex`   | `Visible`     | second merge pass picks the face up     |
/// | `Visible`     | `Deleted`     | horizon walk, merge, or redundant face  |
/// | `NonConvex`   | `Deleted`     | merged into a neighbour                 |
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum FaceMark {
    Visible,
    NonConvex,
    Deleted,
}

impl FaceMark {
    pub fn can_become(self, to: FaceMark) -> bool {
        use FaceMark::*;
        matches!(
            (self, to),
            (Visible, NonConvex) | (NonConvex, Visible) | (Visible, Deleted) | (NonConvex, Deleted)
        )
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Face {
    pub he0: HalfEdgeId,
    pub normal: Vector,
    pub centroid: Point,
    pub plane_offset: f64,
    pub area: f64,
    pub num_verts: usize,
    /// First vertex of this face's run in the claimed list.
    pub outside: Option<VertexId>,
    mark: FaceMark,
}

impl Face {
    fn new(he0: HalfEdgeId) -> Self {
        Self {
            he0,
            normal: Vector::zeros(),
            centroid: Point::origin(),
            plane_offset: 0.0,
            area: 0.0,
            num_verts: 0,
            outside: None,
            mark: FaceMark::Visible,
        }
    }

    pub fn mark(&self) -> FaceMark {
        self.mark
    }

    pub fn set_mark(&mut self, mark: FaceMark) {
        debug_assert!(
            self.mark.can_become(mark),
            "illegal face transition {:?} -> {:?}",
            self.mark,
            mark
        );
        self.mark = mark;
    }

    pub fn is_visible(&self) -> bool {
        self.mark == FaceMark::Visible
    }

    /// Signed distance from the face plane, positive outside.
    pub fn distance_to_plane(&self, p: &Point) -> f64 {
        self.normal.dot(&p.coords) - self.plane_offset
    }
}

#[derive(Clone, Debug, Default)]
pub(crate) struct Mesh {
    pub vertices: Vec<Vertex>,
    pub half_edges: Vec<HalfEdge>,
    pub faces: Vec<Face>,
}

impl Mesh {
    /// Refills the vertex pool from `points` and drops all faces, keeping the
    /// arenas' allocations.
    pub fn reset(&mut self, points: &[Point]) {
        self.vertices.clear();
        self.vertices.extend(points.iter().map(|p| Vertex::new(*p)));
        self.half_edges.clear();
        self.faces.clear();
    }

    pub fn vertex(&self, v: VertexId) -> &Vertex {
        &self.vertices[v.0]
    }

    pub fn vertex_mut(&mut self, v: VertexId) -> &mut Vertex {
        &mut self.vertices[v.0]
    }

    pub fn point(&self, v: VertexId) -> &Point {
        &self.vertices[v.0].point
    }

    pub fn face(&self, f: FaceId) -> &Face {
        &self.faces[f.0]
    }

    pub fn face_mut(&mut self, f: FaceId) -> &mut Face {
        &mut self.faces[f.0]
    }

    pub fn head(&self, he: HalfEdgeId) -> VertexId {
        self.half_edges[he.0].head
    }

    pub fn tail(&self, he: HalfEdgeId) -> VertexId {
        self.head(self.prev(he))
    }

    pub fn next(&self, he: HalfEdgeId) -> HalfEdgeId {
        self.half_edges[he.0].next
    }

    pub fn prev(&self, he: HalfEdgeId) -> HalfEdgeId {
        self.half_edges[he.0].prev
    }

    pub fn face_of(&self, he: HalfEdgeId) -> FaceId {
        self.half_edges[he.0].face
    }

    /// Every half-edge of a finished face ring is paired; reaching an
    /// unpaired one is a construction bug.
    pub fn opposite(&self, he: HalfEdgeId) -> HalfEdgeId {
        self.half_edges[he.0]
            .opposite
            .expect("half edge has no opposite")
    }

    pub fn opposite_face(&self, he: HalfEdgeId) -> FaceId {
        self.face_of(self.opposite(he))
    }

    pub fn set_opposite(&mut self, a: HalfEdgeId, b: HalfEdgeId) {
        self.half_edges[a.0].opposite = Some(b);
        self.half_edges[b.0].opposite = Some(a);
    }

    fn link(&mut self, prev: HalfEdgeId, next: HalfEdgeId) {
        self.half_edges[prev.0].next = next;
        self.half_edges[next.0].prev = prev;
    }

    pub fn length_squared(&self, he: HalfEdgeId) -> f64 {
        (self.point(self.head(he)) - self.point(self.tail(he))).norm_squared()
    }

    /// The `i`th half-edge of `face`, counting from `he0`; negative values walk
    /// backwards.
    pub fn edge(&self, face: FaceId, mut i: isize) -> HalfEdgeId {
        let mut he = self.face(face).he0;
        while i > 0 {
            he = self.next(he);
            i -= 1;
        }
        while i < 0 {
            he = self.prev(he);
            i += 1;
        }
        he
    }

    pub fn face_edges(&self, face: FaceId) -> FaceEdges<'_> {
        let start = self.face(face).he0;
        FaceEdges {
            mesh: self,
            start,
            current: Some(start),
        }
    }

    /// Distance of the centroid of the face across `he` from the plane of the
    /// face owning `he`.
    pub fn opposite_face_distance(&self, he: HalfEdgeId) -> f64 {
        let centroid = self.face(self.opposite_face(he)).centroid;
        self.face(self.face_of(he)).distance_to_plane(&centroid)
    }

    fn push_half_edge(&mut self, head: VertexId, face: FaceId) -> HalfEdgeId {
        let id = HalfEdgeId(self.half_edges.len());
        self.half_edges.push(HalfEdge {
            head,
            face,
            next: id,
            prev: id,
            opposite: None,
        });
        id
    }

    /// Creates the triangle `v0, v1, v2` (counter-clockwise seen from outside).
    ///
    /// The triangle's half-edges are unpaired until the caller stitches them.
    pub fn create_triangle(
        &mut self,
        v0: VertexId,
        v1: VertexId,
        v2: VertexId,
        min_area: f64,
    ) -> FaceId {
        let face = FaceId(self.faces.len());
        let he0 = self.push_half_edge(v0, face);
        let he1 = self.push_half_edge(v1, face);
        let he2 = self.push_half_edge(v2, face);
        self.link(he0, he1);
        self.link(he1, he2);
        self.link(he2, he0);

        self.faces.push(Face::new(he0));
        self.compute_normal_and_centroid(face, min_area);
        face
    }

    /// Newell normal, area and vertex count of `face`.
    ///
    /// Faces with an area below `min_area` get the normal component parallel
    /// to their longest edge removed.
    fn compute_normal(&mut self, face: FaceId, min_area: f64) {
        let he0 = self.face(face).he0;
        let he1 = self.next(he0);
        let mut he2 = self.next(he1);

        let p0 = *self.point(self.head(he0));
        let mut d2 = self.point(self.head(he1)) - p0;
        let mut normal = Vector::zeros();
        let mut num_verts = 2;

        while he2 != he0 {
            let d1 = d2;
            d2 = self.point(self.head(he2)) - p0;
            normal += d1.cross(&d2);
            he2 = self.next(he2);
            num_verts += 1;
        }

        let area = normal.norm();
        normal /= area;

        if area < min_area {
            let longest = self
                .face_edges(face)
                .map(|he| (he, self.length_squared(he)))
                .fold((he0, 0.0_f64), |best, cur| if cur.1 > best.1 { cur } else { best });
            let (he_max, len_sqr_max) = longest;
            let u = (self.point(self.head(he_max)) - self.point(self.tail(he_max)))
                / len_sqr_max.sqrt();
            normal -= u * normal.dot(&u);
            normalize_in_place(&mut normal);
        }

        let f = self.face_mut(face);
        f.normal = normal;
        f.area = area;
        f.num_verts = num_verts;
    }

    fn compute_centroid(&mut self, face: FaceId) {
        let sum = self
            .face_edges(face)
            .fold(Vector::zeros(), |acc, he| acc + self.point(self.head(he)).coords);
        let f = self.face_mut(face);
        f.centroid = Point::from(sum / f.num_verts as f64);
    }

    pub fn compute_normal_and_centroid(&mut self, face: FaceId, min_area: f64) {
        self.compute_normal(face, min_area);
        self.compute_centroid(face);
        let f = self.face_mut(face);
        f.plane_offset = f.normal.dot(&f.centroid.coords);
    }

    /// Counts the separate runs of consecutive edges that `face` shares with
    /// `other`. Only faces sharing exactly one run can be merged; with two or
    /// more the union would enclose the faces between the runs.
    pub fn shared_runs(&self, face: FaceId, other: FaceId) -> usize {
        self.face_edges(face)
            .filter(|&he| {
                self.opposite_face(he) == other && self.opposite_face(self.prev(he)) != other
            })
            .count()
    }

    /// Absorbs the face across `he_adj` into `face`. The two faces must share
    /// a single run of edges.
    ///
    /// `discarded` receives the absorbed face followed by any neighbour that
    /// collapsed while the rings were spliced. Their outside sets still need
    /// redistributing.
    pub fn merge_adjacent_face(
        &mut self,
        face: FaceId,
        he_adj: HalfEdgeId,
        discarded: &mut Vec<FaceId>,
    ) {
        discarded.clear();

        let opp_face = self.opposite_face(he_adj);
        debug_assert_eq!(self.shared_runs(face, opp_face), 1);
        discarded.push(opp_face);
        self.face_mut(opp_face).set_mark(FaceMark::Deleted);

        let he_opp = self.opposite(he_adj);

        let mut he_adj_prev = self.prev(he_adj);
        let mut he_adj_next = self.next(he_adj);
        let mut he_opp_prev = self.prev(he_opp);
        let mut he_opp_next = self.next(he_opp);

        // Several consecutive edges may be shared with the absorbed face.
        while self.opposite_face(he_adj_prev) == opp_face {
            he_adj_prev = self.prev(he_adj_prev);
            he_opp_next = self.next(he_opp_next);
        }
        while self.opposite_face(he_adj_next) == opp_face {
            he_opp_prev = self.prev(he_opp_prev);
            he_adj_next = self.next(he_adj_next);
        }

        let stop = self.next(he_opp_prev);
        let mut he = he_opp_next;
        while he != stop {
            self.half_edges[he.0].face = face;
            he = self.next(he);
        }

        if he_adj == self.face(face).he0 {
            self.face_mut(face).he0 = he_adj_next;
        }

        if let Some(f) = self.connect_half_edges(face, he_opp_prev, he_adj_next) {
            discarded.push(f);
        }
        if let Some(f) = self.connect_half_edges(face, he_adj_prev, he_opp_next) {
            discarded.push(f);
        }

        self.compute_normal_and_centroid(face, 0.0);
        debug_assert_eq!(self.check_face(face), Ok(()));
    }

    /// Joins `he_prev -> he` inside `face`. When both already border the same
    /// neighbour the vertex between them is redundant and gets spliced out; a
    /// triangular neighbour disappears entirely and is returned.
    fn connect_half_edges(
        &mut self,
        face: FaceId,
        he_prev: HalfEdgeId,
        he: HalfEdgeId,
    ) -> Option<FaceId> {
        if self.opposite_face(he_prev) != self.opposite_face(he) {
            self.link(he_prev, he);
            return None;
        }

        let opp_face = self.opposite_face(he);
        let mut discarded = None;

        if he_prev == self.face(face).he0 {
            self.face_mut(face).he0 = he;
        }

        let he_opp = if self.face(opp_face).num_verts == 3 {
            self.face_mut(opp_face).set_mark(FaceMark::Deleted);
            discarded = Some(opp_face);
            self.opposite(self.prev(self.opposite(he)))
        } else {
            let he_opp = self.next(self.opposite(he));
            if self.face(opp_face).he0 == self.prev(he_opp) {
                self.face_mut(opp_face).he0 = he_opp;
            }
            let new_prev = self.prev(self.prev(he_opp));
            self.link(new_prev, he_opp);
            he_opp
        };

        let new_prev = self.prev(he_prev);
        self.link(new_prev, he);
        self.set_opposite(he, he_opp);

        self.compute_normal_and_centroid(opp_face, 0.0);
        discarded
    }

    /// Fan-triangulates `face` around its first vertex.
    ///
    /// `face` itself is reduced to the last triangle of the fan; the others are
    /// appended to `new_faces`. Triangles are left untouched.
    pub fn triangulate_face(&mut self, face: FaceId, min_area: f64, new_faces: &mut FaceList) {
        if self.face(face).num_verts < 4 {
            return;
        }

        let he0 = self.face(face).he0;
        let v0 = self.head(he0);
        let last = self.prev(he0);
        let start = new_faces.len();

        let mut he = self.next(he0);
        let mut opp_prev = self.opposite(he);
        he = self.next(he);

        while he != last {
            let tri = self.create_triangle(v0, self.tail(he), self.head(he), min_area);
            let tri_he0 = self.face(tri).he0;
            self.set_opposite(self.next(tri_he0), opp_prev);
            self.set_opposite(self.prev(tri_he0), self.opposite(he));
            opp_prev = tri_he0;
            new_faces.push(tri);
            he = self.next(he);
        }

        let closing = self.push_half_edge(self.head(self.prev(last)), face);
        self.set_opposite(closing, opp_prev);
        self.link(he0, closing);
        self.link(closing, last);

        self.compute_normal_and_centroid(face, min_area);
        debug_assert_eq!(self.check_face(face), Ok(()));
        debug_assert!(new_faces.as_slice()[start..]
            .iter()
            .all(|&f| self.check_face(f).is_ok()));
    }

    /// Verifies the boundary ring of `face`: every half-edge paired with a
    /// reciprocal opposite running the other way, every neighbour alive, and
    /// the walked length matching the cached vertex count.
    pub fn check_face(&self, face: FaceId) -> Result<(), MeshError> {
        let f = self.face(face);
        if f.num_verts < 3 {
            return Err(MeshError::DegenerateFace(f.num_verts));
        }

        let mut count = 0;
        for he in self.face_edges(face) {
            let tail = self.tail(he).0;
            let head = self.head(he).0;
            let opp = self.half_edges[he.0]
                .opposite
                .ok_or(MeshError::UnreflectedHalfEdge { tail, head })?;

            if self.half_edges[opp.0].opposite != Some(he) {
                return Err(MeshError::AsymmetricOpposite { tail, head });
            }
            if self.head(opp) != self.tail(he) || self.head(he) != self.tail(opp) {
                return Err(MeshError::MismatchedOpposite {
                    tail,
                    head,
                    opposite_tail: self.tail(opp).0,
                    opposite_head: self.head(opp).0,
                });
            }
            if self.face_of(opp) == face {
                return Err(MeshError::SelfAdjacent { tail, head });
            }
            if self.face(self.face_of(opp)).mark() == FaceMark::Deleted {
                return Err(MeshError::OppositeFaceDeleted { tail, head });
            }
            count += 1;
        }

        if count != f.num_verts {
            return Err(MeshError::VertexCountMismatch {
                expected: f.num_verts,
                found: count,
            });
        }
        Ok(())
    }
}

/// Walks a face's boundary ring once, starting at `he0`.
pub(crate) struct FaceEdges<'a> {
    mesh: &'a Mesh,
    start: HalfEdgeId,
    current: Option<HalfEdgeId>,
}

impl Iterator for FaceEdges<'_> {
    type Item = HalfEdgeId;

    fn next(&mut self) -> Option<HalfEdgeId> {
        let he = self.current?;
        let next = self.mesh.next(he);
        self.current = if next == self.start { None } else { Some(next) };
        Some(he)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn mesh_with(points: &[[f64; 3]]) -> Mesh {
        let points: Vec<Point> = points.iter().map(|p| Point::new(p[0], p[1], p[2])).collect();
        let mut mesh = Mesh::default();
        mesh.reset(&points);
        mesh
    }

    /// Two coplanar triangles on top of a unit square, closed by two
    /// triangles underneath.
    fn square_pillow() -> (Mesh, [FaceId; 4]) {
        let mut mesh = mesh_with(&[
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
        ]);
        let [a, b, c, d] = [VertexId(0), VertexId(1), VertexId(2), VertexId(3)];
        let top1 = mesh.create_triangle(a, b, c, 0.0);
        let top2 = mesh.create_triangle(a, c, d, 0.0);
        let bot1 = mesh.create_triangle(a, c, b, 0.0);
        let bot2 = mesh.create_triangle(a, d, c, 0.0);

        let pairs = [
            ((top1, 0), (top2, 1)),
            ((top1, 1), (bot1, 0)),
            ((top1, 2), (bot1, 2)),
            ((top2, 0), (bot2, 1)),
            ((top2, 2), (bot2, 2)),
            ((bot1, 1), (bot2, 0)),
        ];
        for ((f1, e1), (f2, e2)) in pairs {
            let (h1, h2) = (mesh.edge(f1, e1), mesh.edge(f2, e2));
            mesh.set_opposite(h1, h2);
        }
        (mesh, [top1, top2, bot1, bot2])
    }

    fn polygon(mesh: &mut Mesh, ring: &[usize]) -> FaceId {
        let face = FaceId(mesh.faces.len());
        let edges: Vec<_> = ring
            .iter()
            .map(|&v| mesh.push_half_edge(VertexId(v), face))
            .collect();
        for (k, &he) in edges.iter().enumerate() {
            mesh.link(he, edges[(k + 1) % edges.len()]);
        }
        mesh.faces.push(Face::new(edges[0]));
        mesh.compute_normal_and_centroid(face, 0.0);
        face
    }

    /// Pairs every half-edge with the one running the other way.
    fn stitch(mesh: &mut Mesh) {
        let ends: Vec<_> = (0..mesh.half_edges.len())
            .map(|i| (mesh.tail(HalfEdgeId(i)), mesh.head(HalfEdgeId(i))))
            .collect();
        for (i, &(tail, head)) in ends.iter().enumerate() {
            if let Some(j) = ends.iter().position(|&e| e == (head, tail)) {
                mesh.set_opposite(HalfEdgeId(i), HalfEdgeId(j));
            }
        }
    }

    /// A flat triangle inside a larger one. The band between them is split
    /// into a quad and a hexagon that meet along two separate edges, and a
    /// single triangle closes the bottom.
    fn split_annulus() -> (Mesh, [FaceId; 4]) {
        let mut mesh = mesh_with(&[
            [0.0, 0.0, 0.0],
            [4.0, 0.0, 0.0],
            [2.0, 4.0, 0.0],
            [1.5, 1.0, 0.0],
            [2.5, 1.0, 0.0],
            [2.0, 2.0, 0.0],
        ]);
        let quad = polygon(&mut mesh, &[0, 1, 4, 3]);
        let hexagon = polygon(&mut mesh, &[1, 2, 0, 3, 5, 4]);
        let inner = polygon(&mut mesh, &[3, 4, 5]);
        let bottom = polygon(&mut mesh, &[0, 2, 1]);
        stitch(&mut mesh);
        (mesh, [quad, hexagon, inner, bottom])
    }

    #[test]
    fn triangle_plane() {
        let mut mesh = mesh_with(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);
        let face = mesh.create_triangle(VertexId(0), VertexId(1), VertexId(2), 0.0);
        let f = mesh.face(face);

        assert_eq!(f.num_verts, 3);
        assert_relative_eq!(f.normal, Vector::new(0.0, 0.0, 1.0));
        assert_relative_eq!(f.area, 1.0);
        assert_relative_eq!(f.centroid, Point::new(1.0 / 3.0, 1.0 / 3.0, 0.0));
        assert_relative_eq!(f.distance_to_plane(&Point::new(0.3, 0.3, 2.0)), 2.0);
        assert_relative_eq!(f.distance_to_plane(&Point::new(5.0, -1.0, -1.5)), -1.5);
    }

    #[test]
    fn edge_indexing_wraps_both_ways() {
        let mut mesh = mesh_with(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);
        let face = mesh.create_triangle(VertexId(0), VertexId(1), VertexId(2), 0.0);
        let he0 = mesh.face(face).he0;

        assert_eq!(mesh.edge(face, 3), he0);
        assert_eq!(mesh.edge(face, -1), mesh.prev(he0));
        assert_eq!(mesh.edge(face, -1), mesh.edge(face, 2));
        assert_eq!(mesh.head(he0), VertexId(0));
        assert_eq!(mesh.tail(he0), VertexId(2));
        assert_eq!(mesh.face_edges(face).count(), 3);
    }

    #[test]
    fn sliver_normal_is_orthogonal_to_longest_edge() {
        let mut mesh = mesh_with(&[[0.0, 0.0, 0.0], [10.0, 0.0, 0.0], [5.0, 1e-9, 1e-9]]);
        let face = mesh.create_triangle(VertexId(0), VertexId(1), VertexId(2), 1.0);
        let f = mesh.face(face);

        assert!(f.area < 1.0);
        assert!(f.normal.x.abs() < 1e-12);
        assert_relative_eq!(f.normal.norm(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn pillow_is_consistent() {
        let (mesh, faces) = square_pillow();
        for face in faces {
            assert_eq!(mesh.check_face(face), Ok(()));
        }
    }

    #[test]
    fn unpaired_edge_is_reported() {
        let mut mesh = mesh_with(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);
        let face = mesh.create_triangle(VertexId(0), VertexId(1), VertexId(2), 0.0);

        assert_eq!(
            mesh.check_face(face),
            Err(MeshError::UnreflectedHalfEdge { tail: 2, head: 0 })
        );
    }

    #[test]
    fn merge_coplanar_triangles_into_quad() {
        let (mut mesh, [top1, top2, bot1, bot2]) = square_pillow();
        let shared = mesh.edge(top1, 0);
        let mut discarded = Vec::new();

        mesh.merge_adjacent_face(top1, shared, &mut discarded);

        assert_eq!(discarded, vec![top2]);
        assert_eq!(mesh.face(top2).mark(), FaceMark::Deleted);
        assert_eq!(mesh.face(top1).num_verts, 4);
        assert_relative_eq!(mesh.face(top1).normal, Vector::new(0.0, 0.0, 1.0));
        assert_relative_eq!(mesh.face(top1).centroid, Point::new(0.5, 0.5, 0.0));
        assert_eq!(mesh.check_face(top1), Ok(()));
        assert_eq!(mesh.check_face(bot1), Ok(()));
        assert_eq!(mesh.check_face(bot2), Ok(()));

        let ring: Vec<_> = mesh.face_edges(top1).map(|he| mesh.head(he).0).collect();
        assert_eq!(ring, vec![1, 2, 3, 0]);
    }

    #[test]
    fn triangulate_quad_restores_two_triangles() {
        let (mut mesh, [top1, _, bot1, bot2]) = square_pillow();
        let shared = mesh.edge(top1, 0);
        let mut discarded = Vec::new();
        mesh.merge_adjacent_face(top1, shared, &mut discarded);

        let mut new_faces = FaceList::default();
        mesh.triangulate_face(top1, 0.0, &mut new_faces);

        assert_eq!(new_faces.len(), 1);
        let tri = new_faces.as_slice()[0];
        for face in [top1, tri, bot1, bot2] {
            assert_eq!(mesh.check_face(face), Ok(()));
            assert_eq!(mesh.face(face).num_verts, 3);
        }
        assert_relative_eq!(mesh.face(tri).normal, Vector::new(0.0, 0.0, 1.0));
        assert_relative_eq!(mesh.face(top1).normal, Vector::new(0.0, 0.0, 1.0));

        let mut again = FaceList::default();
        mesh.triangulate_face(top1, 0.0, &mut again);
        assert!(again.is_empty());
    }

    #[test]
    fn face_mark_transitions() {
        use FaceMark::*;
        assert!(Visible.can_become(NonConvex));
        assert!(NonConvex.can_become(Visible));
        assert!(Visible.can_become(Deleted));
        assert!(NonConvex.can_become(Deleted));
        assert!(!Deleted.can_become(Visible));
        assert!(!Deleted.can_become(NonConvex));
        assert!(!Deleted.can_become(Deleted));
        assert!(!Visible.can_become(Visible));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "illegal face transition Deleted -> Visible")]
    fn deleted_face_cannot_come_back() {
        let (mut mesh, [top1, ..]) = square_pillow();
        mesh.face_mut(top1).set_mark(FaceMark::Deleted);
        mesh.face_mut(top1).set_mark(FaceMark::Visible);
    }

    #[test]
    fn faces_meeting_twice_share_two_runs() {
        let (mesh, [quad, hexagon, inner, bottom]) = split_annulus();
        for face in [quad, hexagon, inner, bottom] {
            assert_eq!(mesh.check_face(face), Ok(()));
        }

        assert_eq!(mesh.shared_runs(quad, hexagon), 2);
        assert_eq!(mesh.shared_runs(hexagon, quad), 2);
        assert_eq!(mesh.shared_runs(quad, inner), 1);
        assert_eq!(mesh.shared_runs(hexagon, inner), 1);
        assert_eq!(mesh.shared_runs(quad, bottom), 1);
        assert_eq!(mesh.shared_runs(inner, bottom), 0);
    }

    #[test]
    fn self_adjacent_edge_is_reported() {
        let (mut mesh, [quad, ..]) = split_annulus();
        // Hand the hexagon's 4-1 edge to the quad, as a bad splice would.
        let he = mesh.face_edges(quad).find(|&he| mesh.head(he) == VertexId(4)).unwrap();
        let opp = mesh.opposite(he);
        mesh.half_edges[opp.0].face = quad;

        assert_eq!(
            mesh.check_face(quad),
            Err(MeshError::SelfAdjacent { tail: 1, head: 4 })
        );
    }
}
