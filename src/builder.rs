use crate::conflict::outside_set;
use crate::error::DegenerateInputError;
use crate::format::DistanceTolerance;
use crate::math::{Point, Vector, DOUBLE_PREC};
use crate::mesh::{FaceId, FaceMark, HalfEdgeId, VertexId, VertexState};
use crate::ConvexHull;

/// Points farther than this many tolerances outside a new face are assigned
/// to it without looking at the remaining new faces.
const CLAIM_SHORTCUT_FACTOR: f64 = 1000.0;

/// Simplex points must be this many tolerances off the line or plane through
/// the previous ones.
const SIMPLEX_SEPARATION_FACTOR: f64 = 100.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum MergeKind {
    /// Merge when the larger face sees the neighbour as non-convex; defer the
    /// case where only the smaller face does.
    NonConvexWrtLargerFace,
    /// Merge when either face sees the other as non-convex.
    NonConvex,
}

/// Points with the smallest and largest coordinate along each axis.
struct Extremes {
    min: [VertexId; 3],
    max: [VertexId; 3],
}

/// Pending work in the horizon walk: the edges of one face still to cross,
/// from `edge` up to but excluding `stop`.
struct HorizonFrame {
    edge: HalfEdgeId,
    stop: HalfEdgeId,
    done: bool,
}

impl ConvexHull {
    /// Computes the hull of `points`, replacing whatever hull was held before.
    ///
    /// Handles from a previous build are invalidated as soon as this starts.
    pub fn build(&mut self, points: &[Point]) -> Result<(), DegenerateInputError> {
        self.reset(points);

        if points.len() < 4 {
            let err = DegenerateInputError::TooFewPoints(points.len());
            log::debug!("rejecting input: {}", err);
            return Err(err);
        }

        let extremes = self.compute_max_and_min();
        if let Err(err) = self.create_initial_simplex(&extremes) {
            log::debug!("rejecting input: {}", err);
            self.reset(&[]);
            return Err(err);
        }

        let mut iterations = 0;
        while let Some(eye) = self.next_point_to_add() {
            self.add_point_to_hull(eye);
            iterations += 1;
        }
        self.reindex_faces_and_vertices();

        log::debug!(
            "built hull of {} points: {} vertices, {} faces after {} insertions",
            points.len(),
            self.vertex_count(),
            self.face_count(),
            iterations
        );
        Ok(())
    }

    /// Splits every face with more than three sides into a triangle fan.
    pub fn triangulate(&mut self) {
        let min_area = 1000.0 * self.char_length * DOUBLE_PREC;
        self.new_faces.clear();
        for i in 0..self.hull_faces.len() {
            let face = self.hull_faces[i];
            if self.mesh.face(face).is_visible() {
                self.mesh.triangulate_face(face, min_area, &mut self.new_faces);
            }
        }
        self.hull_faces.extend_from_slice(self.new_faces.as_slice());
        log::debug!(
            "triangulated hull: {} new faces, {} total",
            self.new_faces.len(),
            self.hull_faces.len()
        );
        self.new_faces.clear();
    }

    fn reset(&mut self, points: &[Point]) {
        self.mesh.reset(points);
        self.claimed.clear();
        self.unclaimed.clear();
        self.new_faces.clear();
        self.horizon.clear();
        self.discarded.clear();
        self.hull_faces.clear();
        self.vertex_point_indices.clear();
    }

    /// Finds the extreme points along each axis and derives the tolerance.
    fn compute_max_and_min(&mut self) -> Extremes {
        let first = VertexId(0);
        let mut extremes = Extremes {
            min: [first; 3],
            max: [first; 3],
        };
        let mut min = *self.mesh.point(first);
        let mut max = min;

        for (i, vertex) in self.mesh.vertices.iter().enumerate().skip(1) {
            let p = vertex.point;
            for axis in 0..3 {
                if p[axis] > max[axis] {
                    max[axis] = p[axis];
                    extremes.max[axis] = VertexId(i);
                } else if p[axis] < min[axis] {
                    min[axis] = p[axis];
                    extremes.min[axis] = VertexId(i);
                }
            }
        }

        self.char_length = (max - min).max();
        self.tolerance = match self.explicit_tolerance {
            DistanceTolerance::Automatic => {
                let magnitude: f64 = (0..3).map(|a| max[a].abs().max(min[a].abs())).sum();
                3.0 * DOUBLE_PREC * magnitude
            }
            DistanceTolerance::Explicit(tolerance) => tolerance,
        };
        log::debug!(
            "characteristic length {}, distance tolerance {}",
            self.char_length,
            self.tolerance
        );
        extremes
    }

    fn create_initial_simplex(&mut self, extremes: &Extremes) -> Result<(), DegenerateInputError> {
        let mut max: f64 = 0.0;
        let mut imax = 0;
        for axis in 0..3 {
            let diff = self.mesh.point(extremes.max[axis])[axis]
                - self.mesh.point(extremes.min[axis])[axis];
            if diff > max {
                max = diff;
                imax = axis;
            }
        }
        if max <= self.tolerance {
            return Err(DegenerateInputError::CoincidentPoints);
        }

        let v0 = extremes.max[imax];
        let v1 = extremes.min[imax];
        let p0 = *self.mesh.point(v0);

        // Third vertex: farthest from the line v0-v1.
        let u01 = (self.mesh.point(v1) - p0).normalize();
        let mut max_sqr: f64 = 0.0;
        let mut v2 = None;
        let mut normal = Vector::zeros();
        for (i, vertex) in self.mesh.vertices.iter().enumerate() {
            let xprod = u01.cross(&(vertex.point - p0));
            let len_sqr = xprod.norm_squared();
            if len_sqr > max_sqr && VertexId(i) != v0 && VertexId(i) != v1 {
                max_sqr = len_sqr;
                v2 = Some(VertexId(i));
                normal = xprod;
            }
        }
        let v2 = match v2 {
            Some(v2) if max_sqr.sqrt() > SIMPLEX_SEPARATION_FACTOR * self.tolerance => v2,
            _ => return Err(DegenerateInputError::ColinearPoints),
        };
        normal.normalize_mut();

        // Fourth vertex: farthest from the plane through v0, v1, v2.
        let d0 = self.mesh.point(v2).coords.dot(&normal);
        let mut max_dist: f64 = 0.0;
        let mut v3 = None;
        for (i, vertex) in self.mesh.vertices.iter().enumerate() {
            let dist = (vertex.point.coords.dot(&normal) - d0).abs();
            let id = VertexId(i);
            if dist > max_dist && id != v0 && id != v1 && id != v2 {
                max_dist = dist;
                v3 = Some(id);
            }
        }
        let v3 = match v3 {
            Some(v3) if max_dist > SIMPLEX_SEPARATION_FACTOR * self.tolerance => v3,
            _ => return Err(DegenerateInputError::CoplanarPoints),
        };

        let tris = if self.mesh.point(v3).coords.dot(&normal) - d0 < 0.0 {
            let tris = [
                self.mesh.create_triangle(v0, v1, v2, 0.0),
                self.mesh.create_triangle(v3, v1, v0, 0.0),
                self.mesh.create_triangle(v3, v2, v1, 0.0),
                self.mesh.create_triangle(v3, v0, v2, 0.0),
            ];
            for i in 0..3 {
                let k = (i + 1) % 3;
                let (a, b) = (self.mesh.edge(tris[i + 1], 1), self.mesh.edge(tris[k + 1], 0));
                self.mesh.set_opposite(a, b);
                let (a, b) = (
                    self.mesh.edge(tris[i + 1], 2),
                    self.mesh.edge(tris[0], k as isize),
                );
                self.mesh.set_opposite(a, b);
            }
            tris
        } else {
            let tris = [
                self.mesh.create_triangle(v0, v2, v1, 0.0),
                self.mesh.create_triangle(v3, v0, v1, 0.0),
                self.mesh.create_triangle(v3, v1, v2, 0.0),
                self.mesh.create_triangle(v3, v2, v0, 0.0),
            ];
            for i in 0..3 {
                let k = (i + 1) % 3;
                let (a, b) = (self.mesh.edge(tris[i + 1], 0), self.mesh.edge(tris[k + 1], 1));
                self.mesh.set_opposite(a, b);
                let (a, b) = (
                    self.mesh.edge(tris[i + 1], 2),
                    self.mesh.edge(tris[0], ((3 - i) % 3) as isize),
                );
                self.mesh.set_opposite(a, b);
            }
            tris
        };
        log::debug!("initial simplex {} {} {} {}", v0.0, v1.0, v2.0, v3.0);

        let simplex = [v0, v1, v2, v3];
        for i in 0..self.mesh.vertices.len() {
            let v = VertexId(i);
            if simplex.contains(&v) {
                continue;
            }
            let point = *self.mesh.point(v);
            let mut max_dist = self.tolerance;
            let mut max_face = None;
            for &face in &tris {
                let dist = self.mesh.face(face).distance_to_plane(&point);
                if dist > max_dist {
                    max_face = Some(face);
                    max_dist = dist;
                }
            }
            if let Some(face) = max_face {
                self.add_point_to_face(v, face);
            }
        }
        Ok(())
    }

    fn add_point_to_face(&mut self, v: VertexId, face: FaceId) {
        self.mesh.vertex_mut(v).state = VertexState::Claimed(face);
        match self.mesh.face(face).outside {
            None => self.claimed.add(&mut self.mesh.vertices, v),
            Some(outside) => self.claimed.insert_before(&mut self.mesh.vertices, v, outside),
        }
        self.mesh.face_mut(face).outside = Some(v);
    }

    fn remove_point_from_face(&mut self, v: VertexId, face: FaceId) {
        if self.mesh.face(face).outside == Some(v) {
            let next = self
                .mesh
                .vertex(v)
                .next
                .filter(|&n| self.mesh.vertex(n).state == VertexState::Claimed(face));
            self.mesh.face_mut(face).outside = next;
        }
        self.claimed.delete(&mut self.mesh.vertices, v);
        self.mesh.vertex_mut(v).state = VertexState::Unassigned;
    }

    /// Detaches the outside set of `face` from the claimed list and returns
    /// its first vertex. The run stays chained through `next`.
    fn remove_all_points_from_face(&mut self, face: FaceId) -> Option<VertexId> {
        let first = self.mesh.face_mut(face).outside.take()?;
        let last = outside_set(&self.mesh.vertices, face, Some(first))
            .last()
            .unwrap_or(first);
        self.claimed.delete_range(&mut self.mesh.vertices, first, last);
        self.mesh.vertex_mut(last).next = None;
        Some(first)
    }

    /// Releases the outside set of `face`. Points still outside
    /// `absorbing_face` move to it, the rest become unclaimed.
    fn delete_face_points(&mut self, face: FaceId, absorbing_face: Option<FaceId>) {
        let Some(first) = self.remove_all_points_from_face(face) else {
            return;
        };
        match absorbing_face {
            None => {
                let mut next = Some(first);
                while let Some(v) = next {
                    next = self.mesh.vertex(v).next;
                    self.mesh.vertex_mut(v).state = VertexState::Unclaimed;
                }
                self.unclaimed.add_all(&mut self.mesh.vertices, first);
            }
            Some(absorbing) => {
                let mut next = Some(first);
                while let Some(v) = next {
                    next = self.mesh.vertex(v).next;
                    let dist = self.mesh.face(absorbing).distance_to_plane(self.mesh.point(v));
                    if dist > self.tolerance {
                        self.add_point_to_face(v, absorbing);
                    } else {
                        self.mesh.vertex_mut(v).state = VertexState::Unclaimed;
                        self.unclaimed.add(&mut self.mesh.vertices, v);
                    }
                }
            }
        }
    }

    /// The farthest point in the outside set of the first claimed face.
    ///
    /// A merge can tilt a face so that none of its points is above it any
    /// more. Such a set is released and the search moves on.
    fn next_point_to_add(&mut self) -> Option<VertexId> {
        loop {
            let first = self.claimed.first()?;
            let VertexState::Claimed(eye_face) = self.mesh.vertex(first).state else {
                return None;
            };
            let face = self.mesh.face(eye_face);

            let mut eye = None;
            let mut max_dist = 0.0;
            for v in outside_set(&self.mesh.vertices, eye_face, face.outside) {
                let dist = face.distance_to_plane(self.mesh.point(v));
                if dist > max_dist {
                    max_dist = dist;
                    eye = Some(v);
                }
            }
            if eye.is_some() {
                return eye;
            }

            log::trace!("face {} has no point above it, releasing its outside set", eye_face.0);
            self.release_outside_set(eye_face);
        }
    }

    /// Moves each point of the outside set of `face` to the visible face it is
    /// farthest above, or drops it as interior.
    fn release_outside_set(&mut self, face: FaceId) {
        let mut next = self.remove_all_points_from_face(face);
        while let Some(v) = next {
            next = self.mesh.vertex(v).next;
            let point = *self.mesh.point(v);

            let mut max_dist = self.tolerance;
            let mut max_face = None;
            for (i, f) in self.mesh.faces.iter().enumerate() {
                if f.is_visible() {
                    let dist = f.distance_to_plane(&point);
                    if dist > max_dist {
                        max_dist = dist;
                        max_face = Some(FaceId(i));
                    }
                }
            }

            match max_face {
                Some(absorbing) => self.add_point_to_face(v, absorbing),
                None => self.mesh.vertex_mut(v).state = VertexState::Unassigned,
            }
        }
    }

    fn add_point_to_hull(&mut self, eye: VertexId) {
        self.horizon.clear();
        self.unclaimed.clear();

        let VertexState::Claimed(eye_face) = self.mesh.vertex(eye).state else {
            return;
        };
        self.remove_point_from_face(eye, eye_face);
        let eye_point = *self.mesh.point(eye);
        self.calculate_horizon(&eye_point, eye_face);
        self.add_new_faces(eye);

        let mut merges = 0;
        for i in 0..self.new_faces.len() {
            let face = self.new_faces.as_slice()[i];
            if self.mesh.face(face).mark() == FaceMark::Visible {
                while self.do_adjacent_merge(face, MergeKind::NonConvexWrtLargerFace) {
                    merges += 1;
                }
            }
        }
        for i in 0..self.new_faces.len() {
            let face = self.new_faces.as_slice()[i];
            if self.mesh.face(face).mark() == FaceMark::NonConvex {
                self.mesh.face_mut(face).set_mark(FaceMark::Visible);
                while self.do_adjacent_merge(face, MergeKind::NonConvex) {
                    merges += 1;
                }
            }
        }

        log::trace!(
            "added point {}: horizon of {} edges, {} merges",
            eye.0,
            self.horizon.len(),
            merges
        );
        self.resolve_unclaimed_points();
    }

    /// Deletes every face visible from `eye_point`, starting at `eye_face`,
    /// and collects the boundary of the deleted region in order.
    fn calculate_horizon(&mut self, eye_point: &Point, eye_face: FaceId) {
        self.delete_face_points(eye_face, None);
        self.mesh.face_mut(eye_face).set_mark(FaceMark::Deleted);

        let he0 = self.mesh.face(eye_face).he0;
        let mut stack = vec![HorizonFrame {
            edge: he0,
            stop: he0,
            done: false,
        }];

        while let Some(frame) = stack.last_mut() {
            if frame.done {
                stack.pop();
                continue;
            }
            let edge = frame.edge;
            frame.edge = self.mesh.next(edge);
            frame.done = frame.edge == frame.stop;

            let opp_face = self.mesh.opposite_face(edge);
            if self.mesh.face(opp_face).mark() != FaceMark::Visible {
                continue;
            }
            if self.mesh.face(opp_face).distance_to_plane(eye_point) > self.tolerance {
                self.delete_face_points(opp_face, None);
                self.mesh.face_mut(opp_face).set_mark(FaceMark::Deleted);
                let entry = self.mesh.opposite(edge);
                stack.push(HorizonFrame {
                    edge: self.mesh.next(entry),
                    stop: entry,
                    done: false,
                });
            } else {
                self.horizon.push(edge);
            }
        }
    }

    /// Builds the triangle joining `eye` to horizon edge `he` and returns its
    /// side edge ending at the eye.
    fn add_adjoining_face(&mut self, eye: VertexId, he: HalfEdgeId) -> HalfEdgeId {
        let face = self.mesh.create_triangle(eye, self.mesh.tail(he), self.mesh.head(he), 0.0);
        let (outer, across) = (self.mesh.edge(face, -1), self.mesh.opposite(he));
        self.mesh.set_opposite(outer, across);
        self.mesh.edge(face, 0)
    }

    fn add_new_faces(&mut self, eye: VertexId) {
        self.new_faces.clear();

        let mut side_begin = None;
        let mut side_prev = None;
        for i in 0..self.horizon.len() {
            let side = self.add_adjoining_face(eye, self.horizon[i]);
            match side_prev {
                Some(prev) => {
                    let next = self.mesh.next(side);
                    self.mesh.set_opposite(next, prev);
                }
                None => side_begin = Some(side),
            }
            self.new_faces.push(self.mesh.face_of(side));
            side_prev = Some(side);
        }

        if let (Some(begin), Some(prev)) = (side_begin, side_prev) {
            let next = self.mesh.next(begin);
            self.mesh.set_opposite(next, prev);
        }
    }

    /// Merges `face` with the first neighbour that fails the convexity test
    /// for `kind`. Returns whether a merge happened.
    fn do_adjacent_merge(&mut self, face: FaceId, kind: MergeKind) -> bool {
        let tolerance = self.tolerance;
        let he0 = self.mesh.face(face).he0;
        let mut he = he0;
        let mut convex = true;

        loop {
            let opp_face = self.mesh.opposite_face(he);
            let across = self.mesh.opposite_face_distance(he);
            let back = self.mesh.opposite_face_distance(self.mesh.opposite(he));

            let merge = match kind {
                MergeKind::NonConvex => across > -tolerance || back > -tolerance,
                MergeKind::NonConvexWrtLargerFace => {
                    let larger = self.mesh.face(face).area > self.mesh.face(opp_face).area;
                    let (own, other) = if larger {
                        (across, back)
                    } else {
                        (back, across)
                    };
                    if own > -tolerance {
                        true
                    } else {
                        if other > -tolerance {
                            convex = false;
                        }
                        false
                    }
                }
            };

            if merge && self.mesh.shared_runs(face, opp_face) != 1 {
                log::trace!(
                    "not merging face {} into {}: they meet along separate edges",
                    opp_face.0,
                    face.0
                );
            } else if merge {
                let mut discarded = std::mem::take(&mut self.discarded);
                self.mesh.merge_adjacent_face(face, he, &mut discarded);
                for &gone in &discarded {
                    self.delete_face_points(gone, Some(face));
                }
                self.discarded = discarded;
                return true;
            }

            he = self.mesh.next(he);
            if he == he0 {
                break;
            }
        }

        if !convex {
            self.mesh.face_mut(face).set_mark(FaceMark::NonConvex);
        }
        false
    }

    /// Hands every unclaimed point to the new face it is farthest outside of,
    /// or drops it as interior.
    fn resolve_unclaimed_points(&mut self) {
        let shortcut = CLAIM_SHORTCUT_FACTOR * self.tolerance;
        let mut next = self.unclaimed.first();

        while let Some(v) = next {
            next = self.mesh.vertex(v).next;
            let point = *self.mesh.point(v);

            let mut max_dist = self.tolerance;
            let mut max_face = None;
            for &face in self.new_faces.as_slice() {
                let f = self.mesh.face(face);
                if f.is_visible() {
                    let dist = f.distance_to_plane(&point);
                    if dist > max_dist {
                        max_dist = dist;
                        max_face = Some(face);
                    }
                    if max_dist > shortcut {
                        break;
                    }
                }
            }

            match max_face {
                Some(face) => self.add_point_to_face(v, face),
                None => self.mesh.vertex_mut(v).state = VertexState::Unassigned,
            }
        }
        self.unclaimed.clear();
    }

    /// Keeps only visible faces and numbers the vertices they use, in input
    /// order.
    fn reindex_faces_and_vertices(&mut self) {
        for vertex in &mut self.mesh.vertices {
            vertex.hull_index = None;
        }

        self.hull_faces.clear();
        for (i, face) in self.mesh.faces.iter().enumerate() {
            if face.is_visible() {
                self.hull_faces.push(FaceId(i));
            }
        }

        let on_hull: Vec<VertexId> = self
            .hull_faces
            .iter()
            .flat_map(|&face| self.mesh.face_edges(face))
            .map(|he| self.mesh.head(he))
            .collect();
        for v in on_hull {
            self.mesh.vertex_mut(v).hull_index = Some(0);
        }

        self.vertex_point_indices.clear();
        for (i, vertex) in self.mesh.vertices.iter_mut().enumerate() {
            if vertex.hull_index.is_some() {
                vertex.hull_index = Some(self.vertex_point_indices.len());
                self.vertex_point_indices.push(i);
            }
        }
    }
}
