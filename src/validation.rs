use indexmap::IndexMap;

use crate::error::ValidationError;
use crate::format::FaceFormat;
use crate::mesh::FaceId;
use crate::ConvexHull;

impl ConvexHull {
    /// Checks the hull against its own distance tolerance.
    ///
    /// See [`check_with_tolerance`](Self::check_with_tolerance).
    pub fn check(&self) -> Result<(), ValidationError> {
        self.check_with_tolerance(self.tolerance)
    }

    /// Verifies that the last build produced a closed convex polyhedron
    /// containing every input point.
    ///
    /// Face rings and edge convexity are checked against the build tolerance;
    /// input points may lie up to `10 * tolerance` above a face. Hulls that
    /// went through [`triangulate`](Self::triangulate) can fail the convexity
    /// test on thin fan triangles.
    pub fn check_with_tolerance(&self, tolerance: f64) -> Result<(), ValidationError> {
        if self.hull_faces.is_empty() {
            return Err(ValidationError::Empty);
        }

        for (i, &face) in self.hull_faces.iter().enumerate() {
            self.mesh
                .check_face(face)
                .map_err(|source| ValidationError::Mesh { face: i, source })?;
            self.check_face_convexity(i, face)?;
        }

        let point_tolerance = 10.0 * tolerance;
        for (point, vertex) in self.mesh.vertices.iter().enumerate() {
            for (i, &face) in self.hull_faces.iter().enumerate() {
                let distance = self.mesh.face(face).distance_to_plane(&vertex.point);
                if distance > point_tolerance {
                    return Err(ValidationError::PointOutside {
                        point,
                        face: i,
                        distance,
                    });
                }
            }
        }

        self.check_topology()
    }

    fn check_face_convexity(&self, index: usize, face: FaceId) -> Result<(), ValidationError> {
        for he in self.mesh.face_edges(face) {
            let tail = self.mesh.tail(he).0;
            let head = self.mesh.head(he).0;

            for distance in [
                self.mesh.opposite_face_distance(he),
                self.mesh.opposite_face_distance(self.mesh.opposite(he)),
            ] {
                if distance > self.tolerance {
                    return Err(ValidationError::NonConvexEdge {
                        tail,
                        head,
                        distance,
                    });
                }
            }

            if self.mesh.opposite_face(self.mesh.next(he)) == self.mesh.opposite_face(he) {
                return Err(ValidationError::RedundantVertex {
                    face: index,
                    vertex: head,
                });
            }
        }
        Ok(())
    }

    /// Every undirected edge must be shared by exactly two faces, and the
    /// counts must satisfy Euler's formula for a sphere.
    fn check_topology(&self) -> Result<(), ValidationError> {
        let mut edges: IndexMap<(usize, usize), usize> = IndexMap::new();
        for face in self.faces_with(FaceFormat::default().input_indices()) {
            for (k, &a) in face.iter().enumerate() {
                let b = face[(k + 1) % face.len()];
                *edges.entry((a.min(b), a.max(b))).or_insert(0) += 1;
            }
        }

        if let Some((&(a, b), &count)) = edges.iter().find(|(_, count)| **count != 2) {
            return Err(ValidationError::NonManifoldEdge(a, b, count));
        }

        let euler = self.vertex_count() as i64 - edges.len() as i64 + self.face_count() as i64;
        if euler != 2 {
            return Err(ValidationError::EulerCharacteristic(euler));
        }
        Ok(())
    }
}
