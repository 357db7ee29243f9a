//! Convex hulls of 3D point sets.
//!
//! Hulls are built with an incremental Quickhull: starting from a tetrahedron
//! spanned by extreme points, the farthest point outside some face is added
//! until no point remains outside. Faces that end up coplanar or slightly
//! concave within the distance tolerance are merged, so the result is made of
//! convex polygons rather than triangles. Call [`ConvexHull::triangulate`] to
//! get triangles.
//!
//! ```
//! use nalgebra::Point3;
//! use quickhull::ConvexHull;
//!
//! let points = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.5, 0.0),
//!     Point3::new(2.0, 0.0, 0.0),
//!     Point3::new(0.5, 0.5, 0.5),
//!     Point3::new(0.0, 0.0, 2.0),
//!     Point3::new(0.1, 0.2, 0.3),
//!     Point3::new(0.0, 2.0, 0.0),
//! ];
//!
//! let hull = ConvexHull::from_points(&points).unwrap();
//! assert_eq!(hull.vertex_count(), 4);
//! assert_eq!(hull.face_count(), 4);
//! ```
use nalgebra as na;

mod builder;
mod conflict;
mod error;
mod format;
mod math;
mod mesh;
mod validation;

#[cfg(feature = "genmesh")]
mod genmesh;

pub use crate::error::{DegenerateInputError, MeshError, ValidationError};
pub use crate::format::{DistanceTolerance, FaceFormat, IndexSpace, Winding};
pub use crate::math::{Point, Vector, DOUBLE_PREC};

use crate::conflict::{FaceList, VertexList};
use crate::mesh::{FaceId, HalfEdgeId, Mesh, VertexId};

/// A convex hull builder and the last hull it built.
///
/// The same instance can be rebuilt any number of times; its internal buffers
/// are reused. A failed build leaves it empty.
#[derive(Clone, Debug, Default)]
pub struct ConvexHull {
    pub(crate) mesh: Mesh,
    pub(crate) claimed: VertexList,
    pub(crate) unclaimed: VertexList,
    pub(crate) new_faces: FaceList,
    pub(crate) horizon: Vec<HalfEdgeId>,
    pub(crate) discarded: Vec<FaceId>,
    /// Faces of the finished hull, in creation order.
    pub(crate) hull_faces: Vec<FaceId>,
    /// Input index of each hull vertex.
    pub(crate) vertex_point_indices: Vec<usize>,
    pub(crate) explicit_tolerance: DistanceTolerance,
    pub(crate) tolerance: f64,
    pub(crate) char_length: f64,
}

impl ConvexHull {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the hull of `points` in one go.
    pub fn from_points(points: &[na::Point3<f64>]) -> Result<Self, DegenerateInputError> {
        let mut hull = Self::new();
        hull.build(points)?;
        Ok(hull)
    }

    /// The hull vertices, ordered by their position in the input.
    pub fn vertices(&self) -> Vec<na::Point3<f64>> {
        self.vertex_point_indices
            .iter()
            .map(|&i| *self.mesh.point(VertexId(i)))
            .collect()
    }

    /// For each hull vertex, the index of the input point it came from.
    pub fn vertex_point_indices(&self) -> &[usize] {
        &self.vertex_point_indices
    }

    /// Faces as counter-clockwise, zero-based indices into
    /// [`vertices`](Self::vertices).
    pub fn faces(&self) -> Vec<Vec<usize>> {
        self.faces_with(FaceFormat::default())
    }

    pub fn faces_with(&self, format: FaceFormat) -> Vec<Vec<usize>> {
        self.hull_faces
            .iter()
            .map(|&face| self.face_indices(face, format))
            .collect()
    }

    fn face_indices(&self, face: FaceId, format: FaceFormat) -> Vec<usize> {
        let base = usize::from(format.one_based);
        let he0 = self.mesh.face(face).he0;
        let mut indices = Vec::with_capacity(self.mesh.face(face).num_verts);
        let mut he = he0;
        loop {
            let vertex = self.mesh.head(he);
            let idx = match format.indices {
                IndexSpace::Input => vertex.0,
                IndexSpace::Hull => self
                    .mesh
                    .vertex(vertex)
                    .hull_index
                    .expect("hull face references a vertex without a hull index"),
            };
            indices.push(idx + base);
            he = match format.winding {
                Winding::CounterClockwise => self.mesh.next(he),
                Winding::Clockwise => self.mesh.prev(he),
            };
            if he == he0 {
                return indices;
            }
        }
    }

    /// Outward unit normal of each face, in [`faces`](Self::faces) order.
    pub fn face_normals(&self) -> Vec<na::Vector3<f64>> {
        self.hull_faces
            .iter()
            .map(|&face| self.mesh.face(face).normal)
            .collect()
    }

    pub fn face_count(&self) -> usize {
        self.hull_faces.len()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_point_indices.len()
    }

    /// The tolerance used by the most recent build.
    pub fn distance_tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn explicit_distance_tolerance(&self) -> DistanceTolerance {
        self.explicit_tolerance
    }

    /// Sets the tolerance for subsequent builds.
    pub fn set_distance_tolerance(&mut self, tolerance: DistanceTolerance) {
        self.explicit_tolerance = tolerance;
    }

    #[cfg(feature = "genmesh")]
    pub fn mesh_generator(&self) -> crate::genmesh::ConvexHullMeshGenerator {
        crate::genmesh::ConvexHullMeshGenerator::new(self)
    }
}
