/// Reasons a point set cannot produce a three-dimensional hull.
///
/// All of these are detected while the initial simplex is being built, before
/// any hull state is produced. The condition is a property of the input, so
/// retrying the same build will fail the same way.
///
/// ```
/// use nalgebra::Point3;
/// use quickhull::{ConvexHull, DegenerateInputError};
///
/// let points = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(2.0, 0.0, 0.0),
///     Point3::new(3.0, 0.0, 0.0),
/// ];
///
/// assert_eq!(
///     ConvexHull::from_points(&points).err(),
///     Some(DegenerateInputError::ColinearPoints)
/// );
/// ```
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegenerateInputError {
    /// Fewer than four points were given.
    #[error("less than four input points specified ({0} given)")]
    TooFewPoints(usize),
    /// Every axis extent is within the distance tolerance.
    #[error("input points appear to be coincident")]
    CoincidentPoints,
    /// No point is far enough from the line through the two extreme points.
    #[error("input points appear to be colinear")]
    ColinearPoints,
    /// No point is far enough from the plane of the first three simplex points.
    #[error("input points appear to be coplanar")]
    CoplanarPoints,
}

/// A broken invariant in the boundary ring of a single face.
///
/// Vertices are named by their input index. These indicate a bug in hull
/// construction, never a property of the input.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MeshError {
    #[error("degenerate face with {0} vertices")]
    DegenerateFace(usize),
    #[error("unreflected half edge {tail}-{head}")]
    UnreflectedHalfEdge { tail: usize, head: usize },
    #[error("opposite of half edge {tail}-{head} does not point back to it")]
    AsymmetricOpposite { tail: usize, head: usize },
    #[error("half edge {tail}-{head} reflected by {opposite_tail}-{opposite_head}")]
    MismatchedOpposite {
        tail: usize,
        head: usize,
        opposite_tail: usize,
        opposite_head: usize,
    },
    #[error("half edge {tail}-{head} is opposite an edge of its own face")]
    SelfAdjacent { tail: usize, head: usize },
    #[error("face opposite half edge {tail}-{head} is not on the hull")]
    OppositeFaceDeleted { tail: usize, head: usize },
    #[error("face ring has {found} vertices, expected {expected}")]
    VertexCountMismatch { expected: usize, found: usize },
}

/// Failures reported by [`ConvexHull::check`](crate::ConvexHull::check).
///
/// Faces are named by their position in [`ConvexHull::faces`](crate::ConvexHull::faces),
/// vertices and points by their input index.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("no hull has been built")]
    Empty,
    #[error("face {face}: {source}")]
    Mesh {
        face: usize,
        #[source]
        source: MeshError,
    },
    #[error("edge {tail}-{head} non-convex by {distance}")]
    NonConvexEdge { tail: usize, head: usize, distance: f64 },
    #[error("redundant vertex {vertex} in face {face}")]
    RedundantVertex { face: usize, vertex: usize },
    #[error("point {point} is {distance} above face {face}")]
    PointOutside {
        point: usize,
        face: usize,
        distance: f64,
    },
    #[error("edge {0}-{1} is shared by {2} half edges")]
    NonManifoldEdge(usize, usize, usize),
    #[error("euler characteristic is {0}, expected 2")]
    EulerCharacteristic(i64),
}
