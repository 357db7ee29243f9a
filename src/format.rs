/// How the distance tolerance for a build is chosen.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum DistanceTolerance {
    /// Derived from the magnitude of the input coordinates on every build.
    #[default]
    Automatic,
    /// Used as given until reset to [`DistanceTolerance::Automatic`].
    Explicit(f64),
}

/// Direction in which face vertices are listed, seen from outside the hull.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Winding {
    #[default]
    CounterClockwise,
    Clockwise,
}

/// Which index space face indices refer to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum IndexSpace {
    /// Positions in [`ConvexHull::vertices`](crate::ConvexHull::vertices).
    #[default]
    Hull,
    /// Positions in the point slice the hull was built from.
    Input,
}

/// Output options for [`ConvexHull::faces_with`](crate::ConvexHull::faces_with).
///
/// ```
/// use quickhull::{FaceFormat, IndexSpace, Winding};
///
/// let format = FaceFormat::default().clockwise().one_based();
/// assert_eq!(format.winding, Winding::Clockwise);
/// assert_eq!(format.indices, IndexSpace::Hull);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FaceFormat {
    pub winding: Winding,
    /// Number the first vertex 1 instead of 0.
    pub one_based: bool,
    pub indices: IndexSpace,
}

impl FaceFormat {
    pub fn clockwise(mut self) -> Self {
        self.winding = Winding::Clockwise;
        self
    }

    pub fn one_based(mut self) -> Self {
        self.one_based = true;
        self
    }

    pub fn input_indices(mut self) -> Self {
        self.indices = IndexSpace::Input;
        self
    }
}
