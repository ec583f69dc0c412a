use crate::float_types::Real;

/// All the ways a winding or plane construction can degenerate.
#[derive(Clone, Debug, thiserror::Error, PartialEq)]
pub enum GeometryError {
    /// A winding needs at least 3 points to span a plane.
    #[error("winding has {0} points, need at least 3")]
    TooFewPoints(usize),
    /// The points are (nearly) colinear and do not define a plane.
    #[error("points are colinear, no plane can be derived")]
    DegeneratePlane,
    /// Winding area collapsed below the sanity threshold.
    #[error("winding area {0} is degenerate")]
    TinyArea(Real),
    /// A coordinate escaped the configured world extent.
    #[error("coordinate {0} exceeds the world extent")]
    OutOfRange(Real),
    /// A vertex drifted off the winding's own plane.
    #[error("point is {0} off the winding plane")]
    PointOffPlane(Real),
    /// The vertex ring is not convex at the given point index.
    #[error("winding is not convex at point {0}")]
    NotConvex(usize),
}
