// Re-export parry for bounding volumes; the whole crate is double precision.
pub use parry3d_f64 as parry3d;

/// Our Real scalar type.
pub type Real = f64;

/// Maximum distance a winding vertex may sit off a plane and still classify
/// as ON during clipping.
pub const ON_EPSILON: Real = 0.1;

/// Tolerance for classifying a bounding box against a plane. If a brush just
/// barely pokes onto the other side, let it slide by without chopping.
///
/// Much tighter than [`ON_EPSILON`]; the two are not interchangeable.
pub const PLANESIDE_EPSILON: Real = 0.001;

/// Tolerance for plane-normal comparisons and axial snapping.
pub const NORMAL_EPSILON: Real = 1e-6;

/// Tolerance for plane-distance comparisons.
pub const DIST_EPSILON: Real = 1e-4;

/// Edge length below which a clipped winding counts as crunched out of
/// existence by vertex snapping.
pub const TINY_EDGE_LENGTH: Real = 0.2;

/// Default half-extent of the world along each axis.
pub const DEFAULT_WORLD_EXTENT: Real = 65536.0;

/// Default margin added around the input bounds to form the root volume.
pub const DEFAULT_SIDESPACE: Real = 8.0;

/// Default volume below which a brush is reported as a microbrush.
pub const DEFAULT_MICRO_VOLUME: Real = 1.0;
