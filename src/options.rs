use crate::float_types::{
    Real, DEFAULT_MICRO_VOLUME, DEFAULT_SIDESPACE, DEFAULT_WORLD_EXTENT,
};

/// Build-wide configuration. Immutable once a build starts; shared by
/// reference across the worker tasks.
#[derive(Clone, Copy, Debug)]
pub struct BuildOptions {
    /// Half-extent of the world along each axis. Base windings are sized by
    /// this, and `Winding::is_huge` tests against it.
    pub world_extent: Real,
    /// Brushes below this volume are reported as microbrushes.
    pub micro_volume: Real,
    /// Margin added around the entity bounds to form the root node volume.
    pub side_space: Real,
}

impl Default for BuildOptions {
    fn default() -> Self {
        BuildOptions {
            world_extent: DEFAULT_WORLD_EXTENT,
            micro_volume: DEFAULT_MICRO_VOLUME,
            side_space: DEFAULT_SIDESPACE,
        }
    }
}
