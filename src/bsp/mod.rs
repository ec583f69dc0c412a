//! Brush BSP tree construction.
//!
//! The tree builder recursively partitions a brush list: at each node a
//! heuristic picks the best splitting side out of the remaining brushes, the
//! split engine chops the straddling brushes and the node volume, and the
//! two disjoint child problems recurse (in parallel when the `parallel`
//! feature is on). Nodes where no splitter is found become leaves carrying
//! the combined contents of the brushes that reached them.

pub mod builder;
pub mod classify;
pub mod node;
pub mod select;

pub use builder::{brush_bsp, BspStats};
pub use classify::{box_on_plane_side, test_brush_to_plane, BrushPlaneTest};
pub use node::{Node, Tree};
pub use select::{select_split_side, SplitChoice};

/// Brush placement relative to a plane.
pub const PSIDE_FRONT: u8 = 1;
pub const PSIDE_BACK: u8 = 2;
pub const PSIDE_BOTH: u8 = PSIDE_FRONT | PSIDE_BACK;
/// OR'ed in when one of the brush sides lies on the tested plane.
pub const PSIDE_FACING: u8 = 4;
