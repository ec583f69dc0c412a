#![forbid(unsafe_code)]
//! Brush-based binary space partitioning.
//!
//! Takes a list of convex solid brushes and recursively partitions space
//! into a tree whose interior nodes are oriented planes and whose leaves
//! classify the volume they enclose. The entry point is
//! [`bsp::brush_bsp`]; game-specific content rules come in through a
//! [`game::GameAdapter`].

pub mod brush;
pub mod bsp;
pub mod errors;
pub mod float_types;
pub mod game;
pub mod options;
pub mod plane;
pub mod winding;
