//! Test support library
//! Provides a minimal game adapter and brush/tree helpers for tests.
#![allow(dead_code)]

use brushbsp::brush::{brush_from_bounds, Brush};
use brushbsp::bsp::Node;
use brushbsp::float_types::{parry3d::bounding_volume::Aabb, Real};
use brushbsp::game::{ContentFlags, ContentStats, GameAdapter};
use brushbsp::options::BuildOptions;
use brushbsp::plane::PlaneRegistry;
use nalgebra::Point3;
use std::any::Any;
use std::sync::atomic::{AtomicUsize, Ordering};

pub const CONTENTS_SOLID: ContentFlags = ContentFlags(1);
pub const CONTENTS_DETAIL: ContentFlags = ContentFlags(1 << 1);

/// Quick helper to compare floating-point results with an acceptable tolerance.
pub fn approx_eq(a: Real, b: Real, eps: Real) -> bool {
    (a - b).abs() < eps
}

#[derive(Default)]
pub struct TestStats {
    pub solid_leafs: AtomicUsize,
    pub empty_leafs: AtomicUsize,
}

impl ContentStats for TestStats {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A two-bit game: solid and detail, combined by OR.
pub struct TestGame;

impl GameAdapter for TestGame {
    fn create_empty_contents(&self) -> ContentFlags {
        ContentFlags(0)
    }

    fn combine_contents(&self, a: ContentFlags, b: ContentFlags) -> ContentFlags {
        ContentFlags(a.0 | b.0)
    }

    fn is_any_detail(&self, contents: ContentFlags) -> bool {
        (contents.0 & CONTENTS_DETAIL.0) != 0
    }

    fn create_content_stats(&self) -> Box<dyn ContentStats> {
        Box::new(TestStats::default())
    }

    fn count_contents_in_stats(&self, contents: ContentFlags, stats: &dyn ContentStats) {
        let stats = stats.as_any().downcast_ref::<TestStats>().unwrap();
        if (contents.0 & CONTENTS_SOLID.0) != 0 {
            stats.solid_leafs.fetch_add(1, Ordering::Relaxed);
        } else {
            stats.empty_leafs.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn print_content_stats(&self, stats: &dyn ContentStats, label: &str) {
        let stats = stats.as_any().downcast_ref::<TestStats>().unwrap();
        log::info!(
            target: "stat",
            "{:8} solid {label}, {:8} empty {label}",
            stats.solid_leafs.load(Ordering::Relaxed),
            stats.empty_leafs.load(Ordering::Relaxed),
        );
    }
}

pub fn aabb(mins: [Real; 3], maxs: [Real; 3]) -> Aabb {
    Aabb::new(Point3::from(mins), Point3::from(maxs))
}

/// An axial solid brush with all faces visible, as the map loader would
/// hand it to the builder.
pub fn solid_brush(
    planes: &PlaneRegistry,
    options: &BuildOptions,
    mins: [Real; 3],
    maxs: [Real; 3],
    original: usize,
) -> Brush {
    let mut brush = brush_from_bounds(&aabb(mins, maxs), planes, options);
    brush.original = original;
    brush.contents = CONTENTS_SOLID;
    for side in &mut brush.sides {
        side.visible = true;
    }
    brush
}

pub fn collect_leaves(node: &Node) -> Vec<&Node> {
    let mut leaves = Vec::new();
    let mut stack = vec![node];
    while let Some(current) = stack.pop() {
        if current.is_leaf() {
            leaves.push(current);
        }
        if let Some(front) = &current.front {
            stack.push(front);
        }
        if let Some(back) = &current.back {
            stack.push(back);
        }
    }
    leaves
}

pub fn collect_interior(node: &Node) -> Vec<&Node> {
    let mut interior = Vec::new();
    let mut stack = vec![node];
    while let Some(current) = stack.pop() {
        if !current.is_leaf() {
            interior.push(current);
        }
        if let Some(front) = &current.front {
            stack.push(front);
        }
        if let Some(back) = &current.back {
            stack.push(back);
        }
    }
    interior
}

/// Total volume of all leaves whose contents match `contents`.
pub fn leaf_volume_with_contents(
    node: &Node,
    contents: ContentFlags,
    planes: &PlaneRegistry,
) -> Real {
    collect_leaves(node)
        .iter()
        .filter(|leaf| leaf.contents == contents)
        .filter_map(|leaf| leaf.volume.as_ref())
        .map(|v| v.volume(planes))
        .sum()
}
