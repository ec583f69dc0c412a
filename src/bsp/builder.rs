//! Recursive tree construction driver.

use crate::brush::{brush_from_bounds, split_brush, Brush, Side};
use crate::bsp::node::{Node, Tree};
use crate::bsp::select::select_split_side;
use crate::bsp::{PSIDE_BACK, PSIDE_BOTH, PSIDE_FACING, PSIDE_FRONT};
use crate::float_types::parry3d::bounding_volume::{Aabb, BoundingVolume};
use crate::game::{ContentStats, GameAdapter};
use crate::options::BuildOptions;
use crate::plane::{Plane, PlaneRegistry};
use log::{info, warn};
use nalgebra::Vector3;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Counters accumulated across the (parallel) build.
pub struct BspStats {
    /// Total number of interior nodes, including `nonvis`.
    pub nodes: AtomicUsize,
    /// Nodes created by splitting on a side that was not visible.
    pub nonvis: AtomicUsize,
    /// Total number of leafs.
    pub leafs: AtomicUsize,
    pub leafstats: Box<dyn ContentStats>,
}

struct BuildCtx<'a> {
    planes: &'a PlaneRegistry,
    game: &'a dyn GameAdapter,
    options: &'a BuildOptions,
    stats: &'a BspStats,
}

/// Turn `node` into a leaf holding the union of `brushes`' contents.
fn leaf_node(node: &mut Node, brushes: Vec<Brush>, ctx: &BuildCtx) {
    node.plane = None;
    node.side = None;

    node.contents = ctx.game.create_empty_contents();
    for brush in &brushes {
        node.contents = ctx.game.combine_contents(node.contents, brush.contents);
    }
    node.original_brushes = brushes.iter().map(|b| b.original).collect();

    ctx.game
        .count_contents_in_stats(node.contents, ctx.stats.leafstats.as_ref());
}

/// Partition `brushes` by the classification stored during splitter
/// selection, splitting the straddlers.
fn split_brush_list(
    brushes: Vec<Brush>,
    plane: &Plane,
    ctx: &BuildCtx,
) -> (Vec<Brush>, Vec<Brush>) {
    let mut front_list = Vec::new();
    let mut back_list = Vec::new();

    for mut brush in brushes {
        let sides = brush.side;

        if sides == PSIDE_BOTH {
            // split into two brushes
            let (front, back) = split_brush(brush, plane, ctx.planes, ctx.options);
            if let Some(front) = front {
                front_list.push(front);
            }
            if let Some(back) = back {
                back_list.push(back);
            }
            continue;
        }

        // if the plane is actually a part of the brush, flag the matching
        // sides as used so they won't be tried as a splitter again
        if (sides & PSIDE_FACING) != 0 {
            for side in &mut brush.sides {
                if ctx.planes.get(side.plane).epsilon_eq(plane) {
                    side.onnode = true;
                }
            }
        }

        if (sides & PSIDE_FRONT) != 0 {
            front_list.push(brush);
            continue;
        }
        if (sides & PSIDE_BACK) != 0 {
            back_list.push(brush);
        }
    }

    (front_list, back_list)
}

/// Called in parallel.
fn build_tree(node: &mut Node, mut brushes: Vec<Brush>, parents: &[Plane], ctx: &BuildCtx) {
    // find the best plane to use as a splitter
    let choice = {
        let volume = node.volume.as_ref().unwrap();
        select_split_side(&mut brushes, volume, parents, ctx.planes, ctx.game, ctx.options)
    };

    let Some(choice) = choice else {
        // this is a leaf node
        ctx.stats.leafs.fetch_add(1, Ordering::Relaxed);
        leaf_node(node, brushes, ctx);
        return;
    };

    // this is a splitplane node
    let winner = brushes[choice.brush].sides[choice.side].clone();
    let (handle, _) = ctx
        .planes
        .intern(&winner.face_plane(ctx.planes), true); // always use front facing
    let plane = ctx.planes.get(handle);

    ctx.stats.nodes.fetch_add(1, Ordering::Relaxed);
    if !winner.visible {
        ctx.stats.nonvis.fetch_add(1, Ordering::Relaxed);
    }

    node.plane = Some(handle);
    node.side = Some(winner);
    node.detail_separator = choice.late_pass;

    let (front_brushes, back_brushes) = split_brush_list(brushes, &plane, ctx);

    let volume = node.volume.as_ref().unwrap().clone();
    let (front_volume, back_volume) = split_brush(volume, &plane, ctx.planes, ctx.options);
    // the chooser already verified the plane divides this volume
    let (Some(front_volume), Some(back_volume)) = (front_volume, back_volume) else {
        unreachable!("selected plane failed to divide the node volume");
    };

    let mut front = Box::new(Node::new());
    front.volume = Some(front_volume);
    let mut back = Box::new(Node::new());
    back.volume = Some(back_volume);

    let mut child_parents = parents.to_vec();
    child_parents.push(plane);

    // the two subtrees operate on disjoint brush lists and share only
    // read-only state, so they recurse concurrently
    #[cfg(feature = "parallel")]
    rayon::join(
        || build_tree(&mut front, front_brushes, &child_parents, ctx),
        || build_tree(&mut back, back_brushes, &child_parents, ctx),
    );

    #[cfg(not(feature = "parallel"))]
    {
        build_tree(&mut front, front_brushes, &child_parents, ctx);
        build_tree(&mut back, back_brushes, &child_parents, ctx);
    }

    node.front = Some(front);
    node.back = Some(back);
}

/// An entity made only of clip brushes still needs a well-formed tree:
/// a trivial root with two empty leaves spanning the entity bounds.
fn stub_tree(entity_bounds: &Aabb, planes: &PlaneRegistry, game: &dyn GameAdapter) -> Tree {
    let (handle, _) = planes.intern(&Plane::from_normal(Vector3::z(), 0.0), true);

    let mut head = Node::new();
    head.plane = Some(handle);
    // no brush contributed this plane; a bare synthetic side keeps the
    // interior-node shape (plane, side, two children) intact
    head.side = Some(Side::new(handle, false));

    let mut front = Node::new();
    front.contents = game.create_empty_contents();
    head.front = Some(Box::new(front));

    let mut back = Node::new();
    back.contents = game.create_empty_contents();
    head.back = Some(Box::new(back));

    Tree {
        head,
        bounds: *entity_bounds,
    }
}

/// Partition `brushes` into a BSP tree.
///
/// `entity_bounds` is only consulted for the degenerate no-brush stub; the
/// real build derives its bounds from the brushes themselves, grown by
/// [`BuildOptions::side_space`] to form the root volume.
pub fn brush_bsp(
    entity_bounds: &Aabb,
    brushes: Vec<Brush>,
    planes: &PlaneRegistry,
    game: &dyn GameAdapter,
    options: &BuildOptions,
) -> (Tree, BspStats) {
    info!(target: "progress", "---- brush_bsp ----");

    let mut c_brushes = 0usize;
    let mut c_faces = 0usize;
    let mut c_nonvisfaces = 0usize;
    let mut bounds = Aabb::new_invalid();

    for brush in &brushes {
        c_brushes += 1;

        if brush.volume(planes) < options.micro_volume {
            warn!("microbrush");
        }

        for side in &brush.sides {
            if side.bevel || side.winding.is_none() || side.onnode {
                continue;
            }
            if side.visible {
                c_faces += 1;
            } else {
                c_nonvisfaces += 1;
            }
        }

        bounds.merge(&brush.bounds);
    }

    let stats = BspStats {
        nodes: AtomicUsize::new(0),
        nonvis: AtomicUsize::new(0),
        leafs: AtomicUsize::new(0),
        leafstats: game.create_content_stats(),
    };

    if brushes.is_empty() {
        return (stub_tree(entity_bounds, planes, game), stats);
    }

    info!(target: "stat", "{:8} brushes", c_brushes);
    info!(target: "stat", "{:8} visible faces", c_faces);
    info!(target: "stat", "{:8} nonvisible faces", c_nonvisfaces);

    let mut head = Node::new();
    head.volume = Some(brush_from_bounds(
        &bounds.loosened(options.side_space),
        planes,
        options,
    ));

    let ctx = BuildCtx {
        planes,
        game,
        options,
        stats: &stats,
    };
    build_tree(&mut head, brushes, &[], &ctx);

    let nodes = stats.nodes.load(Ordering::Relaxed);
    let nonvis = stats.nonvis.load(Ordering::Relaxed);
    info!(target: "stat", "{:8} visible nodes", nodes - nonvis);
    info!(target: "stat", "{:8} nonvis nodes", nonvis);
    info!(target: "stat", "{:8} leafs", stats.leafs.load(Ordering::Relaxed));
    game.print_content_stats(stats.leafstats.as_ref(), "leafs");

    (Tree { head, bounds }, stats)
}
