mod support;

use brushbsp::bsp::{brush_bsp, Node};
use brushbsp::float_types::Real;
use brushbsp::game::ContentFlags;
use brushbsp::options::BuildOptions;
use brushbsp::plane::{Plane, PlaneHandle, PlaneRegistry};
use std::sync::atomic::Ordering;

use crate::support::{
    aabb, approx_eq, collect_interior, collect_leaves, leaf_volume_with_contents,
    solid_brush, TestGame, CONTENTS_DETAIL, CONTENTS_SOLID,
};

const EMPTY: ContentFlags = ContentFlags(0);

/// The union of leaf volumes must equal the root volume: space is neither
/// lost nor double-counted by the subdivision.
fn assert_volume_coverage(head: &Node, planes: &PlaneRegistry) {
    let root_volume = head.volume.as_ref().unwrap().volume(planes);
    let leaf_sum: Real = collect_leaves(head)
        .iter()
        .map(|leaf| leaf.volume.as_ref().unwrap().volume(planes))
        .sum();
    assert!(
        (leaf_sum - root_volume).abs() < 1e-3 * root_volume,
        "leaves cover {leaf_sum} of {root_volume}",
    );
}

/// No interior node may reuse an ancestor's plane.
fn assert_ancestors_disjoint(node: &Node, planes: &PlaneRegistry, ancestors: &mut Vec<Plane>) {
    let Some(handle) = node.plane else {
        return;
    };
    let plane = planes.get(handle);
    for ancestor in ancestors.iter() {
        assert!(!ancestor.epsilon_eq(&plane), "ancestor plane reused");
    }
    ancestors.push(plane);
    if let Some(front) = &node.front {
        assert_ancestors_disjoint(front, planes, ancestors);
    }
    if let Some(back) = &node.back {
        assert_ancestors_disjoint(back, planes, ancestors);
    }
    ancestors.pop();
}

#[test]
fn unit_cube() {
    let planes = PlaneRegistry::new();
    let options = BuildOptions::default();
    let game = TestGame;
    let brushes = vec![solid_brush(&planes, &options, [0.0; 3], [16.0; 3], 0)];

    let (tree, stats) = brush_bsp(
        &aabb([0.0; 3], [16.0; 3]),
        brushes,
        &planes,
        &game,
        &options,
    );

    let interior = collect_interior(&tree.head);
    let leaves = collect_leaves(&tree.head);
    assert!(interior.len() <= 6);
    assert_eq!(leaves.len(), interior.len() + 1);
    assert_eq!(stats.leafs.load(Ordering::Relaxed), leaves.len());

    let solid: Vec<_> = leaves
        .iter()
        .filter(|l| l.contents == CONTENTS_SOLID)
        .collect();
    assert_eq!(solid.len(), 1);
    assert_eq!(solid[0].original_brushes, vec![0]);
    assert!(approx_eq(
        solid[0].volume.as_ref().unwrap().volume(&planes),
        4096.0,
        1e-3,
    ));
    for leaf in &leaves {
        if leaf.contents != CONTENTS_SOLID {
            assert_eq!(leaf.contents, EMPTY);
        }
    }

    // every interior node carries a plane, a chosen side, and two children
    for node in &interior {
        assert!(node.plane.is_some());
        assert!(node.side.is_some());
        assert!(node.front.is_some() && node.back.is_some());
        assert!(!node.detail_separator);
    }

    assert_volume_coverage(&tree.head, &planes);
    assert_ancestors_disjoint(&tree.head, &planes, &mut Vec::new());
}

#[test]
fn two_disjoint_cubes() {
    let planes = PlaneRegistry::new();
    let options = BuildOptions::default();
    let game = TestGame;
    let brushes = vec![
        solid_brush(&planes, &options, [0.0; 3], [8.0; 3], 0),
        solid_brush(&planes, &options, [16.0, 0.0, 0.0], [24.0, 8.0, 8.0], 1),
    ];
    let brush_planes: Vec<PlaneHandle> = brushes
        .iter()
        .flat_map(|b| b.sides.iter().map(|s| s.plane))
        .collect();

    let (tree, _) = brush_bsp(
        &aabb([0.0; 3], [24.0, 8.0, 8.0]),
        brushes,
        &planes,
        &game,
        &options,
    );

    let leaves = collect_leaves(&tree.head);
    let solid: Vec<_> = leaves
        .iter()
        .filter(|l| l.contents == CONTENTS_SOLID)
        .collect();
    assert_eq!(solid.len(), 2);

    let originals: Vec<_> = solid.iter().map(|l| l.original_brushes.clone()).collect();
    assert!(originals.contains(&vec![0]));
    assert!(originals.contains(&vec![1]));

    assert!(approx_eq(
        leaf_volume_with_contents(&tree.head, CONTENTS_SOLID, &planes),
        1024.0,
        1e-3,
    ));

    // splitters only ever come from the input brushes
    for node in collect_interior(&tree.head) {
        assert!(brush_planes.contains(&node.plane.unwrap()));
    }

    assert_volume_coverage(&tree.head, &planes);
    assert_ancestors_disjoint(&tree.head, &planes, &mut Vec::new());
}

#[test]
fn touching_cubes_share_one_plane() {
    let planes = PlaneRegistry::new();
    let options = BuildOptions::default();
    let game = TestGame;
    let brushes = vec![
        solid_brush(&planes, &options, [0.0; 3], [8.0; 3], 0),
        solid_brush(&planes, &options, [8.0, 0.0, 0.0], [16.0, 8.0, 8.0], 1),
    ];

    // the shared x=8 surface interns to a single registry entry
    let shared = brushes[0].sides[0].plane;
    assert_eq!(shared, brushes[1].sides[3].plane);
    assert!(brushes[1].sides[3].plane_flipped);

    let (tree, _) = brush_bsp(
        &aabb([0.0; 3], [16.0, 8.0, 8.0]),
        brushes,
        &planes,
        &game,
        &options,
    );

    // ...and splits the tree at most once
    let shared_uses = collect_interior(&tree.head)
        .iter()
        .filter(|n| n.plane.unwrap() == shared)
        .count();
    assert!(shared_uses <= 1);

    assert!(approx_eq(
        leaf_volume_with_contents(&tree.head, CONTENTS_SOLID, &planes),
        1024.0,
        1e-3,
    ));

    assert_volume_coverage(&tree.head, &planes);
    assert_ancestors_disjoint(&tree.head, &planes, &mut Vec::new());
}

#[test]
fn clip_only_entity_gets_a_stub_tree() {
    let planes = PlaneRegistry::new();
    let options = BuildOptions::default();
    let game = TestGame;
    let entity_bounds = aabb([-32.0; 3], [32.0; 3]);

    let (tree, _) = brush_bsp(&entity_bounds, Vec::new(), &planes, &game, &options);

    assert!(tree.head.plane.is_some());
    let plane = planes.get(tree.head.plane.unwrap());
    assert_eq!(plane.normal(), nalgebra::Vector3::z());
    assert_eq!(plane.dist(), 0.0);

    // even the stub root is a well-formed interior node with a chosen side
    let side = tree.head.side.as_ref().expect("stub root has no side");
    assert_eq!(side.plane, tree.head.plane.unwrap());
    assert!(!side.visible);

    for child in [&tree.head.front, &tree.head.back] {
        let child = child.as_ref().expect("stub child missing");
        assert!(child.is_leaf());
        assert_eq!(child.contents, EMPTY);
    }

    assert_eq!(tree.bounds.mins, entity_bounds.mins);
    assert_eq!(tree.bounds.maxs, entity_bounds.maxs);
}

#[test]
fn microbrush_still_classifies_its_leaf() {
    let planes = PlaneRegistry::new();
    let options = BuildOptions::default();
    let game = TestGame;
    // volume 0.5, below the micro_volume warning floor
    let brushes = vec![solid_brush(
        &planes,
        &options,
        [0.0; 3],
        [1.0, 1.0, 0.5],
        0,
    )];

    let (tree, _) = brush_bsp(
        &aabb([0.0; 3], [1.0, 1.0, 0.5]),
        brushes,
        &planes,
        &game,
        &options,
    );

    let leaves = collect_leaves(&tree.head);
    let solid: Vec<_> = leaves
        .iter()
        .filter(|l| l.contents == CONTENTS_SOLID)
        .collect();
    assert_eq!(solid.len(), 1);
    assert_eq!(solid[0].original_brushes, vec![0]);

    assert_volume_coverage(&tree.head, &planes);
    assert_ancestors_disjoint(&tree.head, &planes, &mut Vec::new());
}

/// Carry the (clipped) hint face down the tree: wherever a node plane cuts
/// through the surviving piece, the splitter must itself be a hint side.
fn assert_hint_uncut(node: &Node, piece: brushbsp::winding::Winding, planes: &PlaneRegistry) {
    let Some(handle) = node.plane else {
        return;
    };
    let plane = planes.get(handle);
    let (front, back) = piece.clip(&plane, brushbsp::float_types::ON_EPSILON, false);
    if front.is_some() && back.is_some() {
        assert!(
            node.side.as_ref().unwrap().texinfo.hint,
            "hint face cut by a plain splitter",
        );
    }
    if let (Some(child), Some(w)) = (&node.front, front) {
        assert_hint_uncut(child, w, planes);
    }
    if let (Some(child), Some(w)) = (&node.back, back) {
        assert_hint_uncut(child, w, planes);
    }
}

#[test]
fn hint_faces_survive_the_build_uncut() {
    let planes = PlaneRegistry::new();
    let options = BuildOptions::default();
    let game = TestGame;

    let mut slab = solid_brush(&planes, &options, [0.0, 0.0, 0.0], [16.0, 16.0, 4.0], 0);
    slab.sides[2].texinfo.hint = true;
    let hint_winding = slab.sides[2].winding.clone().unwrap();

    let tower = solid_brush(&planes, &options, [4.0, 4.0, 2.0], [12.0, 12.0, 10.0], 1);
    let third = solid_brush(&planes, &options, [0.0, 0.0, 6.0], [16.0, 16.0, 10.0], 2);

    let (tree, _) = brush_bsp(
        &aabb([0.0; 3], [16.0, 16.0, 10.0]),
        vec![slab, tower, third],
        &planes,
        &game,
        &options,
    );

    assert!(!collect_interior(&tree.head).is_empty());
    assert_hint_uncut(&tree.head, hint_winding, &planes);

    assert_volume_coverage(&tree.head, &planes);
    assert_ancestors_disjoint(&tree.head, &planes, &mut Vec::new());
}

#[test]
fn detail_brush_marks_detail_separators() {
    let planes = PlaneRegistry::new();
    let options = BuildOptions::default();
    let game = TestGame;

    let mut brush = solid_brush(&planes, &options, [0.0; 3], [8.0; 3], 0);
    brush.contents = ContentFlags(CONTENTS_SOLID.0 | CONTENTS_DETAIL.0);

    let (tree, _) = brush_bsp(
        &aabb([0.0; 3], [8.0; 3]),
        vec![brush],
        &planes,
        &game,
        &options,
    );

    let interior = collect_interior(&tree.head);
    assert!(!interior.is_empty());
    for node in &interior {
        assert!(node.detail_separator);
    }
}

#[test]
fn nonvisible_sides_count_as_nonvis_nodes() {
    let planes = PlaneRegistry::new();
    let options = BuildOptions::default();
    let game = TestGame;

    let mut brush = solid_brush(&planes, &options, [0.0; 3], [8.0; 3], 0);
    for side in &mut brush.sides {
        side.visible = false;
    }

    let (tree, stats) = brush_bsp(
        &aabb([0.0; 3], [8.0; 3]),
        vec![brush],
        &planes,
        &game,
        &options,
    );

    let interior = collect_interior(&tree.head);
    assert!(!interior.is_empty());
    assert_eq!(stats.nonvis.load(Ordering::Relaxed), interior.len());
    assert_eq!(stats.nodes.load(Ordering::Relaxed), interior.len());
}
