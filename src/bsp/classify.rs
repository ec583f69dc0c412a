//! Brush-versus-plane classification.

use crate::brush::Brush;
use crate::bsp::{PSIDE_BACK, PSIDE_BOTH, PSIDE_FACING, PSIDE_FRONT};
use crate::float_types::{
    parry3d::bounding_volume::Aabb, Real, ON_EPSILON, PLANESIDE_EPSILON,
};
use crate::plane::{Plane, PlaneRegistry};
use nalgebra::Point3;

/// Returns PSIDE_FRONT, PSIDE_BACK, or PSIDE_BOTH.
pub fn box_on_plane_side(bounds: &Aabb, plane: &Plane) -> u8 {
    let ptype = plane.plane_type();

    // axial planes are easy
    if ptype.is_axial() {
        let axis = ptype.axis();
        let mut side = 0;
        if bounds.maxs[axis] > plane.dist() + PLANESIDE_EPSILON {
            side |= PSIDE_FRONT;
        }
        if bounds.mins[axis] < plane.dist() - PLANESIDE_EPSILON {
            side |= PSIDE_BACK;
        }
        return side;
    }

    // create the proper leading and trailing corners for the box
    let normal = plane.normal();
    let mut leading = Point3::origin();
    let mut trailing = Point3::origin();
    for i in 0..3 {
        if normal[i] < 0.0 {
            leading[i] = bounds.mins[i];
            trailing[i] = bounds.maxs[i];
        } else {
            leading[i] = bounds.maxs[i];
            trailing[i] = bounds.mins[i];
        }
    }

    let dist1 = plane.distance_to(&leading);
    let dist2 = plane.distance_to(&trailing);
    let mut side = 0;
    if dist1 >= PLANESIDE_EPSILON {
        side = PSIDE_FRONT;
    }
    if dist2 < PLANESIDE_EPSILON {
        side |= PSIDE_BACK;
    }
    side
}

/// Outcome of testing one brush against a candidate splitting plane.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrushPlaneTest {
    /// PSIDE bits.
    pub side: u8,
    /// Visible faces the plane would cut in two.
    pub splits: usize,
    /// One of the cut faces is a hint face.
    pub hint_split: bool,
    /// A vertex sits uncomfortably close to (but not on) the plane.
    pub epsilon_brush: bool,
}

/// Classify `brush` against `plane` and count the face splits the plane
/// would induce.
pub fn test_brush_to_plane(
    brush: &Brush,
    plane: &Plane,
    planes: &PlaneRegistry,
) -> BrushPlaneTest {
    // if the brush actually uses the plane, we can tell the side for sure
    for side in &brush.sides {
        if planes.get(side.plane).epsilon_eq(plane) {
            let bits = if side.plane_flipped {
                PSIDE_FRONT | PSIDE_FACING
            } else {
                PSIDE_BACK | PSIDE_FACING
            };
            return BrushPlaneTest {
                side: bits,
                ..BrushPlaneTest::default()
            };
        }
    }

    let s = box_on_plane_side(&brush.bounds, plane);
    if s != PSIDE_BOTH {
        return BrushPlaneTest {
            side: s,
            ..BrushPlaneTest::default()
        };
    }

    // if both sides, count the visible faces split
    let mut d_front: Real = 0.0;
    let mut d_back: Real = 0.0;
    let mut splits = 0;
    let mut hint_split = false;

    for side in &brush.sides {
        if side.onnode {
            continue; // on node, don't worry about splits
        }
        if !side.visible {
            continue; // we don't care about non-visible
        }
        let Some(w) = &side.winding else {
            continue;
        };
        let mut front = false;
        let mut back = false;
        for point in &w.points {
            let d = plane.distance_to(point);
            if d > d_front {
                d_front = d;
            }
            if d < d_back {
                d_back = d;
            }
            if d > ON_EPSILON {
                front = true;
            }
            if d < -ON_EPSILON {
                back = true;
            }
        }
        if front && back && !side.texinfo.hintskip {
            splits += 1;
            if side.texinfo.hint {
                hint_split = true;
            }
        }
    }

    let epsilon_brush =
        (d_front > 0.0 && d_front < 1.0) || (d_back < 0.0 && d_back > -1.0);

    BrushPlaneTest {
        side: s,
        splits,
        hint_split,
        epsilon_brush,
    }
}
