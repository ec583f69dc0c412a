//! Convex brushes: an ordered set of planar sides, each carrying its
//! clipped winding. This module owns the geometric heavy lifting of the
//! compiler: building windings for a plane set, measuring volume, and
//! splitting a brush in two along an arbitrary plane.

use crate::float_types::{
    parry3d::bounding_volume::Aabb, Real, TINY_EDGE_LENGTH,
};
use crate::game::ContentFlags;
use crate::options::BuildOptions;
use crate::plane::{Plane, PlaneHandle, PlaneRegistry};
use crate::winding::{PlaneSide, Winding};
use log::warn;

/// Children of a split beyond this range are thrown away as clipping debris.
const BOGUS_RANGE: Real = 4096.0;

/// Opaque texture reference. The partitioner only ever looks at the two
/// selection flags; everything else rides through untouched.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TexInfo {
    pub id: i32,
    /// Hint faces bias splitter selection toward themselves.
    pub hint: bool,
    /// Skip faces are never counted as splits nor chosen as splitters.
    pub hintskip: bool,
}

impl TexInfo {
    /// The texinfo applied to synthetic cap faces introduced by splits.
    pub const fn skip() -> Self {
        TexInfo {
            id: -1,
            hint: false,
            hintskip: true,
        }
    }
}

/// One planar face of a brush.
#[derive(Clone, Debug)]
pub struct Side {
    /// Registry entry for the face's canonical plane.
    pub plane: PlaneHandle,
    /// Whether the outward normal is the negation of the registry plane.
    pub plane_flipped: bool,
    /// The face polygon; `None` once clipped away.
    pub winding: Option<Winding>,
    pub texinfo: TexInfo,
    /// Synthetic bevel side, never used as a splitter.
    pub bevel: bool,
    /// Face is user-facing.
    pub visible: bool,
    /// Already used as a splitter on an ancestor node.
    pub onnode: bool,
    /// Transient marker during one splitter search.
    pub tested: bool,
}

impl Side {
    pub fn new(plane: PlaneHandle, plane_flipped: bool) -> Self {
        Side {
            plane,
            plane_flipped,
            winding: None,
            texinfo: TexInfo::default(),
            bevel: false,
            visible: false,
            onnode: false,
            tested: false,
        }
    }

    /// The outward-oriented plane of this face.
    pub fn face_plane(&self, planes: &PlaneRegistry) -> Plane {
        let plane = planes.get(self.plane);
        if self.plane_flipped {
            -plane
        } else {
            plane
        }
    }
}

/// A convex polyhedron: the intersection of its sides' back half-spaces.
#[derive(Clone, Debug)]
pub struct Brush {
    pub sides: Vec<Side>,
    /// Opaque content mask, combined through the game adapter.
    pub contents: ContentFlags,
    pub bounds: Aabb,
    /// Index of the pre-split source brush; stable through all splits.
    pub original: usize,
    pub lmshift: i32,
    /// Entity index of the owning areaportal, if any.
    pub func_areaportal: Option<usize>,
    /// PSIDE classification stored by the splitter search for partitioning.
    pub side: u8,
    /// Transient PSIDE classification during one splitter search.
    pub testside: u8,
}

impl Brush {
    pub fn new(original: usize, contents: ContentFlags) -> Self {
        Brush {
            sides: Vec::new(),
            contents,
            bounds: Aabb::new_invalid(),
            original,
            lmshift: 0,
            func_areaportal: None,
            side: 0,
            testside: 0,
        }
    }

    pub fn update_bounds(&mut self) {
        let mut bounds = Aabb::new_invalid();
        for side in &self.sides {
            if let Some(w) = &side.winding {
                for point in &w.points {
                    bounds.mins = bounds.mins.inf(point);
                    bounds.maxs = bounds.maxs.sup(point);
                }
            }
        }
        self.bounds = bounds;
    }

    /// Total volume: tetrahedra from a common corner to every face, summed.
    pub fn volume(&self, planes: &PlaneRegistry) -> Real {
        // grab the first valid point as the corner
        let corner = match self
            .sides
            .iter()
            .find_map(|s| s.winding.as_ref().and_then(|w| w.points.first()))
        {
            Some(p) => *p,
            None => return 0.0,
        };

        let mut volume = 0.0;
        for side in &self.sides {
            let Some(w) = &side.winding else {
                continue;
            };
            let plane = side.face_plane(planes);
            let d = -plane.distance_to(&corner);
            volume += d * w.area();
        }
        volume / 3.0
    }

    /// Which half-space holds the brush's farthest vertex from `plane`.
    pub fn mostly_on_side(&self, plane: &Plane) -> PlaneSide {
        let mut max = 0.0;
        let mut side = PlaneSide::Front;
        for face in &self.sides {
            let Some(w) = &face.winding else {
                continue;
            };
            for point in &w.points {
                let d = plane.distance_to(point);
                if d > max {
                    max = d;
                    side = PlaneSide::Front;
                }
                if -d > max {
                    max = -d;
                    side = PlaneSide::Back;
                }
            }
        }
        side
    }

    /// Rebuild every side's winding from the plane set: each face starts as
    /// the base quad on its plane and is clipped by all the other sides.
    pub fn create_windings(&mut self, planes: &PlaneRegistry, world_extent: Real) {
        for i in 0..self.sides.len() {
            let face_plane = self.sides[i].face_plane(planes);
            let mut w = Some(Winding::base_for_plane(&face_plane, world_extent));
            for j in 0..self.sides.len() {
                if i == j || self.sides[j].bevel {
                    continue;
                }
                let Some(cur) = w else {
                    break;
                };
                let clip_plane = -self.sides[j].face_plane(planes);
                w = cur.clip(&clip_plane, 0.0, false).0;
            }
            self.sides[i].winding = w;
        }

        self.update_bounds();
    }
}

/// Create a new axial brush spanning `bounds`.
pub fn brush_from_bounds(
    bounds: &Aabb,
    planes: &PlaneRegistry,
    options: &BuildOptions,
) -> Brush {
    let mut brush = Brush::new(0, ContentFlags::default());
    brush.sides.reserve(6);

    for i in 0..3 {
        let mut normal = nalgebra::Vector3::zeros();
        normal[i] = 1.0;
        let (handle, flipped) =
            planes.intern(&Plane::from_normal(normal, bounds.maxs[i]), true);
        brush.sides.push(Side::new(handle, flipped));
    }
    for i in 0..3 {
        let mut normal = nalgebra::Vector3::zeros();
        normal[i] = -1.0;
        let (handle, flipped) =
            planes.intern(&Plane::from_normal(normal, -bounds.mins[i]), true);
        brush.sides.push(Side::new(handle, flipped));
    }

    brush.create_windings(planes, options.world_extent);
    brush
}

/// Split `brush` along `split`, returning the (front, back) children.
///
/// A brush that does not really straddle the plane comes back intact on the
/// side it (mostly) occupies. Children that degenerate (too few sides,
/// runaway bounds, or volume below 1.0) are discarded, falling back to the
/// original brush on the surviving side.
pub fn split_brush(
    brush: Brush,
    split: &Plane,
    planes: &PlaneRegistry,
    options: &BuildOptions,
) -> (Option<Brush>, Option<Brush>) {
    // check all points
    let mut d_front: Real = 0.0;
    let mut d_back: Real = 0.0;
    for face in &brush.sides {
        let Some(w) = &face.winding else {
            continue;
        };
        for point in &w.points {
            let d = split.distance_to(point);
            if d > 0.0 && d > d_front {
                d_front = d;
            }
            if d < 0.0 && d < d_back {
                d_back = d;
            }
        }
    }
    if d_front < 0.1 {
        // only on back
        return (None, Some(brush));
    }
    if d_back > -0.1 {
        // only on front
        return (Some(brush), None);
    }

    // create a new winding from the split plane
    let mut w = Some(Winding::base_for_plane(split, options.world_extent));
    for face in &brush.sides {
        let Some(cur) = w else {
            break;
        };
        w = cur.clip(&face.face_plane(planes), 0.0, false).1;
    }

    let midwinding = match w {
        Some(w) if !w.is_tiny(TINY_EDGE_LENGTH) => w,
        _ => {
            // the brush isn't really split
            return match brush.mostly_on_side(split) {
                PlaneSide::Back => (None, Some(brush)),
                _ => (Some(brush), None),
            };
        }
    };

    if midwinding.is_huge(options.world_extent) {
        warn!("huge winding");
    }

    // split it for real: start with two empty brushes carrying the
    // original's identity and metadata
    let make_child = || {
        let mut child = Brush::new(brush.original, brush.contents);
        child.lmshift = brush.lmshift;
        child.func_areaportal = brush.func_areaportal;
        child
    };
    let mut children = [Some(make_child()), Some(make_child())];

    // distribute each side's winding pieces
    for face in &brush.sides {
        let Some(w) = &face.winding else {
            continue;
        };
        let (cw_front, cw_back) = w.clip(split, 0.0, false);
        for (child, piece) in children.iter_mut().zip([cw_front, cw_back]) {
            let Some(piece) = piece else {
                continue;
            };
            let mut copy = face.clone();
            copy.winding = Some(piece);
            copy.tested = false;
            child.as_mut().unwrap().sides.push(copy);
        }
    }

    // see if we have valid polygons on both sides
    for child in children.iter_mut() {
        let c = child.as_mut().unwrap();
        c.update_bounds();

        let mut bogus = false;
        for j in 0..3 {
            if c.bounds.mins[j] < -BOGUS_RANGE || c.bounds.maxs[j] > BOGUS_RANGE {
                warn!("bogus brush after clip");
                bogus = true;
                break;
            }
        }

        if c.sides.len() < 3 || bogus {
            *child = None;
        }
    }

    if children.iter().any(|c| c.is_none()) {
        return salvage(brush, children);
    }

    // add the midwinding cap to both sides; the front child's cap faces
    // against the split normal, the back child's along it
    for (i, child) in children.iter_mut().enumerate() {
        let on_front = i == 0;
        let cap_plane = if on_front { -*split } else { *split };
        let (handle, flipped) = planes.intern(&cap_plane, true);

        let mut cap = Side::new(handle, flipped);
        cap.texinfo = TexInfo::skip();
        cap.onnode = true;
        let mut w = midwinding.clone();
        if on_front {
            w.flip();
        }
        cap.winding = Some(w);

        child.as_mut().unwrap().sides.push(cap);
    }

    for child in children.iter_mut() {
        if child.as_ref().unwrap().volume(planes) < 1.0 {
            // tiny volume after clip
            *child = None;
        }
    }

    if children.iter().any(|c| c.is_none()) {
        return salvage(brush, children);
    }

    let [front, back] = children;
    (front, back)
}

/// One or both split children were rejected: report it and hand the original
/// brush back whole on the surviving side, if any.
fn salvage(brush: Brush, children: [Option<Brush>; 2]) -> (Option<Brush>, Option<Brush>) {
    match children {
        [None, None] => {
            warn!("split removed brush");
            (None, None)
        }
        [Some(_), None] => {
            warn!("split not on both sides");
            (Some(brush), None)
        }
        [None, Some(_)] => {
            warn!("split not on both sides");
            (None, Some(brush))
        }
        [Some(_), Some(_)] => unreachable!("salvage called with both children intact"),
    }
}
