//! Heuristic splitter selection.

use crate::brush::{split_brush, Brush};
use crate::bsp::classify::test_brush_to_plane;
use crate::bsp::{PSIDE_BACK, PSIDE_FACING, PSIDE_FRONT};
use crate::game::GameAdapter;
use crate::options::BuildOptions;
use crate::plane::{Plane, PlaneRegistry};

/// The winning side of a splitter search, addressed by brush and side index
/// into the searched list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SplitChoice {
    pub brush: usize,
    pub side: usize,
    /// The winner came from a pass after visible-structural; the node it
    /// splits is not needed for visibility.
    pub late_pass: bool,
}

/// A splitter must never repeat a plane already used above it in the tree.
fn check_plane_against_parents(plane: &Plane, parents: &[Plane]) {
    for parent in parents {
        assert!(!parent.epsilon_eq(plane), "tried parent plane");
    }
}

/// The plane has to actually carve the node's volume into two pieces.
fn check_plane_against_volume(
    plane: &Plane,
    volume: &Brush,
    planes: &PlaneRegistry,
    options: &BuildOptions,
) -> bool {
    let (front, back) = split_brush(volume.clone(), plane, planes, options);
    front.is_some() && back.is_some()
}

/// Using a heuristic, choose one of the sides out of the brush list to
/// partition the brushes with. Returns `None` if there are no valid planes
/// to split with.
///
/// The search order goes: visible-structural, visible-detail,
/// nonvisible-structural, nonvisible-detail. If any valid plane is available
/// in a pass, no further passes are tried. On return, every brush's `side`
/// field holds its classification against the winning plane.
pub fn select_split_side(
    brushes: &mut [Brush],
    volume: &Brush,
    parents: &[Plane],
    planes: &PlaneRegistry,
    game: &dyn GameAdapter,
    options: &BuildOptions,
) -> Option<SplitChoice> {
    let mut best: Option<SplitChoice> = None;
    let mut best_value = -99999i64;

    for pass in 0..4 {
        for bi in 0..brushes.len() {
            let detail = game.is_any_detail(brushes[bi].contents);
            if (pass & 1) == 1 && !detail {
                continue;
            }
            if (pass & 1) == 0 && detail {
                continue;
            }

            for si in 0..brushes[bi].sides.len() {
                let candidate_hint;
                let plane = {
                    let side = &brushes[bi].sides[si];
                    if side.bevel {
                        continue; // never use a bevel as a splitter
                    }
                    if side.winding.is_none() {
                        continue; // nothing visible, so it can't split
                    }
                    if side.onnode {
                        continue; // already a node splitter
                    }
                    if side.tested {
                        continue; // we already have metrics for this plane
                    }
                    if side.texinfo.hintskip {
                        continue; // skip surfaces are never chosen
                    }
                    if side.visible != (pass < 2) {
                        continue; // only check visible faces on first passes
                    }
                    candidate_hint = side.texinfo.hint;

                    // always use the positive facing plane
                    let (handle, _) = planes.intern(&planes.get(side.plane), true);
                    planes.get(handle)
                };

                check_plane_against_parents(&plane, parents);

                if !check_plane_against_volume(&plane, volume, planes, options) {
                    continue; // would produce a tiny volume
                }

                let mut front = 0i64;
                let mut back = 0i64;
                let mut facing = 0i64;
                let mut splits = 0i64;
                let mut epsilon_brush = 0i64;
                let mut hint_split = false;

                for ti in 0..brushes.len() {
                    let test = test_brush_to_plane(&brushes[ti], &plane, planes);

                    splits += test.splits as i64;
                    assert!(
                        test.splits == 0 || (test.side & PSIDE_FACING) == 0,
                        "PSIDE_FACING with splits"
                    );

                    brushes[ti].testside = test.side;

                    // if the brush shares this face, don't bother testing
                    // that side as a splitter again
                    if (test.side & PSIDE_FACING) != 0 {
                        facing += 1;
                        for other in &mut brushes[ti].sides {
                            if planes.get(other.plane).epsilon_eq(&plane) {
                                other.tested = true;
                            }
                        }
                    }
                    if (test.side & PSIDE_FRONT) != 0 {
                        front += 1;
                    }
                    if (test.side & PSIDE_BACK) != 0 {
                        back += 1;
                    }
                    if test.hint_split {
                        hint_split = true;
                    }
                    if test.epsilon_brush {
                        epsilon_brush += 1;
                    }
                }

                // give a value estimate for using this plane
                let mut value = 5 * facing - 5 * splits - (front - back).abs();
                if plane.plane_type().is_axial() {
                    value += 5; // axial is better
                }
                value -= epsilon_brush * 1000; // avoid!

                // never split a hint side except with another hint
                if hint_split && !candidate_hint {
                    value = -9999999;
                }

                // save off the side test so we don't need to recalculate it
                // when we actually separate the brushes
                if value > best_value {
                    best_value = value;
                    best = Some(SplitChoice {
                        brush: bi,
                        side: si,
                        late_pass: pass > 0,
                    });
                    for test in brushes.iter_mut() {
                        test.side = test.testside;
                    }
                }
            }
        }

        // if we found a good plane, don't bother trying any other passes
        if best.is_some() {
            break;
        }
    }

    // clear all the tested flags we set
    for brush in brushes.iter_mut() {
        for side in &mut brush.sides {
            side.tested = false;
        }
    }

    best
}
