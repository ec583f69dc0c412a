//! Convex polygon ("winding") primitive.
//!
//! A winding starts life as a large base polygon on a plane and is whittled
//! down by half-space clips. Every vertex is expected to satisfy the parent
//! plane equation within [`ON_EPSILON`].

use crate::errors::GeometryError;
use crate::float_types::{
    parry3d::bounding_volume::Aabb, Real, NORMAL_EPSILON, ON_EPSILON,
};
use crate::plane::Plane;
use nalgebra::Point3;

/// Classification of a point against a clip plane.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(usize)]
pub enum PlaneSide {
    Front = 0,
    Back = 1,
    On = 2,
}

/// An ordered ring of coplanar points, always convex.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Winding {
    pub points: Vec<Point3<Real>>,
}

impl Winding {
    pub fn from_points(points: Vec<Point3<Real>>) -> Self {
        Winding { points }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The largest quad on `plane` that fits the world: a square of
    /// half-extent `world_extent`, centered on the plane's origin projection.
    pub fn base_for_plane(plane: &Plane, world_extent: Real) -> Self {
        let normal = plane.normal();
        let axis = plane.plane_type().axis();

        // pick an up vector not parallel to the normal, then make it lie in
        // the plane
        let mut vup = nalgebra::Vector3::zeros();
        if axis == 2 {
            vup.x = 1.0;
        } else {
            vup.z = 1.0;
        }
        vup -= normal * vup.dot(&normal);
        vup.normalize_mut();

        let org = Point3::from(normal * plane.dist());
        let vright = vup.cross(&normal) * world_extent;
        let vup = vup * world_extent;

        Winding {
            points: vec![
                org - vright + vup,
                org + vright + vup,
                org + vright - vup,
                org - vright - vup,
            ],
        }
    }

    /// Split by the half-spaces of `plane`, returning the (front, back)
    /// pieces. A winding wholly on one side comes back intact on that side;
    /// a winding lying in the plane goes to the front when `keep_on` is set
    /// and to the back otherwise. A piece that would degenerate to fewer
    /// than 3 points is dropped.
    pub fn clip(
        &self,
        plane: &Plane,
        epsilon: Real,
        keep_on: bool,
    ) -> (Option<Winding>, Option<Winding>) {
        let n = self.points.len();
        let mut dists = Vec::with_capacity(n + 1);
        let mut sides = Vec::with_capacity(n + 1);
        let mut counts = [0usize; 3];

        for point in &self.points {
            let d = plane.distance_to(point);
            let side = if d > epsilon {
                PlaneSide::Front
            } else if d < -epsilon {
                PlaneSide::Back
            } else {
                PlaneSide::On
            };
            counts[side as usize] += 1;
            dists.push(d);
            sides.push(side);
        }
        dists.push(dists[0]);
        sides.push(sides[0]);

        if counts[PlaneSide::Front as usize] == 0 && counts[PlaneSide::Back as usize] == 0 {
            // fully coplanar
            return if keep_on {
                (Some(self.clone()), None)
            } else {
                (None, Some(self.clone()))
            };
        }
        if counts[PlaneSide::Front as usize] == 0 {
            return (None, Some(self.clone()));
        }
        if counts[PlaneSide::Back as usize] == 0 {
            return (Some(self.clone()), None);
        }

        let mut front = Vec::with_capacity(n + 4);
        let mut back = Vec::with_capacity(n + 4);
        let normal = plane.normal();

        for i in 0..n {
            let p1 = self.points[i];

            match sides[i] {
                PlaneSide::On => {
                    front.push(p1);
                    back.push(p1);
                    continue;
                }
                PlaneSide::Front => front.push(p1),
                PlaneSide::Back => back.push(p1),
            }

            if sides[i + 1] == PlaneSide::On || sides[i + 1] == sides[i] {
                continue;
            }

            // the edge crosses the plane; emit the intersection on both sides
            let p2 = self.points[(i + 1) % n];
            let t = dists[i] / (dists[i] - dists[i + 1]);
            let mut mid = Point3::origin();
            for j in 0..3 {
                // avoid rounding through near-axial normals
                mid[j] = if normal[j] == 1.0 {
                    plane.dist()
                } else if normal[j] == -1.0 {
                    -plane.dist()
                } else {
                    p1[j] + t * (p2[j] - p1[j])
                };
            }
            front.push(mid);
            back.push(mid);
        }

        let front = (front.len() >= 3).then(|| Winding::from_points(front));
        let back = (back.len() >= 3).then(|| Winding::from_points(back));
        (front, back)
    }

    /// Sum of the fan triangle areas.
    pub fn area(&self) -> Real {
        let mut total = 0.0;
        for i in 2..self.points.len() {
            let d1 = self.points[i - 1] - self.points[0];
            let d2 = self.points[i] - self.points[0];
            total += 0.5 * d1.cross(&d2).norm();
        }
        total
    }

    pub fn bounds(&self) -> Aabb {
        let mut aabb = Aabb::new_invalid();
        for point in &self.points {
            aabb.mins = aabb.mins.inf(point);
            aabb.maxs = aabb.maxs.sup(point);
        }
        aabb
    }

    pub fn center(&self) -> Point3<Real> {
        let mut sum = nalgebra::Vector3::zeros();
        for point in &self.points {
            sum += point.coords;
        }
        Point3::from(sum / self.points.len() as Real)
    }

    /// Reverse the point order, negating the winding's plane.
    pub fn flip(&mut self) {
        self.points.reverse();
    }

    /// The plane spanned by the winding's first three points.
    pub fn plane_of(&self) -> Result<Plane, GeometryError> {
        if self.points.len() < 3 {
            return Err(GeometryError::TooFewPoints(self.points.len()));
        }
        Plane::from_points(&self.points[0], &self.points[1], &self.points[2])
    }

    /// Drop points whose incoming and outgoing edges are (nearly) parallel.
    pub fn remove_colinear_points(&mut self) {
        let n = self.points.len();
        if n < 3 {
            return;
        }
        let mut kept = Vec::with_capacity(n);
        for i in 0..n {
            let j = (i + 1) % n;
            let k = (i + n - 1) % n;
            let v1 = (self.points[j] - self.points[i]).normalize();
            let v2 = (self.points[i] - self.points[k]).normalize();
            if v1.dot(&v2) < 0.999 {
                kept.push(self.points[i]);
            }
        }
        self.points = kept;
    }

    /// True when at most two edges are longer than `size`, meaning the
    /// winding would be crunched out of existence by vertex snapping.
    pub fn is_tiny(&self, size: Real) -> bool {
        let mut edges = 0;
        let n = self.points.len();
        for i in 0..n {
            let j = (i + 1) % n;
            if (self.points[j] - self.points[i]).norm() > size {
                edges += 1;
                if edges == 3 {
                    return false;
                }
            }
        }
        true
    }

    /// True when the winding still reaches outside the world extent, i.e. it
    /// kept one of its base-quad corners through all clips.
    pub fn is_huge(&self, world_extent: Real) -> bool {
        self.points
            .iter()
            .any(|p| (0..3).any(|j| p[j].abs() > world_extent))
    }

    /// Sanity-check the winding: enough points, sane area, points in range,
    /// on plane, and convex order.
    pub fn check(&self, world_extent: Real) -> Result<(), GeometryError> {
        let n = self.points.len();
        if n < 3 {
            return Err(GeometryError::TooFewPoints(n));
        }

        let area = self.area();
        if area < 1.0 {
            return Err(GeometryError::TinyArea(area));
        }

        let plane = self.plane_of()?;
        let facenormal = plane.normal();

        for i in 0..n {
            let p1 = self.points[i];
            for j in 0..3 {
                if p1[j].abs() > world_extent {
                    return Err(GeometryError::OutOfRange(p1[j]));
                }
            }

            let d = plane.distance_to(&p1);
            if d.abs() > ON_EPSILON {
                return Err(GeometryError::PointOffPlane(d));
            }

            // every other point must be behind the edge plane
            let p2 = self.points[(i + 1) % n];
            let dir = p2 - p1;
            let edgenormal = match facenormal.cross(&dir).try_normalize(NORMAL_EPSILON) {
                Some(en) => en,
                None => return Err(GeometryError::NotConvex(i)),
            };
            let edgedist = edgenormal.dot(&p1.coords) + ON_EPSILON;
            for (k, point) in self.points.iter().enumerate() {
                if k == i {
                    continue;
                }
                if edgenormal.dot(&point.coords) > edgedist {
                    return Err(GeometryError::NotConvex(i));
                }
            }
        }

        Ok(())
    }
}
