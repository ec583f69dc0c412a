//! Oriented planes and the deduplicating plane registry.
//!
//! Every plane used during a build is interned into a [`PlaneRegistry`] and
//! referenced through a stable [`PlaneHandle`]. Interning canonicalizes the
//! plane (axial snap, optional flip to a positive-facing orientation) and
//! collapses epsilon-close duplicates, so two brushes that touch along the
//! same surface end up referencing one registry entry.

use crate::errors::GeometryError;
use crate::float_types::{Real, DIST_EPSILON, NORMAL_EPSILON};
use hashbrown::HashMap;
use nalgebra::{Point3, Vector3};
use parking_lot::RwLock;
use std::ops::Neg;

/// Orientation class of a plane normal.
///
/// `X`/`Y`/`Z` mean the normal is exactly the positive unit axis; the `Any*`
/// variants record the dominant axis of a general normal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlaneType {
    X,
    Y,
    Z,
    AnyX,
    AnyY,
    AnyZ,
}

impl PlaneType {
    #[inline]
    pub fn is_axial(self) -> bool {
        matches!(self, PlaneType::X | PlaneType::Y | PlaneType::Z)
    }

    /// Index of the (dominant) axis.
    #[inline]
    pub fn axis(self) -> usize {
        match self {
            PlaneType::X | PlaneType::AnyX => 0,
            PlaneType::Y | PlaneType::AnyY => 1,
            PlaneType::Z | PlaneType::AnyZ => 2,
        }
    }
}

/// An oriented plane `{p : normal . p = dist}` with a cached type tag.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Plane {
    normal: Vector3<Real>,
    dist: Real,
    ptype: PlaneType,
}

impl Plane {
    /// Create a plane from a unit normal and signed distance.
    pub fn from_normal(normal: Vector3<Real>, dist: Real) -> Self {
        Plane {
            normal,
            dist,
            ptype: plane_type_of(&normal),
        }
    }

    /// Derive the plane spanned by three points, using the winding vertex
    /// convention (counter-clockwise looking down the normal).
    pub fn from_points(
        p0: &Point3<Real>,
        p1: &Point3<Real>,
        p2: &Point3<Real>,
    ) -> Result<Self, GeometryError> {
        let v1 = p1 - p0;
        let v2 = p2 - p0;
        let normal = v2
            .cross(&v1)
            .try_normalize(NORMAL_EPSILON)
            .ok_or(GeometryError::DegeneratePlane)?;
        let dist = normal.dot(&p0.coords);
        Ok(Plane::from_normal(normal, dist))
    }

    #[inline]
    pub fn normal(&self) -> Vector3<Real> {
        self.normal
    }

    #[inline]
    pub fn dist(&self) -> Real {
        self.dist
    }

    #[inline]
    pub fn plane_type(&self) -> PlaneType {
        self.ptype
    }

    /// Signed distance from `point` to the plane, positive in front.
    #[inline]
    pub fn distance_to(&self, point: &Point3<Real>) -> Real {
        self.normal.dot(&point.coords) - self.dist
    }

    /// Reverse the plane's orientation in place.
    pub fn flip(&mut self) {
        *self = -*self;
    }

    /// Epsilon equality: normals dot-close, distances close.
    pub fn epsilon_eq(&self, other: &Plane) -> bool {
        self.normal.dot(&other.normal) > 1.0 - NORMAL_EPSILON
            && (self.dist - other.dist).abs() < DIST_EPSILON
    }

    /// Canonicalize the plane: a normal within [`NORMAL_EPSILON`] of a unit
    /// axis snaps to exactly that axis, and with `flip` set the result is
    /// forced positive on its dominant axis. Returns the canonical plane and
    /// whether it was flipped.
    pub fn canonicalized(&self, flip: bool) -> (Plane, bool) {
        for i in 0..3 {
            if (self.normal[i] - 1.0).abs() < NORMAL_EPSILON {
                let mut n = Vector3::zeros();
                n[i] = 1.0;
                return (Plane::from_normal(n, self.dist), false);
            }
            if (self.normal[i] + 1.0).abs() < NORMAL_EPSILON {
                let mut n = Vector3::zeros();
                if flip {
                    n[i] = 1.0;
                    return (Plane::from_normal(n, -self.dist), true);
                }
                n[i] = -1.0;
                return (Plane::from_normal(n, self.dist), false);
            }
        }

        let nearest = self.ptype.axis();
        if flip && self.normal[nearest] < 0.0 {
            return (-*self, true);
        }
        (*self, false)
    }
}

impl Neg for Plane {
    type Output = Plane;

    fn neg(self) -> Plane {
        Plane::from_normal(-self.normal, -self.dist)
    }
}

fn plane_type_of(normal: &Vector3<Real>) -> PlaneType {
    for (i, axial) in [PlaneType::X, PlaneType::Y, PlaneType::Z]
        .into_iter()
        .enumerate()
    {
        if normal[i] > 1.0 - NORMAL_EPSILON {
            return axial;
        }
    }

    let ax = normal.x.abs();
    let ay = normal.y.abs();
    let az = normal.z.abs();
    if ax >= ay && ax >= az {
        PlaneType::AnyX
    } else if ay >= ax && ay >= az {
        PlaneType::AnyY
    } else {
        PlaneType::AnyZ
    }
}

/// Stable reference to a plane owned by a [`PlaneRegistry`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PlaneHandle(usize);

impl PlaneHandle {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Default)]
struct PlaneTable {
    planes: Vec<Plane>,
    // plane indices bucketed by rounded distance; lookups probe the
    // neighboring buckets so epsilon-close duplicates always collapse
    buckets: HashMap<i64, Vec<usize>>,
}

impl PlaneTable {
    fn find(&self, plane: &Plane) -> Option<usize> {
        let key = bucket_key(plane.dist());
        for k in (key - 1)..=(key + 1) {
            if let Some(bucket) = self.buckets.get(&k) {
                for &idx in bucket {
                    if self.planes[idx].epsilon_eq(plane) {
                        return Some(idx);
                    }
                }
            }
        }
        None
    }

    fn insert(&mut self, plane: Plane) -> usize {
        let idx = self.planes.len();
        self.planes.push(plane);
        self.buckets.entry(bucket_key(plane.dist())).or_default().push(idx);
        idx
    }
}

#[inline]
fn bucket_key(dist: Real) -> i64 {
    dist.round() as i64
}

/// Deduplicating store of canonical planes. Readers run in parallel with one
/// another; insertions take the writer lock, which is rare once the input
/// brush planes have been interned.
#[derive(Default)]
pub struct PlaneRegistry {
    inner: RwLock<PlaneTable>,
}

impl PlaneRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Canonicalize `plane` (flipping to a positive-facing orientation when
    /// `flip` is set) and return the handle of the matching registry entry,
    /// inserting it if no epsilon-equal plane is stored yet. The second
    /// return value reports whether canonicalization flipped the plane.
    pub fn intern(&self, plane: &Plane, flip: bool) -> (PlaneHandle, bool) {
        let (canon, was_flipped) = plane.canonicalized(flip);

        if let Some(idx) = self.inner.read().find(&canon) {
            return (PlaneHandle(idx), was_flipped);
        }

        let mut table = self.inner.write();
        // another writer may have inserted it between the locks
        if let Some(idx) = table.find(&canon) {
            return (PlaneHandle(idx), was_flipped);
        }
        (PlaneHandle(table.insert(canon)), was_flipped)
    }

    /// Fetch a copy of the stored plane.
    pub fn get(&self, handle: PlaneHandle) -> Plane {
        self.inner.read().planes[handle.0]
    }

    pub fn len(&self) -> usize {
        self.inner.read().planes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
