use nalgebra::Point3;
use nalgebra_glm::{max2, min2};
use num_traits::cast;

use crate::geometry::traits::{ClosestPoint3, HasScalarType, RealNumber};

/// Axis-aligned bounding box in 3D.
#[derive(Debug, Clone, Copy)]
pub struct Box3<TScalar: RealNumber> {
    min: Point3<TScalar>,
    max: Point3<TScalar>,
}

impl<TScalar: RealNumber> Box3<TScalar> {
    #[inline]
    pub fn new(min: Point3<TScalar>, max: Point3<TScalar>) -> Self {
        Self { min, max }
    }

    /// Degenerate box containing a single point.
    #[inline]
    pub fn from_point(point: &Point3<TScalar>) -> Self {
        Self { min: *point, max: *point }
    }

    /// Empty box. `union_point`/`union_box` grow it from here; it must not be
    /// queried (`size_x` etc) before at least one union.
    #[inline]
    pub fn empty() -> Self {
        let inf = cast(1.0e18).unwrap();
        Self {
            min: Point3::new(inf, inf, inf),
            max: Point3::new(-inf, -inf, -inf),
        }
    }

    #[inline]
    pub fn get_min(&self) -> &Point3<TScalar> {
        &self.min
    }

    #[inline]
    pub fn get_max(&self) -> &Point3<TScalar> {
        &self.max
    }

    #[inline]
    pub fn get_center(&self) -> Point3<TScalar> {
        (self.min + self.max.coords) * cast(0.5).unwrap()
    }

    #[inline]
    pub fn size_x(&self) -> TScalar {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn size_y(&self) -> TScalar {
        self.max.y - self.min.y
    }

    #[inline]
    pub fn size_z(&self) -> TScalar {
        self.max.z - self.min.z
    }

    #[inline]
    pub fn size_max(&self) -> TScalar {
        let xy = if self.size_x() > self.size_y() { self.size_x() } else { self.size_y() };
        if xy > self.size_z() { xy } else { self.size_z() }
    }

    /// Grows the box, in place, to also contain `point`.
    #[inline]
    pub fn union_point(&mut self, point: &Point3<TScalar>) -> &mut Self {
        self.max = max2(&self.max.coords, &point.coords).into();
        self.min = min2(&self.min.coords, &point.coords).into();
        self
    }

    /// Grows the box, in place, to also contain `other`.
    #[inline]
    pub fn union_box(&mut self, other: &Box3<TScalar>) -> &mut Self {
        self.max = max2(&self.max.coords, &other.max.coords).into();
        self.min = min2(&self.min.coords, &other.min.coords).into();
        self
    }

    /// Returns a copy of this box expanded outward by `amount` on every side.
    #[inline]
    pub fn inflated(&self, amount: TScalar) -> Self {
        Self {
            min: self.min - Point3::new(amount, amount, amount).coords,
            max: self.max + Point3::new(amount, amount, amount).coords,
        }
    }

    #[inline]
    pub fn contains_point(&self, point: &Point3<TScalar>) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }

    /// Inclusive box-box overlap test.
    pub fn overlaps(&self, other: &Box3<TScalar>) -> bool {
        if self.max.x < other.min.x || self.min.x > other.max.x {
            return false;
        }

        if self.max.y < other.min.y || self.min.y > other.max.y {
            return false;
        }

        if self.max.z < other.min.z || self.min.z > other.max.z {
            return false;
        }

        true
    }

    /// Inclusive box-box overlap test where `other` is first expanded by `tol` on every side.
    #[inline]
    pub fn overlaps_inflated(&self, other: &Box3<TScalar>, tol: TScalar) -> bool {
        self.overlaps(&other.inflated(tol))
    }

    /// Squared distance from `point` to the closest point of the box (zero if inside).
    pub fn squared_distance(&self, point: &Point3<TScalar>) -> TScalar {
        let mut sq_distance = TScalar::zero();

        for i in 0..3 {
            let v = point[i];

            if v < self.min[i] {
                sq_distance += (self.min[i] - v) * (self.min[i] - v);
            }

            if v > self.max[i] {
                sq_distance += (v - self.max[i]) * (v - self.max[i]);
            }
        }

        sq_distance
    }
}

impl<TScalar: RealNumber> HasScalarType for Box3<TScalar> {
    type ScalarType = TScalar;
}

impl<TScalar: RealNumber> ClosestPoint3 for Box3<TScalar> {
    #[inline]
    fn closest_point(&self, point: &Point3<TScalar>) -> Point3<TScalar> {
        Point3::from(min2(&max2(&self.min.coords, &point.coords), &self.max.coords))
    }
}
