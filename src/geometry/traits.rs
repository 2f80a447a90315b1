use nalgebra::{Point3, RealField};
use num_traits::NumCast;

use super::primitives::box3::Box3;

/// Scalar type usable throughout the geometry and spatial-partitioning code.
///
/// `f32` and `f64` are the only real implementors; the bound exists so that
/// algorithms are written once and instantiated for either precision.
pub trait RealNumber: RealField + Copy + NumCast {}

impl<T> RealNumber for T where T: RealField + Copy + NumCast {}

/// A type that carries a single scalar precision.
pub trait HasScalarType {
    type ScalarType: RealNumber;
}

/// 3D axis-aligned bounding box of a value.
pub trait HasBBox3: HasScalarType {
    fn bbox(&self) -> Box3<Self::ScalarType>;
}

/// Closest point on a shape to a query point, in world space.
pub trait ClosestPoint3: HasScalarType {
    fn closest_point(&self, point: &Point3<Self::ScalarType>) -> Point3<Self::ScalarType>;
}

/// Helper to build a scalar constant from an `f64` literal.
#[inline]
pub fn scalar<T: RealNumber>(value: f64) -> T {
    NumCast::from(value).unwrap()
}
