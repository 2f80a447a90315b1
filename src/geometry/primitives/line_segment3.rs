use nalgebra::Point3;

use crate::{
    geometry::traits::{ClosestPoint3, HasScalarType, RealNumber},
    helpers::aliases::SegmentBarycentric,
};

/// 3D line segment between two endpoints.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct LineSegment3<TScalar: RealNumber> {
    a: Point3<TScalar>,
    b: Point3<TScalar>,
}

impl<TScalar: RealNumber> LineSegment3<TScalar> {
    #[inline]
    pub fn new(a: &Point3<TScalar>, b: &Point3<TScalar>) -> Self {
        Self { a: *a, b: *b }
    }

    #[inline]
    pub fn start(&self) -> &Point3<TScalar> {
        &self.a
    }

    #[inline]
    pub fn end(&self) -> &Point3<TScalar> {
        &self.b
    }

    /// Closest point on the segment to `point`, together with its barycentric
    /// coordinates `[lambda_a, lambda_b]` (`lambda_a + lambda_b == 1`, both `>= 0`).
    pub fn closest_point_barycentric(
        &self,
        point: &Point3<TScalar>,
    ) -> (Point3<TScalar>, SegmentBarycentric<TScalar>) {
        let zero = TScalar::zero();
        let one = TScalar::one();

        let ab = self.b - self.a;
        let t = (point - self.a).dot(&ab);

        if t <= zero {
            return (self.a, SegmentBarycentric::new(one, zero));
        }

        let denom = ab.dot(&ab);
        if t >= denom {
            return (self.b, SegmentBarycentric::new(zero, one));
        }

        let t = t / denom;
        let closest = self.a + ab * t;

        (closest, SegmentBarycentric::new(one - t, t))
    }

    /// Minimum distance from `point` to the segment.
    #[inline]
    pub fn distance(&self, point: &Point3<TScalar>) -> TScalar {
        let (closest, _) = self.closest_point_barycentric(point);
        (point - closest).norm()
    }
}

impl<TScalar: RealNumber> HasScalarType for LineSegment3<TScalar> {
    type ScalarType = TScalar;
}

impl<TScalar: RealNumber> ClosestPoint3 for LineSegment3<TScalar> {
    #[inline]
    fn closest_point(&self, point: &Point3<TScalar>) -> Point3<TScalar> {
        self.closest_point_barycentric(point).0
    }
}
