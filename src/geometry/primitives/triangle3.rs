use nalgebra::{Point3, Vector3};
use nalgebra_glm::{max2, min2};

use crate::{
    geometry::traits::{ClosestPoint3, HasBBox3, HasScalarType, RealNumber},
    helpers::aliases::TriangleBarycentric,
};

use super::box3::Box3;

/// 3D triangle, given by its three vertex positions.
#[derive(Debug, Clone, Copy)]
pub struct Triangle3<TScalar: RealNumber> {
    a: Point3<TScalar>,
    b: Point3<TScalar>,
    c: Point3<TScalar>,
}

impl<TScalar: RealNumber> Triangle3<TScalar> {
    #[inline]
    pub fn new(a: Point3<TScalar>, b: Point3<TScalar>, c: Point3<TScalar>) -> Self {
        Self { a, b, c }
    }

    #[inline]
    pub fn a(&self) -> &Point3<TScalar> {
        &self.a
    }

    #[inline]
    pub fn b(&self) -> &Point3<TScalar> {
        &self.b
    }

    #[inline]
    pub fn c(&self) -> &Point3<TScalar> {
        &self.c
    }

    /// Outward unit normal, or `None` if the triangle is degenerate (zero area).
    #[inline]
    pub fn try_normal(&self) -> Option<Vector3<TScalar>> {
        let cross = (self.b - self.a).cross(&(self.c - self.a));

        if cross.norm_squared() <= TScalar::zero() {
            return None;
        }

        Some(cross.normalize())
    }

    #[inline]
    pub fn point_at(&self, barycoords: &TriangleBarycentric<TScalar>) -> Point3<TScalar> {
        Point3::new(
            barycoords.x * self.a.x + barycoords.y * self.b.x + barycoords.z * self.c.x,
            barycoords.x * self.a.y + barycoords.y * self.b.y + barycoords.z * self.c.y,
            barycoords.x * self.a.z + barycoords.y * self.b.z + barycoords.z * self.c.z,
        )
    }

    /// Closest point on the triangle to `point`, together with its barycentric
    /// coordinates `[lambda_a, lambda_b, lambda_c]`.
    ///
    /// Region-based closest point, following Ericson, *Real-Time Collision
    /// Detection* section 5.1.5: the query point is classified against the
    /// three vertex regions, the three edge regions and the face region of
    /// the triangle's Voronoi diagram.
    pub fn closest_point_barycentric(
        &self,
        point: &Point3<TScalar>,
    ) -> (Point3<TScalar>, TriangleBarycentric<TScalar>) {
        let zero = TScalar::zero();
        let one = TScalar::one();

        let ab = self.b - self.a;
        let ac = self.c - self.a;
        let ap = point - self.a;
        let d1 = ab.dot(&ap);
        let d2 = ac.dot(&ap);

        // vertex region outside A
        if d1 <= zero && d2 <= zero {
            return (self.a, TriangleBarycentric::new(one, zero, zero));
        }

        let bp = point - self.b;
        let d3 = ab.dot(&bp);
        let d4 = ac.dot(&bp);

        // vertex region outside B
        if d3 >= zero && d4 <= d3 {
            return (self.b, TriangleBarycentric::new(zero, one, zero));
        }

        // edge region of AB
        let vc = d1 * d4 - d3 * d2;
        if vc <= zero && d1 >= zero && d3 <= zero {
            let v = d1 / (d1 - d3);
            return (
                self.a + ab.scale(v),
                TriangleBarycentric::new(one - v, v, zero),
            );
        }

        let cp = point - self.c;
        let d5 = ab.dot(&cp);
        let d6 = ac.dot(&cp);

        // vertex region outside C
        if d6 >= zero && d5 <= d6 {
            return (self.c, TriangleBarycentric::new(zero, zero, one));
        }

        // edge region of AC
        let vb = d5 * d2 - d1 * d6;
        if vb <= zero && d2 >= zero && d6 <= zero {
            let w = d2 / (d2 - d6);
            return (
                self.a + ac.scale(w),
                TriangleBarycentric::new(one - w, zero, w),
            );
        }

        // edge region of BC
        let va = d3 * d6 - d5 * d4;
        if va <= zero && (d4 - d3) >= zero && (d5 - d6) >= zero {
            let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
            return (
                self.b + (self.c - self.b).scale(w),
                TriangleBarycentric::new(zero, one - w, w),
            );
        }

        // face region, barycentric coordinates (u, v, w)
        let denom = one / (va + vb + vc);
        let v = vb * denom;
        let w = vc * denom;

        (
            self.a + ab * v + ac * w,
            TriangleBarycentric::new(one - v - w, v, w),
        )
    }

    /// Minimum distance from `point` to the triangle.
    #[inline]
    pub fn distance(&self, point: &Point3<TScalar>) -> TScalar {
        let (closest, _) = self.closest_point_barycentric(point);
        (point - closest).norm()
    }
}

impl<TScalar: RealNumber> HasScalarType for Triangle3<TScalar> {
    type ScalarType = TScalar;
}

impl<TScalar: RealNumber> HasBBox3 for Triangle3<TScalar> {
    #[inline]
    fn bbox(&self) -> Box3<TScalar> {
        return Box3::new(
            min2(&self.c.coords, &min2(&self.a.coords, &self.b.coords)).into(),
            max2(&self.c.coords, &max2(&self.a.coords, &self.b.coords)).into(),
        );
    }
}

impl<TScalar: RealNumber> ClosestPoint3 for Triangle3<TScalar> {
    #[inline]
    fn closest_point(&self, point: &Point3<TScalar>) -> Point3<TScalar> {
        self.closest_point_barycentric(point).0
    }
}
