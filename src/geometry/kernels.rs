use nalgebra::Point3;

use crate::helpers::aliases::{SegmentBarycentric, TriangleBarycentric};

use super::{
    primitives::{box3::Box3, line_segment3::LineSegment3, triangle3::Triangle3},
    traits::{scalar, RealNumber},
};

/// Which Voronoi region of a general simplex the closest point fell in.
/// Only meaningful for [`dist_point_simplex`]; the segment/triangle kernels
/// return exact barycentric coordinates instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimplexRegion {
    /// Closest point coincides with vertex `index`.
    Vertex(usize),
    /// Closest point lies strictly between vertices `a` and `b`.
    Edge(usize, usize),
}

/// Minimum distance from `point` to the segment `[a, b]`, the closest point,
/// and its barycentric coordinates `[lambda_a, lambda_b]`.
#[inline]
pub fn dist_point_segment<TScalar: RealNumber>(
    point: &Point3<TScalar>,
    a: &Point3<TScalar>,
    b: &Point3<TScalar>,
) -> (TScalar, Point3<TScalar>, SegmentBarycentric<TScalar>) {
    let segment = LineSegment3::new(a, b);
    let (closest, lambda) = segment.closest_point_barycentric(point);
    ((point - closest).norm(), closest, lambda)
}

/// Minimum distance from `point` to the triangle `(a, b, c)`, the closest
/// point, and its barycentric coordinates `[lambda_a, lambda_b, lambda_c]`.
#[inline]
pub fn dist_point_triangle<TScalar: RealNumber>(
    point: &Point3<TScalar>,
    a: &Point3<TScalar>,
    b: &Point3<TScalar>,
    c: &Point3<TScalar>,
) -> (TScalar, Point3<TScalar>, TriangleBarycentric<TScalar>) {
    let triangle = Triangle3::new(*a, *b, *c);
    let (closest, lambda) = triangle.closest_point_barycentric(point);
    ((point - closest).norm(), closest, lambda)
}

/// Minimum distance from `point` to a general simplex given by its vertices
/// `vs`, used for cell vertex counts other than 2 (segment) or 3 (triangle).
///
/// Falls back to brute-force closest-point-on-edge over every edge of the
/// (assumed planar, convex) vertex loop, plus a check against each vertex.
pub fn dist_point_simplex<TScalar: RealNumber>(
    point: &Point3<TScalar>,
    vs: &[Point3<TScalar>],
) -> (TScalar, Point3<TScalar>, SimplexRegion) {
    debug_assert!(!vs.is_empty(), "simplex must have at least one vertex");

    if vs.len() == 1 {
        return ((point - vs[0]).norm(), vs[0], SimplexRegion::Vertex(0));
    }

    let mut best_d: TScalar = scalar(1.0e18);
    let mut best_p = vs[0];
    let mut best_region = SimplexRegion::Vertex(0);

    let n = vs.len();
    for i in 0..n {
        let j = (i + 1) % n;
        let (d, p, lambda) = dist_point_segment(point, &vs[i], &vs[j]);

        if d < best_d {
            best_d = d;
            best_p = p;

            let zero = TScalar::zero();
            best_region = if lambda.x <= zero {
                SimplexRegion::Vertex(j)
            } else if lambda.y <= zero {
                SimplexRegion::Vertex(i)
            } else {
                SimplexRegion::Edge(i, j)
            };
        }
    }

    (best_d, best_p, best_region)
}

/// Inclusive overlap test between two axis-aligned boxes given as raw
/// `(min, max)` pairs.
#[inline]
pub fn aabb_overlap<TScalar: RealNumber>(
    min1: &Point3<TScalar>,
    max1: &Point3<TScalar>,
    min2: &Point3<TScalar>,
    max2: &Point3<TScalar>,
) -> bool {
    Box3::new(*min1, *max1).overlaps(&Box3::new(*min2, *max2))
}
