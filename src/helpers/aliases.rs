use nalgebra::{Point3, Vector2, Vector3};

/// A point (or, where the context is a direction, a free vector) in 3D space.
pub type Vec3<T> = Point3<T>;
pub type Vec3f = Point3<f32>;
pub type Vec3d = Point3<f64>;

/// Barycentric coordinates of a point with respect to a segment: `[lambda_a, lambda_b]`.
pub type SegmentBarycentric<T> = Vector2<T>;

/// Barycentric coordinates of a point with respect to a triangle: `[lambda_a, lambda_b, lambda_c]`.
pub type TriangleBarycentric<T> = Vector3<T>;
