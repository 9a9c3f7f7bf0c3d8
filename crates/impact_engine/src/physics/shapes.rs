//! Collision shapes and bounding volumes
//!
//! Provides the closed set of shapes a body can carry (box, sphere, plane,
//! triangle mesh) plus the bounding volumes used by broad-phase rejection.

use crate::foundation::math::{Transform, Vec3};
use crate::physics::mesh::CollisionMesh;
use std::sync::Arc;

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner of the box
    pub min: Vec3,
    /// Maximum corner of the box
    pub max: Vec3,
}

impl Aabb {
    /// Create a new box from min and max corners
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create a box centered at a point with the given half-extents
    pub fn from_center_extents(center: Vec3, extents: Vec3) -> Self {
        Self {
            min: center - extents,
            max: center + extents,
        }
    }

    /// Get the center of the box
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Get the half-extents of the box
    pub fn extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Check if this box contains a point
    pub fn contains_point(&self, point: Vec3) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }

    /// Check if this box overlaps another
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    /// Smallest box containing both boxes
    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.inf(&other.min),
            max: self.max.sup(&other.max),
        }
    }

    /// This box shifted by an offset
    pub fn translated(&self, offset: Vec3) -> Aabb {
        Aabb {
            min: self.min + offset,
            max: self.max + offset,
        }
    }

    /// This box unioned with itself advanced along a motion vector
    pub fn swept_along(&self, motion: Vec3) -> Aabb {
        self.union(&self.translated(motion))
    }

    /// This box scaled about its center by a looseness factor
    pub fn dilated(&self, factor: f32) -> Aabb {
        Aabb::from_center_extents(self.center(), self.extents() * factor)
    }

    /// Pad any axis with near-zero extent so every axis is strictly positive
    pub fn padded(&self, epsilon: f32) -> Aabb {
        let mut min = self.min;
        let mut max = self.max;
        for axis in 0..3 {
            if max[axis] - min[axis] < epsilon {
                min[axis] -= epsilon;
                max[axis] += epsilon;
            }
        }
        Aabb { min, max }
    }

    /// Index (0 = X, 1 = Y, 2 = Z) of the longest axis
    pub fn longest_axis(&self) -> usize {
        let size = self.max - self.min;
        if size.x >= size.y && size.x >= size.z {
            0
        } else if size.y >= size.z {
            1
        } else {
            2
        }
    }

    /// The eight corners of the box
    pub fn corners(&self) -> [Vec3; 8] {
        let (lo, hi) = (self.min, self.max);
        [
            Vec3::new(lo.x, lo.y, lo.z),
            Vec3::new(hi.x, lo.y, lo.z),
            Vec3::new(lo.x, hi.y, lo.z),
            Vec3::new(hi.x, hi.y, lo.z),
            Vec3::new(lo.x, lo.y, hi.z),
            Vec3::new(hi.x, lo.y, hi.z),
            Vec3::new(lo.x, hi.y, hi.z),
            Vec3::new(hi.x, hi.y, hi.z),
        ]
    }

    /// Axis-aligned box covering this box mapped through a transform
    pub fn transformed(&self, transform: &Transform) -> Aabb {
        let mut min = Vec3::repeat(f32::INFINITY);
        let mut max = Vec3::repeat(f32::NEG_INFINITY);
        for corner in self.corners() {
            let mapped = transform.transform_point(corner);
            min = min.inf(&mapped);
            max = max.sup(&mapped);
        }
        Aabb { min, max }
    }

    /// Axis-aligned box covering this box mapped into a transform's local space
    pub fn inverse_transformed(&self, transform: &Transform) -> Aabb {
        let mut min = Vec3::repeat(f32::INFINITY);
        let mut max = Vec3::repeat(f32::NEG_INFINITY);
        for corner in self.corners() {
            let mapped = transform.inverse_transform_point(corner);
            min = min.inf(&mapped);
            max = max.sup(&mapped);
        }
        Aabb { min, max }
    }
}

/// Bounding sphere for broad-phase rejection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSphere {
    /// Center of the sphere in world space
    pub center: Vec3,
    /// Radius of the sphere
    pub radius: f32,
}

impl BoundingSphere {
    /// Create a new bounding sphere
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Sphere conservatively covering a box (reaches the corners)
    pub fn from_aabb(aabb: &Aabb) -> Self {
        Self {
            center: aabb.center(),
            radius: aabb.extents().magnitude(),
        }
    }

    /// Check if this sphere intersects another
    pub fn intersects(&self, other: &BoundingSphere) -> bool {
        let distance_squared = (self.center - other.center).magnitude_squared();
        let radius_sum = self.radius + other.radius;
        distance_squared <= radius_sum * radius_sum
    }
}

/// Plane defined by a unit normal and distance from origin
///
/// Points `p` on the plane satisfy `dot(normal, p) + distance == 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    /// Normal vector (normalized on construction)
    pub normal: Vec3,
    /// Distance from origin along the normal
    pub distance: f32,
}

impl Plane {
    /// Create a new plane from a normal and a distance from origin
    pub fn new(normal: Vec3, distance: f32) -> Self {
        Self {
            normal: normal.normalize(),
            distance,
        }
    }

    /// Plane through a point with the given normal
    pub fn from_point_normal(point: Vec3, normal: Vec3) -> Self {
        let normal = normal.normalize();
        Self {
            normal,
            distance: -normal.dot(&point),
        }
    }

    /// Signed distance from the plane to a point (positive on the normal side)
    pub fn signed_distance(&self, point: Vec3) -> f32 {
        self.normal.dot(&point) + self.distance
    }
}

/// A triangle in 3D space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    /// First vertex
    pub a: Vec3,
    /// Second vertex
    pub b: Vec3,
    /// Third vertex
    pub c: Vec3,
}

impl Triangle {
    /// Create a new triangle
    pub fn new(a: Vec3, b: Vec3, c: Vec3) -> Self {
        Self { a, b, c }
    }

    /// Face normal by the right-hand rule
    pub fn normal(&self) -> Vec3 {
        let edge1 = self.b - self.a;
        let edge2 = self.c - self.a;
        edge1.cross(&edge2).normalize()
    }

    /// Closest point on the triangle to a given point
    ///
    /// Projects onto the triangle plane and falls back to the closest point
    /// on an edge or vertex when the projection lands outside.
    pub fn closest_point(&self, point: Vec3) -> Vec3 {
        let edge1 = self.b - self.a;
        let edge2 = self.c - self.a;
        let to_point = point - self.a;

        let d1 = edge1.dot(&to_point);
        let d2 = edge2.dot(&to_point);
        if d1 <= 0.0 && d2 <= 0.0 {
            return self.a;
        }

        let b_to_point = point - self.b;
        let d3 = edge1.dot(&b_to_point);
        let d4 = edge2.dot(&b_to_point);
        if d3 >= 0.0 && d4 <= d3 {
            return self.b;
        }

        let c_to_point = point - self.c;
        let d5 = edge1.dot(&c_to_point);
        let d6 = edge2.dot(&c_to_point);
        if d6 >= 0.0 && d5 <= d6 {
            return self.c;
        }

        let vc = d1 * d4 - d3 * d2;
        if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
            let v = d1 / (d1 - d3);
            return self.a + edge1 * v;
        }

        let vb = d5 * d2 - d1 * d6;
        if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
            let w = d2 / (d2 - d6);
            return self.a + edge2 * w;
        }

        let va = d3 * d6 - d5 * d4;
        if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
            let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
            return self.b + (self.c - self.b) * w;
        }

        let denom = 1.0 / (va + vb + vc);
        let v = vb * denom;
        let w = vc * denom;
        self.a + edge1 * v + edge2 * w
    }
}

/// Shape kind discriminant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    /// Axis-aligned box
    Box,
    /// Sphere
    Sphere,
    /// Infinite plane
    Plane,
    /// Static triangle mesh
    TriangleMesh,
}

/// Collision shape carried by a body
#[derive(Debug, Clone)]
pub enum Shape {
    /// Axis-aligned box with the given half-extents
    Box {
        /// Half-size along each axis
        half_extents: Vec3,
    },
    /// Sphere with the given radius
    Sphere {
        /// Sphere radius
        radius: f32,
    },
    /// Infinite plane in local space
    Plane(Plane),
    /// Triangle mesh shared with the asset system
    TriangleMesh(Arc<CollisionMesh>),
}

/// Half-extent assigned to the degenerate axes of a plane's bounds.
const PLANE_BOUNDS_EXTENT: f32 = 1.0e5;

impl Shape {
    /// Get the shape kind discriminant
    pub fn kind(&self) -> ShapeKind {
        match self {
            Self::Box { .. } => ShapeKind::Box,
            Self::Sphere { .. } => ShapeKind::Sphere,
            Self::Plane(_) => ShapeKind::Plane,
            Self::TriangleMesh(_) => ShapeKind::TriangleMesh,
        }
    }

    /// Object-space bounds of the shape
    pub fn local_bounds(&self) -> Aabb {
        match self {
            Self::Box { half_extents } => Aabb::from_center_extents(Vec3::zeros(), *half_extents),
            Self::Sphere { radius } => {
                Aabb::from_center_extents(Vec3::zeros(), Vec3::repeat(*radius))
            }
            Self::Plane(_) => {
                Aabb::from_center_extents(Vec3::zeros(), Vec3::repeat(PLANE_BOUNDS_EXTENT))
            }
            Self::TriangleMesh(mesh) => mesh.local_bounds(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn padded_restores_positive_extent() {
        let flat = Aabb::new(Vec3::new(-1.0, -1.0, 0.0), Vec3::new(1.0, 1.0, 0.0));
        let padded = flat.padded(0.01);

        for axis in 0..3 {
            assert!(padded.max[axis] - padded.min[axis] > 0.0);
        }
        assert_relative_eq!(padded.max.z, 0.01);
    }

    #[test]
    fn swept_box_covers_both_endpoints() {
        let unit = Aabb::from_center_extents(Vec3::zeros(), Vec3::repeat(1.0));
        let swept = unit.swept_along(Vec3::new(5.0, 0.0, 0.0));

        assert!(swept.contains_point(Vec3::new(-1.0, 0.0, 0.0)));
        assert!(swept.contains_point(Vec3::new(6.0, 0.0, 0.0)));
    }

    #[test]
    fn bounding_sphere_reaches_box_corners() {
        let unit = Aabb::from_center_extents(Vec3::zeros(), Vec3::repeat(1.0));
        let sphere = BoundingSphere::from_aabb(&unit);

        let corner_distance = Vec3::repeat(1.0).magnitude();
        assert_relative_eq!(sphere.radius, corner_distance, epsilon = 1e-6);
    }

    #[test]
    fn longest_axis_picks_dominant_extent() {
        let slab = Aabb::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 4.0, 2.0));
        assert_eq!(slab.longest_axis(), 1);
    }

    #[test]
    fn closest_point_inside_projects_to_plane() {
        let tri = Triangle::new(
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::new(0.0, 2.0, 0.0),
        );

        let closest = tri.closest_point(Vec3::new(0.5, 0.5, 3.0));
        assert_relative_eq!(closest, Vec3::new(0.5, 0.5, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn closest_point_clamps_to_vertex() {
        let tri = Triangle::new(
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        );

        let closest = tri.closest_point(Vec3::new(-2.0, -2.0, 0.0));
        assert_relative_eq!(closest, Vec3::zeros());
    }
}
