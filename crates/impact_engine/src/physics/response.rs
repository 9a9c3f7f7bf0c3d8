//! Narrow-phase contact calculators
//!
//! Pure functions producing a [`CollisionResponse`] per shape pair. A
//! default (zeroed) response means no contact; callers must treat it as
//! "no collision", never as an error.
//!
//! Normal convention: the response normal points from the second shape
//! toward the first, so applying a positive impulse along it separates
//! the first shape from the second.

use crate::foundation::math::Vec3;
use crate::physics::shapes::{Aabb, Plane, Triangle};

const CENTER_EPSILON: f32 = 1.0e-6;

/// Narrow-phase contact description
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CollisionResponse {
    /// Separation normal, pointing from the second shape toward the first
    pub normal: Vec3,
    /// Penetration depth; zero when there is no contact
    pub distance: f32,
    /// Approximate contact point, informational only
    pub point: Vec3,
}

impl CollisionResponse {
    /// Whether this response describes an actual contact
    pub fn is_contact(&self) -> bool {
        self.distance > 0.0
    }

    /// The response with the smaller penetration, preferring actual contacts
    pub fn least(self, other: CollisionResponse) -> CollisionResponse {
        match (self.is_contact(), other.is_contact()) {
            (true, true) => {
                if self.distance <= other.distance {
                    self
                } else {
                    other
                }
            }
            (true, false) => self,
            _ => other,
        }
    }
}

/// Sphere vs. sphere contact.
///
/// Coincident centers are degenerate (the normal is undefined) and report
/// no contact.
pub fn sphere_sphere(
    a_center: Vec3,
    a_radius: f32,
    b_center: Vec3,
    b_radius: f32,
) -> CollisionResponse {
    let delta = a_center - b_center;
    let distance_sq = delta.magnitude_squared();
    let radius_sum = a_radius + b_radius;

    if distance_sq > radius_sum * radius_sum || distance_sq < CENTER_EPSILON {
        return CollisionResponse::default();
    }

    let distance = distance_sq.sqrt();
    let normal = delta / distance;

    CollisionResponse {
        normal,
        distance: radius_sum - distance,
        point: b_center + normal * b_radius,
    }
}

/// Sphere vs. plane contact. Normal points from the plane toward the sphere.
pub fn sphere_plane(center: Vec3, radius: f32, plane: &Plane) -> CollisionResponse {
    let signed = plane.signed_distance(center);
    if signed.abs() > radius {
        return CollisionResponse::default();
    }

    let side = if signed < 0.0 { -1.0 } else { 1.0 };

    CollisionResponse {
        normal: plane.normal * side,
        distance: radius - signed.abs(),
        point: center - plane.normal * signed,
    }
}

/// Sphere vs. box contact via closest-point projection.
///
/// Normal points from the box toward the sphere. A sphere center inside
/// the box falls back to the box-center direction.
pub fn sphere_aabb(center: Vec3, radius: f32, aabb: &Aabb) -> CollisionResponse {
    let closest = Vec3::new(
        center.x.clamp(aabb.min.x, aabb.max.x),
        center.y.clamp(aabb.min.y, aabb.max.y),
        center.z.clamp(aabb.min.z, aabb.max.z),
    );

    let offset = center - closest;
    let distance_sq = offset.magnitude_squared();
    if distance_sq > radius * radius {
        return CollisionResponse::default();
    }

    if distance_sq < CENTER_EPSILON {
        // Center inside the box; push out along the center-to-center axis.
        let fallback = center - aabb.center();
        let normal = if fallback.magnitude_squared() > CENTER_EPSILON {
            fallback.normalize()
        } else {
            Vec3::new(0.0, 0.0, 1.0)
        };
        return CollisionResponse {
            normal,
            distance: radius,
            point: closest,
        };
    }

    let distance = distance_sq.sqrt();
    CollisionResponse {
        normal: offset / distance,
        distance: radius - distance,
        point: closest,
    }
}

/// Box vs. plane contact.
///
/// Compares the box's projected half-extent along the plane normal to the
/// signed distance of the box center. Normal points from the plane toward
/// the box.
pub fn aabb_plane(aabb: &Aabb, plane: &Plane) -> CollisionResponse {
    let extents = aabb.extents();
    let projected = extents.x * plane.normal.x.abs()
        + extents.y * plane.normal.y.abs()
        + extents.z * plane.normal.z.abs();

    let center = aabb.center();
    let signed = plane.signed_distance(center);
    if signed.abs() > projected {
        return CollisionResponse::default();
    }

    let side = if signed < 0.0 { -1.0 } else { 1.0 };

    CollisionResponse {
        normal: plane.normal * side,
        distance: projected - signed.abs(),
        point: center - plane.normal * signed,
    }
}

/// Box vs. box contact via the minimum-translation-vector heuristic.
///
/// The axis with the smallest positive overlap wins; ties resolve in
/// X, Y, Z priority order. This is not a full SAT test. Normal points
/// from `b` toward `a`.
pub fn aabb_aabb(a: &Aabb, b: &Aabb) -> CollisionResponse {
    let delta = a.center() - b.center();
    let half_sum = a.extents() + b.extents();

    let mut overlap = Vec3::zeros();
    for axis in 0..3 {
        overlap[axis] = half_sum[axis] - delta[axis].abs();
        if overlap[axis] <= 0.0 {
            return CollisionResponse::default();
        }
    }

    let mut best_axis = 0;
    for axis in 1..3 {
        if overlap[axis] < overlap[best_axis] {
            best_axis = axis;
        }
    }

    let mut normal = Vec3::zeros();
    normal[best_axis] = if delta[best_axis] < 0.0 { -1.0 } else { 1.0 };

    CollisionResponse {
        normal,
        distance: overlap[best_axis],
        point: (a.center() + b.center()) * 0.5,
    }
}

/// Triangle vs. box separating-axis test, reduced to Class I and Class II.
///
/// Class I checks the three box axes against the recentered triangle;
/// Class II checks the triangle's face normal. The nine edge cross-product
/// axes (Class III) are only compiled in with the `sat-edge-axes` feature,
/// so edge-only separations can report contact where none exists. Normal
/// points from the triangle toward the box center.
pub fn triangle_aabb(
    a: Vec3,
    b: Vec3,
    c: Vec3,
    box_center: Vec3,
    box_extents: Vec3,
) -> CollisionResponse {
    // Class I: recenter the triangle on the box origin and reject per axis.
    let v0 = a - box_center;
    let v1 = b - box_center;
    let v2 = c - box_center;

    for axis in 0..3 {
        let lo = v0[axis].min(v1[axis]).min(v2[axis]);
        let hi = v0[axis].max(v1[axis]).max(v2[axis]);
        if lo > box_extents[axis] || hi < -box_extents[axis] {
            return CollisionResponse::default();
        }
    }

    // Class II: box projection along the triangle face normal.
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;
    let cross = edge1.cross(&edge2);
    let cross_len_sq = cross.magnitude_squared();
    if cross_len_sq < CENTER_EPSILON {
        // Degenerate triangle with no face plane.
        return CollisionResponse::default();
    }

    let face_normal = cross / cross_len_sq.sqrt();
    let plane_distance = face_normal.dot(&v0);
    let projected = box_extents.x * face_normal.x.abs()
        + box_extents.y * face_normal.y.abs()
        + box_extents.z * face_normal.z.abs();

    if plane_distance.abs() > projected {
        return CollisionResponse::default();
    }

    #[cfg(feature = "sat-edge-axes")]
    if edge_axes_separate(v0, v1, v2, box_extents) {
        return CollisionResponse::default();
    }

    // Point the normal from the triangle plane toward the box center.
    let normal = if plane_distance > 0.0 {
        -face_normal
    } else {
        face_normal
    };

    CollisionResponse {
        normal,
        distance: projected - plane_distance.abs(),
        point: box_center - face_normal * plane_distance,
    }
}

/// Class III edge cross-product axes, compiled out of shipping builds.
#[cfg(feature = "sat-edge-axes")]
fn edge_axes_separate(v0: Vec3, v1: Vec3, v2: Vec3, extents: Vec3) -> bool {
    let edges = [v1 - v0, v2 - v1, v0 - v2];
    let box_axes = [Vec3::x(), Vec3::y(), Vec3::z()];

    for edge in &edges {
        for box_axis in &box_axes {
            let axis = edge.cross(box_axis);
            if axis.magnitude_squared() < CENTER_EPSILON {
                continue;
            }

            let p0 = axis.dot(&v0);
            let p1 = axis.dot(&v1);
            let p2 = axis.dot(&v2);
            let lo = p0.min(p1).min(p2);
            let hi = p0.max(p1).max(p2);

            let radius = extents.x * axis.x.abs()
                + extents.y * axis.y.abs()
                + extents.z * axis.z.abs();

            if lo > radius || hi < -radius {
                return true;
            }
        }
    }

    false
}

/// Triangle vs. sphere contact.
///
/// Finds the closest point on the triangle to the sphere center, then
/// resolves against the triangle's plane. Normal points from the triangle
/// toward the sphere.
pub fn triangle_sphere(a: Vec3, b: Vec3, c: Vec3, center: Vec3, radius: f32) -> CollisionResponse {
    let triangle = Triangle::new(a, b, c);
    let closest = triangle.closest_point(center);

    let offset = center - closest;
    if offset.magnitude_squared() > radius * radius {
        return CollisionResponse::default();
    }

    let plane = Plane::from_point_normal(a, triangle.normal());
    let mut response = sphere_plane(center, radius, &plane);
    if response.is_contact() {
        response.point = closest;
    }
    response
}
