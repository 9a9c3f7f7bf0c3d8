//! Stateless ray and segment intersection queries
//!
//! Pure functions against boxes, spheres, and planes. Ray functions return
//! a parametric distance (negative on a miss); segment functions wrap them
//! and produce a full [`GeometryResult`] with position and surface normal.

use crate::foundation::math::Vec3;
use crate::physics::shapes::{Aabb, Plane};
use crate::physics::world::EntityKey;

/// Sentinel distance returned when a ray query misses.
pub const MISS: f32 = -1.0;

const SEGMENT_EPSILON: f32 = 1.0e-6;

/// Result of a segment intersection query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometryResult {
    /// Whether the query hit anything
    pub hit: bool,
    /// Point of intersection in query space
    pub position: Vec3,
    /// Distance from the segment start to the hit point
    pub distance: f32,
    /// Surface normal at the hit point
    pub normal: Vec3,
    /// Owner entity of the hit body; set only by body-level query wrappers
    pub body: Option<EntityKey>,
}

impl Default for GeometryResult {
    fn default() -> Self {
        Self {
            hit: false,
            position: Vec3::zeros(),
            distance: 0.0,
            normal: Vec3::zeros(),
            body: None,
        }
    }
}

/// Distance along a ray to the surface of a box, via the slab method.
///
/// Returns [`MISS`] when the ray never crosses the box, `0.0` when the
/// origin is already inside, and the entry distance otherwise. Axes with a
/// zero direction component divide to signed infinity, which the min/max
/// combine handles without special cases.
pub fn ray_in_aabb(origin: Vec3, direction: Vec3, aabb: &Aabb) -> f32 {
    let inv = Vec3::new(1.0 / direction.x, 1.0 / direction.y, 1.0 / direction.z);

    let tx1 = (aabb.min.x - origin.x) * inv.x;
    let tx2 = (aabb.max.x - origin.x) * inv.x;
    let ty1 = (aabb.min.y - origin.y) * inv.y;
    let ty2 = (aabb.max.y - origin.y) * inv.y;
    let tz1 = (aabb.min.z - origin.z) * inv.z;
    let tz2 = (aabb.max.z - origin.z) * inv.z;

    let t_min = tx1.min(tx2).max(ty1.min(ty2)).max(tz1.min(tz2));
    let t_max = tx1.max(tx2).min(ty1.max(ty2)).min(tz1.max(tz2));

    if t_max < t_min || t_max < 0.0 {
        return MISS;
    }

    // Origin inside the box: distance to the surface is zero by convention.
    t_min.max(0.0)
}

/// Segment query against a box.
///
/// The normal is the hit position relative to the box center, divided by
/// the half-extents and snapped to the dominant axis, yielding one of the
/// six face normals.
pub fn line_in_aabb(start: Vec3, end: Vec3, aabb: &Aabb) -> GeometryResult {
    let delta = end - start;
    let length = delta.magnitude();
    if length < SEGMENT_EPSILON {
        return GeometryResult::default();
    }

    let direction = delta / length;
    let distance = ray_in_aabb(start, direction, aabb);
    if distance < 0.0 || distance > length {
        return GeometryResult::default();
    }

    let position = start + direction * distance;
    let relative = position - aabb.center();
    let extents = aabb.extents();
    let scaled = Vec3::new(
        safe_div(relative.x, extents.x),
        safe_div(relative.y, extents.y),
        safe_div(relative.z, extents.z),
    );

    GeometryResult {
        hit: true,
        position,
        distance,
        normal: dominant_axis(scaled),
        body: None,
    }
}

/// Distance along a ray to the surface of a sphere.
///
/// Uses the closest-approach parametrization: an origin outside the sphere
/// takes the entry root, an origin inside takes the exit root.
pub fn ray_in_sphere(origin: Vec3, direction: Vec3, center: Vec3, radius: f32) -> f32 {
    let to_center = center - origin;
    let projection = to_center.dot(&direction);
    let perp_sq = to_center.magnitude_squared() - projection * projection;
    let radius_sq = radius * radius;

    if perp_sq > radius_sq {
        return MISS;
    }

    let half_chord = (radius_sq - perp_sq).sqrt();
    let inside = to_center.magnitude_squared() < radius_sq;

    let distance = if inside {
        projection + half_chord
    } else {
        projection - half_chord
    };

    if distance < 0.0 {
        MISS
    } else {
        distance
    }
}

/// Segment query against a sphere.
pub fn line_in_sphere(start: Vec3, end: Vec3, center: Vec3, radius: f32) -> GeometryResult {
    let delta = end - start;
    let length = delta.magnitude();
    if length < SEGMENT_EPSILON {
        return GeometryResult::default();
    }

    let direction = delta / length;
    let distance = ray_in_sphere(start, direction, center, radius);
    if distance < 0.0 || distance > length {
        return GeometryResult::default();
    }

    let position = start + direction * distance;
    let offset = position - center;
    let normal = if offset.magnitude_squared() > SEGMENT_EPSILON {
        offset.normalize()
    } else {
        -direction
    };

    GeometryResult {
        hit: true,
        position,
        distance,
        normal,
        body: None,
    }
}

/// Distance along a ray to a plane.
///
/// Misses when the ray is parallel to the plane or moving away from it
/// (direction not opposing the normal).
pub fn ray_in_plane(origin: Vec3, direction: Vec3, plane: &Plane) -> f32 {
    let denom = direction.dot(&plane.normal);
    if denom >= 0.0 {
        return MISS;
    }

    let distance = -plane.signed_distance(origin) / denom;
    if distance < 0.0 {
        MISS
    } else {
        distance
    }
}

/// Segment query against a plane.
pub fn line_in_plane(start: Vec3, end: Vec3, plane: &Plane) -> GeometryResult {
    let delta = end - start;
    let length = delta.magnitude();
    if length < SEGMENT_EPSILON {
        return GeometryResult::default();
    }

    let direction = delta / length;
    let distance = ray_in_plane(start, direction, plane);
    if distance < 0.0 || distance > length {
        return GeometryResult::default();
    }

    GeometryResult {
        hit: true,
        position: start + direction * distance,
        distance,
        normal: plane.normal,
        body: None,
    }
}

/// Snap a vector to the axis with the largest absolute component.
fn dominant_axis(v: Vec3) -> Vec3 {
    let abs = v.abs();
    if abs.x >= abs.y && abs.x >= abs.z {
        Vec3::new(v.x.signum(), 0.0, 0.0)
    } else if abs.y >= abs.z {
        Vec3::new(0.0, v.y.signum(), 0.0)
    } else {
        Vec3::new(0.0, 0.0, v.z.signum())
    }
}

fn safe_div(numerator: f32, denominator: f32) -> f32 {
    if denominator.abs() < SEGMENT_EPSILON {
        0.0
    } else {
        numerator / denominator
    }
}
