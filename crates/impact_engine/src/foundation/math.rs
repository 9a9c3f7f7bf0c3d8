//! Math utilities and types
//!
//! Provides the fundamental math types used throughout the collision core.

pub use nalgebra::{Matrix3, Matrix4, Quaternion, Unit, Vector2, Vector3, Vector4};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Smallest scale component allowed when inverting a transform.
///
/// Guards the reciprocal against a division by exactly zero; a degenerate
/// scale axis collapses to a very large (finite) inverse instead.
pub const SCALE_EPSILON: f32 = 1.0e-6;

/// Transform representing position, rotation, and scale
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// Position in 3D space
    pub position: Vec3,

    /// Rotation quaternion
    pub rotation: Quat,

    /// Scale factors
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    /// Create a new identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a transform with only position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a transform with position and rotation
    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            ..Default::default()
        }
    }

    /// Convert to a transformation matrix
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.position)
            * self.rotation.to_homogeneous()
            * Mat4::new_nonuniform_scaling(&self.scale)
    }

    /// Apply this transform to a point
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.position + self.rotation * self.scale.component_mul(&point)
    }

    /// Apply this transform to a direction vector (rotation and scale, no translation)
    pub fn transform_vector(&self, vector: Vec3) -> Vec3 {
        self.rotation * self.scale.component_mul(&vector)
    }

    /// Map a world-space point into this transform's local space
    pub fn inverse_transform_point(&self, point: Vec3) -> Vec3 {
        let rotated = self.rotation.inverse() * (point - self.position);
        rotated.component_div(&guarded_scale(self.scale))
    }

    /// Map a world-space vector into this transform's local space
    pub fn inverse_transform_vector(&self, vector: Vec3) -> Vec3 {
        let rotated = self.rotation.inverse() * vector;
        rotated.component_div(&guarded_scale(self.scale))
    }

    /// Combine this transform with another (this applied after `other`)
    pub fn combine(&self, other: &Transform) -> Transform {
        Transform {
            position: self.position + self.rotation * self.scale.component_mul(&other.position),
            rotation: self.rotation * other.rotation,
            scale: self.scale.component_mul(&other.scale),
        }
    }
}

/// Clamp each scale component away from zero, preserving sign.
fn guarded_scale(scale: Vec3) -> Vec3 {
    Vec3::new(
        guard_component(scale.x),
        guard_component(scale.y),
        guard_component(scale.z),
    )
}

fn guard_component(value: f32) -> f32 {
    if value.abs() < SCALE_EPSILON {
        if value < 0.0 {
            -SCALE_EPSILON
        } else {
            SCALE_EPSILON
        }
    } else {
        value
    }
}
