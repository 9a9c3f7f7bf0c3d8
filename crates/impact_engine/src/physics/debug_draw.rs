//! Debug visualization side channel
//!
//! Bodies can emit their bounding volumes and last contact normal to a
//! [`DebugDraw`] collaborator. Headless hosts plug in [`NullDebugDraw`].

use crate::foundation::math::Vec3;
use crate::physics::shapes::{Aabb, BoundingSphere};

/// Sink for debug-draw primitives
pub trait DebugDraw {
    /// Draw a wireframe box
    fn draw_box(&mut self, aabb: &Aabb);

    /// Draw a wireframe sphere
    fn draw_sphere(&mut self, sphere: &BoundingSphere);

    /// Draw a line segment
    fn draw_line(&mut self, start: Vec3, end: Vec3);
}

/// Debug-draw collaborator that discards everything
#[derive(Debug, Default)]
pub struct NullDebugDraw;

impl DebugDraw for NullDebugDraw {
    fn draw_box(&mut self, _aabb: &Aabb) {}

    fn draw_sphere(&mut self, _sphere: &BoundingSphere) {}

    fn draw_line(&mut self, _start: Vec3, _end: Vec3) {}
}
