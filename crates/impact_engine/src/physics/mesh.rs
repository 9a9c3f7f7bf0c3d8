//! Shared triangle mesh data for static collision bodies
//!
//! Vertex and index buffers are supplied once by the asset system and
//! shared immutably between the owning body and every tree node built
//! from them.

use crate::foundation::math::Vec3;
use crate::physics::shapes::{Aabb, Triangle};

/// Read-only triangle soup with precomputed local bounds
#[derive(Debug, Clone)]
pub struct CollisionMesh {
    vertices: Vec<Vec3>,
    indices: Vec<u32>,
    local_bounds: Aabb,
}

impl CollisionMesh {
    /// Build a mesh from model-space vertices and a triangle index buffer
    ///
    /// Trailing indices that do not form a full triangle are dropped.
    pub fn from_vertices(vertices: Vec<Vec3>, indices: Vec<u32>) -> Self {
        let mut indices = indices;
        indices.truncate(indices.len() - indices.len() % 3);

        let mut min = Vec3::repeat(f32::INFINITY);
        let mut max = Vec3::repeat(f32::NEG_INFINITY);
        for &index in &indices {
            if let Some(vertex) = vertices.get(index as usize) {
                min = min.inf(vertex);
                max = max.sup(vertex);
            }
        }

        let local_bounds = if indices.is_empty() {
            Aabb::from_center_extents(Vec3::zeros(), Vec3::zeros())
        } else {
            Aabb::new(min, max)
        };

        Self {
            vertices,
            indices,
            local_bounds,
        }
    }

    /// Model-space bounding box of the mesh
    pub fn local_bounds(&self) -> Aabb {
        self.local_bounds
    }

    /// Triangle index buffer (length is a multiple of 3)
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Number of triangles in the mesh
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Look up a vertex position by buffer index
    pub fn vertex(&self, index: u32) -> Vec3 {
        self.vertices
            .get(index as usize)
            .copied()
            .unwrap_or_else(Vec3::zeros)
    }

    /// Build the triangle stored at the given position in the index buffer
    ///
    /// `base` is an offset into the index buffer and must be a multiple of 3.
    pub fn triangle_at(&self, base: usize) -> Triangle {
        Triangle::new(
            self.vertex(self.indices[base]),
            self.vertex(self.indices[base + 1]),
            self.vertex(self.indices[base + 2]),
        )
    }
}
