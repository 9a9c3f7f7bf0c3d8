//! Static triangle tree for mesh collision queries
//!
//! A bounding-volume hierarchy built once over a static mesh's triangles
//! and queried by a moving body's bounding box. Nodes own their children;
//! the mesh buffers are shared immutably with the owning body. The tree is
//! read-only after construction, so concurrent queries need no locking.

use crate::foundation::math::Transform;
use crate::physics::mesh::CollisionMesh;
use crate::physics::response::{self, CollisionResponse};
use crate::physics::shapes::Aabb;
use log::debug;
use std::sync::Arc;

/// Parameters controlling tree construction and querying
#[derive(Debug, Clone, Copy)]
pub struct TreeParams {
    /// Subdivision budget; 0 builds a single leaf holding every triangle
    pub depth: u32,
    /// Triangle count below which a node stops subdividing
    pub leaf_size: usize,
    /// Padding applied to degenerate node bounds
    pub bounds_epsilon: f32,
    /// Dilation factor applied to the query box during traversal
    pub query_dilation: f32,
    /// Scale from raw separating-axis units into positional-correction units
    pub response_scale: f32,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            depth: 0,
            leaf_size: 25,
            bounds_epsilon: 0.01,
            query_dilation: 1.5,
            response_scale: 0.001_65,
        }
    }
}

/// Single node of the triangle tree
#[derive(Debug)]
struct TreeNode {
    /// Object-space bounds of this node, padded on degenerate axes
    bounds: Aabb,
    /// Triangle-vertex indices belonging to this node, in groups of 3
    indices: Vec<u32>,
    /// Child on the lower side of the split axis
    lower: Option<Box<TreeNode>>,
    /// Child on the upper side of the split axis
    upper: Option<Box<TreeNode>>,
}

impl TreeNode {
    fn is_leaf(&self) -> bool {
        self.lower.is_none() && self.upper.is_none()
    }
}

/// Bounding-volume hierarchy over a static mesh's triangles
#[derive(Debug)]
pub struct TriangleTree {
    root: TreeNode,
    mesh: Arc<CollisionMesh>,
    query_dilation: f32,
    response_scale: f32,
}

impl TriangleTree {
    /// Build a tree over every triangle of the mesh.
    ///
    /// With the default depth budget of 0 the root never subdivides and
    /// queries iterate every triangle. Raising the budget changes only
    /// performance, not query results.
    pub fn build(mesh: Arc<CollisionMesh>, params: &TreeParams) -> Self {
        let mut root = TreeNode {
            bounds: mesh.local_bounds().padded(params.bounds_epsilon),
            indices: mesh.indices().to_vec(),
            lower: None,
            upper: None,
        };

        subdivide(&mut root, &mesh, params.depth, params);

        debug!(
            "built triangle tree: {} triangles, depth budget {}",
            mesh.triangle_count(),
            params.depth
        );

        Self {
            root,
            mesh,
            query_dilation: params.query_dilation,
            response_scale: params.response_scale,
        }
    }

    /// Object-space bounds of the whole tree
    pub fn bounds(&self) -> Aabb {
        self.root.bounds
    }

    /// Whether the root was ever subdivided
    pub fn is_subdivided(&self) -> bool {
        !self.root.is_leaf()
    }

    /// Test a world-space box against the mesh.
    ///
    /// The box is mapped into the mesh's local space through the owner's
    /// inverse transform. The returned response carries a normalized
    /// world-space normal pointing out of the mesh and a distance scaled
    /// into positional-correction units.
    pub fn query(&self, world_box: &Aabb, owner: &Transform) -> CollisionResponse {
        let local_box = world_box.inverse_transformed(owner);
        let response = query_node(&self.root, &self.mesh, &local_box, self.query_dilation);
        if !response.is_contact() {
            return CollisionResponse::default();
        }

        let world_normal = owner.rotation * response.normal;
        let length = world_normal.magnitude();
        if length <= f32::EPSILON {
            return CollisionResponse::default();
        }

        CollisionResponse {
            // Raw SAT normals already face the query box's center, which
            // is the outward direction for a box resting on the mesh.
            normal: world_normal / length,
            distance: response.distance * self.response_scale,
            point: owner.transform_point(response.point),
        }
    }
}

/// Recursively split a node along the longest axis of its bounds.
///
/// A triangle with any vertex at or above the midpoint goes to the upper
/// child and any vertex below it to the lower child, so straddlers land
/// in both.
fn subdivide(node: &mut TreeNode, mesh: &CollisionMesh, depth: u32, params: &TreeParams) {
    if depth == 0 || node.indices.len() / 3 <= params.leaf_size {
        return;
    }

    let axis = node.bounds.longest_axis();
    let midpoint = node.bounds.center()[axis];

    let mut lower_indices = Vec::new();
    let mut upper_indices = Vec::new();

    for triangle in node.indices.chunks_exact(3) {
        let mut any_lower = false;
        let mut any_upper = false;
        for &index in triangle {
            if mesh.vertex(index)[axis] >= midpoint {
                any_upper = true;
            } else {
                any_lower = true;
            }
        }

        if any_upper {
            upper_indices.extend_from_slice(triangle);
        }
        if any_lower {
            lower_indices.extend_from_slice(triangle);
        }
    }

    // Child bounds are the parent box split at the midpoint of one axis.
    let mut lower_bounds = node.bounds;
    lower_bounds.max[axis] = midpoint;
    let mut upper_bounds = node.bounds;
    upper_bounds.min[axis] = midpoint;

    if !lower_indices.is_empty() {
        let mut child = TreeNode {
            bounds: lower_bounds.padded(params.bounds_epsilon),
            indices: lower_indices,
            lower: None,
            upper: None,
        };
        subdivide(&mut child, mesh, depth - 1, params);
        node.lower = Some(Box::new(child));
    }

    if !upper_indices.is_empty() {
        let mut child = TreeNode {
            bounds: upper_bounds.padded(params.bounds_epsilon),
            indices: upper_indices,
            lower: None,
            upper: None,
        };
        subdivide(&mut child, mesh, depth - 1, params);
        node.upper = Some(Box::new(child));
    }

    if !node.is_leaf() {
        node.indices.clear();
    }
}

fn query_node(
    node: &TreeNode,
    mesh: &CollisionMesh,
    local_box: &Aabb,
    dilation: f32,
) -> CollisionResponse {
    // Loose rejection: miss only when even the dilated query box is clear.
    if !node.bounds.intersects(&local_box.dilated(dilation)) {
        return CollisionResponse::default();
    }

    if node.is_leaf() {
        let center = local_box.center();
        let extents = local_box.extents();
        let mut best = CollisionResponse::default();

        for triangle in node.indices.chunks_exact(3) {
            let candidate = response::triangle_aabb(
                mesh.vertex(triangle[0]),
                mesh.vertex(triangle[1]),
                mesh.vertex(triangle[2]),
                center,
                extents,
            );
            best = best.least(candidate);
        }

        return best;
    }

    let mut best = CollisionResponse::default();
    if let Some(lower) = &node.lower {
        best = best.least(query_node(lower, mesh, local_box, dilation));
    }
    if let Some(upper) = &node.upper {
        best = best.least(query_node(upper, mesh, local_box, dilation));
    }
    best
}
