//! Physics module for collision detection and response
//!
//! The pipeline per fixed step: broad-phase rejection through bounding
//! spheres and boxes, narrow-phase contact calculation per shape pair,
//! then positional correction and impulse integration on each body.

pub mod body;
pub mod debug_draw;
pub mod geometry;
pub mod mesh;
pub mod response;
pub mod shapes;
pub mod tree;
pub mod world;

pub use body::{Body, BodyDesc, BodyFlags};
pub use debug_draw::{DebugDraw, NullDebugDraw};
pub use geometry::GeometryResult;
pub use mesh::CollisionMesh;
pub use response::CollisionResponse;
pub use shapes::{Aabb, BoundingSphere, Plane, Shape, ShapeKind, Triangle};
pub use tree::{TreeParams, TriangleTree};
pub use world::{BodyAnchor, EntityKey, GhostKey, NullWorld, PhysicsWorld, TransformStore};
