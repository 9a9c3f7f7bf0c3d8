//! # Impact Engine
//!
//! A rigid-body collision detection and resolution core for fixed-step
//! simulations. The embedding world owns entity storage and drives the
//! step loop; this crate owns shapes, contact math, and body state.
//!
//! ## Features
//!
//! - **Shape queries**: ray and segment tests against boxes, spheres, and planes
//! - **Narrow phase**: contact responses for every supported shape pair
//! - **Triangle trees**: static-mesh collision through a bounding-volume hierarchy
//! - **Body stepping**: semi-implicit Euler integration, impulse response, sleep bookkeeping
//!
//! ## Quick Start
//!
//! ```rust
//! use impact_engine::prelude::*;
//!
//! let config = PhysicsConfig::default();
//! let mut store = TransformStore::new();
//! let key = store.insert_entity(Transform::from_position(Vec3::new(0.0, 0.0, 10.0)));
//!
//! let mut body = Body::new(
//!     BodyDesc::new(Shape::Sphere { radius: 1.0 })
//!         .with_anchor(BodyAnchor::Entity(key))
//!         .with_mass(1.0)
//!         .with_flags(BodyFlags::AFFECTED_BY_GRAVITY),
//! );
//! body.construct(&mut NullWorld, &store, &config);
//!
//! let mut clock = SimulationClock::new(config.time_step);
//! for _ in 0..60 {
//!     clock.advance();
//!     body.pre_collision(&mut store, &clock, &config);
//!     body.tick(&mut store, &clock, &config);
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod core;
pub mod foundation;
pub mod physics;

/// Common imports for engine users
pub mod prelude {
    pub use crate::core::{Config, ConfigError, PhysicsConfig};
    pub use crate::foundation::{
        math::{Mat4, Quat, Transform, Vec3},
        time::SimulationClock,
    };
    pub use crate::physics::{
        Aabb, Body, BodyAnchor, BodyDesc, BodyFlags, BoundingSphere, CollisionMesh,
        CollisionResponse, DebugDraw, EntityKey, GeometryResult, GhostKey, NullDebugDraw,
        NullWorld, PhysicsWorld, Plane, Shape, ShapeKind, TransformStore, Triangle, TriangleTree,
    };
}
