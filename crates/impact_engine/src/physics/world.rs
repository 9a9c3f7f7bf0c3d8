//! Collaborator contracts between bodies and the owning simulation world
//!
//! The collision core does not own entity storage or drive the step loop.
//! Bodies resolve their positional data through a [`TransformStore`] and
//! announce their lifecycle to a [`PhysicsWorld`] implementation supplied
//! by the embedding application.

use crate::foundation::math::{Transform, Vec3};
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Key identifying an owner entity in the transform store
    pub struct EntityKey;
}

new_key_type! {
    /// Key identifying a ghost (point-only transform holder)
    pub struct GhostKey;
}

/// What a body is anchored to for its positional data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyAnchor {
    /// A full entity with position, rotation, and scale
    Entity(EntityKey),
    /// A lighter-weight point-only holder
    Ghost(GhostKey),
    /// No anchor; the body resolves to an identity transform
    Detached,
}

/// External storage for entity transforms and ghost positions
///
/// Stale keys resolve to nothing; callers fall back to an identity
/// transform rather than treating that as an error.
#[derive(Debug, Default)]
pub struct TransformStore {
    transforms: SlotMap<EntityKey, Transform>,
    ghosts: SlotMap<GhostKey, Vec3>,
}

impl TransformStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entity with an initial transform
    pub fn insert_entity(&mut self, transform: Transform) -> EntityKey {
        self.transforms.insert(transform)
    }

    /// Remove an entity, invalidating its key
    pub fn remove_entity(&mut self, key: EntityKey) {
        self.transforms.remove(key);
    }

    /// Get an entity's transform
    pub fn transform(&self, key: EntityKey) -> Option<&Transform> {
        self.transforms.get(key)
    }

    /// Replace an entity's transform
    pub fn set_transform(&mut self, key: EntityKey, transform: Transform) {
        if let Some(slot) = self.transforms.get_mut(key) {
            *slot = transform;
        }
    }

    /// Add a ghost at an initial position
    pub fn insert_ghost(&mut self, position: Vec3) -> GhostKey {
        self.ghosts.insert(position)
    }

    /// Remove a ghost, invalidating its key
    pub fn remove_ghost(&mut self, key: GhostKey) {
        self.ghosts.remove(key);
    }

    /// Get a ghost's position
    pub fn ghost_position(&self, key: GhostKey) -> Option<Vec3> {
        self.ghosts.get(key).copied()
    }

    /// Replace a ghost's position
    pub fn set_ghost_position(&mut self, key: GhostKey, position: Vec3) {
        if let Some(slot) = self.ghosts.get_mut(key) {
            *slot = position;
        }
    }

    /// Resolve an anchor to a transform, or `None` when nothing resolves
    pub fn resolve(&self, anchor: BodyAnchor) -> Option<Transform> {
        match anchor {
            BodyAnchor::Entity(key) => self.transform(key).cloned(),
            BodyAnchor::Ghost(key) => self.ghost_position(key).map(Transform::from_position),
            BodyAnchor::Detached => None,
        }
    }

    /// Write a new position back through an anchor, preserving rotation and scale
    ///
    /// Writes to a detached or stale anchor are silently dropped.
    pub fn write_position(&mut self, anchor: BodyAnchor, position: Vec3) {
        match anchor {
            BodyAnchor::Entity(key) => {
                if let Some(transform) = self.transforms.get_mut(key) {
                    transform.position = position;
                }
            }
            BodyAnchor::Ghost(key) => {
                if let Some(slot) = self.ghosts.get_mut(key) {
                    *slot = position;
                }
            }
            BodyAnchor::Detached => {}
        }
    }
}

/// Lifecycle contract a body reports to when entering or leaving simulation
pub trait PhysicsWorld {
    /// Called once when a body joins the simulation
    fn register_body(&mut self, anchor: BodyAnchor);

    /// Called once when a body leaves the simulation
    fn unregister_body(&mut self, anchor: BodyAnchor);
}

/// World collaborator that ignores all registrations
///
/// Useful for tests and for querying bodies outside a live simulation.
#[derive(Debug, Default)]
pub struct NullWorld;

impl PhysicsWorld for NullWorld {
    fn register_body(&mut self, _anchor: BodyAnchor) {}

    fn unregister_body(&mut self, _anchor: BodyAnchor) {}
}
