//! Rigid body state machine
//!
//! A [`Body`] is the stateful entity of the collision core. It never owns
//! its positional data; it resolves a [`BodyAnchor`] through the external
//! [`TransformStore`] each step and writes results back. Per fixed step
//! the driving world calls [`Body::pre_collision`], then [`Body::collide`]
//! for every candidate pair, then [`Body::tick`], in that strict order.
//!
//! Velocity and contact accounting are only ever mutated in `collide` and
//! `tick`, which keeps the pairwise bookkeeping symmetric.

use crate::core::config::PhysicsConfig;
use crate::foundation::math::{Transform, Vec3};
use crate::foundation::time::SimulationClock;
use crate::physics::debug_draw::DebugDraw;
use crate::physics::geometry::{self, GeometryResult};
use crate::physics::response::{self, CollisionResponse};
use crate::physics::shapes::{Aabb, BoundingSphere, Plane, Shape, ShapeKind};
use crate::physics::tree::{TreeParams, TriangleTree};
use crate::physics::world::{BodyAnchor, EntityKey, PhysicsWorld, TransformStore};
use log::{debug, trace, warn};
use std::collections::HashSet;

bitflags::bitflags! {
    /// Behavior flags for a body
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct BodyFlags: u32 {
        /// Never moves; infinite mass
        const STATIC = 1 << 0;
        /// Moves only through external code, never simulated forces
        const STATIONARY = 1 << 1;
        /// Participates in collision at all
        const BLOCK = 1 << 2;
        /// Receives gravity acceleration each step
        const AFFECTED_BY_GRAVITY = 1 << 3;
        /// Enables swept testing for fast movers
        const CONTINUOUS = 1 << 4;
    }
}

/// Construction parameters for a body
#[derive(Debug, Clone)]
pub struct BodyDesc {
    /// Collision shape
    pub shape: Shape,
    /// What the body reads and writes its transform through
    pub anchor: BodyAnchor,
    /// Mass in arbitrary units; non-positive means immovable
    pub mass: f32,
    /// Surface friction coefficient
    pub friction: f32,
    /// Bounciness; the smaller of the two bodies' values applies per contact
    pub restitution: f32,
    /// Per-second exponential velocity damping base
    pub damping: f32,
    /// Behavior flags
    pub flags: BodyFlags,
    /// Initial velocity
    pub velocity: Vec3,
}

impl BodyDesc {
    /// Start a description for the given shape with blocking defaults
    pub fn new(shape: Shape) -> Self {
        Self {
            shape,
            anchor: BodyAnchor::Detached,
            mass: 0.0,
            friction: 0.5,
            restitution: 0.0,
            damping: 1.0,
            flags: BodyFlags::BLOCK,
            velocity: Vec3::zeros(),
        }
    }

    /// Set the positional anchor
    pub fn with_anchor(mut self, anchor: BodyAnchor) -> Self {
        self.anchor = anchor;
        self
    }

    /// Set the mass
    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        self
    }

    /// Set the friction coefficient
    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = friction;
        self
    }

    /// Set the restitution coefficient
    pub fn with_restitution(mut self, restitution: f32) -> Self {
        self.restitution = restitution;
        self
    }

    /// Set the damping base
    pub fn with_damping(mut self, damping: f32) -> Self {
        self.damping = damping;
        self
    }

    /// Add behavior flags on top of the defaults
    pub fn with_flags(mut self, flags: BodyFlags) -> Self {
        self.flags |= flags;
        self
    }

    /// Set the initial velocity
    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }
}

/// A rigid body participating in collision detection and response
#[derive(Debug)]
pub struct Body {
    shape: Shape,
    anchor: BodyAnchor,
    flags: BodyFlags,

    local_bounds: Aabb,
    world_bounds: Aabb,
    world_bounds_swept: Aabb,
    world_sphere: BoundingSphere,

    mass: f32,
    inverse_mass: f32,
    friction: f32,
    restitution: f32,
    damping: f32,

    velocity: Vec3,
    acceleration: Vec3,
    linear_velocity: Vec3,
    depenetration: Vec3,
    normal: Vec3,
    contacts: u32,
    contact: bool,
    contact_entity: Option<EntityKey>,

    sleeping: bool,
    last_activity: f32,
    tried_to_move: bool,

    ignored: HashSet<EntityKey>,
    tree: Option<TriangleTree>,
    registered: bool,
}

impl Body {
    /// Create an unregistered body from a description
    pub fn new(desc: BodyDesc) -> Self {
        let immovable = desc.flags.contains(BodyFlags::STATIC)
            || desc.flags.contains(BodyFlags::STATIONARY)
            || desc.mass <= 0.0;
        let inverse_mass = if immovable { 0.0 } else { 1.0 / desc.mass };

        let local_bounds = desc.shape.local_bounds();

        Self {
            shape: desc.shape,
            anchor: desc.anchor,
            flags: desc.flags,
            local_bounds,
            world_bounds: local_bounds,
            world_bounds_swept: local_bounds,
            world_sphere: BoundingSphere::from_aabb(&local_bounds),
            mass: desc.mass,
            inverse_mass,
            friction: desc.friction,
            restitution: desc.restitution,
            damping: desc.damping,
            velocity: desc.velocity,
            acceleration: Vec3::zeros(),
            linear_velocity: Vec3::zeros(),
            depenetration: Vec3::zeros(),
            normal: Vec3::zeros(),
            contacts: 0,
            contact: false,
            contact_entity: None,
            sleeping: false,
            last_activity: 0.0,
            tried_to_move: false,
            ignored: HashSet::new(),
            tree: None,
            registered: false,
        }
    }

    /// Register with the world and derive world-space state.
    ///
    /// Builds the triangle tree for immovable triangle-mesh bodies. No-op
    /// when already registered or when the anchor does not resolve.
    pub fn construct(
        &mut self,
        world: &mut dyn PhysicsWorld,
        store: &TransformStore,
        config: &PhysicsConfig,
    ) {
        if self.registered {
            return;
        }

        if store.resolve(self.anchor).is_none() {
            warn!("body construct skipped: anchor does not resolve");
            return;
        }

        world.register_body(self.anchor);
        self.registered = true;
        self.update_bounds(store, config.time_step, config.bounds_epsilon);

        if !self.is_kinetic() {
            if let Shape::TriangleMesh(mesh) = &self.shape {
                let params = TreeParams {
                    depth: config.tree_depth,
                    leaf_size: config.tree_leaf_size,
                    bounds_epsilon: config.bounds_epsilon,
                    query_dilation: config.tree_query_dilation,
                    response_scale: config.mesh_response_scale,
                };
                self.tree = Some(TriangleTree::build(mesh.clone(), &params));
                debug!("body constructed with triangle tree");
            }
        }
    }

    /// Unregister from the world. The triangle tree is dropped with the body.
    pub fn destroy(&mut self, world: &mut dyn PhysicsWorld) {
        if !self.registered {
            return;
        }
        world.unregister_body(self.anchor);
        self.registered = false;
    }

    /// Tentatively apply externally injected velocity before pair testing.
    ///
    /// Skipped entirely while sleeping. Statics reset their contact state
    /// but never move.
    pub fn pre_collision(
        &mut self,
        store: &mut TransformStore,
        clock: &SimulationClock,
        config: &PhysicsConfig,
    ) {
        if self.sleeping {
            return;
        }

        self.normal = Vec3::zeros();
        self.contacts = 0;
        self.contact = false;
        self.contact_entity = None;
        self.tried_to_move = false;

        if self.flags.contains(BodyFlags::STATIC) {
            return;
        }

        // Exact-zero check: an optimization, not an invariant.
        if self.linear_velocity == Vec3::zeros() {
            return;
        }

        self.tried_to_move = true;
        let transform = store.resolve(self.anchor).unwrap_or_default();
        let position = transform.position + self.linear_velocity * clock.time_step();
        store.write_position(self.anchor, position);
        self.update_bounds(store, clock.time_step(), config.bounds_epsilon);
        self.last_activity = clock.now();
    }

    /// Test this body against another and resolve the contact.
    ///
    /// Performs the broad sphere check, shape-pair dispatch, depenetration
    /// accumulation, and impulse integration. Both bodies' velocities and
    /// contact counters may be mutated. Returns whether an impulse was
    /// applied.
    pub fn collide(
        &mut self,
        other: &mut Body,
        store: &TransformStore,
        clock: &SimulationClock,
    ) -> bool {
        if !self.flags.contains(BodyFlags::BLOCK) || !other.flags.contains(BodyFlags::BLOCK) {
            return false;
        }

        // Planes are excluded from the generic pairwise path entirely.
        if other.shape.kind() == ShapeKind::Plane {
            return false;
        }

        if let Some(entity) = other.owner_entity() {
            if self.ignored.contains(&entity) {
                return false;
            }
        }

        if !self.world_sphere.intersects(&other.world_sphere) {
            return false;
        }

        // Only a kinetic first body can respond to the contact.
        if !self.is_kinetic() {
            return false;
        }

        if self.shape.kind() != ShapeKind::Sphere {
            let overlapping = self.world_bounds.intersects(&other.world_bounds);
            if self.flags.contains(BodyFlags::CONTINUOUS) {
                if !overlapping && !self.swept_obstructed(other, clock.time_step()) {
                    return false;
                }
            } else if !overlapping {
                return false;
            }
        }

        let response = self.narrow_response(other, store);
        if !response.is_contact() {
            return false;
        }

        // Split the positional correction by inverse mass share.
        let inverse_sum = self.inverse_mass + other.inverse_mass;
        let correction = response.normal * response.distance;
        self.depenetration -= correction * (self.inverse_mass / inverse_sum);
        other.depenetration += correction * (other.inverse_mass / inverse_sum);

        self.normal = response.normal;
        other.normal = -response.normal;
        self.contacts += 1;
        other.contacts += 1;
        self.contact = true;
        other.contact = true;
        self.contact_entity = other.owner_entity();
        other.contact_entity = self.owner_entity();

        // Impulse integration along the contact normal.
        let relative = self.velocity - other.velocity;
        let separating = relative.dot(&response.normal);
        if separating >= 0.0 {
            // Already separating; the contact stands but no impulse applies.
            return false;
        }

        let restitution = self.restitution.min(other.restitution);
        let magnitude = -(1.0 + restitution) * separating / inverse_sum;
        self.velocity += response.normal * (magnitude * self.inverse_mass);
        other.velocity -= response.normal * (magnitude * other.inverse_mass);

        true
    }

    /// Integrate forces and positions at the end of the step.
    pub fn tick(
        &mut self,
        store: &mut TransformStore,
        clock: &SimulationClock,
        config: &PhysicsConfig,
    ) {
        if self.flags.contains(BodyFlags::STATIC) {
            return;
        }

        let dt = clock.time_step();
        self.update_bounds(store, dt, config.bounds_epsilon);

        if self.sleeping || !self.is_kinetic() {
            return;
        }

        let transform = store.resolve(self.anchor).unwrap_or_default();
        let start_position = transform.position;
        let mut position = start_position;

        // Apply the positional correction accumulated during pair testing.
        if self.depenetration != Vec3::zeros() {
            position -= self.depenetration;
            self.normal = (-self.depenetration).normalize();
            self.depenetration = Vec3::zeros();
        }

        if self.flags.contains(BodyFlags::AFFECTED_BY_GRAVITY) {
            self.acceleration += config.gravity;
        }

        // Semi-implicit Euler.
        self.velocity += self.acceleration * dt;
        position += self.velocity * dt;

        // One-shot injected velocity folds in unscaled.
        self.velocity += self.linear_velocity;
        self.acceleration = Vec3::zeros();
        self.linear_velocity = Vec3::zeros();

        self.velocity *= self.damping.powf(dt);

        // Hard fallback against infinite falls.
        let limit = config.world_half_extent;
        for axis in 0..3 {
            if position[axis] > limit {
                position[axis] = limit;
                self.velocity[axis] = 0.0;
                self.contact = true;
            } else if position[axis] < -limit {
                position[axis] = -limit;
                self.velocity[axis] = 0.0;
                self.contact = true;
            }
        }

        let moved_sq = (position - start_position).magnitude_squared();
        if moved_sq > config.motion_epsilon {
            self.last_activity = clock.now();
        } else if !self.tried_to_move
            && !self.flags.contains(BodyFlags::STATIONARY)
            && clock.elapsed_since(self.last_activity) > config.sleep_timeout
        {
            trace!("body fell asleep at t={}", clock.now());
            self.sleeping = true;
        }

        store.write_position(self.anchor, position);
        self.update_bounds(store, dt, config.bounds_epsilon);
    }

    /// Toggle the symmetric ignore relation with another body.
    ///
    /// `clear` removes the pairing instead of adding it. Keyed by owner
    /// entity; bodies without one cannot be ignored.
    pub fn ignore(&mut self, other: &mut Body, clear: bool) {
        let (Some(own), Some(theirs)) = (self.owner_entity(), other.owner_entity()) else {
            return;
        };

        if clear {
            self.ignored.remove(&theirs);
            other.ignored.remove(&own);
        } else {
            self.ignored.insert(theirs);
            other.ignored.insert(own);
        }
    }

    /// Inject a one-shot velocity, waking the body.
    pub fn set_linear_velocity(&mut self, velocity: Vec3, clock: &SimulationClock) {
        self.linear_velocity = velocity;
        if velocity != Vec3::zeros() {
            self.tried_to_move = true;
            self.last_activity = clock.now();
            self.sleeping = false;
        }
    }

    /// Add an acceleration for this step (cleared after integration)
    pub fn add_acceleration(&mut self, acceleration: Vec3) {
        self.acceleration += acceleration;
    }

    /// Apply an instantaneous impulse, scaled by inverse mass.
    ///
    /// Immovable bodies ignore impulses.
    pub fn apply_impulse(&mut self, impulse: Vec3) {
        self.velocity += impulse * self.inverse_mass;
    }

    /// Segment query against this body's shape.
    ///
    /// Triangle-mesh bodies are not supported by segment queries and
    /// report a miss. On a hit the result carries this body's owner
    /// entity.
    pub fn query_segment(&self, start: Vec3, end: Vec3, store: &TransformStore) -> GeometryResult {
        let mut result = match &self.shape {
            Shape::Box { .. } => geometry::line_in_aabb(start, end, &self.world_bounds),
            Shape::Sphere { .. } => {
                let (center, radius) = self.shape_sphere();
                geometry::line_in_sphere(start, end, center, radius)
            }
            Shape::Plane(plane) => {
                let transform = store.resolve(self.anchor).unwrap_or_default();
                geometry::line_in_plane(start, end, &world_plane(plane, &transform))
            }
            Shape::TriangleMesh(_) => GeometryResult::default(),
        };

        if result.hit {
            result.body = self.owner_entity();
        }
        result
    }

    /// Emit this body's volumes and last contact normal for visualization
    pub fn debug(&self, draw: &mut dyn DebugDraw) {
        draw.draw_box(&self.world_bounds);
        draw.draw_sphere(&self.world_sphere);
        if self.contact {
            let center = self.world_bounds.center();
            draw.draw_line(center, center + self.normal);
        }
    }

    /// Whether forces and impulses can move this body
    pub fn is_kinetic(&self) -> bool {
        self.inverse_mass > 0.0
    }

    /// Owner entity key, if anchored to an entity
    pub fn owner_entity(&self) -> Option<EntityKey> {
        match self.anchor {
            BodyAnchor::Entity(key) => Some(key),
            _ => None,
        }
    }

    /// Current world-space bounds
    pub fn world_bounds(&self) -> Aabb {
        self.world_bounds
    }

    /// Current world-space bounding sphere
    pub fn world_sphere(&self) -> BoundingSphere {
        self.world_sphere
    }

    /// Current velocity
    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    /// Last resolved contact normal
    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    /// Number of contacts resolved this step
    pub fn contacts(&self) -> u32 {
        self.contacts
    }

    /// Whether any contact was resolved this step
    pub fn contact(&self) -> bool {
        self.contact
    }

    /// Owner entity of the most recent contact partner
    pub fn contact_entity(&self) -> Option<EntityKey> {
        self.contact_entity
    }

    /// Whether the body is asleep
    pub fn sleeping(&self) -> bool {
        self.sleeping
    }

    /// Behavior flags
    pub fn flags(&self) -> BodyFlags {
        self.flags
    }

    /// Mass as supplied at construction
    pub fn mass(&self) -> f32 {
        self.mass
    }

    /// Inverse mass; zero for immovable bodies
    pub fn inverse_mass(&self) -> f32 {
        self.inverse_mass
    }

    /// Surface friction coefficient
    pub fn friction(&self) -> f32 {
        self.friction
    }

    /// Restitution coefficient
    pub fn restitution(&self) -> f32 {
        self.restitution
    }

    /// Shape kind discriminant
    pub fn shape_kind(&self) -> ShapeKind {
        self.shape.kind()
    }

    /// Whether a triangle tree was built at construction
    pub fn has_tree(&self) -> bool {
        self.tree.is_some()
    }

    /// Whether the body is registered with a world
    pub fn registered(&self) -> bool {
        self.registered
    }

    fn update_bounds(&mut self, store: &TransformStore, dt: f32, epsilon: f32) {
        let transform = store.resolve(self.anchor).unwrap_or_default();
        self.world_bounds = self
            .local_bounds
            .transformed(&transform)
            .padded(epsilon);
        self.world_sphere = BoundingSphere::from_aabb(&self.world_bounds);
        self.world_bounds_swept = if self.flags.contains(BodyFlags::CONTINUOUS) {
            self.world_bounds.swept_along(self.velocity * dt)
        } else {
            self.world_bounds
        };
    }

    /// Swept test for fast movers: advance the box's corners along the
    /// velocity and stop the body at the first obstruction found.
    ///
    /// Mutating the velocity here is a deliberate side effect of the test,
    /// not just a query.
    fn swept_obstructed(&mut self, other: &Body, dt: f32) -> bool {
        if !self.world_bounds_swept.intersects(&other.world_bounds) {
            return false;
        }

        let travel = self.velocity * dt;
        let length = travel.magnitude();
        if length <= f32::EPSILON {
            return false;
        }

        for corner in self.world_bounds.corners() {
            let result = geometry::line_in_aabb(corner, corner + travel, &other.world_bounds);
            if result.hit {
                let scale = (result.distance / length).clamp(0.0, 1.0);
                self.velocity *= scale;
                return true;
            }
        }

        false
    }

    /// Shape-pair dispatch, keyed by this (kinetic) body's kind first.
    fn narrow_response(&self, other: &Body, store: &TransformStore) -> CollisionResponse {
        match (self.shape.kind(), other.shape.kind()) {
            (ShapeKind::Sphere, ShapeKind::Sphere) => {
                let (a_center, a_radius) = self.shape_sphere();
                let (b_center, b_radius) = other.shape_sphere();
                response::sphere_sphere(a_center, a_radius, b_center, b_radius)
            }
            (ShapeKind::Sphere, ShapeKind::Box) => {
                let (center, radius) = self.shape_sphere();
                response::sphere_aabb(center, radius, &other.world_bounds)
            }
            (ShapeKind::Box, ShapeKind::Sphere) => {
                let (center, radius) = other.shape_sphere();
                let mut result = response::sphere_aabb(center, radius, &self.world_bounds);
                result.normal = -result.normal;
                result
            }
            (ShapeKind::Box, ShapeKind::Box) => {
                response::aabb_aabb(&self.world_bounds, &other.world_bounds)
            }
            (ShapeKind::Box, ShapeKind::TriangleMesh) => match &other.tree {
                Some(tree) => {
                    let transform = store.resolve(other.anchor).unwrap_or_default();
                    tree.query(&self.world_bounds, &transform)
                }
                None => CollisionResponse::default(),
            },
            // Unsupported pairs (sphere/mesh, mesh-first, planes) resolve
            // to "no contact" rather than erroring.
            _ => CollisionResponse::default(),
        }
    }

    /// World-space sphere matching the actual shape, not the conservative
    /// broad-phase sphere.
    fn shape_sphere(&self) -> (Vec3, f32) {
        let extents = self.world_bounds.extents();
        let radius = extents.x.min(extents.y).min(extents.z);
        (self.world_bounds.center(), radius)
    }
}

/// Map an object-space plane through a transform.
fn world_plane(plane: &Plane, transform: &Transform) -> Plane {
    let normal = transform.rotation * plane.normal;
    Plane {
        normal,
        distance: plane.distance - normal.dot(&transform.position),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::mesh::CollisionMesh;
    use crate::physics::world::NullWorld;
    use approx::assert_relative_eq;
    use std::sync::Arc;

    struct RecordingWorld {
        registered: usize,
        unregistered: usize,
    }

    impl RecordingWorld {
        fn new() -> Self {
            Self {
                registered: 0,
                unregistered: 0,
            }
        }
    }

    impl PhysicsWorld for RecordingWorld {
        fn register_body(&mut self, _anchor: BodyAnchor) {
            self.registered += 1;
        }

        fn unregister_body(&mut self, _anchor: BodyAnchor) {
            self.unregistered += 1;
        }
    }

    fn test_config() -> PhysicsConfig {
        PhysicsConfig::default()
    }

    fn box_body(store: &mut TransformStore, position: Vec3, mass: f32) -> Body {
        let key = store.insert_entity(Transform::from_position(position));
        Body::new(
            BodyDesc::new(Shape::Box {
                half_extents: Vec3::repeat(0.5),
            })
            .with_anchor(BodyAnchor::Entity(key))
            .with_mass(mass),
        )
    }

    fn sphere_body(store: &mut TransformStore, position: Vec3, mass: f32) -> Body {
        let key = store.insert_entity(Transform::from_position(position));
        Body::new(
            BodyDesc::new(Shape::Sphere { radius: 1.0 })
                .with_anchor(BodyAnchor::Entity(key))
                .with_mass(mass),
        )
    }

    fn constructed(mut body: Body, store: &TransformStore) -> Body {
        body.construct(&mut NullWorld, store, &test_config());
        body
    }

    #[test]
    fn construct_registers_once() {
        let mut store = TransformStore::new();
        let mut world = RecordingWorld::new();
        let mut body = box_body(&mut store, Vec3::zeros(), 1.0);

        body.construct(&mut world, &store, &test_config());
        body.construct(&mut world, &store, &test_config());

        assert!(body.registered());
        assert_eq!(world.registered, 1);

        body.destroy(&mut world);
        assert_eq!(world.unregistered, 1);
        assert!(!body.registered());
    }

    #[test]
    fn construct_with_unresolvable_anchor_is_a_no_op() {
        let store = TransformStore::new();
        let mut world = RecordingWorld::new();
        let mut body = Body::new(
            BodyDesc::new(Shape::Box {
                half_extents: Vec3::repeat(0.5),
            })
            .with_mass(1.0),
        );

        body.construct(&mut world, &store, &test_config());

        assert!(!body.registered());
        assert_eq!(world.registered, 0);
    }

    #[test]
    fn static_mesh_body_builds_tree() {
        let mut store = TransformStore::new();
        let key = store.insert_entity(Transform::identity());
        let mesh = Arc::new(CollisionMesh::from_vertices(
            vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
            ],
            vec![0, 1, 2],
        ));

        let body = constructed(
            Body::new(
                BodyDesc::new(Shape::TriangleMesh(mesh))
                    .with_anchor(BodyAnchor::Entity(key))
                    .with_flags(BodyFlags::STATIC),
            ),
            &store,
        );

        assert!(body.has_tree());
    }

    #[test]
    fn static_tick_is_idempotent() {
        let mut store = TransformStore::new();
        let key = store.insert_entity(Transform::from_position(Vec3::new(1.0, 2.0, 3.0)));
        let mut body = Body::new(
            BodyDesc::new(Shape::Box {
                half_extents: Vec3::repeat(0.5),
            })
            .with_anchor(BodyAnchor::Entity(key))
            .with_flags(BodyFlags::STATIC),
        );
        body.construct(&mut NullWorld, &store, &test_config());

        let clock = SimulationClock::default();
        body.tick(&mut store, &clock, &test_config());
        body.tick(&mut store, &clock, &test_config());

        let transform = store.transform(key).unwrap();
        assert_relative_eq!(transform.position, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn gravity_free_fall_matches_analytic_velocity() {
        let config = test_config();
        let mut store = TransformStore::new();
        let key = store.insert_entity(Transform::from_position(Vec3::new(0.0, 0.0, 100.0)));
        let mut body = Body::new(
            BodyDesc::new(Shape::Box {
                half_extents: Vec3::repeat(0.5),
            })
            .with_anchor(BodyAnchor::Entity(key))
            .with_mass(1.0)
            .with_flags(BodyFlags::AFFECTED_BY_GRAVITY),
        );
        body.construct(&mut NullWorld, &store, &config);

        let mut clock = SimulationClock::new(1.0 / 60.0);
        for _ in 0..60 {
            clock.advance();
            body.pre_collision(&mut store, &clock, &config);
            body.tick(&mut store, &clock, &config);
        }

        assert_relative_eq!(body.velocity().z, config.gravity.z, epsilon = 1e-3);
        assert!(!body.sleeping());
    }

    #[test]
    fn idle_body_sleeps_after_timeout_and_wakes_on_injection() {
        let config = test_config();
        let mut store = TransformStore::new();
        let mut body = box_body(&mut store, Vec3::zeros(), 1.0);
        body.construct(&mut NullWorld, &store, &config);

        let mut clock = SimulationClock::new(0.5);
        for _ in 0..25 {
            clock.advance();
            body.pre_collision(&mut store, &clock, &config);
            body.tick(&mut store, &clock, &config);
        }
        assert!(body.sleeping());

        body.set_linear_velocity(Vec3::new(1.0, 0.0, 0.0), &clock);
        clock.advance();
        body.pre_collision(&mut store, &clock, &config);
        body.tick(&mut store, &clock, &config);

        assert!(!body.sleeping());
    }

    #[test]
    fn pre_collision_applies_injected_velocity() {
        let config = test_config();
        let mut store = TransformStore::new();
        let mut body = box_body(&mut store, Vec3::zeros(), 1.0);
        let key = body.owner_entity().unwrap();
        body.construct(&mut NullWorld, &store, &config);

        let mut clock = SimulationClock::new(1.0 / 60.0);
        clock.advance();
        body.set_linear_velocity(Vec3::new(6.0, 0.0, 0.0), &clock);
        body.pre_collision(&mut store, &clock, &config);

        let transform = store.transform(key).unwrap();
        assert_relative_eq!(transform.position.x, 0.1, epsilon = 1e-5);
    }

    #[test]
    fn overlapping_spheres_exchange_impulse() {
        let config = test_config();
        let mut store = TransformStore::new();
        let mut a = Body::new(
            BodyDesc::new(Shape::Sphere { radius: 1.0 })
                .with_anchor(BodyAnchor::Entity(
                    store.insert_entity(Transform::from_position(Vec3::zeros())),
                ))
                .with_mass(1.0)
                .with_velocity(Vec3::new(1.0, 0.0, 0.0)),
        );
        let mut b = Body::new(
            BodyDesc::new(Shape::Sphere { radius: 1.0 })
                .with_anchor(BodyAnchor::Entity(
                    store.insert_entity(Transform::from_position(Vec3::new(1.9, 0.0, 0.0))),
                ))
                .with_mass(1.0)
                .with_velocity(Vec3::new(-1.0, 0.0, 0.0)),
        );
        a.construct(&mut NullWorld, &store, &config);
        b.construct(&mut NullWorld, &store, &config);

        let clock = SimulationClock::default();
        let applied = a.collide(&mut b, &store, &clock);

        assert!(applied);
        assert_eq!(a.contacts(), 1);
        assert_eq!(b.contacts(), 1);
        assert!(a.contact() && b.contact());
        assert_eq!(a.contact_entity(), b.owner_entity());
        // Equal masses, zero restitution: approach velocity cancels.
        assert!(a.velocity().x <= 0.0);
        assert!(b.velocity().x >= 0.0);
    }

    #[test]
    fn separating_bodies_keep_contact_but_no_impulse() {
        let config = test_config();
        let mut store = TransformStore::new();
        let mut a = Body::new(
            BodyDesc::new(Shape::Sphere { radius: 1.0 })
                .with_anchor(BodyAnchor::Entity(
                    store.insert_entity(Transform::from_position(Vec3::zeros())),
                ))
                .with_mass(1.0)
                .with_velocity(Vec3::new(-1.0, 0.0, 0.0)),
        );
        let mut b = Body::new(
            BodyDesc::new(Shape::Sphere { radius: 1.0 })
                .with_anchor(BodyAnchor::Entity(
                    store.insert_entity(Transform::from_position(Vec3::new(1.9, 0.0, 0.0))),
                ))
                .with_mass(1.0)
                .with_velocity(Vec3::new(1.0, 0.0, 0.0)),
        );
        a.construct(&mut NullWorld, &store, &config);
        b.construct(&mut NullWorld, &store, &config);

        let clock = SimulationClock::default();
        let applied = a.collide(&mut b, &store, &clock);

        assert!(!applied);
        assert_eq!(a.contacts(), 1);
        assert_relative_eq!(a.velocity(), Vec3::new(-1.0, 0.0, 0.0));
    }

    #[test]
    fn distant_bodies_fail_broad_phase() {
        let config = test_config();
        let mut store = TransformStore::new();
        let mut a = sphere_body(&mut store, Vec3::zeros(), 1.0);
        let mut b = sphere_body(&mut store, Vec3::new(50.0, 0.0, 0.0), 1.0);
        a.construct(&mut NullWorld, &store, &config);
        b.construct(&mut NullWorld, &store, &config);

        let clock = SimulationClock::default();
        assert!(!a.collide(&mut b, &store, &clock));
        assert_eq!(a.contacts(), 0);
    }

    #[test]
    fn non_blocking_bodies_never_collide() {
        let config = test_config();
        let mut store = TransformStore::new();
        let key = store.insert_entity(Transform::identity());
        let mut a = Body::new(
            BodyDesc::new(Shape::Sphere { radius: 1.0 })
                .with_anchor(BodyAnchor::Entity(key))
                .with_mass(1.0),
        );
        a.flags.remove(BodyFlags::BLOCK);
        let mut b = sphere_body(&mut store, Vec3::new(0.5, 0.0, 0.0), 1.0);
        a.construct(&mut NullWorld, &store, &config);
        b.construct(&mut NullWorld, &store, &config);

        let clock = SimulationClock::default();
        assert!(!a.collide(&mut b, &store, &clock));
    }

    #[test]
    fn plane_bodies_are_excluded_from_pairwise_testing() {
        let config = test_config();
        let mut store = TransformStore::new();
        let mut a = sphere_body(&mut store, Vec3::zeros(), 1.0);
        let key = store.insert_entity(Transform::identity());
        let mut plane = Body::new(
            BodyDesc::new(Shape::Plane(Plane::new(Vec3::new(0.0, 0.0, 1.0), 0.0)))
                .with_anchor(BodyAnchor::Entity(key))
                .with_flags(BodyFlags::STATIC),
        );
        a.construct(&mut NullWorld, &store, &config);
        plane.construct(&mut NullWorld, &store, &config);

        let clock = SimulationClock::default();
        assert!(!a.collide(&mut plane, &store, &clock));
    }

    #[test]
    fn ignore_suppresses_and_unignore_restores_collision() {
        let config = test_config();
        let mut store = TransformStore::new();
        let mut a = sphere_body(&mut store, Vec3::zeros(), 1.0);
        let mut b = sphere_body(&mut store, Vec3::new(1.5, 0.0, 0.0), 1.0);
        a.construct(&mut NullWorld, &store, &config);
        b.construct(&mut NullWorld, &store, &config);

        let clock = SimulationClock::default();

        a.ignore(&mut b, false);
        assert!(!a.collide(&mut b, &store, &clock));
        assert_eq!(a.contacts(), 0);

        a.ignore(&mut b, true);
        a.velocity = Vec3::new(1.0, 0.0, 0.0);
        b.velocity = Vec3::new(-1.0, 0.0, 0.0);
        assert!(a.collide(&mut b, &store, &clock));
    }

    #[test]
    fn box_collides_with_static_mesh_through_tree() {
        let config = test_config();
        let mut store = TransformStore::new();
        let mesh_key = store.insert_entity(Transform::identity());
        let mesh = Arc::new(CollisionMesh::from_vertices(
            vec![
                Vec3::new(-2.0, -2.0, 0.0),
                Vec3::new(2.0, -2.0, 0.0),
                Vec3::new(0.0, 2.0, 0.0),
            ],
            vec![0, 1, 2],
        ));
        let mut ground = Body::new(
            BodyDesc::new(Shape::TriangleMesh(mesh))
                .with_anchor(BodyAnchor::Entity(mesh_key))
                .with_flags(BodyFlags::STATIC),
        );
        let mut faller = box_body(&mut store, Vec3::new(0.0, 0.0, 0.25), 1.0);
        ground.construct(&mut NullWorld, &store, &config);
        faller.construct(&mut NullWorld, &store, &config);

        let clock = SimulationClock::default();
        faller.velocity = Vec3::new(0.0, 0.0, -1.0);
        let applied = faller.collide(&mut ground, &store, &clock);

        assert!(applied);
        assert!(faller.contact());
        // Outward mesh normal opposes the fall.
        assert!(faller.normal().z > 0.0);
    }

    #[test]
    fn continuous_swept_test_trims_velocity() {
        let config = test_config();
        let mut store = TransformStore::new();
        let key = store.insert_entity(Transform::identity());
        let mut mover = Body::new(
            BodyDesc::new(Shape::Box {
                half_extents: Vec3::repeat(0.5),
            })
            .with_anchor(BodyAnchor::Entity(key))
            .with_mass(1.0)
            .with_flags(BodyFlags::CONTINUOUS)
            .with_velocity(Vec3::new(100.0, 0.0, 0.0)),
        );
        let mut wall = Body::new(
            BodyDesc::new(Shape::Box {
                half_extents: Vec3::new(0.5, 2.0, 2.0),
            })
            .with_anchor(BodyAnchor::Entity(
                store.insert_entity(Transform::from_position(Vec3::new(1.5, 0.0, 0.0))),
            ))
            .with_flags(BodyFlags::STATIC),
        );
        mover.construct(&mut NullWorld, &store, &config);
        wall.construct(&mut NullWorld, &store, &config);

        let clock = SimulationClock::default();
        mover.collide(&mut wall, &store, &clock);

        // The swept test stops the mover at the first obstruction even
        // though the start and end boxes never overlap the wall.
        assert!(mover.velocity().x < 100.0);
    }

    #[test]
    fn segment_query_tags_hit_with_owner() {
        let config = test_config();
        let mut store = TransformStore::new();
        let mut body = sphere_body(&mut store, Vec3::zeros(), 1.0);
        body.construct(&mut NullWorld, &store, &config);

        let result = body.query_segment(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -5.0), &store);

        assert!(result.hit);
        assert_eq!(result.body, body.owner_entity());

        let miss = body.query_segment(Vec3::new(10.0, 0.0, 5.0), Vec3::new(10.0, 0.0, -5.0), &store);
        assert!(!miss.hit);
        assert_eq!(miss.body, None);
    }
}
