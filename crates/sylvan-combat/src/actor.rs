//! Actor state: body, facing, health.
//!
//! An [`Actor`] is owned by the controller that represents it (enemy, boss,
//! player). Health changes only through the damage resolver
//! ([`Actor::take_damage`]) or explicit heal/set calls.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use sylvan_common::{direction_to, ActorId, Facing, LayerMask};

use crate::damage::DamagePacket;
use crate::health::{Health, HealthChange};

/// Default decay rate of knockback velocity, per second.
const DEFAULT_KNOCKBACK_DAMPING: f32 = 8.0;

/// Knockback speed below which residual knockback is discarded.
const KNOCKBACK_REST_SPEED: f32 = 0.01;

/// Kinematic state of an actor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    /// World position
    pub position: Vec2,
    /// Steering velocity set by AI or input
    pub velocity: Vec2,
    /// Velocity from knockback impulses, decays over time
    pub knockback: Vec2,
    /// Horizontal facing
    pub facing: Facing,
    /// Mass used to convert impulses to velocity
    pub mass: f32,
    /// Knockback decay rate per second
    pub knockback_damping: f32,
    /// Whether the body takes part in spatial queries
    pub collision_enabled: bool,
}

impl Body {
    /// Creates a body at rest.
    #[must_use]
    pub fn new(position: Vec2) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            knockback: Vec2::ZERO,
            facing: Facing::Right,
            mass: 1.0,
            knockback_damping: DEFAULT_KNOCKBACK_DAMPING,
            collision_enabled: true,
        }
    }

    /// Adds an instantaneous impulse.
    pub fn apply_impulse(&mut self, impulse: Vec2) {
        self.knockback += impulse / self.mass.max(f32::EPSILON);
    }

    /// Advances position by one physics step.
    pub fn integrate(&mut self, dt: f32) {
        self.position += (self.velocity + self.knockback) * dt;
        self.knockback *= 1.0 / (1.0 + self.knockback_damping * dt);
        if self.knockback.length_squared() < KNOCKBACK_REST_SPEED * KNOCKBACK_REST_SPEED {
            self.knockback = Vec2::ZERO;
        }
    }
}

/// Read-only view of an actor, valid for the current tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActorSnapshot {
    /// Actor ID
    pub id: ActorId,
    /// Position
    pub position: Vec2,
    /// Whether health is above zero
    pub alive: bool,
    /// Collision layer
    pub layer: LayerMask,
    /// Whether the actor can currently be hit
    pub collision_enabled: bool,
}

/// Anything with health participating in combat.
#[derive(Debug)]
pub struct Actor {
    id: ActorId,
    layer: LayerMask,
    body: Body,
    health: Health,
}

impl Actor {
    /// Creates an actor with full health.
    #[must_use]
    pub fn new(layer: LayerMask, position: Vec2, max_health: f32) -> Self {
        Self {
            id: ActorId::new(),
            layer,
            body: Body::new(position),
            health: Health::new(max_health),
        }
    }

    /// Actor ID.
    #[must_use]
    pub const fn id(&self) -> ActorId {
        self.id
    }

    /// Collision layer.
    #[must_use]
    pub const fn layer(&self) -> LayerMask {
        self.layer
    }

    /// Kinematic state.
    #[must_use]
    pub const fn body(&self) -> &Body {
        &self.body
    }

    /// Mutable kinematic state.
    pub fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    /// Health pool.
    #[must_use]
    pub const fn health(&self) -> &Health {
        &self.health
    }

    /// Mutable health pool.
    pub fn health_mut(&mut self) -> &mut Health {
        &mut self.health
    }

    /// Position.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.body.position
    }

    /// Teleports the actor.
    pub fn set_position(&mut self, position: Vec2) {
        self.body.position = position;
    }

    /// Steering velocity.
    #[must_use]
    pub const fn velocity(&self) -> Vec2 {
        self.body.velocity
    }

    /// Sets the steering velocity.
    pub fn set_velocity(&mut self, velocity: Vec2) {
        self.body.velocity = velocity;
    }

    /// Facing.
    #[must_use]
    pub const fn facing(&self) -> Facing {
        self.body.facing
    }

    /// Returns whether health is above zero.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.health.is_alive()
    }

    /// Returns whether the actor can be found by spatial queries.
    #[must_use]
    pub const fn collision_enabled(&self) -> bool {
        self.body.collision_enabled
    }

    /// Removes the actor from spatial queries.
    pub fn disable_collision(&mut self) {
        self.body.collision_enabled = false;
    }

    /// Re-enables spatial queries.
    pub fn enable_collision(&mut self) {
        self.body.collision_enabled = true;
    }

    /// Sets velocity toward `target` at `speed` and faces the movement.
    pub fn move_towards(&mut self, target: Vec2, speed: f32) {
        let direction = direction_to(self.body.position, target);
        self.body.velocity = direction * speed;
        self.face_direction(direction);
    }

    /// Stops steering movement. Knockback still plays out.
    pub fn stop(&mut self) {
        self.body.velocity = Vec2::ZERO;
    }

    /// Faces a direction; vertical directions keep the current facing.
    pub fn face_direction(&mut self, direction: Vec2) {
        self.body.facing = Facing::from_direction(direction, self.body.facing);
    }

    /// Faces a world position.
    pub fn face_target(&mut self, target: Vec2) {
        self.face_direction(target - self.body.position);
    }

    /// Distance to a world position.
    #[must_use]
    pub fn distance_to(&self, point: Vec2) -> f32 {
        self.body.position.distance(point)
    }

    /// Damage resolver: applies the packet to health, then the knockback
    /// impulse if the packet was not ignored.
    pub fn take_damage(&mut self, packet: &DamagePacket) -> Option<HealthChange> {
        let change = self.health.take_damage(packet)?;
        if let Some(impulse) = packet.knockback_impulse() {
            self.body.apply_impulse(impulse);
        }
        Some(change)
    }

    /// Restores health. Ignored when dead.
    pub fn heal(&mut self, amount: f32) -> Option<HealthChange> {
        self.health.heal(amount)
    }

    /// Sets health directly.
    pub fn set_health(&mut self, value: f32) -> HealthChange {
        self.health.set_health(value)
    }

    /// Toggles damage immunity.
    pub fn set_invulnerable(&mut self, invulnerable: bool) {
        self.health.set_invulnerable(invulnerable);
    }

    /// Advances the body by one physics step.
    pub fn integrate(&mut self, dt: f32) {
        self.body.integrate(dt);
    }

    /// Snapshot for spatial and target queries.
    #[must_use]
    pub fn snapshot(&self) -> ActorSnapshot {
        ActorSnapshot {
            id: self.id,
            position: self.body.position,
            alive: self.is_alive(),
            layer: self.layer,
            collision_enabled: self.body.collision_enabled,
        }
    }

    /// Returns whether this actor lies within a query circle on `mask`.
    #[must_use]
    pub fn overlaps_circle(&self, center: Vec2, radius: f32, mask: LayerMask) -> bool {
        self.body.collision_enabled
            && mask.intersects(self.layer)
            && self.body.position.distance(center) <= radius
    }
}
