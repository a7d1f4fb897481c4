//! Independent projectile entity.
//!
//! Once spawned, a projectile belongs to the world, not to its owner: it keeps
//! flying after the owner dies. It damages the first alive actor in its mask
//! other than the owner and despawns, or expires when its lifetime runs out.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use sylvan_common::{ActorId, LayerMask};
use tracing::trace;

use crate::damage::{DamagePacket, DamageType};
use crate::world::CombatWorld;

/// Outcome of one projectile update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectileStatus {
    /// Still in flight
    Flying,
    /// Hit this actor and must be despawned
    Hit(ActorId),
    /// Lifetime ran out
    Expired,
}

/// A moving damage source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    /// Actor that fired it
    pub owner: ActorId,
    /// Current position
    pub position: Vec2,
    /// Unit flight direction
    pub direction: Vec2,
    /// Units per second
    pub speed: f32,
    /// Damage on hit
    pub damage: f32,
    /// Knockback along the flight direction
    pub knockback_force: f32,
    /// Type of damage
    pub damage_type: DamageType,
    /// Seconds left before expiry
    pub lifetime: f32,
    /// Collision radius
    pub radius: f32,
    /// Layers it can hit
    pub target_mask: LayerMask,
}

impl Projectile {
    /// Default lifetime in seconds.
    pub const DEFAULT_LIFETIME: f32 = 3.0;
    /// Default knockback force.
    pub const DEFAULT_KNOCKBACK: f32 = 2.0;
    /// Default collision radius.
    pub const DEFAULT_RADIUS: f32 = 0.25;

    /// Creates a magic projectile with default lifetime, knockback and radius.
    #[must_use]
    pub fn new(
        owner: ActorId,
        position: Vec2,
        direction: Vec2,
        speed: f32,
        damage: f32,
        target_mask: LayerMask,
    ) -> Self {
        Self {
            owner,
            position,
            direction: direction.normalize_or_zero(),
            speed,
            damage,
            knockback_force: Self::DEFAULT_KNOCKBACK,
            damage_type: DamageType::Magic,
            lifetime: Self::DEFAULT_LIFETIME,
            radius: Self::DEFAULT_RADIUS,
            target_mask,
        }
    }

    /// Sets the lifetime.
    #[must_use]
    pub const fn with_lifetime(mut self, lifetime: f32) -> Self {
        self.lifetime = lifetime;
        self
    }

    /// Sets the knockback force.
    #[must_use]
    pub const fn with_knockback(mut self, force: f32) -> Self {
        self.knockback_force = force;
        self
    }

    /// Sets the collision radius.
    #[must_use]
    pub const fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }

    /// Moves, checks for a hit, then ages the projectile.
    pub fn update<W: CombatWorld + ?Sized>(&mut self, world: &mut W, dt: f32) -> ProjectileStatus {
        self.position += self.direction * self.speed * dt;

        for candidate in world.overlap_circle(self.position, self.radius, self.target_mask) {
            if candidate == self.owner {
                continue;
            }
            let alive = world.snapshot(candidate).is_some_and(|s| s.alive);
            if !alive {
                continue;
            }

            let packet = DamagePacket::new(self.damage, self.owner, self.position)
                .with_knockback(self.direction, self.knockback_force)
                .with_damage_type(self.damage_type);
            // An ignored packet (shield, dash) still consumes the projectile.
            let absorbed = world.damage(candidate, &packet).is_none();
            trace!(owner = %self.owner, target = %candidate, absorbed, "projectile hit");
            return ProjectileStatus::Hit(candidate);
        }

        self.lifetime -= dt;
        if self.lifetime <= 0.0 {
            ProjectileStatus::Expired
        } else {
            ProjectileStatus::Flying
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::testing::MockWorld;

    #[test]
    fn test_projectile_hits_first_alive_target() {
        let mut world = MockWorld::new();
        let owner = world.spawn(LayerMask::ENEMY, Vec2::ZERO, 50.0);
        let player = world.spawn(LayerMask::PLAYER, Vec2::new(2.0, 0.0), 100.0);

        let mut bolt = Projectile::new(owner, Vec2::ZERO, Vec2::X, 8.0, 15.0, LayerMask::PLAYER);
        assert_eq!(bolt.update(&mut world, 0.125), ProjectileStatus::Flying);
        assert_eq!(bolt.update(&mut world, 0.125), ProjectileStatus::Hit(player));

        let (_, packet) = world.damage_log[0];
        assert_eq!(packet.damage_type, DamageType::Magic);
        assert_eq!(packet.knockback_direction, Vec2::X);
        assert_eq!(world.actor(player).health().current(), 85.0);
    }

    #[test]
    fn test_projectile_ignores_owner_and_dead() {
        let mut world = MockWorld::new();
        let owner = world.spawn(LayerMask::PLAYER, Vec2::ZERO, 50.0);
        let corpse = world.spawn(LayerMask::PLAYER, Vec2::new(0.1, 0.0), 50.0);
        world.actor_mut(corpse).set_health(0.0);

        let mut bolt = Projectile::new(owner, Vec2::ZERO, Vec2::X, 0.5, 15.0, LayerMask::PLAYER);
        assert_eq!(bolt.update(&mut world, 0.1), ProjectileStatus::Flying);
        assert!(world.damage_log.is_empty());
    }

    #[test]
    fn test_invulnerable_target_still_consumes_projectile() {
        let mut world = MockWorld::new();
        let owner = world.spawn(LayerMask::ENEMY, Vec2::ZERO, 50.0);
        let player = world.spawn(LayerMask::PLAYER, Vec2::new(0.5, 0.0), 100.0);
        world.actor_mut(player).set_invulnerable(true);

        let mut bolt = Projectile::new(owner, Vec2::ZERO, Vec2::X, 8.0, 15.0, LayerMask::PLAYER);
        assert_eq!(bolt.update(&mut world, 0.0625), ProjectileStatus::Hit(player));
        assert!(world.damage_log.is_empty());
        assert_eq!(world.actor(player).health().current(), 100.0);
    }

    #[test]
    fn test_projectile_expires() {
        let mut world = MockWorld::new();
        let mut bolt = Projectile::new(ActorId::NULL, Vec2::ZERO, Vec2::Y, 8.0, 15.0, LayerMask::ALL)
            .with_lifetime(0.25);
        assert_eq!(bolt.update(&mut world, 0.2), ProjectileStatus::Flying);
        assert_eq!(bolt.update(&mut world, 0.2), ProjectileStatus::Expired);
    }
}
