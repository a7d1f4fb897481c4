//! Collaborator traits the combat core consumes.
//!
//! The core never owns other actors. It reaches them through a
//! [`CombatWorld`]: a spatial query for candidates, a snapshot for target
//! checks, and a single damage entry point that routes to the owning
//! controller.

use glam::Vec2;
use sylvan_common::{ActorId, LayerMask};
use tracing::trace;

use crate::actor::{Actor, ActorSnapshot};
use crate::damage::{DamagePacket, StrikeSpec};
use crate::health::HealthChange;
use crate::projectile::Projectile;

/// Anything that accepts damage packets.
pub trait Damageable {
    /// Underlying actor state.
    fn actor(&self) -> &Actor;

    /// Applies a damage packet. Returns `None` when ignored.
    fn take_damage(&mut self, packet: &DamagePacket) -> Option<HealthChange>;

    /// Returns whether health is above zero.
    fn is_alive(&self) -> bool {
        self.actor().is_alive()
    }

    /// Current position.
    fn position(&self) -> Vec2 {
        self.actor().position()
    }
}

impl Damageable for Actor {
    fn actor(&self) -> &Actor {
        self
    }

    fn take_damage(&mut self, packet: &DamagePacket) -> Option<HealthChange> {
        Actor::take_damage(self, packet)
    }
}

/// Circle overlap query over collidable actors.
pub trait SpatialQuery {
    /// Returns actors with collision enabled on `mask` whose position lies
    /// within `radius` of `center`. Valid for the current tick only.
    fn overlap_circle(&self, center: Vec2, radius: f32, mask: LayerMask) -> Vec<ActorId>;
}

/// Everything an actor may touch outside itself during a tick.
pub trait CombatWorld: SpatialQuery {
    /// Read-only view of another actor, `None` if absent or removed.
    fn snapshot(&self, id: ActorId) -> Option<ActorSnapshot>;

    /// Delivers a damage packet to `target`.
    fn damage(&mut self, target: ActorId, packet: &DamagePacket) -> Option<HealthChange>;

    /// Hands a projectile to the world, which updates it from then on.
    fn spawn_projectile(&mut self, projectile: Projectile);
}

/// How a radius strike pushes the actors it hits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Knockback {
    /// Away from a point (melee sweep, slam)
    AwayFrom(Vec2),
    /// Along a fixed direction (charge)
    Along(Vec2),
}

impl Knockback {
    fn direction_for(self, target: Vec2) -> Vec2 {
        match self {
            Self::AwayFrom(origin) => sylvan_common::direction_to(origin, target),
            Self::Along(direction) => direction,
        }
    }
}

/// Damages every alive, collidable actor on `mask` within `radius` of
/// `center`, except `attacker`. Returns the actors whose health changed.
pub fn strike_circle<W: CombatWorld + ?Sized>(
    world: &mut W,
    attacker: ActorId,
    center: Vec2,
    radius: f32,
    mask: LayerMask,
    spec: &StrikeSpec,
    knockback: Knockback,
) -> Vec<ActorId> {
    let mut hits = Vec::new();
    for candidate in world.overlap_circle(center, radius, mask) {
        if candidate == attacker {
            continue;
        }
        let Some(target) = world.snapshot(candidate) else {
            continue;
        };
        if !target.alive || !target.collision_enabled {
            continue;
        }

        let distance = center.distance(target.position);
        let packet = DamagePacket::new(spec.damage_at(distance, radius), attacker, target.position)
            .with_knockback(knockback.direction_for(target.position), spec.knockback_force)
            .with_damage_type(spec.damage_type);

        if world.damage(candidate, &packet).is_some() {
            trace!(%attacker, target = %candidate, amount = packet.amount, "strike hit");
            hits.push(candidate);
        }
    }
    hits
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory world for unit tests.

    use super::*;

    /// Owns a flat list of actors and records every delivered packet.
    #[derive(Debug, Default)]
    pub(crate) struct MockWorld {
        pub actors: Vec<Actor>,
        pub projectiles: Vec<Projectile>,
        pub damage_log: Vec<(ActorId, DamagePacket)>,
    }

    impl MockWorld {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn spawn(&mut self, layer: LayerMask, position: Vec2, max_health: f32) -> ActorId {
            let actor = Actor::new(layer, position, max_health);
            let id = actor.id();
            self.actors.push(actor);
            id
        }

        pub fn actor(&self, id: ActorId) -> &Actor {
            self.actors
                .iter()
                .find(|a| a.id() == id)
                .expect("unknown actor")
        }

        pub fn actor_mut(&mut self, id: ActorId) -> &mut Actor {
            self.actors
                .iter_mut()
                .find(|a| a.id() == id)
                .expect("unknown actor")
        }

        pub fn hits_on(&self, id: ActorId) -> usize {
            self.damage_log.iter().filter(|(t, _)| *t == id).count()
        }
    }

    impl SpatialQuery for MockWorld {
        fn overlap_circle(&self, center: Vec2, radius: f32, mask: LayerMask) -> Vec<ActorId> {
            self.actors
                .iter()
                .filter(|a| a.overlaps_circle(center, radius, mask))
                .map(Actor::id)
                .collect()
        }
    }

    impl CombatWorld for MockWorld {
        fn snapshot(&self, id: ActorId) -> Option<ActorSnapshot> {
            self.actors.iter().find(|a| a.id() == id).map(Actor::snapshot)
        }

        fn damage(&mut self, target: ActorId, packet: &DamagePacket) -> Option<HealthChange> {
            let actor = self.actors.iter_mut().find(|a| a.id() == target)?;
            let change = actor.take_damage(packet)?;
            self.damage_log.push((target, *packet));
            Some(change)
        }

        fn spawn_projectile(&mut self, projectile: Projectile) {
            self.projectiles.push(projectile);
        }
    }
}
