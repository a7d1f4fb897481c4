//! Archetype attack strategies for regular enemies.
//!
//! The enemy's Attack state decides *when* to attack; the archetype decides
//! *how*. Multi-step attacks (the charge) keep their progress in
//! [`ChargePhase`] and advance one step per logic tick.

use glam::Vec2;
use sylvan_common::{direction_to, ActorId};
use tracing::{debug, trace};

use crate::actor::{Actor, ActorSnapshot};
use crate::config::{ArchetypeConfig, ChargerConfig, EnemyConfig, MeleeConfig, RangedConfig};
use crate::damage::StrikeSpec;
use crate::projectile::Projectile;
use crate::world::{strike_circle, CombatWorld, Knockback};

/// Result of asking an archetype to attack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttackOutcome {
    /// Radius strike landed on these actors (possibly none)
    Struck(Vec<ActorId>),
    /// A projectile was handed to the world
    Fired,
    /// A charge sequence began
    ChargeStarted,
    /// The attack was refused (sequence already running)
    Rejected,
}

/// Radius sweep around the attacker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeleeStrategy {
    config: MeleeConfig,
}

impl MeleeStrategy {
    /// Creates the strategy.
    #[must_use]
    pub const fn new(config: MeleeConfig) -> Self {
        Self { config }
    }

    fn perform(&self, actor: &mut Actor, stats: &EnemyConfig, world: &mut dyn CombatWorld) -> AttackOutcome {
        let origin = actor.position();
        let spec = stats.strike().with_damage_type(self.config.damage_type);
        let hits = strike_circle(
            world,
            actor.id(),
            origin,
            stats.attack_range,
            stats.target_mask,
            &spec,
            Knockback::AwayFrom(origin),
        );
        debug!(attacker = %actor.id(), hits = hits.len(), "melee sweep");
        AttackOutcome::Struck(hits)
    }
}

/// Keeps a distance band and throws projectiles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangedStrategy {
    config: RangedConfig,
}

impl RangedStrategy {
    /// Creates the strategy.
    #[must_use]
    pub const fn new(config: RangedConfig) -> Self {
        Self { config }
    }

    /// Tunables.
    #[must_use]
    pub const fn config(&self) -> &RangedConfig {
        &self.config
    }

    /// Where projectiles leave the body.
    #[must_use]
    pub fn fire_point(&self, actor: &Actor) -> Vec2 {
        actor.position() + actor.facing().as_vec2() * self.config.fire_point_offset
    }

    /// Backs away from `target` while facing it if it is too close.
    /// Returns whether the actor is retreating.
    pub fn retreat(&self, actor: &mut Actor, chase_speed: f32, target: Vec2) -> bool {
        if actor.distance_to(target) >= self.config.too_close_distance {
            return false;
        }
        let away = direction_to(target, actor.position());
        actor.set_velocity(away * chase_speed * self.config.retreat_speed_factor);
        actor.face_target(target);
        true
    }

    fn perform(
        &self,
        actor: &mut Actor,
        stats: &EnemyConfig,
        target: &ActorSnapshot,
        world: &mut dyn CombatWorld,
    ) -> AttackOutcome {
        actor.face_target(target.position);
        let origin = self.fire_point(actor);
        let projectile = Projectile::new(
            actor.id(),
            origin,
            direction_to(origin, target.position),
            self.config.projectile_speed,
            stats.attack_damage,
            stats.target_mask,
        )
        .with_lifetime(self.config.projectile_lifetime)
        .with_knockback(self.config.projectile_knockback)
        .with_radius(self.config.projectile_radius);

        debug!(attacker = %actor.id(), "projectile fired");
        world.spawn_projectile(projectile);
        AttackOutcome::Fired
    }
}

/// Progress of a charge sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChargePhase {
    /// Lock free; a charge may start
    Ready,
    /// Standing still, telegraphing
    Preparing {
        /// Seconds left
        remaining: f32,
    },
    /// Moving along the locked direction
    Charging {
        /// Unit charge direction
        direction: Vec2,
        /// Distance left to cover
        distance_remaining: f32,
    },
    /// Standing still after the charge
    Recovering {
        /// Seconds left
        remaining: f32,
    },
    /// Lock still held; waiting to release it
    CoolingDown {
        /// Seconds left
        remaining: f32,
    },
}

/// Prepare, charge, recover, cool down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChargerStrategy {
    config: ChargerConfig,
    phase: ChargePhase,
}

impl ChargerStrategy {
    /// Creates the strategy with the lock free.
    #[must_use]
    pub const fn new(config: ChargerConfig) -> Self {
        Self {
            config,
            phase: ChargePhase::Ready,
        }
    }

    /// Current step of the sequence.
    #[must_use]
    pub const fn phase(&self) -> ChargePhase {
        self.phase
    }

    /// Returns whether a new charge may start.
    #[must_use]
    pub const fn can_charge(&self) -> bool {
        matches!(self.phase, ChargePhase::Ready)
    }

    fn perform(&mut self, actor: &mut Actor) -> AttackOutcome {
        if !self.can_charge() {
            return AttackOutcome::Rejected;
        }
        actor.stop();
        self.phase = ChargePhase::Preparing {
            remaining: self.config.preparation_time,
        };
        debug!(attacker = %actor.id(), "charge preparing");
        AttackOutcome::ChargeStarted
    }

    fn update(
        &mut self,
        actor: &mut Actor,
        stats: &EnemyConfig,
        target: Option<&ActorSnapshot>,
        world: &mut dyn CombatWorld,
        dt: f32,
    ) {
        self.phase = match self.phase {
            ChargePhase::Ready => ChargePhase::Ready,
            ChargePhase::Preparing { remaining } => {
                actor.stop();
                let remaining = remaining - dt;
                if remaining > 0.0 {
                    ChargePhase::Preparing { remaining }
                } else if let Some(target) = target.filter(|t| t.alive) {
                    let direction = direction_to(actor.position(), target.position);
                    actor.face_direction(direction);
                    debug!(attacker = %actor.id(), "charging");
                    ChargePhase::Charging {
                        direction,
                        distance_remaining: self.config.charge_distance,
                    }
                } else {
                    ChargePhase::Recovering {
                        remaining: self.config.recovery_time,
                    }
                }
            }
            ChargePhase::Charging {
                direction,
                distance_remaining,
            } => {
                actor.set_velocity(direction * self.config.charge_speed);
                let spec = StrikeSpec::new(
                    stats.attack_damage,
                    stats.knockback_force * self.config.knockback_multiplier,
                );
                let hits = strike_circle(
                    world,
                    actor.id(),
                    actor.position(),
                    stats.attack_range,
                    stats.target_mask,
                    &spec,
                    Knockback::Along(direction),
                );
                let distance_remaining = distance_remaining - self.config.charge_speed * dt;

                if !hits.is_empty() || distance_remaining <= 0.0 {
                    actor.stop();
                    debug!(attacker = %actor.id(), hits = hits.len(), "charge ended");
                    ChargePhase::Recovering {
                        remaining: self.config.recovery_time,
                    }
                } else {
                    ChargePhase::Charging {
                        direction,
                        distance_remaining,
                    }
                }
            }
            ChargePhase::Recovering { remaining } => {
                actor.stop();
                let remaining = remaining - dt;
                if remaining > 0.0 {
                    ChargePhase::Recovering { remaining }
                } else {
                    ChargePhase::CoolingDown {
                        remaining: self.config.charge_cooldown,
                    }
                }
            }
            ChargePhase::CoolingDown { remaining } => {
                let remaining = remaining - dt;
                if remaining > 0.0 {
                    ChargePhase::CoolingDown { remaining }
                } else {
                    trace!(attacker = %actor.id(), "charge ready");
                    ChargePhase::Ready
                }
            }
        };
    }

    fn locks_movement(&self) -> bool {
        matches!(
            self.phase,
            ChargePhase::Preparing { .. } | ChargePhase::Charging { .. } | ChargePhase::Recovering { .. }
        )
    }
}

/// Attack strategy of one enemy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Archetype {
    /// Radius sweep
    Melee(MeleeStrategy),
    /// Kiting projectile thrower
    Ranged(RangedStrategy),
    /// Charge sequence
    Charger(ChargerStrategy),
}

impl Archetype {
    /// Builds the strategy selected by a config.
    #[must_use]
    pub const fn from_config(config: &ArchetypeConfig) -> Self {
        match config {
            ArchetypeConfig::Melee(c) => Self::Melee(MeleeStrategy::new(*c)),
            ArchetypeConfig::Ranged(c) => Self::Ranged(RangedStrategy::new(*c)),
            ArchetypeConfig::Charger(c) => Self::Charger(ChargerStrategy::new(*c)),
        }
    }

    /// Name for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Melee(_) => "melee",
            Self::Ranged(_) => "ranged",
            Self::Charger(_) => "charger",
        }
    }

    /// Runs one attack against `target`.
    pub fn perform_attack(
        &mut self,
        actor: &mut Actor,
        stats: &EnemyConfig,
        target: &ActorSnapshot,
        world: &mut dyn CombatWorld,
    ) -> AttackOutcome {
        match self {
            Self::Melee(m) => m.perform(actor, stats, world),
            Self::Ranged(r) => r.perform(actor, stats, target, world),
            Self::Charger(c) => c.perform(actor),
        }
    }

    /// Steers away from a too-close target (ranged only). Returns whether the
    /// actor is retreating.
    pub fn retreat(&self, actor: &mut Actor, chase_speed: f32, target: Vec2) -> bool {
        match self {
            Self::Ranged(r) => r.retreat(actor, chase_speed, target),
            Self::Melee(_) | Self::Charger(_) => false,
        }
    }

    /// Advances any running sequence by one logic tick.
    pub fn update(
        &mut self,
        actor: &mut Actor,
        stats: &EnemyConfig,
        target: Option<&ActorSnapshot>,
        world: &mut dyn CombatWorld,
        dt: f32,
    ) {
        if let Self::Charger(c) = self {
            c.update(actor, stats, target, world, dt);
        }
    }

    /// Returns whether a running sequence owns the actor's movement.
    #[must_use]
    pub fn locks_movement(&self) -> bool {
        match self {
            Self::Charger(c) => c.locks_movement(),
            Self::Melee(_) | Self::Ranged(_) => false,
        }
    }

    /// Aborts any running sequence, releasing its lock and stopping the actor.
    pub fn cancel(&mut self, actor: &mut Actor) {
        if let Self::Charger(c) = self {
            if !c.can_charge() {
                debug!(attacker = %actor.id(), "charge cancelled");
            }
            c.phase = ChargePhase::Ready;
        }
        actor.stop();
    }
}
