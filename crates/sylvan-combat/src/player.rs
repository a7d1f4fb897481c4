//! Player combatant.
//!
//! Melee swings are gated by their own cooldown and hold an attack lock for a
//! short animation window. Abilities live in numbered slots of an
//! [`ActionSet`] sharing one energy pool. A dash strike is an explicit
//! sub-state advanced once per logic tick, never a blocking sequence.

use glam::Vec2;
use sylvan_common::{ActorId, ConfigError, LayerMask};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::actor::Actor;
use crate::config::{AbilityConfig, AbilityKind, PlayerConfig};
use crate::damage::{DamagePacket, DamageType, StrikeSpec};
use crate::health::{HealthChange, HealthHooks};
use crate::projectile::Projectile;
use crate::sequencer::{ActionError, ActionSet, ActionSlot, Cooldown, EnergyPool};
use crate::world::{strike_circle, CombatWorld, Damageable, Knockback};

/// Number of ability slots.
pub const ABILITY_SLOTS: usize = 4;

/// Knockback of the dash strike landing hit.
const DASH_KNOCKBACK: f32 = 5.0;

/// Knockback of an area blast.
const AOE_KNOCKBACK: f32 = 4.0;

/// Distance from the player center at which projectiles spawn.
const FIRE_POINT_OFFSET: f32 = 0.5;

/// Errors from player actions.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlayerError {
    /// Invalid tunables
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Sequencer refused the ability
    #[error(transparent)]
    Action(#[from] ActionError),

    /// Player is dead
    #[error("player is dead")]
    Dead,

    /// Another action holds the player
    #[error("player is busy ({0})")]
    Busy(&'static str),
}

/// Result alias for player actions.
pub type PlayerResult<T> = Result<T, PlayerError>;

/// What the player is currently locked into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlayerAction {
    /// Free to move and act
    Idle,
    /// Melee animation lock
    Attacking {
        /// Seconds until the lock releases
        remaining: f32,
    },
    /// Invulnerable dash toward a landing point
    Dashing {
        /// Start of the dash
        from: Vec2,
        /// Landing point
        to: Vec2,
        /// Seconds since the dash started
        elapsed: f32,
        /// Total dash time
        duration: f32,
        /// Landing hit radius
        radius: f32,
        /// Landing hit damage
        damage: f32,
    },
    /// Dead until respawned
    Dead,
}

impl PlayerAction {
    /// Short name for logs and errors.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Attacking { .. } => "attacking",
            Self::Dashing { .. } => "dashing",
            Self::Dead => "dead",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct SpeedBoost {
    multiplier: f32,
    remaining: f32,
}

/// The player's combat controller.
#[derive(Debug)]
pub struct Player {
    actor: Actor,
    config: PlayerConfig,
    abilities: ActionSet<AbilityConfig>,
    attack_cooldown: Cooldown,
    action: PlayerAction,
    shield_remaining: Option<f32>,
    boost: Option<SpeedBoost>,
    move_input: Vec2,
    aim: Vec2,
}

impl Player {
    /// Creates a player and fills the ability slots in order.
    pub fn new(config: PlayerConfig, position: Vec2) -> PlayerResult<Self> {
        config.validate()?;

        let mut actor = Actor::new(LayerMask::PLAYER, position, config.max_health);
        actor.body_mut().mass = config.mass;

        let energy = EnergyPool::new(config.energy.max, config.energy.regen_rate);
        let mut abilities = ActionSet::new(ABILITY_SLOTS, energy);
        if config.abilities.len() > ABILITY_SLOTS {
            warn!(
                configured = config.abilities.len(),
                slots = ABILITY_SLOTS,
                "extra abilities ignored"
            );
        }
        for (index, ability) in config.abilities.iter().take(ABILITY_SLOTS).enumerate() {
            let slot = ActionSlot::new(*ability, ability.cooldown, ability.energy_cost);
            abilities.set_slot(index, Some(slot))?;
        }

        Ok(Self {
            actor,
            attack_cooldown: Cooldown::new(config.attack_cooldown),
            config,
            abilities,
            action: PlayerAction::Idle,
            shield_remaining: None,
            boost: None,
            move_input: Vec2::ZERO,
            aim: Vec2::X,
        })
    }

    /// Actor ID.
    #[must_use]
    pub const fn id(&self) -> ActorId {
        self.actor.id()
    }

    /// Underlying actor.
    #[must_use]
    pub const fn actor(&self) -> &Actor {
        &self.actor
    }

    /// Mutable actor, for placement by the owning world.
    pub fn actor_mut(&mut self) -> &mut Actor {
        &mut self.actor
    }

    /// Tunables.
    #[must_use]
    pub const fn config(&self) -> &PlayerConfig {
        &self.config
    }

    /// Ability slots and energy.
    #[must_use]
    pub const fn abilities(&self) -> &ActionSet<AbilityConfig> {
        &self.abilities
    }

    /// Current action lock.
    #[must_use]
    pub const fn action(&self) -> PlayerAction {
        self.action
    }

    /// Unit aim direction.
    #[must_use]
    pub const fn aim_direction(&self) -> Vec2 {
        self.aim
    }

    /// Returns whether a shield is up.
    #[must_use]
    pub const fn is_shielded(&self) -> bool {
        self.shield_remaining.is_some()
    }

    /// Current movement multiplier from speed boosts.
    #[must_use]
    pub fn speed_multiplier(&self) -> f32 {
        self.boost.map_or(1.0, |b| b.multiplier)
    }

    /// Health notification hooks.
    pub fn hooks_mut(&mut self) -> &mut HealthHooks {
        self.actor.health_mut().hooks_mut()
    }

    /// Sets the desired movement direction. Zero stops.
    pub fn move_input(&mut self, direction: Vec2) {
        self.move_input = direction.normalize_or_zero();
    }

    /// Points the aim. A zero vector keeps the previous aim.
    pub fn aim(&mut self, direction: Vec2) {
        let direction = direction.normalize_or_zero();
        if direction != Vec2::ZERO {
            self.aim = direction;
            self.actor.face_direction(direction);
        }
    }

    fn ensure_ready(&self) -> PlayerResult<()> {
        match self.action {
            PlayerAction::Idle => Ok(()),
            PlayerAction::Dead => Err(PlayerError::Dead),
            other => Err(PlayerError::Busy(other.name())),
        }
    }

    /// Swings at the point `attack_range` along the aim. Returns the actors hit.
    pub fn attack(&mut self, world: &mut dyn CombatWorld) -> PlayerResult<Vec<ActorId>> {
        self.ensure_ready()?;
        if !self.attack_cooldown.is_ready() {
            return Err(ActionError::OnCooldown {
                remaining: self.attack_cooldown.remaining(),
            }
            .into());
        }

        let origin = self.actor.position();
        let center = origin + self.aim * self.config.attack_range;
        let spec = StrikeSpec::new(self.config.attack_damage, self.config.attack_knockback);
        let hits = strike_circle(
            world,
            self.id(),
            center,
            self.config.attack_radius,
            self.config.target_mask,
            &spec,
            Knockback::AwayFrom(origin),
        );

        self.attack_cooldown.trigger();
        self.actor.stop();
        self.action = PlayerAction::Attacking {
            remaining: self.config.attack_lock,
        };
        debug!(player = %self.id(), hits = hits.len(), "melee swing");
        Ok(hits)
    }

    /// Runs the ability in `slot`. Returns its kind on success.
    pub fn use_ability(&mut self, slot: usize, world: &mut dyn CombatWorld) -> PlayerResult<AbilityKind> {
        self.ensure_ready()?;

        let at_full_health = self.actor.health().is_full();
        let ability = *self.abilities.try_execute(slot, |ability| match ability.kind {
            AbilityKind::Heal { .. } => !at_full_health,
            _ => true,
        })?;

        let origin = self.actor.position();
        match ability.kind {
            AbilityKind::Projectile { speed, lifetime } => {
                let projectile = Projectile::new(
                    self.id(),
                    origin + self.aim * FIRE_POINT_OFFSET,
                    self.aim,
                    speed,
                    ability.damage,
                    self.config.target_mask,
                )
                .with_lifetime(lifetime);
                world.spawn_projectile(projectile);
            }
            AbilityKind::DashStrike {
                distance,
                duration,
                radius,
            } => {
                self.actor.stop();
                self.actor.set_invulnerable(true);
                self.action = PlayerAction::Dashing {
                    from: origin,
                    to: origin + self.aim * distance,
                    elapsed: 0.0,
                    duration,
                    radius,
                    damage: ability.damage,
                };
            }
            AbilityKind::AoE { radius } => {
                let center = origin + self.aim * ability.range;
                let spec = StrikeSpec::new(ability.damage, AOE_KNOCKBACK)
                    .with_damage_type(DamageType::Magic)
                    .with_falloff();
                let hits = strike_circle(
                    world,
                    self.id(),
                    center,
                    radius,
                    self.config.target_mask,
                    &spec,
                    Knockback::AwayFrom(center),
                );
                debug!(player = %self.id(), hits = hits.len(), "area blast");
            }
            AbilityKind::Heal { amount } => {
                self.actor.heal(amount);
            }
            AbilityKind::Shield { duration } => {
                self.shield_remaining = Some(duration);
                self.actor.set_invulnerable(true);
            }
            AbilityKind::SpeedBoost {
                multiplier,
                duration,
            } => {
                self.boost = Some(SpeedBoost {
                    multiplier,
                    remaining: duration,
                });
            }
        }
        debug!(player = %self.id(), slot, ability = ?ability.kind, "ability used");
        Ok(ability.kind)
    }

    /// Logic tick: timers, effects, the current action, then steering.
    pub fn tick(&mut self, world: &mut dyn CombatWorld, dt: f32) {
        if self.action == PlayerAction::Dead {
            return;
        }

        self.abilities.tick(dt);
        self.attack_cooldown.tick(dt);
        self.tick_effects(dt);

        match &mut self.action {
            PlayerAction::Attacking { remaining } => {
                *remaining -= dt;
                if *remaining <= 0.0 {
                    self.action = PlayerAction::Idle;
                }
            }
            PlayerAction::Dashing {
                from,
                to,
                elapsed,
                duration,
                radius,
                damage,
            } => {
                *elapsed += dt;
                let t = (*elapsed / *duration).min(1.0);
                self.actor.set_position(from.lerp(*to, t));
                if t >= 1.0 {
                    let (landing, radius, damage) = (*to, *radius, *damage);
                    self.land_dash(world, landing, radius, damage);
                }
            }
            PlayerAction::Idle | PlayerAction::Dead => {}
        }

        if self.action == PlayerAction::Idle {
            let speed = self.config.move_speed * self.speed_multiplier();
            self.actor.set_velocity(self.move_input * speed);
            if self.move_input != Vec2::ZERO {
                self.actor.face_direction(self.move_input);
            }
        }
    }

    fn tick_effects(&mut self, dt: f32) {
        if let Some(remaining) = self.shield_remaining.as_mut() {
            *remaining -= dt;
            if *remaining <= 0.0 {
                self.shield_remaining = None;
                if !matches!(self.action, PlayerAction::Dashing { .. }) {
                    self.actor.set_invulnerable(false);
                }
            }
        }
        if let Some(boost) = self.boost.as_mut() {
            boost.remaining -= dt;
            if boost.remaining <= 0.0 {
                self.boost = None;
            }
        }
    }

    fn land_dash(&mut self, world: &mut dyn CombatWorld, landing: Vec2, radius: f32, damage: f32) {
        self.action = PlayerAction::Idle;
        if self.shield_remaining.is_none() {
            self.actor.set_invulnerable(false);
        }
        let hits = strike_circle(
            world,
            self.id(),
            landing,
            radius,
            self.config.target_mask,
            &StrikeSpec::new(damage, DASH_KNOCKBACK),
            Knockback::AwayFrom(landing),
        );
        debug!(player = %self.id(), hits = hits.len(), "dash strike landed");
    }

    /// Physics tick. The dash moves the player directly, so it skips
    /// integration.
    pub fn fixed_tick(&mut self, dt: f32) {
        match self.action {
            PlayerAction::Dead | PlayerAction::Dashing { .. } => {}
            PlayerAction::Idle | PlayerAction::Attacking { .. } => self.actor.integrate(dt),
        }
    }

    /// Restores health. Ignored when dead.
    pub fn heal(&mut self, amount: f32) -> Option<HealthChange> {
        self.actor.heal(amount)
    }

    /// Sets health directly.
    pub fn set_health(&mut self, value: f32) -> HealthChange {
        let change = self.actor.set_health(value);
        if change.died {
            self.on_death();
        }
        change
    }

    /// Brings the player back at `position` with full health.
    pub fn respawn(&mut self, position: Vec2) {
        self.actor.health_mut().reset();
        self.actor.set_position(position);
        self.actor.stop();
        self.actor.body_mut().knockback = Vec2::ZERO;
        self.actor.set_invulnerable(false);
        self.move_input = Vec2::ZERO;
        self.action = PlayerAction::Idle;
        info!(player = %self.id(), "respawned");
    }

    fn on_death(&mut self) {
        self.action = PlayerAction::Dead;
        self.shield_remaining = None;
        self.boost = None;
        self.move_input = Vec2::ZERO;
        self.actor.set_invulnerable(false);
        self.actor.stop();
        info!(player = %self.id(), "player died");
    }
}

impl Damageable for Player {
    fn actor(&self) -> &Actor {
        &self.actor
    }

    fn take_damage(&mut self, packet: &DamagePacket) -> Option<HealthChange> {
        let change = self.actor.take_damage(packet)?;
        if change.died {
            self.on_death();
        }
        Some(change)
    }
}
