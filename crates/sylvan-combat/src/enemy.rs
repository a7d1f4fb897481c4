//! Regular enemy controller and its behavior set.
//!
//! - Idle: waits a random time; goes to Patrol if a route exists.
//! - Patrol: walks waypoints in order, wrapping around.
//! - Chase: moves toward the target until it is in attack range.
//! - Attack: faces the target and attacks on a cooldown.
//! - Death: terminal; collision off, removed after a delay.
//!
//! Idle, Patrol, Chase and Attack all drop to Chase or Idle as detection
//! dictates. Detection is re-evaluated every tick: the target is visible iff
//! it exists, is alive, and lies within the detection range.

use glam::Vec2;
use sylvan_common::{distance_or_infinite, ActorId, ConfigError};
use tracing::{debug, info};

use crate::actor::{Actor, ActorSnapshot};
use crate::archetype::Archetype;
use crate::config::EnemyConfig;
use crate::damage::DamagePacket;
use crate::health::{HealthChange, HealthHooks};
use crate::state_machine::{BehaviorState, StateMachine, Transition};
use crate::world::{CombatWorld, Damageable};

/// Per-enemy data the behavior states act on.
#[derive(Debug)]
pub struct EnemyAgent {
    actor: Actor,
    config: EnemyConfig,
    archetype: Archetype,
    target: Option<ActorId>,
    patrol_index: usize,
    rng: fastrand::Rng,
    removed: bool,
}

impl EnemyAgent {
    fn target_snapshot(&self, world: &dyn CombatWorld) -> Option<ActorSnapshot> {
        self.target.and_then(|id| world.snapshot(id))
    }

    fn distance_to(&self, target: Option<&ActorSnapshot>) -> f32 {
        distance_or_infinite(self.actor.position(), target.map(|t| t.position))
    }

    /// Visible target, if any.
    fn visible_target(&self, world: &dyn CombatWorld) -> Option<ActorSnapshot> {
        self.target_snapshot(world)
            .filter(|t| t.alive && self.distance_to(Some(t)) <= self.config.detection_range)
    }

    fn in_attack_range(&self, target: &ActorSnapshot) -> bool {
        self.distance_to(Some(target)) <= self.config.attack_range
    }

    fn has_patrol_points(&self) -> bool {
        !self.config.patrol_points.is_empty()
    }

    fn current_patrol_point(&self) -> Option<Vec2> {
        self.config.patrol_points.get(self.patrol_index).copied()
    }

    fn next_patrol_point(&mut self) {
        if self.has_patrol_points() {
            self.patrol_index = (self.patrol_index + 1) % self.config.patrol_points.len();
        }
    }

    fn roll_idle_time(&mut self) -> f32 {
        let span = self.config.idle_time_max - self.config.idle_time_min;
        self.config.idle_time_min + self.rng.f32() * span
    }

    fn steering_free(&self) -> bool {
        !self.archetype.locks_movement()
    }
}

/// Behavior states of a regular enemy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EnemyState {
    /// Standing still for a random duration
    Idle {
        /// Seconds left
        remaining: f32,
    },
    /// Walking the waypoint route
    Patrol,
    /// Moving toward the target
    Chase,
    /// Attacking on a cooldown
    Attack {
        /// Seconds until the next attack
        cooldown: f32,
    },
    /// Waiting for removal
    Death {
        /// Seconds until removal
        remaining: f32,
    },
}

impl EnemyState {
    /// Idle with its timer rolled on entry.
    #[must_use]
    pub const fn idle() -> Self {
        Self::Idle { remaining: 0.0 }
    }

    /// Attack, ready to strike on its first tick.
    #[must_use]
    pub const fn attack() -> Self {
        Self::Attack { cooldown: 0.0 }
    }

    /// Death with its delay set on entry.
    #[must_use]
    pub const fn death() -> Self {
        Self::Death { remaining: 0.0 }
    }
}

impl BehaviorState for EnemyState {
    type Owner = EnemyAgent;
    type World = dyn CombatWorld;

    fn name(&self) -> &'static str {
        match self {
            Self::Idle { .. } => "idle",
            Self::Patrol => "patrol",
            Self::Chase => "chase",
            Self::Attack { .. } => "attack",
            Self::Death { .. } => "death",
        }
    }

    fn enter(&mut self, agent: &mut EnemyAgent) {
        match self {
            Self::Idle { remaining } => {
                *remaining = agent.roll_idle_time();
                if agent.steering_free() {
                    agent.actor.stop();
                }
            }
            Self::Attack { cooldown } => {
                *cooldown = 0.0;
                if agent.steering_free() {
                    agent.actor.stop();
                }
            }
            Self::Death { remaining } => {
                *remaining = agent.config.death_delay;
                agent.archetype.cancel(&mut agent.actor);
                agent.actor.stop();
                agent.actor.disable_collision();
                info!(enemy = %agent.actor.id(), name = %agent.config.name, "enemy died");
            }
            Self::Patrol | Self::Chase => {}
        }
    }

    fn execute(&mut self, agent: &mut EnemyAgent, world: &mut Self::World, dt: f32) -> Transition<Self> {
        match self {
            Self::Idle { remaining } => {
                if agent.visible_target(world).is_some() {
                    return Transition::To(Self::Chase);
                }
                *remaining -= dt;
                if *remaining <= 0.0 {
                    if agent.has_patrol_points() {
                        return Transition::To(Self::Patrol);
                    }
                    *remaining = agent.roll_idle_time();
                }
                Transition::Stay
            }
            Self::Patrol => {
                if agent.visible_target(world).is_some() {
                    return Transition::To(Self::Chase);
                }
                let Some(waypoint) = agent.current_patrol_point() else {
                    return Transition::To(Self::idle());
                };
                if agent.steering_free() {
                    agent.actor.move_towards(waypoint, agent.config.patrol_speed);
                }
                if agent.actor.distance_to(waypoint) < agent.config.waypoint_radius {
                    agent.next_patrol_point();
                }
                Transition::Stay
            }
            Self::Chase => {
                let Some(target) = agent.visible_target(world) else {
                    return Transition::To(Self::idle());
                };
                if agent.in_attack_range(&target) {
                    return Transition::To(Self::attack());
                }
                if agent.steering_free() {
                    agent.actor.move_towards(target.position, agent.config.chase_speed);
                    agent
                        .archetype
                        .retreat(&mut agent.actor, agent.config.chase_speed, target.position);
                }
                Transition::Stay
            }
            Self::Attack { cooldown } => {
                let Some(target) = agent.visible_target(world) else {
                    return Transition::To(Self::idle());
                };
                if !agent.in_attack_range(&target) {
                    return Transition::To(Self::Chase);
                }

                let mut retreating = false;
                if agent.steering_free() {
                    agent.actor.face_target(target.position);
                    retreating = agent.archetype.retreat(
                        &mut agent.actor,
                        agent.config.chase_speed,
                        target.position,
                    );
                    if !retreating {
                        agent.actor.stop();
                    }
                }

                *cooldown -= dt;
                if *cooldown <= 0.0 && !retreating {
                    agent
                        .archetype
                        .perform_attack(&mut agent.actor, &agent.config, &target, world);
                    *cooldown = agent.config.attack_cooldown;
                }
                Transition::Stay
            }
            Self::Death { remaining } => {
                *remaining -= dt;
                if *remaining <= 0.0 && !agent.removed {
                    agent.removed = true;
                    agent.actor.health_mut().hooks_mut().close_all();
                    debug!(enemy = %agent.actor.id(), "enemy removed");
                }
                Transition::Stay
            }
        }
    }

    fn fixed_execute(&mut self, agent: &mut EnemyAgent, dt: f32) {
        if !matches!(self, Self::Death { .. }) {
            agent.actor.integrate(dt);
        }
    }

    fn is_terminal(&self) -> bool {
        matches!(self, Self::Death { .. })
    }
}

/// A regular enemy: actor, archetype, and behavior machine.
#[derive(Debug)]
pub struct Enemy {
    agent: EnemyAgent,
    machine: StateMachine<EnemyState>,
}

impl Enemy {
    /// Spawns an enemy at `position` with full health, in Idle.
    pub fn new(config: EnemyConfig, position: Vec2) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut actor = Actor::new(sylvan_common::LayerMask::ENEMY, position, config.max_health);
        actor.body_mut().mass = config.mass;
        let rng = config
            .rng_seed
            .map_or_else(fastrand::Rng::new, fastrand::Rng::with_seed);

        let mut agent = EnemyAgent {
            actor,
            archetype: Archetype::from_config(&config.archetype),
            config,
            target: None,
            patrol_index: 0,
            rng,
            removed: false,
        };
        let mut machine = StateMachine::new();
        machine.initialize(EnemyState::idle(), &mut agent);

        debug!(
            enemy = %agent.actor.id(),
            archetype = agent.archetype.name(),
            "enemy spawned"
        );
        Ok(Self { agent, machine })
    }

    /// Sets the actor to pursue.
    #[must_use]
    pub fn with_target(mut self, target: ActorId) -> Self {
        self.agent.target = Some(target);
        self
    }

    /// Actor ID.
    #[must_use]
    pub const fn id(&self) -> ActorId {
        self.agent.actor.id()
    }

    /// Underlying actor.
    #[must_use]
    pub const fn actor(&self) -> &Actor {
        &self.agent.actor
    }

    /// Tunables.
    #[must_use]
    pub const fn config(&self) -> &EnemyConfig {
        &self.agent.config
    }

    /// Attack strategy.
    #[must_use]
    pub const fn archetype(&self) -> &Archetype {
        &self.agent.archetype
    }

    /// Current behavior state.
    #[must_use]
    pub const fn state(&self) -> Option<&EnemyState> {
        self.machine.current()
    }

    /// Name of the current behavior state.
    #[must_use]
    pub fn state_name(&self) -> &'static str {
        self.machine.current_name().unwrap_or("uninitialized")
    }

    /// Returns whether the post-death delay has elapsed.
    #[must_use]
    pub const fn is_removed(&self) -> bool {
        self.agent.removed
    }

    /// Returns whether the enemy is in its Death state.
    #[must_use]
    pub fn is_dying(&self) -> bool {
        matches!(self.machine.current(), Some(EnemyState::Death { .. }))
    }

    /// Current target.
    #[must_use]
    pub const fn target(&self) -> Option<ActorId> {
        self.agent.target
    }

    /// Changes or clears the target.
    pub fn set_target(&mut self, target: Option<ActorId>) {
        self.agent.target = target;
    }

    /// Replaces the patrol route and restarts it from the first point.
    pub fn set_patrol_points(&mut self, points: Vec<Vec2>) {
        self.agent.config.patrol_points = points;
        self.agent.patrol_index = 0;
    }

    /// Index of the waypoint currently walked toward.
    #[must_use]
    pub const fn patrol_index(&self) -> usize {
        self.agent.patrol_index
    }

    /// Health notification hooks, for subscribing.
    pub fn hooks_mut(&mut self) -> &mut HealthHooks {
        self.agent.actor.health_mut().hooks_mut()
    }

    /// Logic tick: behavior state, then any running attack sequence.
    pub fn tick(&mut self, world: &mut (dyn CombatWorld + 'static), dt: f32) {
        if self.agent.removed {
            return;
        }
        self.machine.tick(&mut self.agent, world, dt);

        if !self.is_dying() {
            let agent = &mut self.agent;
            let target = agent.visible_target(world);
            agent
                .archetype
                .update(&mut agent.actor, &agent.config, target.as_ref(), world, dt);
        }
    }

    /// Physics tick: movement integration.
    pub fn fixed_tick(&mut self, dt: f32) {
        if self.agent.removed {
            return;
        }
        self.machine.fixed_tick(&mut self.agent, dt);
    }

    /// Restores health. Ignored when dead.
    pub fn heal(&mut self, amount: f32) -> Option<HealthChange> {
        self.agent.actor.heal(amount)
    }

    /// Sets health directly. A positive value after death does not leave
    /// the Death state.
    pub fn set_health(&mut self, value: f32) -> HealthChange {
        let change = self.agent.actor.set_health(value);
        if change.died {
            self.enter_death();
        }
        change
    }

    fn enter_death(&mut self) {
        self.machine.change_state(EnemyState::death(), &mut self.agent);
    }
}

impl Damageable for Enemy {
    fn actor(&self) -> &Actor {
        &self.agent.actor
    }

    fn take_damage(&mut self, packet: &DamagePacket) -> Option<HealthChange> {
        let change = self.agent.actor.take_damage(packet)?;
        if change.died {
            self.enter_death();
        }
        Some(change)
    }
}
