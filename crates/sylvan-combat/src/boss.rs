//! Boss encounter controller.
//!
//! The encounter phase only moves forward:
//! Inactive → Intro → Phase1 → Phase2 → Death, with Death reachable from any
//! phase and terminal. Phase 2 and enrage are driven purely by the actor's
//! health fraction. Enrage is an orthogonal one-way flag.
//!
//! The boss is invulnerable until its encounter starts.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use sylvan_common::{direction_to, ActorId, ConfigError, LayerMask};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::actor::{Actor, ActorSnapshot};
use crate::config::{AttackProfile, BossConfig};
use crate::damage::DamagePacket;
use crate::events::Notifier;
use crate::health::{HealthChange, HealthHooks};
use crate::sequencer::Cooldown;
use crate::state_machine::{BehaviorState, StateMachine, Transition};
use crate::world::{strike_circle, CombatWorld, Damageable, Knockback};

/// Stage of a boss encounter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BossPhase {
    /// Waiting for the arena trigger
    #[default]
    Inactive,
    /// Intro sequence
    Intro,
    /// First combat phase
    Phase1,
    /// Second combat phase
    Phase2,
    /// Defeated
    Death,
}

impl BossPhase {
    const fn ordinal(self) -> u8 {
        match self {
            Self::Inactive => 0,
            Self::Intro => 1,
            Self::Phase1 => 2,
            Self::Phase2 => 3,
            Self::Death => 4,
        }
    }

    /// Returns whether `next` is the single forward step from this phase, or
    /// Death from any phase other than Death.
    #[must_use]
    pub const fn can_advance_to(self, next: Self) -> bool {
        match (self, next) {
            (Self::Death, _) => false,
            (_, Self::Death) => true,
            _ => next.ordinal() == self.ordinal() + 1,
        }
    }

    /// Returns whether the boss is fighting (Intro, Phase1, Phase2).
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Intro | Self::Phase1 | Self::Phase2)
    }
}

/// Reasons an encounter could not start.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncounterError {
    /// Encounter already running
    #[error("encounter already started (phase {0:?})")]
    AlreadyStarted(BossPhase),

    /// Boss already defeated
    #[error("boss already defeated")]
    Defeated,
}

/// Encounter-level notification hooks.
#[derive(Debug, Default)]
pub struct EncounterHooks {
    /// Raised when the encounter starts
    pub boss_start: Notifier<()>,
    /// Raised with the new phase on every phase change
    pub phase_changed: Notifier<BossPhase>,
    /// Raised once when phase 2 starts
    pub phase2_start: Notifier<()>,
    /// Raised once when the boss enrages
    pub enrage: Notifier<()>,
    /// Raised once when the boss is defeated
    pub boss_defeated: Notifier<()>,
    /// Raised once with the drop position after defeat
    pub loot_drop: Notifier<Vec2>,
}

impl EncounterHooks {
    /// Closes every hook.
    pub fn close_all(&mut self) {
        self.boss_start.close();
        self.phase_changed.close();
        self.phase2_start.close();
        self.enrage.close();
        self.boss_defeated.close();
        self.loot_drop.close();
    }
}

/// Phase tracking and enrage flag of one encounter.
#[derive(Debug)]
pub struct BossEncounter {
    phase: BossPhase,
    is_enraged: bool,
    phase2_threshold: f32,
    enrage_threshold: f32,
    hooks: EncounterHooks,
}

impl BossEncounter {
    /// Creates an inactive encounter.
    #[must_use]
    pub fn new(phase2_threshold: f32, enrage_threshold: f32) -> Self {
        Self {
            phase: BossPhase::Inactive,
            is_enraged: false,
            phase2_threshold,
            enrage_threshold,
            hooks: EncounterHooks::default(),
        }
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> BossPhase {
        self.phase
    }

    /// Returns whether the boss is enraged.
    #[must_use]
    pub const fn is_enraged(&self) -> bool {
        self.is_enraged
    }

    /// Health fraction that starts phase 2.
    #[must_use]
    pub const fn phase2_threshold(&self) -> f32 {
        self.phase2_threshold
    }

    /// Health fraction that enrages the boss.
    #[must_use]
    pub const fn enrage_threshold(&self) -> f32 {
        self.enrage_threshold
    }

    /// Notification hooks.
    pub fn hooks_mut(&mut self) -> &mut EncounterHooks {
        &mut self.hooks
    }

    /// Returns whether a health fraction calls for phase 2 now.
    #[must_use]
    pub fn wants_phase2(&self, health_percent: f32) -> bool {
        self.phase == BossPhase::Phase1 && health_percent <= self.phase2_threshold
    }

    /// Sets the enrage flag the first time `health_percent` reaches the
    /// threshold. Returns whether this call enraged the boss.
    pub fn observe_enrage(&mut self, health_percent: f32) -> bool {
        if self.is_enraged || health_percent > self.enrage_threshold {
            return false;
        }
        self.is_enraged = true;
        self.hooks.enrage.notify(&());
        true
    }

    /// Moves to `next` if the step is allowed.
    fn advance_to(&mut self, next: BossPhase) -> bool {
        if !self.phase.can_advance_to(next) {
            warn!(from = ?self.phase, to = ?next, "boss phase change refused");
            return false;
        }
        self.phase = next;
        self.hooks.phase_changed.notify(&next);
        true
    }
}

/// Per-boss data the phase states act on.
#[derive(Debug)]
pub struct BossAgent {
    actor: Actor,
    config: BossConfig,
    encounter: BossEncounter,
    target: Option<ActorId>,
    move_speed: f32,
    damage_multiplier: f32,
    removed: bool,
}

impl BossAgent {
    fn target_snapshot(&self, world: &dyn CombatWorld) -> Option<ActorSnapshot> {
        self.target
            .and_then(|id| world.snapshot(id))
            .filter(|t| t.alive)
    }

    fn strike(&mut self, profile: &AttackProfile, world: &mut dyn CombatWorld) -> Vec<ActorId> {
        let origin = self.actor.position();
        strike_circle(
            world,
            self.actor.id(),
            origin,
            profile.range,
            self.config.target_mask,
            &profile.strike(self.damage_multiplier),
            Knockback::AwayFrom(origin),
        )
    }

    /// Shared pursue-and-melee step of both combat phases.
    fn pursue_and_melee(
        &mut self,
        target: &ActorSnapshot,
        melee: &AttackProfile,
        cooldown: &mut Cooldown,
        pursue_beyond: f32,
        world: &mut dyn CombatWorld,
    ) {
        let distance = self.actor.distance_to(target.position);
        if distance > pursue_beyond {
            self.actor.move_towards(target.position, self.move_speed);
        } else if distance <= melee.range && cooldown.is_ready() {
            self.actor.face_target(target.position);
            let hits = self.strike(melee, world);
            debug!(boss = %self.actor.id(), hits = hits.len(), "boss melee");
            cooldown.trigger();
        } else if distance > melee.range {
            self.actor.move_towards(target.position, self.move_speed);
        } else {
            self.actor.stop();
            self.actor.face_target(target.position);
        }
    }

    fn confine(&mut self) {
        let confined = confine_to_circle(
            self.actor.position(),
            self.config.arena_center,
            self.config.arena_radius,
        );
        self.actor.set_position(confined);
    }
}

/// Clamps `point` into the circle at `center`.
#[must_use]
pub fn confine_to_circle(point: Vec2, center: Vec2, radius: f32) -> Vec2 {
    if point.distance(center) <= radius {
        point
    } else {
        center + direction_to(center, point) * radius
    }
}

/// Behavior states of a boss, one per active phase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BossState {
    /// Intro sequence
    Intro {
        /// Seconds since the encounter started
        elapsed: f32,
    },
    /// Melee phase
    Phase1 {
        /// Melee cooldown, running from phase entry
        attack: Cooldown,
    },
    /// Faster melee plus ground slam
    Phase2 {
        /// Melee cooldown, running from phase entry
        attack: Cooldown,
        /// Slam cooldown, running from phase entry
        slam: Cooldown,
    },
    /// Defeated, waiting for loot and removal
    Death {
        /// Seconds since defeat
        elapsed: f32,
        /// Whether the loot hook has fired
        loot_dropped: bool,
    },
}

impl BossState {
    fn intro() -> Self {
        Self::Intro { elapsed: 0.0 }
    }

    fn phase1(config: &BossConfig) -> Self {
        Self::Phase1 {
            attack: Cooldown::new(config.phase1_melee.cooldown),
        }
    }

    fn phase2(config: &BossConfig) -> Self {
        Self::Phase2 {
            attack: Cooldown::new(config.phase2_melee.cooldown),
            slam: Cooldown::new(config.ground_slam.cooldown),
        }
    }

    fn death() -> Self {
        Self::Death {
            elapsed: 0.0,
            loot_dropped: false,
        }
    }

    /// Encounter phase this state represents.
    #[must_use]
    pub const fn phase(&self) -> BossPhase {
        match self {
            Self::Intro { .. } => BossPhase::Intro,
            Self::Phase1 { .. } => BossPhase::Phase1,
            Self::Phase2 { .. } => BossPhase::Phase2,
            Self::Death { .. } => BossPhase::Death,
        }
    }
}

impl BehaviorState for BossState {
    type Owner = BossAgent;
    type World = dyn CombatWorld;

    fn name(&self) -> &'static str {
        match self {
            Self::Intro { .. } => "intro",
            Self::Phase1 { .. } => "phase1",
            Self::Phase2 { .. } => "phase2",
            Self::Death { .. } => "death",
        }
    }

    fn enter(&mut self, boss: &mut BossAgent) {
        boss.encounter.advance_to(self.phase());
        let name = boss.config.name.as_str();

        match self {
            Self::Intro { elapsed } => {
                *elapsed = 0.0;
                boss.actor.stop();
                info!(boss = name, "encounter started");
                boss.encounter.hooks.boss_start.notify(&());
            }
            Self::Phase1 { attack } => {
                boss.move_speed = boss.config.phase1_move_speed;
                attack.trigger();
                info!(boss = name, "phase 1");
            }
            Self::Phase2 { attack, slam } => {
                boss.move_speed = boss.config.phase2_move_speed;
                attack.trigger();
                slam.trigger();
                info!(boss = name, "phase 2");
                boss.encounter.hooks.phase2_start.notify(&());
            }
            Self::Death {
                elapsed,
                loot_dropped,
            } => {
                *elapsed = 0.0;
                *loot_dropped = false;
                boss.actor.stop();
                boss.actor.disable_collision();
                info!(boss = name, "boss defeated");
                boss.encounter.hooks.boss_defeated.notify(&());
            }
        }
    }

    fn execute(&mut self, boss: &mut BossAgent, world: &mut Self::World, dt: f32) -> Transition<Self> {
        if let Self::Death {
            elapsed,
            loot_dropped,
        } = self
        {
            *elapsed += dt;
            if !*loot_dropped && *elapsed >= boss.config.loot_delay {
                *loot_dropped = true;
                let position = boss.actor.position();
                debug!(boss = %boss.actor.id(), "loot dropped");
                boss.encounter.hooks.loot_drop.notify(&position);
            }
            if *elapsed >= boss.config.removal_delay && !boss.removed {
                boss.removed = true;
                boss.actor.health_mut().hooks_mut().close_all();
                boss.encounter.hooks.close_all();
                debug!(boss = %boss.actor.id(), "boss removed");
            }
            return Transition::Stay;
        }

        let target = boss.target_snapshot(&*world);

        match self {
            Self::Intro { elapsed } => {
                if let Some(target) = &target {
                    boss.actor.face_target(target.position);
                }
                *elapsed += dt;
                if *elapsed >= boss.config.intro_duration {
                    return Transition::To(Self::phase1(&boss.config));
                }
            }
            Self::Phase1 { attack } => {
                attack.tick(dt);
                let Some(target) = target else {
                    boss.actor.stop();
                    return Transition::Stay;
                };
                let melee = boss.config.phase1_melee;
                let pursue_beyond = boss.config.charge_distance;
                boss.pursue_and_melee(&target, &melee, attack, pursue_beyond, world);
            }
            Self::Phase2 { attack, slam } => {
                attack.tick(dt);
                slam.tick(dt);
                let Some(target) = target else {
                    boss.actor.stop();
                    return Transition::Stay;
                };

                let slam_profile = boss.config.ground_slam;
                if slam.is_ready() && boss.actor.distance_to(target.position) <= slam_profile.range {
                    boss.actor.stop();
                    let hits = boss.strike(&slam_profile, world);
                    info!(boss = %boss.config.name, hits = hits.len(), "ground slam");
                    slam.trigger();
                    return Transition::Stay;
                }

                let melee = boss.config.phase2_melee;
                boss.pursue_and_melee(&target, &melee, attack, melee.range, world);
            }
            Self::Death { .. } => {}
        }
        Transition::Stay
    }

    fn fixed_execute(&mut self, boss: &mut BossAgent, dt: f32) {
        if matches!(self, Self::Death { .. }) {
            return;
        }
        boss.actor.integrate(dt);
        boss.confine();
    }

    fn exit(&mut self, boss: &mut BossAgent) {
        boss.actor.stop();
    }

    fn is_terminal(&self) -> bool {
        matches!(self, Self::Death { .. })
    }
}

/// A boss: actor, encounter, and phase machine.
#[derive(Debug)]
pub struct Boss {
    agent: BossAgent,
    machine: StateMachine<BossState>,
}

impl Boss {
    /// Spawns an inactive, invulnerable boss.
    pub fn new(config: BossConfig, position: Vec2) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut actor = Actor::new(LayerMask::BOSS, position, config.max_health);
        actor.body_mut().mass = config.mass;
        actor.set_invulnerable(true);

        let agent = BossAgent {
            actor,
            encounter: BossEncounter::new(config.phase2_threshold, config.enrage_threshold),
            move_speed: config.move_speed,
            config,
            target: None,
            damage_multiplier: 1.0,
            removed: false,
        };
        Ok(Self {
            agent,
            machine: StateMachine::new(),
        })
    }

    /// Sets the actor to fight.
    #[must_use]
    pub fn with_target(mut self, target: ActorId) -> Self {
        self.agent.target = Some(target);
        self
    }

    /// Changes or clears the target.
    pub fn set_target(&mut self, target: Option<ActorId>) {
        self.agent.target = target;
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
    pub const fn config(&self) -> &BossConfig {
        &self.agent.config
    }

    /// Encounter state.
    #[must_use]
    pub const fn encounter(&self) -> &BossEncounter {
        &self.agent.encounter
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> BossPhase {
        self.agent.encounter.phase()
    }

    /// Returns whether the boss is enraged.
    #[must_use]
    pub const fn is_enraged(&self) -> bool {
        self.agent.encounter.is_enraged()
    }

    /// Multiplier applied to every boss attack.
    #[must_use]
    pub const fn damage_multiplier(&self) -> f32 {
        self.agent.damage_multiplier
    }

    /// Current move speed.
    #[must_use]
    pub const fn move_speed(&self) -> f32 {
        self.agent.move_speed
    }

    /// Name of the current phase state.
    #[must_use]
    pub fn state_name(&self) -> &'static str {
        self.machine.current_name().unwrap_or("inactive")
    }

    /// Returns whether the post-defeat delay has elapsed.
    #[must_use]
    pub const fn is_removed(&self) -> bool {
        self.agent.removed
    }

    /// Health notification hooks.
    pub fn hooks_mut(&mut self) -> &mut HealthHooks {
        self.agent.actor.health_mut().hooks_mut()
    }

    /// Encounter notification hooks.
    pub fn encounter_hooks_mut(&mut self) -> &mut EncounterHooks {
        self.agent.encounter.hooks_mut()
    }

    /// Starts the encounter: Inactive → Intro. Makes the boss vulnerable.
    pub fn start_encounter(&mut self) -> Result<(), EncounterError> {
        match self.phase() {
            BossPhase::Inactive => {}
            BossPhase::Death => return Err(EncounterError::Defeated),
            phase => return Err(EncounterError::AlreadyStarted(phase)),
        }
        self.agent.actor.set_invulnerable(false);
        self.machine.initialize(BossState::intro(), &mut self.agent);
        Ok(())
    }

    /// Logic tick.
    pub fn tick(&mut self, world: &mut (dyn CombatWorld + 'static), dt: f32) {
        if self.agent.removed || !self.machine.is_initialized() {
            return;
        }
        self.machine.tick(&mut self.agent, world, dt);
        self.evaluate_health();
    }

    /// Physics tick.
    pub fn fixed_tick(&mut self, dt: f32) {
        if self.agent.removed {
            return;
        }
        self.machine.fixed_tick(&mut self.agent, dt);
    }

    /// Restores health. Ignored when dead; never reverts enrage or phase.
    pub fn heal(&mut self, amount: f32) -> Option<HealthChange> {
        self.agent.actor.heal(amount)
    }

    /// Sets health directly.
    pub fn set_health(&mut self, value: f32) -> HealthChange {
        let change = self.agent.actor.set_health(value);
        self.after_health_change(change);
        change
    }

    /// Thresholds run before death so a lethal hit still crosses them.
    fn after_health_change(&mut self, change: HealthChange) {
        self.evaluate_health();
        if change.died {
            self.enter_death();
        }
    }

    /// Applies phase 2 and enrage if the health fraction calls for them.
    fn evaluate_health(&mut self) {
        if self.phase() == BossPhase::Death {
            return;
        }
        let percent = self.agent.actor.health().percent();

        if self.agent.encounter.wants_phase2(percent) {
            let next = BossState::phase2(&self.agent.config);
            self.machine.change_state(next, &mut self.agent);
        }
        if self.agent.encounter.observe_enrage(percent) {
            self.agent.damage_multiplier = self.agent.config.enrage_damage_multiplier;
            info!(boss = %self.agent.config.name, "enraged");
        }
    }

    fn enter_death(&mut self) {
        if self.machine.is_initialized() {
            self.machine.change_state(BossState::death(), &mut self.agent);
        } else {
            self.machine.initialize(BossState::death(), &mut self.agent);
        }
    }
}

impl Damageable for Boss {
    fn actor(&self) -> &Actor {
        &self.agent.actor
    }

    fn take_damage(&mut self, packet: &DamagePacket) -> Option<HealthChange> {
        let change = self.agent.actor.take_damage(packet)?;
        self.after_health_change(change);
        Some(change)
    }
}

/// Lock state of a boss arena.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ArenaState {
    /// Waiting for the player to enter
    Waiting,
    /// Encounter running; the arena is closed
    Locked,
    /// Boss defeated; opening after a delay
    Unlocking {
        /// Seconds until open
        remaining: f32,
    },
    /// Open again
    Open,
}

/// Trigger area that starts a boss encounter and locks the fight in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BossArena {
    center: Vec2,
    radius: f32,
    unlock_delay: f32,
    lock_player: bool,
    state: ArenaState,
}

impl BossArena {
    /// Creates an arena from the boss's tunables.
    #[must_use]
    pub const fn from_config(config: &BossConfig) -> Self {
        Self {
            center: config.arena_center,
            radius: config.arena_radius,
            unlock_delay: config.arena_unlock_delay,
            lock_player: config.lock_player_in_arena,
            state: ArenaState::Waiting,
        }
    }

    /// Current lock state.
    #[must_use]
    pub const fn state(&self) -> ArenaState {
        self.state
    }

    /// Returns whether the player is held inside.
    #[must_use]
    pub const fn is_locked(&self) -> bool {
        matches!(self.state, ArenaState::Locked | ArenaState::Unlocking { .. })
    }

    /// Returns whether `point` lies inside the arena.
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        point.distance(self.center) <= self.radius
    }

    /// Clamps the player into the arena while it is locked.
    #[must_use]
    pub fn confine_player(&self, position: Vec2) -> Vec2 {
        if self.lock_player && self.is_locked() {
            confine_to_circle(position, self.center, self.radius)
        } else {
            position
        }
    }

    /// Advances the arena. Returns the new state when it changed.
    pub fn update(&mut self, boss: &mut Boss, player: Option<Vec2>, dt: f32) -> Option<ArenaState> {
        let next = match self.state {
            ArenaState::Waiting => {
                if !player.is_some_and(|p| self.contains(p)) {
                    return None;
                }
                if let Err(err) = boss.start_encounter() {
                    warn!(%err, "arena trigger could not start encounter");
                }
                ArenaState::Locked
            }
            ArenaState::Locked => {
                if boss.phase() != BossPhase::Death {
                    return None;
                }
                ArenaState::Unlocking {
                    remaining: self.unlock_delay,
                }
            }
            ArenaState::Unlocking { remaining } => {
                let remaining = remaining - dt;
                if remaining > 0.0 {
                    self.state = ArenaState::Unlocking { remaining };
                    return None;
                }
                info!("arena unlocked");
                ArenaState::Open
            }
            ArenaState::Open => return None,
        };
        self.state = next;
        Some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::testing::MockWorld;
    use std::cell::RefCell;
    use std::rc::Rc;

    const DT: f32 = 0.1;

    fn counter<E: 'static>(notifier: &mut Notifier<E>) -> Rc<RefCell<u32>> {
        let count = Rc::new(RefCell::new(0));
        let c = Rc::clone(&count);
        notifier.subscribe(move |_| *c.borrow_mut() += 1);
        count
    }

    fn hit(amount: f32) -> DamagePacket {
        DamagePacket::new(amount, ActorId::NULL, Vec2::ZERO)
    }

    fn spawn(config: BossConfig, player_at: Vec2) -> (MockWorld, ActorId, Boss) {
        let mut world = MockWorld::new();
        let player = world.spawn(LayerMask::PLAYER, player_at, 1000.0);
        let boss = Boss::new(config, Vec2::ZERO).unwrap().with_target(player);
        (world, player, boss)
    }

    fn boss_with_player(player_at: Vec2) -> (MockWorld, ActorId, Boss) {
        let config = BossConfig {
            max_health: 100.0,
            ..BossConfig::default()
        };
        spawn(config, player_at)
    }

    fn run(boss: &mut Boss, world: &mut MockWorld, ticks: usize) {
        for _ in 0..ticks {
            boss.tick(world, DT);
        }
    }

    /// Starts the encounter and ticks until phase 1 has just been entered.
    fn start_phase1(boss: &mut Boss, world: &mut MockWorld) {
        boss.start_encounter().unwrap();
        for _ in 0..40 {
            boss.tick(world, DT);
            if boss.phase() == BossPhase::Phase1 {
                return;
            }
        }
        panic!("intro never ended");
    }

    #[test]
    fn test_phase_guard() {
        assert!(BossPhase::Inactive.can_advance_to(BossPhase::Intro));
        assert!(BossPhase::Phase1.can_advance_to(BossPhase::Phase2));
        assert!(BossPhase::Intro.can_advance_to(BossPhase::Death));
        assert!(!BossPhase::Intro.can_advance_to(BossPhase::Phase2));
        assert!(!BossPhase::Phase2.can_advance_to(BossPhase::Phase1));
        assert!(!BossPhase::Death.can_advance_to(BossPhase::Death));
    }

    #[test]
    fn test_inactive_boss_is_invulnerable() {
        let (_, _, mut boss) = boss_with_player(Vec2::new(3.0, 0.0));
        assert!(boss.take_damage(&hit(50.0)).is_none());
        assert_eq!(boss.phase(), BossPhase::Inactive);
        assert_eq!(boss.state_name(), "inactive");
    }

    #[test]
    fn test_start_encounter_runs_intro_then_phase1() {
        let (mut world, _, mut boss) = boss_with_player(Vec2::new(3.0, 0.0));
        let starts = counter(&mut boss.encounter_hooks_mut().boss_start);
        let changes = counter(&mut boss.encounter_hooks_mut().phase_changed);

        boss.start_encounter().unwrap();
        assert_eq!(boss.phase(), BossPhase::Intro);
        assert_eq!(*starts.borrow(), 1);
        assert_eq!(
            boss.start_encounter(),
            Err(EncounterError::AlreadyStarted(BossPhase::Intro))
        );

        run(&mut boss, &mut world, 25);
        assert_eq!(boss.phase(), BossPhase::Intro);
        run(&mut boss, &mut world, 6);
        assert_eq!(boss.phase(), BossPhase::Phase1);
        assert_eq!(boss.move_speed(), 4.0);
        assert_eq!(*starts.borrow(), 1);
        assert_eq!(*changes.borrow(), 2);
    }

    #[test]
    fn test_phase2_enters_exactly_once_on_crossing() {
        let (mut world, _, mut boss) = boss_with_player(Vec2::new(30.0, 0.0));
        let phase2 = counter(&mut boss.encounter_hooks_mut().phase2_start);
        start_phase1(&mut boss, &mut world);

        boss.set_health(51.0);
        assert_eq!(boss.phase(), BossPhase::Phase1);

        boss.take_damage(&hit(2.0));
        assert_eq!(boss.phase(), BossPhase::Phase2);
        assert_eq!(boss.move_speed(), 5.0);

        boss.take_damage(&hit(5.0));
        boss.heal(40.0);
        run(&mut boss, &mut world, 10);
        assert_eq!(boss.phase(), BossPhase::Phase2);
        assert_eq!(*phase2.borrow(), 1);
    }

    #[test]
    fn test_enrage_is_monotone() {
        let (mut world, _, mut boss) = boss_with_player(Vec2::new(30.0, 0.0));
        let enrages = counter(&mut boss.encounter_hooks_mut().enrage);
        start_phase1(&mut boss, &mut world);

        boss.set_health(30.0);
        assert!(!boss.is_enraged());
        boss.set_health(20.0);
        assert!(boss.is_enraged());
        assert_eq!(boss.damage_multiplier(), 1.2);
        boss.set_health(35.0);
        assert!(boss.is_enraged());
        boss.set_health(10.0);
        assert_eq!(*enrages.borrow(), 1);
    }

    #[test]
    fn test_phase1_melee_counts_from_entry_and_scales_when_enraged() {
        let config = BossConfig {
            max_health: 100.0,
            phase2_threshold: 0.2,
            enrage_threshold: 0.3,
            ..BossConfig::default()
        };
        let (mut world, player, mut boss) = spawn(config, Vec2::new(1.5, 0.0));
        start_phase1(&mut boss, &mut world);

        run(&mut boss, &mut world, 15);
        assert_eq!(world.hits_on(player), 0);
        run(&mut boss, &mut world, 7);
        assert_eq!(world.hits_on(player), 1);
        assert_eq!(world.damage_log[0].1.amount, 20.0);
        assert_eq!(world.damage_log[0].1.knockback_force, 5.0);

        boss.set_health(25.0);
        assert!(boss.is_enraged());
        assert_eq!(boss.phase(), BossPhase::Phase1);
        run(&mut boss, &mut world, 22);
        assert_eq!(world.hits_on(player), 2);
        let (_, packet) = world.damage_log[1];
        assert!((packet.amount - 24.0).abs() < 1e-4);
    }

    #[test]
    fn test_slam_has_priority_in_phase2() {
        let (mut world, player, mut boss) = boss_with_player(Vec2::new(3.0, 0.0));
        start_phase1(&mut boss, &mut world);
        boss.set_health(40.0);
        assert_eq!(boss.phase(), BossPhase::Phase2);

        run(&mut boss, &mut world, 45);
        assert_eq!(world.hits_on(player), 0);
        run(&mut boss, &mut world, 7);
        assert_eq!(world.hits_on(player), 1);
        let (_, packet) = world.damage_log[0];
        assert_eq!(packet.amount, 40.0);
        assert_eq!(packet.knockback_force, 10.0);
    }

    #[test]
    fn test_death_drops_loot_then_removes() {
        let (mut world, _, mut boss) = boss_with_player(Vec2::new(30.0, 0.0));
        let defeated = counter(&mut boss.encounter_hooks_mut().boss_defeated);
        let loot = Rc::new(RefCell::new(Vec::new()));
        let l = Rc::clone(&loot);
        boss.encounter_hooks_mut()
            .loot_drop
            .subscribe(move |pos| l.borrow_mut().push(*pos));
        start_phase1(&mut boss, &mut world);

        boss.take_damage(&hit(500.0));
        assert_eq!(boss.phase(), BossPhase::Death);
        assert_eq!(*defeated.borrow(), 1);
        assert!(!boss.actor().collision_enabled());

        run(&mut boss, &mut world, 3);
        assert!(loot.borrow().is_empty());
        run(&mut boss, &mut world, 3);
        assert_eq!(loot.borrow().len(), 1);

        boss.set_health(50.0);
        assert_eq!(boss.phase(), BossPhase::Death);

        run(&mut boss, &mut world, 15);
        assert!(boss.is_removed());
        assert_eq!(boss.start_encounter(), Err(EncounterError::Defeated));
        assert_eq!(*defeated.borrow(), 1);
        assert_eq!(loot.borrow().len(), 1);
    }

    #[test]
    fn test_lethal_hit_in_phase1_crosses_thresholds_then_dies() {
        let (mut world, _, mut boss) = boss_with_player(Vec2::new(30.0, 0.0));
        let phase2 = counter(&mut boss.encounter_hooks_mut().phase2_start);
        let enrages = counter(&mut boss.encounter_hooks_mut().enrage);
        let defeated = counter(&mut boss.encounter_hooks_mut().boss_defeated);
        start_phase1(&mut boss, &mut world);

        boss.take_damage(&hit(1000.0));
        assert_eq!(boss.phase(), BossPhase::Death);
        assert!(boss.is_enraged());
        assert_eq!(*phase2.borrow(), 1);
        assert_eq!(*enrages.borrow(), 1);
        assert_eq!(*defeated.borrow(), 1);

        run(&mut boss, &mut world, 5);
        assert_eq!(boss.phase(), BossPhase::Death);
        assert_eq!(*phase2.borrow(), 1);
    }

    #[test]
    fn test_stops_without_alive_target() {
        let (mut world, player, mut boss) = boss_with_player(Vec2::new(6.0, 0.0));
        start_phase1(&mut boss, &mut world);
        boss.tick(&mut world, DT);
        assert_ne!(boss.actor().velocity(), Vec2::ZERO);

        world.actor_mut(player).set_health(0.0);
        boss.tick(&mut world, DT);
        assert_eq!(boss.actor().velocity(), Vec2::ZERO);
    }

    #[test]
    fn test_boss_stays_inside_arena() {
        let (mut world, _, mut boss) = boss_with_player(Vec2::new(30.0, 0.0));
        start_phase1(&mut boss, &mut world);
        for _ in 0..200 {
            boss.tick(&mut world, DT);
            boss.fixed_tick(DT);
        }
        assert!(boss.actor().position().length() <= 15.0 + 1e-3);
    }

    #[test]
    fn test_arena_locks_and_unlocks() {
        let (_, _, mut boss) = boss_with_player(Vec2::new(30.0, 0.0));
        let mut arena = BossArena::from_config(boss.config());

        assert_eq!(arena.update(&mut boss, Some(Vec2::new(20.0, 0.0)), DT), None);
        assert_eq!(
            arena.update(&mut boss, Some(Vec2::new(10.0, 0.0)), DT),
            Some(ArenaState::Locked)
        );
        assert_eq!(boss.phase(), BossPhase::Intro);
        assert_eq!(arena.confine_player(Vec2::new(20.0, 0.0)), Vec2::new(15.0, 0.0));

        boss.take_damage(&hit(1000.0));
        assert!(matches!(
            arena.update(&mut boss, None, DT),
            Some(ArenaState::Unlocking { .. })
        ));
        for _ in 0..29 {
            arena.update(&mut boss, None, DT);
        }
        assert!(arena.is_locked());
        arena.update(&mut boss, None, 0.2);
        assert_eq!(arena.state(), ArenaState::Open);
        assert_eq!(arena.confine_player(Vec2::new(20.0, 0.0)), Vec2::new(20.0, 0.0));
    }
}
