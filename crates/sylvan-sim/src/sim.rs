//! Scenario runner.
//!
//! Drives an [`Arena`] on two cadences: one logic tick per frame with a
//! jittered frame time, and as many fixed physics steps as the clock
//! accumulates. Combat events are drained once per frame into the log.

use serde::Serialize;
use sylvan_combat::{Boss, BossPhase, CombatEvent, Enemy, Player, PlayerError};
use sylvan_common::ConfigError;
use thiserror::Error;
use tracing::{debug, info};

use crate::arena::{Arena, ArenaStats};
use crate::config::ScenarioConfig;
use crate::pilot::Pilot;
use crate::timing::SimClock;

/// Errors building a simulation.
#[derive(Debug, Error)]
pub enum SimError {
    /// Invalid enemy or boss tunables
    #[error("invalid actor configuration: {0}")]
    Config(#[from] ConfigError),

    /// Invalid player tunables
    #[error("invalid player: {0}")]
    Player(#[from] PlayerError),
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Every hostile was removed
    Victory,
    /// The player died
    Defeat,
    /// The scenario duration ran out
    Timeout,
}

/// Event tallies for the summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EventCounts {
    /// Damage events
    pub damaged: u64,
    /// Total damage dealt
    pub damage_total: f32,
    /// Deaths
    pub deaths: u64,
    /// Removals
    pub removed: u64,
    /// Boss phase changes
    pub phase_changes: u64,
    /// Projectiles that expired without hitting
    pub projectiles_expired: u64,
}

impl EventCounts {
    fn record(&mut self, event: &CombatEvent) {
        match event {
            CombatEvent::ActorDamaged { actor, source, amount } => {
                debug!(%actor, %source, amount, "damaged");
                self.damaged += 1;
                self.damage_total += amount;
            }
            CombatEvent::ActorDied { actor } => {
                info!(%actor, "died");
                self.deaths += 1;
            }
            CombatEvent::ActorRemoved { actor } => {
                debug!(%actor, "removed");
                self.removed += 1;
            }
            CombatEvent::BossPhaseChanged { boss, phase } => {
                info!(%boss, ?phase, "boss phase");
                self.phase_changes += 1;
            }
            CombatEvent::BossEnraged { boss } => info!(%boss, "boss enraged"),
            CombatEvent::LootDropped { boss, position } => {
                info!(%boss, x = position.x, y = position.y, "loot dropped");
            }
            CombatEvent::ProjectileSpawned { owner } => debug!(%owner, "projectile spawned"),
            CombatEvent::ProjectileExpired { owner } => {
                debug!(%owner, "projectile expired");
                self.projectiles_expired += 1;
            }
        }
    }
}

/// End-of-run report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    /// How the run ended
    pub outcome: Outcome,
    /// Simulated seconds
    pub elapsed: f32,
    /// Logic frames run
    pub frames: u64,
    /// Physics steps run
    pub fixed_steps: u64,
    /// Average frame time in milliseconds
    pub average_frame_ms: f32,
    /// Player health at the end
    pub player_health: f32,
    /// Enemies left
    pub enemies_remaining: usize,
    /// Final boss phase, if a boss is still present
    pub boss_phase: Option<BossPhase>,
    /// Whether the boss was defeated
    pub boss_defeated: bool,
    /// Event tallies
    pub events: EventCounts,
    /// Arena counters
    pub arena: ArenaStats,
}

/// A scenario ready to run.
#[derive(Debug)]
pub struct Simulation {
    arena: Arena,
    clock: SimClock,
    rng: fastrand::Rng,
    duration: f32,
    frame_dt: f32,
    frame_jitter: f32,
    events: EventCounts,
}

impl Simulation {
    /// Builds the arena described by `scenario`.
    pub fn new(scenario: ScenarioConfig) -> Result<Self, SimError> {
        let player = Player::new(scenario.player, scenario.player_spawn)?;
        let mut arena = Arena::new(player, Pilot::new(scenario.pilot), scenario.event_capacity);

        for spawn in scenario.enemies {
            arena.add_enemy(Enemy::new(spawn.config, spawn.position)?);
        }
        if let Some(spawn) = scenario.boss {
            arena.set_boss(Boss::new(spawn.config, spawn.position)?);
        }

        let rng = scenario.seed.map_or_else(fastrand::Rng::new, fastrand::Rng::with_seed);
        info!(
            enemies = arena.enemy_count(),
            boss = arena.boss().is_some(),
            "scenario ready"
        );

        Ok(Self {
            arena,
            clock: SimClock::new(scenario.fixed_dt),
            rng,
            duration: scenario.duration,
            frame_dt: scenario.frame_dt,
            frame_jitter: scenario.frame_jitter,
            events: EventCounts::default(),
        })
    }

    /// The arena.
    #[must_use]
    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    fn next_frame_dt(&mut self) -> f32 {
        let jitter = (self.rng.f32() * 2.0 - 1.0) * self.frame_jitter;
        self.frame_dt * (1.0 + jitter)
    }

    /// Runs one frame: a logic tick, the fixed steps, then the event drain.
    pub fn step(&mut self) {
        let dt = self.next_frame_dt();
        let dt = self.clock.begin_frame(dt);

        self.arena.tick(dt);
        for _ in 0..self.clock.accumulate(dt) {
            self.arena.fixed_tick(self.clock.fixed_dt());
        }

        for event in self.arena.drain_events() {
            self.events.record(&event);
        }
    }

    /// Returns the outcome once the run is over.
    #[must_use]
    pub fn outcome(&self) -> Option<Outcome> {
        if self.arena.player().map_or(true, |p| !p.actor().is_alive()) {
            Some(Outcome::Defeat)
        } else if self.arena.is_cleared() {
            Some(Outcome::Victory)
        } else if self.clock.elapsed() >= self.duration {
            Some(Outcome::Timeout)
        } else {
            None
        }
    }

    /// Runs until an outcome is reached.
    pub fn run(&mut self) -> Summary {
        let outcome = loop {
            if let Some(outcome) = self.outcome() {
                break outcome;
            }
            self.step();
        };
        info!(?outcome, elapsed = self.clock.elapsed(), "run finished");
        self.summary(outcome)
    }

    fn summary(&self, outcome: Outcome) -> Summary {
        Summary {
            outcome,
            elapsed: self.clock.elapsed(),
            frames: self.clock.frames(),
            fixed_steps: self.clock.fixed_steps(),
            average_frame_ms: self.clock.average_frame_time_ms(),
            player_health: self
                .arena
                .player()
                .map_or(0.0, |p| p.actor().health().current()),
            enemies_remaining: self.arena.enemy_count(),
            boss_phase: self.arena.boss().map(Boss::phase),
            boss_defeated: self.arena.boss_defeated(),
            events: self.events.clone(),
            arena: self.arena.stats().clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EnemySpawn;
    use glam::Vec2;
    use sylvan_combat::{EnemyConfig, PlayerConfig};

    fn quiet_scenario() -> ScenarioConfig {
        ScenarioConfig {
            seed: Some(1),
            duration: 5.0,
            enemies: Vec::new(),
            boss: None,
            ..ScenarioConfig::default()
        }
    }

    #[test]
    fn test_empty_arena_is_an_immediate_victory() {
        let mut sim = Simulation::new(quiet_scenario()).expect("scenario");
        let summary = sim.run();
        assert_eq!(summary.outcome, Outcome::Victory);
        assert_eq!(summary.frames, 0);
    }

    #[test]
    fn test_idle_enemy_out_of_sight_times_out() {
        let scenario = ScenarioConfig {
            enemies: vec![EnemySpawn {
                position: Vec2::new(200.0, 0.0),
                config: EnemyConfig::default().with_seed(3),
            }],
            ..quiet_scenario()
        };
        let mut sim = Simulation::new(scenario).expect("scenario");
        let summary = sim.run();

        assert_eq!(summary.outcome, Outcome::Timeout);
        assert!(summary.elapsed >= 5.0);
        assert!(summary.fixed_steps > 0);
        assert_eq!(summary.enemies_remaining, 1);
    }

    #[test]
    fn test_player_clears_a_single_enemy() {
        let scenario = ScenarioConfig {
            duration: 60.0,
            player_spawn: Vec2::ZERO,
            enemies: vec![EnemySpawn {
                position: Vec2::new(3.0, 0.0),
                config: EnemyConfig {
                    max_health: 30.0,
                    attack_damage: 1.0,
                    ..EnemyConfig::default().with_seed(5)
                },
            }],
            ..quiet_scenario()
        };
        let mut sim = Simulation::new(scenario).expect("scenario");
        let summary = sim.run();

        assert_eq!(summary.outcome, Outcome::Victory);
        assert_eq!(summary.events.deaths, 1);
        assert_eq!(summary.events.removed, 1);
        assert!(summary.events.damage_total >= 30.0);
    }

    #[test]
    fn test_invalid_player_is_rejected() {
        let scenario = ScenarioConfig {
            player: PlayerConfig {
                max_health: 0.0,
                ..PlayerConfig::default()
            },
            ..quiet_scenario()
        };
        assert!(matches!(Simulation::new(scenario), Err(SimError::Player(_))));
    }
}
