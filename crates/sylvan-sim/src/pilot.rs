//! Scripted player input.
//!
//! The pilot stands in for a human: it picks the nearest living hostile,
//! walks into melee range, swings whenever the swing is ready and works
//! through its ability slots on a fixed rhythm. It heals when low.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use sylvan_combat::{AbilityKind, ActorSnapshot, Player};
use sylvan_common::ConfigError;

/// Pilot tunables.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PilotConfig {
    /// Seconds between offensive ability attempts
    pub ability_interval: f32,
    /// Health fraction below which the pilot tries to heal
    pub heal_below: f32,
    /// Hostiles farther than this are ignored
    pub sight_range: f32,
}

impl Default for PilotConfig {
    fn default() -> Self {
        Self {
            ability_interval: 2.0,
            heal_below: 0.5,
            sight_range: 40.0,
        }
    }
}

impl PilotConfig {
    /// Validates every field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::check_magnitude("pilot.ability_interval", self.ability_interval)?;
        ConfigError::check_threshold("pilot.heal_below", self.heal_below)?;
        ConfigError::check_magnitude("pilot.sight_range", self.sight_range)
    }
}

/// One frame of player input.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PilotCommand {
    /// Movement direction, zero to stand still
    pub movement: Vec2,
    /// Aim direction, zero to keep the current aim
    pub aim: Vec2,
    /// Swing the melee attack
    pub attack: bool,
    /// Ability slot to use
    pub ability: Option<usize>,
}

/// Scripted player controller.
#[derive(Debug, Clone)]
pub struct Pilot {
    config: PilotConfig,
    ability_timer: f32,
    next_slot: usize,
}

impl Pilot {
    /// Creates a pilot.
    #[must_use]
    pub fn new(config: PilotConfig) -> Self {
        Self {
            config,
            ability_timer: config.ability_interval,
            next_slot: 0,
        }
    }

    /// Decides this frame's input from the player's state and the hostiles.
    pub fn decide(&mut self, player: &Player, hostiles: &[ActorSnapshot], dt: f32) -> PilotCommand {
        self.ability_timer -= dt;

        let mut command = PilotCommand::default();
        if !player.actor().is_alive() {
            return command;
        }

        let health = player.actor().health().percent();
        if health < self.config.heal_below {
            if let Some(slot) = Self::find_slot(player, |kind| matches!(kind, AbilityKind::Heal { .. })) {
                command.ability = Some(slot);
            }
        }

        let position = player.actor().position();
        let Some(target) = hostiles
            .iter()
            .filter(|h| h.alive && h.position.distance(position) <= self.config.sight_range)
            .min_by(|a, b| {
                a.position
                    .distance_squared(position)
                    .total_cmp(&b.position.distance_squared(position))
            })
        else {
            return command;
        };

        let offset = target.position - position;
        let distance = offset.length();
        command.aim = offset;

        let reach = player.config().attack_range + player.config().attack_radius;
        if distance > reach {
            command.movement = offset;
        } else {
            command.attack = true;
        }

        if command.ability.is_none() && self.ability_timer <= 0.0 {
            command.ability = self.next_offensive_slot(player);
            self.ability_timer = self.config.ability_interval;
        }
        command
    }

    /// Rotates through the filled slots, skipping heals.
    fn next_offensive_slot(&mut self, player: &Player) -> Option<usize> {
        let slots = player.abilities().len();
        for step in 0..slots {
            let index = (self.next_slot + step) % slots;
            let Some(slot) = player.abilities().slot(index) else {
                continue;
            };
            if matches!(slot.action.kind, AbilityKind::Heal { .. }) {
                continue;
            }
            self.next_slot = (index + 1) % slots;
            return Some(index);
        }
        None
    }

    fn find_slot(player: &Player, wanted: impl Fn(&AbilityKind) -> bool) -> Option<usize> {
        (0..player.abilities().len()).find(|&i| {
            player
                .abilities()
                .slot(i)
                .is_some_and(|slot| wanted(&slot.action.kind))
        })
    }
}
