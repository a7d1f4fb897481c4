//! Scenario configuration.
//!
//! A scenario describes one arena: the player, the enemies with their
//! spawn points, an optional boss, and the clock settings. It is loaded
//! from and saved to a TOML file.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{Read, Write};
use std::path::Path;
use sylvan_combat::{BossConfig, EnemyConfig, PlayerConfig};
use sylvan_common::{SylvanError, SylvanResult};
use tracing::{info, warn};

use crate::pilot::PilotConfig;

/// Configuration file name.
pub const CONFIG_FILE: &str = "sylvan.toml";

/// One enemy placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemySpawn {
    /// Spawn position
    pub position: Vec2,
    /// Tunables
    #[serde(default)]
    pub config: EnemyConfig,
}

/// The boss placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BossSpawn {
    /// Spawn position
    pub position: Vec2,
    /// Tunables
    #[serde(default)]
    pub config: BossConfig,
}

/// Scenario parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    // === Clock ===
    /// Seed for frame jitter (None = random)
    pub seed: Option<u64>,
    /// Simulated seconds before the run times out
    pub duration: f32,
    /// Nominal logic frame time
    pub frame_dt: f32,
    /// Relative frame time jitter (0.0 - 0.9)
    pub frame_jitter: f32,
    /// Physics step
    pub fixed_dt: f32,
    /// Combat event bus capacity
    pub event_capacity: usize,

    // === Actors ===
    /// Player spawn position
    pub player_spawn: Vec2,
    /// Player tunables
    pub player: PlayerConfig,
    /// Scripted player behavior
    pub pilot: PilotConfig,
    /// Enemy placements
    pub enemies: Vec<EnemySpawn>,
    /// Boss placement
    pub boss: Option<BossSpawn>,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            seed: None,
            duration: 120.0,
            frame_dt: 1.0 / 30.0,
            frame_jitter: 0.25,
            fixed_dt: 1.0 / 60.0,
            event_capacity: 1024,

            player_spawn: Vec2::new(-20.0, 0.0),
            player: PlayerConfig::default(),
            pilot: PilotConfig::default(),
            enemies: vec![
                EnemySpawn {
                    position: Vec2::new(-12.0, 3.0),
                    config: EnemyConfig::default()
                        .with_patrol(vec![Vec2::new(-12.0, 3.0), Vec2::new(-12.0, -3.0)]),
                },
                EnemySpawn {
                    position: Vec2::new(-8.0, -4.0),
                    config: EnemyConfig {
                        name: "archer".to_string(),
                        ..EnemyConfig::default()
                    }
                    .with_archetype(sylvan_combat::ArchetypeConfig::Ranged(
                        sylvan_combat::RangedConfig::default(),
                    ))
                    .with_attack_range(5.0),
                },
            ],
            boss: Some(BossSpawn {
                position: Vec2::ZERO,
                config: BossConfig::default(),
            }),
        }
    }
}

impl ScenarioConfig {
    /// Load configuration from a specific path.
    /// Returns default config if file doesn't exist or is invalid.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            info!("Scenario file not found, using defaults");
            return Self::default();
        }

        match fs::File::open(path) {
            Ok(mut file) => {
                let mut contents = String::new();
                if let Err(e) = file.read_to_string(&mut contents) {
                    warn!("Failed to read scenario file: {e}");
                    return Self::default();
                }

                match toml::from_str(&contents) {
                    Ok(config) => {
                        info!("Loaded scenario from {}", path.display());
                        config
                    },
                    Err(e) => {
                        warn!("Failed to parse scenario file: {e}");
                        Self::default()
                    },
                }
            },
            Err(e) => {
                warn!("Failed to open scenario file: {e}");
                Self::default()
            },
        }
    }

    /// Save configuration to a specific path.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> SylvanResult<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents =
            toml::to_string_pretty(self).map_err(|e| SylvanError::Serialization(e.to_string()))?;

        let mut file = fs::File::create(path)?;
        file.write_all(contents.as_bytes())?;

        info!("Saved scenario to {}", path.display());
        Ok(())
    }

    /// Clamps clock settings to sensible ranges and validates every actor.
    pub fn validate(&mut self) -> SylvanResult<()> {
        // Clock
        self.duration = self.duration.clamp(1.0, 3600.0);
        self.frame_dt = self.frame_dt.clamp(0.001, 0.25);
        self.frame_jitter = self.frame_jitter.clamp(0.0, 0.9);
        self.fixed_dt = self.fixed_dt.clamp(0.001, 0.1);
        self.event_capacity = self.event_capacity.clamp(16, 65_536);

        // Actors
        self.player.validate()?;
        self.pilot.validate()?;
        for spawn in &self.enemies {
            spawn.config.validate()?;
        }
        if let Some(boss) = &self.boss {
            boss.config.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sylvan_combat::ArchetypeConfig;
    use tempfile::TempDir;

    #[test]
    fn test_default_scenario() {
        let config = ScenarioConfig::default();
        assert_eq!(config.enemies.len(), 2);
        assert!(config.boss.is_some());
        assert_eq!(config.event_capacity, 1024);
    }

    #[test]
    fn test_validation_clamps_clock() {
        let mut config = ScenarioConfig {
            frame_dt: 2.0,
            frame_jitter: 5.0,
            event_capacity: 0,
            ..ScenarioConfig::default()
        };

        config.validate().expect("valid actors");

        assert_eq!(config.frame_dt, 0.25);
        assert_eq!(config.frame_jitter, 0.9);
        assert_eq!(config.event_capacity, 16);
    }

    #[test]
    fn test_validation_rejects_bad_actor() {
        let mut config = ScenarioConfig::default();
        if let Some(boss) = config.boss.as_mut() {
            boss.config.phase2_threshold = 1.5;
        }
        assert!(matches!(config.validate(), Err(SylvanError::Config(_))));
    }

    #[test]
    fn test_scenario_save_load() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("scenario").join(CONFIG_FILE);

        let mut config = ScenarioConfig {
            seed: Some(12345),
            duration: 30.0,
            ..ScenarioConfig::default()
        };
        config.enemies[0].config.attack_damage = 22.0;

        config.save_to(&path).expect("Failed to save scenario");

        let loaded = ScenarioConfig::load_from(&path);
        assert_eq!(loaded.seed, Some(12345));
        assert_eq!(loaded.duration, 30.0);
        assert_eq!(loaded.enemies.len(), 2);
        assert_eq!(loaded.enemies[0].config.attack_damage, 22.0);
        assert!(matches!(
            loaded.enemies[1].config.archetype,
            ArchetypeConfig::Ranged(_)
        ));
        assert_eq!(loaded.player.abilities.len(), 4);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join(CONFIG_FILE);
        fs::write(
            &path,
            "duration = 10.0\n\n[[enemies]]\nposition = [1.0, 2.0]\n\n[enemies.config]\nname = \"brute\"\n\n[enemies.config.archetype]\nkind = \"charger\"\n",
        )
        .expect("write scenario");

        let loaded = ScenarioConfig::load_from(&path);
        assert_eq!(loaded.duration, 10.0);
        assert_eq!(loaded.enemies.len(), 1);
        assert_eq!(loaded.enemies[0].position, Vec2::new(1.0, 2.0));
        assert_eq!(loaded.enemies[0].config.name, "brute");
        assert!(matches!(
            loaded.enemies[0].config.archetype,
            ArchetypeConfig::Charger(_)
        ));
        assert_eq!(loaded.enemies[0].config.detection_range, 8.0);
        assert!(loaded.boss.is_some());
    }

    #[test]
    fn test_scenario_load_missing_file() {
        let config = ScenarioConfig::load_from("/nonexistent/path/sylvan.toml");
        assert_eq!(config.duration, 120.0);
    }

    #[test]
    fn test_malformed_file_uses_defaults() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join(CONFIG_FILE);
        fs::write(&path, "duration = \"soon\"").expect("write scenario");

        let config = ScenarioConfig::load_from(&path);
        assert_eq!(config, ScenarioConfig::default());
    }
}
