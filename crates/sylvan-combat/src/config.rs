//! Actor tunables.
//!
//! Every struct deserializes with `#[serde(default)]` so a scenario file only
//! needs the fields it changes. `validate()` is called by the constructors
//! that consume a config.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use sylvan_common::{ConfigError, LayerMask};

use crate::damage::{DamageType, StrikeSpec};

type ConfigResult = Result<(), ConfigError>;

/// Regular enemy tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyConfig {
    /// Display name for logs
    pub name: String,
    /// Maximum health
    pub max_health: f32,
    /// Radius within which an alive target is detected
    pub detection_range: f32,
    /// Radius within which the enemy attacks
    pub attack_range: f32,
    /// Seconds between attacks
    pub attack_cooldown: f32,
    /// Speed while patrolling
    pub patrol_speed: f32,
    /// Speed while chasing
    pub chase_speed: f32,
    /// Damage per attack
    pub attack_damage: f32,
    /// Knockback per attack
    pub knockback_force: f32,
    /// Layers the enemy attacks
    pub target_mask: LayerMask,
    /// Patrol waypoints, visited in order with wrap-around
    pub patrol_points: Vec<Vec2>,
    /// Distance at which a waypoint counts as reached
    pub waypoint_radius: f32,
    /// Minimum idle duration
    pub idle_time_min: f32,
    /// Maximum idle duration
    pub idle_time_max: f32,
    /// Seconds between death and removal
    pub death_delay: f32,
    /// Body mass
    pub mass: f32,
    /// Seed for idle timers; random when absent
    pub rng_seed: Option<u64>,
    /// Attack strategy
    pub archetype: ArchetypeConfig,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            name: "enemy".to_string(),
            max_health: 100.0,
            detection_range: 8.0,
            attack_range: 1.5,
            attack_cooldown: 1.5,
            patrol_speed: 2.0,
            chase_speed: 4.0,
            attack_damage: 15.0,
            knockback_force: 3.0,
            target_mask: LayerMask::PLAYER,
            patrol_points: Vec::new(),
            waypoint_radius: 0.5,
            idle_time_min: 1.0,
            idle_time_max: 3.0,
            death_delay: 2.0,
            mass: 1.0,
            rng_seed: None,
            archetype: ArchetypeConfig::default(),
        }
    }
}

impl EnemyConfig {
    /// Validates every field.
    pub fn validate(&self) -> ConfigResult {
        ConfigError::check_positive("max_health", self.max_health)?;
        ConfigError::check_magnitude("detection_range", self.detection_range)?;
        ConfigError::check_magnitude("attack_range", self.attack_range)?;
        ConfigError::check_magnitude("attack_cooldown", self.attack_cooldown)?;
        ConfigError::check_magnitude("patrol_speed", self.patrol_speed)?;
        ConfigError::check_magnitude("chase_speed", self.chase_speed)?;
        ConfigError::check_magnitude("attack_damage", self.attack_damage)?;
        ConfigError::check_magnitude("knockback_force", self.knockback_force)?;
        ConfigError::check_magnitude("waypoint_radius", self.waypoint_radius)?;
        ConfigError::check_magnitude("idle_time_min", self.idle_time_min)?;
        ConfigError::check_magnitude("idle_time_max", self.idle_time_max)?;
        if self.idle_time_min > self.idle_time_max {
            return Err(ConfigError::InvertedRange {
                field: "idle_time",
                min: self.idle_time_min,
                max: self.idle_time_max,
            });
        }
        ConfigError::check_magnitude("death_delay", self.death_delay)?;
        ConfigError::check_positive("mass", self.mass)?;
        self.archetype.validate()
    }

    /// Regular attack as a strike.
    #[must_use]
    pub const fn strike(&self) -> StrikeSpec {
        StrikeSpec::new(self.attack_damage, self.knockback_force)
    }

    /// Sets the archetype.
    #[must_use]
    pub fn with_archetype(mut self, archetype: ArchetypeConfig) -> Self {
        self.archetype = archetype;
        self
    }

    /// Sets the distance from which the enemy attacks.
    #[must_use]
    pub const fn with_attack_range(mut self, range: f32) -> Self {
        self.attack_range = range;
        self
    }

    /// Sets the patrol route.
    #[must_use]
    pub fn with_patrol(mut self, points: Vec<Vec2>) -> Self {
        self.patrol_points = points;
        self
    }

    /// Fixes the idle timer seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }
}

/// Attack strategy selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ArchetypeConfig {
    /// Radius sweep around the attacker
    Melee(MeleeConfig),
    /// Kiting projectile thrower
    Ranged(RangedConfig),
    /// Prepare, charge, recover, cool down
    Charger(ChargerConfig),
}

impl Default for ArchetypeConfig {
    fn default() -> Self {
        Self::Melee(MeleeConfig::default())
    }
}

impl ArchetypeConfig {
    /// Validates the selected variant.
    pub fn validate(&self) -> ConfigResult {
        match self {
            Self::Melee(_) => Ok(()),
            Self::Ranged(c) => c.validate(),
            Self::Charger(c) => c.validate(),
        }
    }
}

/// Melee sweep tunables.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MeleeConfig {
    /// Damage type of the sweep
    pub damage_type: DamageType,
}

/// Ranged kiting tunables.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RangedConfig {
    /// Projectile speed
    pub projectile_speed: f32,
    /// Distance from which the enemy starts firing
    pub optimal_distance: f32,
    /// Distance under which the enemy backs away
    pub too_close_distance: f32,
    /// Retreat speed as a fraction of chase speed
    pub retreat_speed_factor: f32,
    /// Projectile lifetime
    pub projectile_lifetime: f32,
    /// Projectile knockback
    pub projectile_knockback: f32,
    /// Projectile collision radius
    pub projectile_radius: f32,
    /// Fire point offset along the facing
    pub fire_point_offset: f32,
}

impl Default for RangedConfig {
    fn default() -> Self {
        Self {
            projectile_speed: 8.0,
            optimal_distance: 5.0,
            too_close_distance: 3.0,
            retreat_speed_factor: 0.7,
            projectile_lifetime: 3.0,
            projectile_knockback: 2.0,
            projectile_radius: 0.25,
            fire_point_offset: 0.5,
        }
    }
}

impl RangedConfig {
    /// Validates every field.
    pub fn validate(&self) -> ConfigResult {
        ConfigError::check_positive("projectile_speed", self.projectile_speed)?;
        ConfigError::check_magnitude("optimal_distance", self.optimal_distance)?;
        ConfigError::check_magnitude("too_close_distance", self.too_close_distance)?;
        if self.too_close_distance > self.optimal_distance {
            return Err(ConfigError::InvertedRange {
                field: "ranged distance band",
                min: self.too_close_distance,
                max: self.optimal_distance,
            });
        }
        ConfigError::check_magnitude("retreat_speed_factor", self.retreat_speed_factor)?;
        ConfigError::check_positive("projectile_lifetime", self.projectile_lifetime)?;
        ConfigError::check_magnitude("projectile_knockback", self.projectile_knockback)?;
        ConfigError::check_positive("projectile_radius", self.projectile_radius)?;
        ConfigError::check_magnitude("fire_point_offset", self.fire_point_offset)
    }
}

/// Charge sequence tunables.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChargerConfig {
    /// Speed during the charge
    pub charge_speed: f32,
    /// Maximum distance covered by one charge
    pub charge_distance: f32,
    /// Seconds after recovery before the next charge
    pub charge_cooldown: f32,
    /// Telegraph delay before the charge
    pub preparation_time: f32,
    /// Vulnerable pause after the charge
    pub recovery_time: f32,
    /// Knockback multiplier for charge hits
    pub knockback_multiplier: f32,
}

impl Default for ChargerConfig {
    fn default() -> Self {
        Self {
            charge_speed: 12.0,
            charge_distance: 8.0,
            charge_cooldown: 3.0,
            preparation_time: 0.5,
            recovery_time: 1.0,
            knockback_multiplier: 1.5,
        }
    }
}

impl ChargerConfig {
    /// Validates every field.
    pub fn validate(&self) -> ConfigResult {
        ConfigError::check_positive("charge_speed", self.charge_speed)?;
        ConfigError::check_magnitude("charge_distance", self.charge_distance)?;
        ConfigError::check_magnitude("charge_cooldown", self.charge_cooldown)?;
        ConfigError::check_magnitude("preparation_time", self.preparation_time)?;
        ConfigError::check_magnitude("recovery_time", self.recovery_time)?;
        ConfigError::check_magnitude("knockback_multiplier", self.knockback_multiplier)
    }
}

/// One radius attack in a boss phase.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttackProfile {
    /// Damage per hit
    pub damage: f32,
    /// Hit radius around the boss
    pub range: f32,
    /// Seconds between uses; counts from phase entry
    pub cooldown: f32,
    /// Knockback per hit
    pub knockback_force: f32,
}

impl Default for AttackProfile {
    fn default() -> Self {
        Self {
            damage: 20.0,
            range: 2.0,
            cooldown: 2.0,
            knockback_force: 5.0,
        }
    }
}

impl AttackProfile {
    /// Creates a profile.
    #[must_use]
    pub const fn new(damage: f32, range: f32, cooldown: f32, knockback_force: f32) -> Self {
        Self {
            damage,
            range,
            cooldown,
            knockback_force,
        }
    }

    /// Validates every field.
    pub fn validate(&self, field: &'static str) -> ConfigResult {
        ConfigError::check_magnitude(field, self.damage)?;
        ConfigError::check_magnitude(field, self.range)?;
        ConfigError::check_magnitude(field, self.cooldown)?;
        ConfigError::check_magnitude(field, self.knockback_force)
    }

    /// Strike with `multiplier` applied to damage.
    #[must_use]
    pub fn strike(&self, multiplier: f32) -> StrikeSpec {
        StrikeSpec::new(self.damage * multiplier, self.knockback_force)
    }
}

/// Boss tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BossConfig {
    /// Display name
    pub name: String,
    /// Stable identifier for save data and dialogue lookups
    pub boss_id: String,
    /// Maximum health
    pub max_health: f32,
    /// Health fraction that starts phase 2
    pub phase2_threshold: f32,
    /// Health fraction that enrages the boss
    pub enrage_threshold: f32,
    /// Base move speed before phase 1
    pub move_speed: f32,
    /// Dash speed
    pub dash_speed: f32,
    /// Move speed in phase 1
    pub phase1_move_speed: f32,
    /// Move speed in phase 2
    pub phase2_move_speed: f32,
    /// Seconds from encounter start to phase 1
    pub intro_duration: f32,
    /// Seconds from death to the loot drop
    pub loot_delay: f32,
    /// Seconds from death to removal
    pub removal_delay: f32,
    /// Damage multiplier once enraged
    pub enrage_damage_multiplier: f32,
    /// Phase 1 pursues at full speed beyond this distance
    pub charge_distance: f32,
    /// Phase 1 melee
    pub phase1_melee: AttackProfile,
    /// Phase 2 melee
    pub phase2_melee: AttackProfile,
    /// Phase 2 ground slam; `range` is the slam radius
    pub ground_slam: AttackProfile,
    /// Layers the boss attacks
    pub target_mask: LayerMask,
    /// Arena center
    pub arena_center: Vec2,
    /// Arena radius; the boss never leaves it
    pub arena_radius: f32,
    /// Seconds from defeat until the arena opens
    pub arena_unlock_delay: f32,
    /// Keep the player inside the arena while it is locked
    pub lock_player_in_arena: bool,
    /// Body mass
    pub mass: f32,
}

impl Default for BossConfig {
    fn default() -> Self {
        Self {
            name: "Tharion".to_string(),
            boss_id: "tharion".to_string(),
            max_health: 500.0,
            phase2_threshold: 0.5,
            enrage_threshold: 0.25,
            move_speed: 3.0,
            dash_speed: 10.0,
            phase1_move_speed: 4.0,
            phase2_move_speed: 5.0,
            intro_duration: 3.0,
            loot_delay: 0.5,
            removal_delay: 2.0,
            enrage_damage_multiplier: 1.2,
            charge_distance: 8.0,
            phase1_melee: AttackProfile::new(20.0, 2.0, 2.0, 5.0),
            phase2_melee: AttackProfile::new(30.0, 2.5, 1.5, 7.0),
            ground_slam: AttackProfile::new(40.0, 4.0, 5.0, 10.0),
            target_mask: LayerMask::PLAYER,
            arena_center: Vec2::ZERO,
            arena_radius: 15.0,
            arena_unlock_delay: 3.0,
            lock_player_in_arena: true,
            mass: 4.0,
        }
    }
}

impl BossConfig {
    /// Validates every field.
    pub fn validate(&self) -> ConfigResult {
        ConfigError::check_positive("max_health", self.max_health)?;
        ConfigError::check_threshold("phase2_threshold", self.phase2_threshold)?;
        ConfigError::check_threshold("enrage_threshold", self.enrage_threshold)?;
        ConfigError::check_magnitude("move_speed", self.move_speed)?;
        ConfigError::check_magnitude("dash_speed", self.dash_speed)?;
        ConfigError::check_magnitude("phase1_move_speed", self.phase1_move_speed)?;
        ConfigError::check_magnitude("phase2_move_speed", self.phase2_move_speed)?;
        ConfigError::check_magnitude("intro_duration", self.intro_duration)?;
        ConfigError::check_magnitude("loot_delay", self.loot_delay)?;
        ConfigError::check_magnitude("removal_delay", self.removal_delay)?;
        ConfigError::check_magnitude("enrage_damage_multiplier", self.enrage_damage_multiplier)?;
        ConfigError::check_magnitude("charge_distance", self.charge_distance)?;
        self.phase1_melee.validate("phase1_melee")?;
        self.phase2_melee.validate("phase2_melee")?;
        self.ground_slam.validate("ground_slam")?;
        ConfigError::check_positive("arena_radius", self.arena_radius)?;
        ConfigError::check_magnitude("arena_unlock_delay", self.arena_unlock_delay)?;
        ConfigError::check_positive("mass", self.mass)
    }
}

/// Player tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Maximum health
    pub max_health: f32,
    /// Walking speed
    pub move_speed: f32,
    /// Melee damage
    pub attack_damage: f32,
    /// Distance from the player to the melee hit center
    pub attack_range: f32,
    /// Radius of the melee hit circle
    pub attack_radius: f32,
    /// Seconds between swings
    pub attack_cooldown: f32,
    /// Melee knockback
    pub attack_knockback: f32,
    /// Seconds the player cannot move after a swing
    pub attack_lock: f32,
    /// Layers the player hits
    pub target_mask: LayerMask,
    /// Shared ability energy
    pub energy: EnergyConfig,
    /// Ability loadout, one entry per slot
    pub abilities: Vec<AbilityConfig>,
    /// Body mass
    pub mass: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            max_health: 100.0,
            move_speed: 5.0,
            attack_damage: 15.0,
            attack_range: 1.5,
            attack_radius: 0.5,
            attack_cooldown: 0.5,
            attack_knockback: 3.0,
            attack_lock: 0.3,
            target_mask: LayerMask::ENEMY | LayerMask::BOSS,
            energy: EnergyConfig::default(),
            abilities: vec![
                AbilityConfig::new(AbilityKind::Projectile { speed: 10.0, lifetime: 3.0 }),
                AbilityConfig::new(AbilityKind::DashStrike {
                    distance: 5.0,
                    duration: 0.3,
                    radius: 2.0,
                }),
                AbilityConfig::new(AbilityKind::AoE { radius: 3.0 }),
                AbilityConfig::new(AbilityKind::Heal { amount: 30.0 }),
            ],
            mass: 1.0,
        }
    }
}

impl PlayerConfig {
    /// Validates every field.
    pub fn validate(&self) -> ConfigResult {
        ConfigError::check_positive("max_health", self.max_health)?;
        ConfigError::check_magnitude("move_speed", self.move_speed)?;
        ConfigError::check_magnitude("attack_damage", self.attack_damage)?;
        ConfigError::check_magnitude("attack_range", self.attack_range)?;
        ConfigError::check_magnitude("attack_radius", self.attack_radius)?;
        ConfigError::check_magnitude("attack_cooldown", self.attack_cooldown)?;
        ConfigError::check_magnitude("attack_knockback", self.attack_knockback)?;
        ConfigError::check_magnitude("attack_lock", self.attack_lock)?;
        ConfigError::check_positive("mass", self.mass)?;
        self.energy.validate()?;
        self.abilities.iter().try_for_each(AbilityConfig::validate)
    }
}

/// Energy pool tunables.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnergyConfig {
    /// Maximum energy
    pub max: f32,
    /// Regeneration per second
    pub regen_rate: f32,
}

impl Default for EnergyConfig {
    fn default() -> Self {
        Self {
            max: 100.0,
            regen_rate: 5.0,
        }
    }
}

impl EnergyConfig {
    /// Validates every field.
    pub fn validate(&self) -> ConfigResult {
        ConfigError::check_magnitude("energy.max", self.max)?;
        ConfigError::check_magnitude("energy.regen_rate", self.regen_rate)
    }
}

/// What an ability does when executed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AbilityKind {
    /// Fires a projectile along the aim
    Projectile {
        /// Projectile speed
        speed: f32,
        /// Projectile lifetime
        lifetime: f32,
    },
    /// Invulnerable dash along the aim, then a radius hit on landing
    DashStrike {
        /// Dash length
        distance: f32,
        /// Dash duration
        duration: f32,
        /// Landing hit radius
        radius: f32,
    },
    /// Radius hit with falloff at `range` along the aim
    #[serde(rename = "aoe")]
    AoE {
        /// Explosion radius
        radius: f32,
    },
    /// Restores health; refused at full health
    Heal {
        /// Health restored
        amount: f32,
    },
    /// Invulnerable for a duration
    Shield {
        /// Shield duration
        duration: f32,
    },
    /// Movement speed multiplier for a duration
    SpeedBoost {
        /// Speed multiplier
        multiplier: f32,
        /// Boost duration
        duration: f32,
    },
}

/// One ability slot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AbilityConfig {
    /// Behavior
    #[serde(flatten)]
    pub kind: AbilityKind,
    /// Seconds between uses
    #[serde(default = "AbilityConfig::default_cooldown")]
    pub cooldown: f32,
    /// Damage for offensive abilities
    #[serde(default = "AbilityConfig::default_damage")]
    pub damage: f32,
    /// Reach along the aim
    #[serde(default = "AbilityConfig::default_range")]
    pub range: f32,
    /// Energy spent per use
    #[serde(default = "AbilityConfig::default_energy_cost")]
    pub energy_cost: f32,
}

impl AbilityConfig {
    const fn default_cooldown() -> f32 {
        1.0
    }

    const fn default_damage() -> f32 {
        20.0
    }

    const fn default_range() -> f32 {
        5.0
    }

    const fn default_energy_cost() -> f32 {
        10.0
    }

    /// Creates an ability with default cooldown, damage, range, and cost.
    #[must_use]
    pub const fn new(kind: AbilityKind) -> Self {
        Self {
            kind,
            cooldown: Self::default_cooldown(),
            damage: Self::default_damage(),
            range: Self::default_range(),
            energy_cost: Self::default_energy_cost(),
        }
    }

    /// Sets the cooldown.
    #[must_use]
    pub const fn with_cooldown(mut self, cooldown: f32) -> Self {
        self.cooldown = cooldown;
        self
    }

    /// Sets the energy cost.
    #[must_use]
    pub const fn with_energy_cost(mut self, energy_cost: f32) -> Self {
        self.energy_cost = energy_cost;
        self
    }

    /// Sets the damage.
    #[must_use]
    pub const fn with_damage(mut self, damage: f32) -> Self {
        self.damage = damage;
        self
    }

    /// Validates every field.
    pub fn validate(&self) -> ConfigResult {
        ConfigError::check_magnitude("ability.cooldown", self.cooldown)?;
        ConfigError::check_magnitude("ability.damage", self.damage)?;
        ConfigError::check_magnitude("ability.range", self.range)?;
        ConfigError::check_magnitude("ability.energy_cost", self.energy_cost)?;
        match self.kind {
            AbilityKind::Projectile { speed, lifetime } => {
                ConfigError::check_positive("projectile.speed", speed)?;
                ConfigError::check_positive("projectile.lifetime", lifetime)
            }
            AbilityKind::DashStrike {
                distance,
                duration,
                radius,
            } => {
                ConfigError::check_magnitude("dash.distance", distance)?;
                ConfigError::check_positive("dash.duration", duration)?;
                ConfigError::check_magnitude("dash.radius", radius)
            }
            AbilityKind::AoE { radius } => ConfigError::check_positive("aoe.radius", radius),
            AbilityKind::Heal { amount } => ConfigError::check_magnitude("heal.amount", amount),
            AbilityKind::Shield { duration } => {
                ConfigError::check_magnitude("shield.duration", duration)
            }
            AbilityKind::SpeedBoost {
                multiplier,
                duration,
            } => {
                ConfigError::check_magnitude("boost.multiplier", multiplier)?;
                ConfigError::check_magnitude("boost.duration", duration)
            }
        }
    }
}
