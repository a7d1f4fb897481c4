//! Damage packets: the value exchanged between attackers and damage intake.
//!
//! A packet is constructed per hit, handed to `Damageable::take_damage`, and
//! consumed once. Its fields are the contract every hit source (melee sweep,
//! projectile, charge, ground slam, external hitbox) delivers damage through.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use sylvan_common::{direction_to, ActorId};

/// Type of damage dealt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DamageType {
    /// Physical damage
    #[default]
    Physical,
    /// Fire damage
    Fire,
    /// Poison damage
    Poison,
    /// Magic damage
    Magic,
}

/// One application of damage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DamagePacket {
    /// Damage amount
    pub amount: f32,
    /// Actor that dealt the damage
    pub source: ActorId,
    /// Where the hit landed
    pub hit_point: Vec2,
    /// Unit knockback direction (zero for none)
    pub knockback_direction: Vec2,
    /// Knockback impulse magnitude
    pub knockback_force: f32,
    /// Type of damage
    pub damage_type: DamageType,
}

impl DamagePacket {
    /// Creates a physical packet without knockback.
    #[must_use]
    pub fn new(amount: f32, source: ActorId, hit_point: Vec2) -> Self {
        Self {
            amount,
            source,
            hit_point,
            knockback_direction: Vec2::ZERO,
            knockback_force: 0.0,
            damage_type: DamageType::Physical,
        }
    }

    /// Sets knockback. The direction is normalized; a zero direction
    /// disables the impulse.
    #[must_use]
    pub fn with_knockback(mut self, direction: Vec2, force: f32) -> Self {
        self.knockback_direction = direction.normalize_or_zero();
        self.knockback_force = force;
        self
    }

    /// Sets knockback pointing from `origin` toward `target`.
    #[must_use]
    pub fn with_knockback_away_from(self, origin: Vec2, target: Vec2, force: f32) -> Self {
        self.with_knockback(direction_to(origin, target), force)
    }

    /// Sets the damage type.
    #[must_use]
    pub fn with_damage_type(mut self, damage_type: DamageType) -> Self {
        self.damage_type = damage_type;
        self
    }

    /// Impulse to apply to the struck body, if any.
    #[must_use]
    pub fn knockback_impulse(&self) -> Option<Vec2> {
        if self.knockback_force > 0.0 && self.knockback_direction != Vec2::ZERO {
            Some(self.knockback_direction * self.knockback_force)
        } else {
            None
        }
    }
}

/// Parameters for a radius strike (melee sweep, slam, AoE burst).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrikeSpec {
    /// Damage per target
    pub damage: f32,
    /// Knockback impulse magnitude
    pub knockback_force: f32,
    /// Type of damage
    pub damage_type: DamageType,
    /// Scale damage down linearly toward the edge of the radius
    pub falloff: bool,
}

impl StrikeSpec {
    /// Creates a physical strike without falloff.
    #[must_use]
    pub const fn new(damage: f32, knockback_force: f32) -> Self {
        Self {
            damage,
            knockback_force,
            damage_type: DamageType::Physical,
            falloff: false,
        }
    }

    /// Sets the damage type.
    #[must_use]
    pub const fn with_damage_type(mut self, damage_type: DamageType) -> Self {
        self.damage_type = damage_type;
        self
    }

    /// Enables linear falloff with distance.
    #[must_use]
    pub const fn with_falloff(mut self) -> Self {
        self.falloff = true;
        self
    }

    /// Damage dealt to a target `distance` away from a strike of `radius`.
    #[must_use]
    pub fn damage_at(&self, distance: f32, radius: f32) -> f32 {
        if !self.falloff || radius <= 0.0 {
            return self.damage;
        }
        self.damage * (1.0 - distance / radius).clamp(0.0, 1.0)
    }
}
