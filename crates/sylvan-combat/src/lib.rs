//! # Sylvan Combat
//!
//! Real-time combat and AI core for the Sylvan simulation.
//!
//! This crate provides:
//! - Actor state and the damage resolver (health, knockback, invulnerability)
//! - Observer hooks and a bounded combat event bus
//! - A generic state machine with enter/execute/fixed-execute/exit
//! - Enemy behaviors (idle, patrol, chase, attack, death) and archetype
//!   strategies (melee, ranged kiting, charger)
//! - Projectiles owned by the world
//! - The boss encounter controller and its arena trigger
//! - Timed action sequencing (cooldowns and a shared energy pool)
//! - The player combatant with melee and slotted abilities
//!
//! The core never owns a physics engine. It consumes a [`CombatWorld`] for
//! spatial queries, cross-actor damage, and projectile hand-off.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod actor;
pub mod archetype;
pub mod boss;
pub mod config;
pub mod damage;
pub mod enemy;
pub mod events;
pub mod health;
pub mod player;
pub mod projectile;
pub mod sequencer;
pub mod state_machine;
pub mod world;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::actor::*;
    pub use crate::archetype::*;
    pub use crate::boss::*;
    pub use crate::config::*;
    pub use crate::damage::*;
    pub use crate::enemy::*;
    pub use crate::events::*;
    pub use crate::health::*;
    pub use crate::player::*;
    pub use crate::projectile::*;
    pub use crate::sequencer::*;
    pub use crate::state_machine::*;
    pub use crate::world::*;
}

pub use prelude::*;
