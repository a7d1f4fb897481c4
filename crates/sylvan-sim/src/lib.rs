//! # Sylvan Sim
//!
//! Headless arena runner for the Sylvan combat core.
//!
//! This crate ties the combat core to a frame loop:
//! - Scenario configuration loaded from TOML
//! - A fixed-step simulation clock
//! - The arena that owns every combatant and implements the combat world
//! - A scripted pilot standing in for player input
//! - The runner that produces an end-of-run summary

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod arena;
pub mod config;
pub mod pilot;
pub mod sim;
pub mod timing;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::arena::*;
    pub use crate::config::*;
    pub use crate::pilot::*;
    pub use crate::sim::*;
    pub use crate::timing::*;
}

pub use prelude::*;
