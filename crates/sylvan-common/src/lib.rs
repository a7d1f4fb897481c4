//! # Sylvan Common
//!
//! Common types, utilities, and shared abstractions for the Sylvan combat
//! simulation.
//!
//! This crate provides foundational types used across all Sylvan crates:
//! - ID types (ActorId) and layer masks for spatial queries
//! - Planar geometry helpers on top of `glam::Vec2`
//! - Common error types
//! - Prelude for convenient imports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod error;
pub mod geometry;
pub mod ids;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::*;
    pub use crate::geometry::*;
    pub use crate::ids::*;
}

pub use glam::Vec2;
pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actor_id_generation() {
        let id1 = ActorId::new();
        let id2 = ActorId::new();
        assert_ne!(id1, id2);
        assert!(id1.is_valid());
        assert!(!ActorId::NULL.is_valid());
    }

    #[test]
    fn test_layer_mask_union() {
        let mask = LayerMask::PLAYER | LayerMask::ENEMY;
        assert!(mask.intersects(LayerMask::PLAYER));
        assert!(mask.intersects(LayerMask::ENEMY));
        assert!(!mask.intersects(LayerMask::BOSS));
    }

    #[test]
    fn test_direction_is_unit_or_zero() {
        let dir = direction_to(Vec2::ZERO, Vec2::new(3.0, 4.0));
        assert!((dir.length() - 1.0).abs() < 1e-6);

        assert_eq!(direction_to(Vec2::ONE, Vec2::ONE), Vec2::ZERO);
    }
}
