//! Planar geometry helpers.
//!
//! Positions and velocities are plain `glam::Vec2` values. The helpers here
//! keep the degenerate cases (coincident points, absent targets) in one place.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Squared length under which a vector is treated as zero.
const EPSILON_SQ: f32 = 1.0e-8;

/// Returns the unit vector pointing from `from` to `to`, or zero when the
/// points coincide.
#[must_use]
pub fn direction_to(from: Vec2, to: Vec2) -> Vec2 {
    let delta = to - from;
    if delta.length_squared() < EPSILON_SQ {
        Vec2::ZERO
    } else {
        delta.normalize()
    }
}

/// Distance between two optional points; an absent end yields infinity.
#[must_use]
pub fn distance_or_infinite(from: Vec2, to: Option<Vec2>) -> f32 {
    to.map_or(f32::INFINITY, |to| from.distance(to))
}

/// Horizontal facing of a side-view actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Facing {
    /// Facing toward negative X.
    Left,
    /// Facing toward positive X.
    #[default]
    Right,
}

impl Facing {
    /// Facing implied by a direction; a purely vertical direction keeps
    /// the `current` facing.
    #[must_use]
    pub fn from_direction(direction: Vec2, current: Self) -> Self {
        if direction.x > 0.0 {
            Self::Right
        } else if direction.x < 0.0 {
            Self::Left
        } else {
            current
        }
    }

    /// Unit vector along the facing.
    #[must_use]
    pub const fn as_vec2(self) -> Vec2 {
        match self {
            Self::Left => Vec2::NEG_X,
            Self::Right => Vec2::X,
        }
    }
}
