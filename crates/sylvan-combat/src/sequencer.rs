//! Timed action sequencer: cooldowns and a shared energy pool.
//!
//! A [`Cooldown`] gates one action. An [`ActionSet`] groups numbered slots
//! that share an [`EnergyPool`]. Execution checks, in order: slot exists,
//! slot is filled, cooldown elapsed, energy affordable, precondition holds.
//! On success the cooldown restarts and the energy is spent immediately;
//! nothing is refunded if the action later fails to land.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Reasons an action was refused.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ActionError {
    /// Slot index past the end of the set
    #[error("no action slot {0}")]
    InvalidSlot(usize),

    /// Slot exists but holds no action
    #[error("action slot {0} is empty")]
    EmptySlot(usize),

    /// Cooldown still running
    #[error("action on cooldown for {remaining:.2}s")]
    OnCooldown {
        /// Seconds until ready
        remaining: f32,
    },

    /// Not enough energy in the pool
    #[error("insufficient energy: need {required}, have {available:.1}")]
    InsufficientEnergy {
        /// Energy cost
        required: f32,
        /// Energy available
        available: f32,
    },

    /// Archetype-specific precondition failed
    #[error("action precondition not met")]
    PreconditionFailed,
}

/// Result type alias for action execution.
pub type ActionResult<T> = Result<T, ActionError>;

/// Countdown timer gating one action.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cooldown {
    duration: f32,
    remaining: f32,
}

impl Cooldown {
    /// Creates a ready cooldown.
    #[must_use]
    pub const fn new(duration: f32) -> Self {
        Self {
            duration,
            remaining: 0.0,
        }
    }

    /// Counts down by `dt`.
    pub fn tick(&mut self, dt: f32) {
        self.remaining = (self.remaining - dt).max(0.0);
    }

    /// Returns whether the action may run.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.remaining <= 0.0
    }

    /// Restarts the full duration.
    pub fn trigger(&mut self) {
        self.remaining = self.duration;
    }

    /// Seconds until ready.
    #[must_use]
    pub const fn remaining(&self) -> f32 {
        self.remaining
    }

    /// Full duration.
    #[must_use]
    pub const fn duration(&self) -> f32 {
        self.duration
    }
}

/// Regenerating energy pool.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnergyPool {
    current: f32,
    max: f32,
    regen_rate: f32,
}

impl EnergyPool {
    /// Creates a full pool.
    #[must_use]
    pub const fn new(max: f32, regen_rate: f32) -> Self {
        Self {
            current: max,
            max,
            regen_rate,
        }
    }

    /// Regenerates by `regen_rate * dt`, clamped to max.
    pub fn tick(&mut self, dt: f32) {
        self.current = (self.current + self.regen_rate * dt).min(self.max);
    }

    /// Returns whether `cost` can be paid.
    #[must_use]
    pub fn can_afford(&self, cost: f32) -> bool {
        self.current >= cost
    }

    /// Spends `cost` if affordable.
    pub fn consume(&mut self, cost: f32) -> bool {
        if !self.can_afford(cost) {
            return false;
        }
        self.current -= cost;
        true
    }

    /// Current energy.
    #[must_use]
    pub const fn current(&self) -> f32 {
        self.current
    }

    /// Maximum energy.
    #[must_use]
    pub const fn max(&self) -> f32 {
        self.max
    }

    /// Energy as a fraction of max.
    #[must_use]
    pub fn percent(&self) -> f32 {
        if self.max > 0.0 {
            self.current / self.max
        } else {
            0.0
        }
    }

    /// Refills the pool.
    pub fn refill(&mut self) {
        self.current = self.max;
    }
}

/// An action with its cooldown and energy cost.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionSlot<A> {
    /// The action payload
    pub action: A,
    /// Cooldown gating the action
    pub cooldown: Cooldown,
    /// Energy spent per execution
    pub energy_cost: f32,
}

impl<A> ActionSlot<A> {
    /// Creates a ready slot.
    #[must_use]
    pub const fn new(action: A, cooldown: f32, energy_cost: f32) -> Self {
        Self {
            action,
            cooldown: Cooldown::new(cooldown),
            energy_cost,
        }
    }
}

/// Numbered action slots sharing one energy pool.
#[derive(Debug, Clone)]
pub struct ActionSet<A> {
    slots: Vec<Option<ActionSlot<A>>>,
    energy: EnergyPool,
}

impl<A> ActionSet<A> {
    /// Creates `slot_count` empty slots.
    #[must_use]
    pub fn new(slot_count: usize, energy: EnergyPool) -> Self {
        let mut slots = Vec::with_capacity(slot_count);
        slots.resize_with(slot_count, || None);
        Self { slots, energy }
    }

    /// Fills or clears a slot.
    pub fn set_slot(&mut self, index: usize, slot: Option<ActionSlot<A>>) -> ActionResult<()> {
        let entry = self
            .slots
            .get_mut(index)
            .ok_or(ActionError::InvalidSlot(index))?;
        *entry = slot;
        Ok(())
    }

    /// Slot at `index`, if filled.
    #[must_use]
    pub fn slot(&self, index: usize) -> Option<&ActionSlot<A>> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// Number of slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns whether there are no slots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Shared energy pool.
    #[must_use]
    pub const fn energy(&self) -> &EnergyPool {
        &self.energy
    }

    /// Mutable energy pool.
    pub fn energy_mut(&mut self) -> &mut EnergyPool {
        &mut self.energy
    }

    /// Counts down every cooldown and regenerates energy.
    pub fn tick(&mut self, dt: f32) {
        self.energy.tick(dt);
        for slot in self.slots.iter_mut().flatten() {
            slot.cooldown.tick(dt);
        }
    }

    /// Checks every gate for slot `index`; on success restarts its cooldown,
    /// spends its energy, and returns the action to run.
    pub fn try_execute(
        &mut self,
        index: usize,
        precondition: impl FnOnce(&A) -> bool,
    ) -> ActionResult<&A> {
        let entry = self
            .slots
            .get_mut(index)
            .ok_or(ActionError::InvalidSlot(index))?;
        let Some(slot) = entry.as_mut() else {
            warn!(slot = index, "no ability in slot");
            return Err(ActionError::EmptySlot(index));
        };

        if !slot.cooldown.is_ready() {
            return Err(ActionError::OnCooldown {
                remaining: slot.cooldown.remaining(),
            });
        }
        if !self.energy.can_afford(slot.energy_cost) {
            return Err(ActionError::InsufficientEnergy {
                required: slot.energy_cost,
                available: self.energy.current(),
            });
        }
        if !precondition(&slot.action) {
            return Err(ActionError::PreconditionFailed);
        }

        slot.cooldown.trigger();
        self.energy.consume(slot.energy_cost);
        debug!(slot = index, energy = self.energy.current(), "action executed");
        Ok(&slot.action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set() -> ActionSet<&'static str> {
        let mut set = ActionSet::new(3, EnergyPool::new(100.0, 5.0));
        set.set_slot(0, Some(ActionSlot::new("bolt", 2.0, 30.0))).unwrap();
        set.set_slot(1, Some(ActionSlot::new("heal", 10.0, 40.0))).unwrap();
        set
    }

    #[test]
    fn test_cooldown_counts_down_and_clamps() {
        let mut cd = Cooldown::new(1.5);
        assert!(cd.is_ready());
        cd.trigger();
        cd.tick(1.0);
        assert!(!cd.is_ready());
        cd.tick(1.0);
        assert!(cd.is_ready());
        assert_eq!(cd.remaining(), 0.0);
    }

    #[test]
    fn test_execute_spends_energy_and_starts_cooldown() {
        let mut set = set();
        assert_eq!(set.try_execute(0, |_| true), Ok(&"bolt"));
        assert_eq!(set.energy().current(), 70.0);
        assert!(matches!(
            set.try_execute(0, |_| true),
            Err(ActionError::OnCooldown { .. })
        ));

        set.tick(2.0);
        assert_eq!(set.energy().current(), 80.0);
        assert!(set.try_execute(0, |_| true).is_ok());
    }

    #[test]
    fn test_gate_order() {
        let mut set = set();
        assert_eq!(set.try_execute(7, |_| true), Err(ActionError::InvalidSlot(7)));
        assert_eq!(set.try_execute(2, |_| true), Err(ActionError::EmptySlot(2)));

        set.energy_mut().consume(80.0);
        assert!(matches!(
            set.try_execute(1, |_| false),
            Err(ActionError::InsufficientEnergy { required, .. }) if required == 40.0
        ));

        set.energy_mut().refill();
        assert_eq!(set.try_execute(1, |_| false), Err(ActionError::PreconditionFailed));
        assert_eq!(set.energy().current(), 100.0);
        assert!(set.slot(1).unwrap().cooldown.is_ready());
    }

    #[test]
    fn test_energy_regen_clamps_to_max() {
        let mut pool = EnergyPool::new(100.0, 5.0);
        pool.consume(10.0);
        pool.tick(10.0);
        assert_eq!(pool.current(), 100.0);
        assert!(!pool.consume(150.0));
    }
}
