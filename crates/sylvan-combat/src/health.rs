//! Actor health and the damage resolver.
//!
//! Aliveness is derived from the current value (`current > 0`). The death
//! notification fires on the alive-to-dead edge only. `set_health` with a
//! positive value after death makes the actor alive again without any
//! resurrection notification; callers that need a one-way death must keep
//! their own terminal state (enemies and bosses do, via their Death state).

use tracing::debug;

use crate::damage::DamagePacket;
use crate::events::Notifier;

/// Notification hooks raised by [`Health`].
#[derive(Debug, Default)]
pub struct HealthHooks {
    /// Raised with the new current health after every change
    pub health_changed: Notifier<f32>,
    /// Raised with the packet after damage is applied
    pub damaged: Notifier<DamagePacket>,
    /// Raised once on the transition from alive to dead
    pub death: Notifier<()>,
}

impl HealthHooks {
    /// Closes every hook; used when the owning actor is removed.
    pub fn close_all(&mut self) {
        self.health_changed.close();
        self.damaged.close();
        self.death.close();
    }
}

/// Result of a health mutation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HealthChange {
    /// Health before the change
    pub previous: f32,
    /// Health after the change
    pub current: f32,
    /// Whether this change crossed from alive to dead
    pub died: bool,
}

impl HealthChange {
    /// Signed change in health.
    #[must_use]
    pub fn delta(&self) -> f32 {
        self.current - self.previous
    }
}

/// Health pool with damage immunity and change notifications.
#[derive(Debug)]
pub struct Health {
    current: f32,
    max: f32,
    invulnerable: bool,
    hooks: HealthHooks,
}

impl Health {
    /// Creates a health pool at full health.
    #[must_use]
    pub fn new(max: f32) -> Self {
        let max = max.max(f32::MIN_POSITIVE);
        Self {
            current: max,
            max,
            invulnerable: false,
            hooks: HealthHooks::default(),
        }
    }

    /// Current health.
    #[must_use]
    pub const fn current(&self) -> f32 {
        self.current
    }

    /// Maximum health.
    #[must_use]
    pub const fn max(&self) -> f32 {
        self.max
    }

    /// Health as a fraction of max (0.0 to 1.0).
    #[must_use]
    pub fn percent(&self) -> f32 {
        self.current / self.max
    }

    /// Returns whether health is above zero.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.current > 0.0
    }

    /// Returns whether at max health.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.current >= self.max
    }

    /// Returns whether damage is currently ignored.
    #[must_use]
    pub const fn is_invulnerable(&self) -> bool {
        self.invulnerable
    }

    /// Toggles damage immunity without touching health.
    pub fn set_invulnerable(&mut self, invulnerable: bool) {
        self.invulnerable = invulnerable;
    }

    /// Notification hooks.
    #[must_use]
    pub const fn hooks(&self) -> &HealthHooks {
        &self.hooks
    }

    /// Mutable notification hooks, for subscribing.
    pub fn hooks_mut(&mut self) -> &mut HealthHooks {
        &mut self.hooks
    }

    /// Applies a damage packet.
    ///
    /// Returns `None` when the packet is ignored: dead, invulnerable, or a
    /// non-finite amount.
    /// Knockback is the caller's concern; see `Actor::take_damage`.
    pub fn take_damage(&mut self, packet: &DamagePacket) -> Option<HealthChange> {
        if !self.is_alive() || self.invulnerable || !packet.amount.is_finite() {
            return None;
        }

        let previous = self.current;
        self.current = (self.current - packet.amount).clamp(0.0, self.max);
        let died = !self.is_alive();

        self.hooks.health_changed.notify(&self.current);
        self.hooks.damaged.notify(packet);
        if died {
            debug!(source = %packet.source, "health depleted");
            self.hooks.death.notify(&());
        }

        Some(HealthChange {
            previous,
            current: self.current,
            died,
        })
    }

    /// Restores health. Returns `None` when dead.
    pub fn heal(&mut self, amount: f32) -> Option<HealthChange> {
        if !self.is_alive() || !amount.is_finite() {
            return None;
        }

        let previous = self.current;
        self.current = (self.current + amount).clamp(0.0, self.max);
        self.hooks.health_changed.notify(&self.current);

        Some(HealthChange {
            previous,
            current: self.current,
            died: false,
        })
    }

    /// Sets health directly, clamped to `[0, max]`.
    ///
    /// Raises death only when alive before the call and the new value is 0.
    pub fn set_health(&mut self, value: f32) -> HealthChange {
        let was_alive = self.is_alive();
        let previous = self.current;
        if !value.is_finite() {
            return HealthChange {
                previous,
                current: previous,
                died: false,
            };
        }
        self.current = value.clamp(0.0, self.max);
        self.hooks.health_changed.notify(&self.current);

        let died = was_alive && !self.is_alive();
        if died {
            self.hooks.death.notify(&());
        }

        HealthChange {
            previous,
            current: self.current,
            died,
        }
    }

    /// Restores full health.
    pub fn reset(&mut self) -> HealthChange {
        let previous = self.current;
        self.current = self.max;
        self.hooks.health_changed.notify(&self.current);

        HealthChange {
            previous,
            current: self.current,
            died: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use proptest::prelude::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use sylvan_common::ActorId;

    fn hit(amount: f32) -> DamagePacket {
        DamagePacket::new(amount, ActorId::NULL, Vec2::ZERO)
    }

    fn count_deaths(health: &mut Health) -> Rc<RefCell<u32>> {
        let deaths = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&deaths);
        health
            .hooks_mut()
            .death
            .subscribe(move |()| *counter.borrow_mut() += 1);
        deaths
    }

    #[test]
    fn test_damage_then_overkill_clamps_and_dies_once() {
        let mut health = Health::new(100.0);
        let deaths = count_deaths(&mut health);

        let change = health.take_damage(&hit(30.0)).unwrap();
        assert_eq!(change.current, 70.0);
        assert!(!change.died);

        let change = health.take_damage(&hit(80.0)).unwrap();
        assert_eq!(change.current, 0.0);
        assert!(change.died);
        assert!(!health.is_alive());

        assert!(health.take_damage(&hit(10.0)).is_none());
        assert_eq!(*deaths.borrow(), 1);
    }

    #[test]
    fn test_set_health_zero_while_dead_does_not_refire() {
        let mut health = Health::new(50.0);
        let deaths = count_deaths(&mut health);

        assert!(health.set_health(0.0).died);
        assert!(!health.set_health(0.0).died);
        assert!(!health.set_health(-5.0).died);
        assert_eq!(*deaths.borrow(), 1);
    }

    #[test]
    fn test_set_health_after_death_revives_without_notification() {
        let mut health = Health::new(50.0);
        let deaths = count_deaths(&mut health);

        health.set_health(0.0);
        let change = health.set_health(20.0);
        assert!(!change.died);
        assert!(health.is_alive());
        assert_eq!(*deaths.borrow(), 1);
    }

    #[test]
    fn test_invulnerable_ignores_damage() {
        let mut health = Health::new(100.0);
        health.set_invulnerable(true);
        assert!(health.take_damage(&hit(50.0)).is_none());
        assert_eq!(health.current(), 100.0);

        health.set_invulnerable(false);
        assert!(health.take_damage(&hit(50.0)).is_some());
    }

    #[test]
    fn test_heal_clamps_and_is_ignored_when_dead() {
        let mut health = Health::new(100.0);
        health.take_damage(&hit(40.0));
        assert_eq!(health.heal(100.0).unwrap().current, 100.0);

        health.set_health(0.0);
        assert!(health.heal(10.0).is_none());
        assert_eq!(health.current(), 0.0);
    }

    #[test]
    fn test_notification_order_changed_then_damaged_then_death() {
        let mut health = Health::new(10.0);
        let log = Rc::new(RefCell::new(Vec::new()));

        let l = Rc::clone(&log);
        health
            .hooks_mut()
            .health_changed
            .subscribe(move |hp| l.borrow_mut().push(format!("changed {hp}")));
        let l = Rc::clone(&log);
        health
            .hooks_mut()
            .damaged
            .subscribe(move |p| l.borrow_mut().push(format!("damaged {}", p.amount)));
        let l = Rc::clone(&log);
        health
            .hooks_mut()
            .death
            .subscribe(move |()| l.borrow_mut().push("death".to_string()));

        health.take_damage(&hit(10.0));
        assert_eq!(*log.borrow(), vec!["changed 0", "damaged 10", "death"]);
    }

    #[test]
    fn test_reset_restores_full_health() {
        let mut health = Health::new(80.0);
        health.set_health(0.0);
        let change = health.reset();
        assert_eq!(change.current, 80.0);
        assert!(health.is_full());
    }

    #[test]
    fn test_closed_hooks_are_silent() {
        let mut health = Health::new(10.0);
        let deaths = count_deaths(&mut health);
        health.hooks_mut().close_all();
        health.take_damage(&hit(10.0));
        assert_eq!(*deaths.borrow(), 0);
    }

    fn any_amount() -> impl Strategy<Value = f32> {
        prop_oneof![
            8 => -500.0f32..500.0,
            1 => Just(f32::NAN),
            1 => Just(f32::INFINITY),
            1 => Just(f32::NEG_INFINITY),
        ]
    }

    #[test]
    fn test_non_finite_amounts_are_ignored() {
        let mut health = Health::new(100.0);
        let deaths = count_deaths(&mut health);

        assert!(health.take_damage(&hit(f32::NAN)).is_none());
        assert!(health.take_damage(&hit(f32::INFINITY)).is_none());
        assert!(health.heal(f32::NAN).is_none());
        let change = health.set_health(f32::NAN);
        assert!(!change.died);

        assert_eq!(health.current(), 100.0);
        assert!(health.is_alive());
        assert_eq!(*deaths.borrow(), 0);
    }

    proptest! {
        #[test]
        fn prop_non_finite_input_keeps_invariants(
            ops in prop::collection::vec((0u8..3, any_amount()), 0..60),
        ) {
            let mut health = Health::new(100.0);
            let deaths = count_deaths(&mut health);
            let mut edges = 0;
            for (op, value) in ops {
                let was_alive = health.is_alive();
                match op {
                    0 => { health.take_damage(&hit(value)); }
                    1 => { health.heal(value); }
                    _ => { health.set_health(value); }
                }
                prop_assert!(health.current().is_finite());
                prop_assert!(health.current() >= 0.0);
                prop_assert!(health.current() <= health.max());
                prop_assert_eq!(health.is_alive(), health.current() > 0.0);
                if was_alive && !health.is_alive() {
                    edges += 1;
                }
            }
            prop_assert_eq!(*deaths.borrow(), edges);
        }

        #[test]
        fn prop_health_stays_in_bounds(
            max in 1.0f32..1000.0,
            hits in prop::collection::vec(-500.0f32..500.0, 0..40),
        ) {
            let mut health = Health::new(max);
            for amount in hits {
                health.take_damage(&hit(amount));
                prop_assert!(health.current() >= 0.0);
                prop_assert!(health.current() <= health.max());
                prop_assert_eq!(health.is_alive(), health.current() > 0.0);
            }
        }

        #[test]
        fn prop_death_fires_only_on_alive_to_dead_edges(
            ops in prop::collection::vec((0u8..3, 0.0f32..150.0), 0..60),
        ) {
            let mut health = Health::new(100.0);
            let deaths = count_deaths(&mut health);
            let mut edges = 0;
            for (op, value) in ops {
                let was_alive = health.is_alive();
                match op {
                    0 => { health.take_damage(&hit(value)); }
                    1 => { health.heal(value); }
                    _ => { health.set_health(value - 50.0); }
                }
                if was_alive && !health.is_alive() {
                    edges += 1;
                }
            }
            prop_assert_eq!(*deaths.borrow(), edges);
        }
    }
}
