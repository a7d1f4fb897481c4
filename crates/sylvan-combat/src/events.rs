//! Notification hooks and the combat event bus.
//!
//! Two delivery paths exist:
//! - [`Notifier`]: synchronous observer list. Callbacks run in registration
//!   order, inside the call that raised the notification.
//! - [`EventBus`]: bounded channel of [`CombatEvent`]s that a frame loop drains
//!   once per frame for logging and bookkeeping.

use crossbeam_channel::{bounded, Receiver, Sender};
use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::fmt;
use sylvan_common::ActorId;
use tracing::warn;

use crate::boss::BossPhase;

/// Handle returned by [`Notifier::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback<E> = Box<dyn FnMut(&E)>;

/// Multicast observer list for one notification kind.
pub struct Notifier<E> {
    subscribers: Vec<(SubscriptionId, Callback<E>)>,
    next_id: u64,
    closed: bool,
}

impl<E> Default for Notifier<E> {
    fn default() -> Self {
        Self {
            subscribers: Vec::new(),
            next_id: 1,
            closed: false,
        }
    }
}

impl<E> fmt::Debug for Notifier<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier")
            .field("subscribers", &self.subscribers.len())
            .field("closed", &self.closed)
            .finish()
    }
}

impl<E> Notifier<E> {
    /// Creates an empty notifier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a callback. Callbacks registered on a closed notifier are
    /// dropped immediately and never invoked.
    pub fn subscribe(&mut self, callback: impl FnMut(&E) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;

        if self.closed {
            warn!("subscription to a closed notifier ignored");
        } else {
            self.subscribers.push((id, Box::new(callback)));
        }
        id
    }

    /// Removes a callback. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub, _)| *sub != id);
        self.subscribers.len() != before
    }

    /// Invokes every callback in registration order.
    pub fn notify(&mut self, event: &E) {
        if self.closed {
            return;
        }
        for (_, callback) in &mut self.subscribers {
            callback(event);
        }
    }

    /// Drops all subscribers and rejects further notifications.
    pub fn close(&mut self) {
        self.subscribers.clear();
        self.closed = true;
    }

    /// Returns whether the notifier was closed.
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.closed
    }

    /// Returns the number of subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    /// Returns whether there are no subscribers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

/// Event types that can be sent through the event bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CombatEvent {
    /// Actor took damage
    ActorDamaged {
        /// Damaged actor
        actor: ActorId,
        /// Source actor
        source: ActorId,
        /// Damage amount
        amount: f32,
    },
    /// Actor health reached zero
    ActorDied {
        /// Actor ID
        actor: ActorId,
    },
    /// Actor removed from the simulation
    ActorRemoved {
        /// Actor ID
        actor: ActorId,
    },
    /// Boss moved to a new phase
    BossPhaseChanged {
        /// Boss actor
        boss: ActorId,
        /// New phase
        phase: BossPhase,
    },
    /// Boss became enraged
    BossEnraged {
        /// Boss actor
        boss: ActorId,
    },
    /// Boss dropped its loot
    LootDropped {
        /// Boss actor
        boss: ActorId,
        /// Drop position
        position: Vec2,
    },
    /// Projectile entered the simulation
    ProjectileSpawned {
        /// Owner actor
        owner: ActorId,
    },
    /// Projectile left the simulation without hitting anything
    ProjectileExpired {
        /// Owner actor
        owner: ActorId,
    },
}

/// Event bus for broadcasting combat events to a frame loop.
#[derive(Debug)]
pub struct EventBus {
    /// Sender for broadcasting events
    sender: Sender<CombatEvent>,
    /// Receiver for collecting events
    receiver: Receiver<CombatEvent>,
    /// Channel capacity
    capacity: usize,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl EventBus {
    /// Creates a new event bus with the given capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self {
            sender,
            receiver,
            capacity,
        }
    }

    /// Publishes an event to the bus.
    pub fn publish(&self, event: CombatEvent) {
        // Non-blocking send - if full, event is dropped
        let _ = self.sender.try_send(event);
    }

    /// Drains all pending events.
    pub fn drain(&self) -> Vec<CombatEvent> {
        self.receiver.try_iter().collect()
    }

    /// Returns the number of pending events.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    /// Returns the channel capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Creates a new sender handle for publishing events.
    #[must_use]
    pub fn sender(&self) -> Sender<CombatEvent> {
        self.sender.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_notifier_fans_out_in_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut notifier = Notifier::<u32>::new();

        for tag in ["a", "b", "c"] {
            let log = Rc::clone(&log);
            notifier.subscribe(move |value| log.borrow_mut().push(format!("{tag}{value}")));
        }

        notifier.notify(&1);
        assert_eq!(*log.borrow(), vec!["a1", "b1", "c1"]);
    }

    #[test]
    fn test_unsubscribe() {
        let hits = Rc::new(RefCell::new(0));
        let mut notifier = Notifier::<()>::new();

        let counter = Rc::clone(&hits);
        let id = notifier.subscribe(move |()| *counter.borrow_mut() += 1);
        notifier.notify(&());
        assert!(notifier.unsubscribe(id));
        assert!(!notifier.unsubscribe(id));
        notifier.notify(&());

        assert_eq!(*hits.borrow(), 1);
    }

    #[test]
    fn test_closed_notifier_is_silent() {
        let hits = Rc::new(RefCell::new(0));
        let mut notifier = Notifier::<()>::new();

        let counter = Rc::clone(&hits);
        notifier.subscribe(move |()| *counter.borrow_mut() += 1);
        notifier.close();
        notifier.notify(&());

        let counter = Rc::clone(&hits);
        notifier.subscribe(move |()| *counter.borrow_mut() += 1);
        notifier.notify(&());

        assert_eq!(*hits.borrow(), 0);
        assert!(notifier.is_empty());
    }

    #[test]
    fn test_event_bus_drain() {
        let bus = EventBus::new(4);
        let id = ActorId::new();
        bus.publish(CombatEvent::ActorDied { actor: id });
        bus.sender().try_send(CombatEvent::ActorRemoved { actor: id }).unwrap();

        assert_eq!(bus.pending_count(), 2);
        let events = bus.drain();
        assert_eq!(events.len(), 2);
        assert_eq!(bus.pending_count(), 0);
    }

    #[test]
    fn test_event_bus_drops_when_full() {
        let bus = EventBus::new(1);
        let id = ActorId::new();
        bus.publish(CombatEvent::ActorDied { actor: id });
        bus.publish(CombatEvent::ActorRemoved { actor: id });
        assert_eq!(bus.drain().len(), 1);
    }
}
