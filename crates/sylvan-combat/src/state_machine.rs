//! Generic state machine.
//!
//! States are plain values (usually enum variants carrying their own timers)
//! implementing [`BehaviorState`]. The machine owns the current state; the
//! owner it acts on is passed in on every call, so a state never holds a
//! reference back to its owner.
//!
//! `enter` and `exit` return nothing, so a state cannot request a transition
//! while it is being entered or left. Transitions are requested only from
//! `execute`, and applied by the machine after `execute` returns.

use tracing::{debug, warn};

/// Outcome of one `execute` call.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition<S> {
    /// Keep the current state
    Stay,
    /// Exit the current state and enter this one
    To(S),
}

/// Behavior contract for one state of an owner.
pub trait BehaviorState: Sized {
    /// Controller data the state reads and mutates.
    type Owner;
    /// External collaborators available during the logic tick.
    type World: ?Sized;

    /// Name for logs.
    fn name(&self) -> &'static str;

    /// Called once when the state becomes current.
    fn enter(&mut self, _owner: &mut Self::Owner) {}

    /// Logic tick: AI decisions and timers.
    fn execute(
        &mut self,
        owner: &mut Self::Owner,
        world: &mut Self::World,
        dt: f32,
    ) -> Transition<Self>;

    /// Physics tick: movement integration.
    fn fixed_execute(&mut self, _owner: &mut Self::Owner, _dt: f32) {}

    /// Called once when the state stops being current.
    fn exit(&mut self, _owner: &mut Self::Owner) {}

    /// Terminal states refuse every outgoing transition.
    fn is_terminal(&self) -> bool {
        false
    }
}

/// Holds exactly one active state after initialization.
#[derive(Debug)]
pub struct StateMachine<S> {
    current: Option<S>,
    transitions: u64,
}

impl<S> Default for StateMachine<S> {
    fn default() -> Self {
        Self {
            current: None,
            transitions: 0,
        }
    }
}

impl<S: BehaviorState> StateMachine<S> {
    /// Creates an uninitialized machine.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the first state and enters it.
    ///
    /// On an already initialized machine this behaves like
    /// [`change_state`](Self::change_state).
    pub fn initialize(&mut self, state: S, owner: &mut S::Owner) -> bool {
        if self.current.is_some() {
            warn!(state = state.name(), "state machine already initialized");
            return self.change_state(state, owner);
        }
        let mut state = state;
        debug!(state = state.name(), "initialize");
        state.enter(owner);
        self.current = Some(state);
        true
    }

    /// Exits the current state, then enters `next`.
    ///
    /// Returns false, leaving the current state untouched, when the current
    /// state is terminal or the machine is uninitialized.
    pub fn change_state(&mut self, next: S, owner: &mut S::Owner) -> bool {
        let Some(current) = self.current.as_mut() else {
            warn!(state = next.name(), "change_state on uninitialized machine");
            return false;
        };
        if current.is_terminal() {
            debug!(
                from = current.name(),
                to = next.name(),
                "transition out of terminal state refused"
            );
            return false;
        }

        debug!(from = current.name(), to = next.name(), "change state");
        current.exit(owner);
        let mut next = next;
        next.enter(owner);
        self.current = Some(next);
        self.transitions += 1;
        true
    }

    /// Runs `execute` on the current state and applies its transition.
    pub fn tick(&mut self, owner: &mut S::Owner, world: &mut S::World, dt: f32) {
        let Some(state) = self.current.as_mut() else {
            return;
        };
        if let Transition::To(next) = state.execute(owner, world, dt) {
            self.change_state(next, owner);
        }
    }

    /// Runs `fixed_execute` on the current state.
    pub fn fixed_tick(&mut self, owner: &mut S::Owner, dt: f32) {
        if let Some(state) = self.current.as_mut() {
            state.fixed_execute(owner, dt);
        }
    }

    /// Current state, `None` before initialization.
    #[must_use]
    pub const fn current(&self) -> Option<&S> {
        self.current.as_ref()
    }

    /// Name of the current state.
    #[must_use]
    pub fn current_name(&self) -> Option<&'static str> {
        self.current.as_ref().map(BehaviorState::name)
    }

    /// Returns whether `initialize` has been called.
    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.current.is_some()
    }

    /// Number of transitions applied since initialization.
    #[must_use]
    pub const fn transition_count(&self) -> u64 {
        self.transitions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Log(Vec<String>);

    #[derive(Debug, PartialEq)]
    enum Light {
        Green { ticks: u32 },
        Red,
        Broken,
    }

    impl BehaviorState for Light {
        type Owner = Log;
        type World = ();

        fn name(&self) -> &'static str {
            match self {
                Self::Green { .. } => "green",
                Self::Red => "red",
                Self::Broken => "broken",
            }
        }

        fn enter(&mut self, owner: &mut Log) {
            owner.0.push(format!("enter {}", self.name()));
        }

        fn execute(&mut self, _owner: &mut Log, _world: &mut (), _dt: f32) -> Transition<Self> {
            match self {
                Self::Green { ticks } => {
                    *ticks += 1;
                    if *ticks >= 2 {
                        Transition::To(Self::Red)
                    } else {
                        Transition::Stay
                    }
                }
                Self::Red => Transition::To(Self::Green { ticks: 0 }),
                Self::Broken => Transition::To(Self::Red),
            }
        }

        fn fixed_execute(&mut self, owner: &mut Log, _dt: f32) {
            owner.0.push(format!("fixed {}", self.name()));
        }

        fn exit(&mut self, owner: &mut Log) {
            owner.0.push(format!("exit {}", self.name()));
        }

        fn is_terminal(&self) -> bool {
            matches!(self, Self::Broken)
        }
    }

    #[test]
    fn test_exit_precedes_enter() {
        let mut log = Log::default();
        let mut machine = StateMachine::new();
        assert!(!machine.is_initialized());

        machine.initialize(Light::Green { ticks: 0 }, &mut log);
        machine.tick(&mut log, &mut (), 0.1);
        machine.tick(&mut log, &mut (), 0.1);

        assert_eq!(log.0, vec!["enter green", "exit green", "enter red"]);
        assert_eq!(machine.current_name(), Some("red"));
        assert_eq!(machine.transition_count(), 1);
    }

    #[test]
    fn test_fixed_tick_delegates_without_transition() {
        let mut log = Log::default();
        let mut machine = StateMachine::new();
        machine.fixed_tick(&mut log, 0.02);
        assert!(log.0.is_empty());

        machine.initialize(Light::Red, &mut log);
        machine.fixed_tick(&mut log, 0.02);
        assert_eq!(log.0.last().map(String::as_str), Some("fixed red"));
        assert_eq!(machine.current(), Some(&Light::Red));
    }

    #[test]
    fn test_terminal_state_refuses_transitions() {
        let mut log = Log::default();
        let mut machine = StateMachine::new();
        machine.initialize(Light::Red, &mut log);
        assert!(machine.change_state(Light::Broken, &mut log));

        assert!(!machine.change_state(Light::Red, &mut log));
        machine.tick(&mut log, &mut (), 0.1);
        assert_eq!(machine.current(), Some(&Light::Broken));
    }

    #[test]
    fn test_change_state_before_initialize_is_refused() {
        let mut log = Log::default();
        let mut machine: StateMachine<Light> = StateMachine::new();
        assert!(!machine.change_state(Light::Red, &mut log));
        assert!(machine.current().is_none());
    }

    #[test]
    fn test_second_initialize_changes_state() {
        let mut log = Log::default();
        let mut machine = StateMachine::new();
        machine.initialize(Light::Red, &mut log);
        machine.initialize(Light::Green { ticks: 0 }, &mut log);
        assert_eq!(log.0, vec!["enter red", "exit red", "enter green"]);
    }
}
