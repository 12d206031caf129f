//! Relay, typed, and event-driven command implementations.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::observable::Subscription;

use super::traits::{Command, CommandParam, EnabledChanged};

// ---------------------------------------------------------------------------
// RelayCommand
// ---------------------------------------------------------------------------

/// Closure-backed command: always enabled, or gated by a predicate.
pub struct RelayCommand {
    action: Box<dyn Fn(CommandParam)>,
    predicate: Option<Box<dyn Fn(&CommandParam) -> bool>>,
    enabled_changed: EnabledChanged,
}

impl RelayCommand {
    /// Create an always-enabled relay command.
    pub fn new(action: impl Fn(CommandParam) + 'static) -> Self {
        Self {
            action: Box::new(action),
            predicate: None,
            enabled_changed: EnabledChanged::new(),
        }
    }

    /// Create a relay command gated by `predicate`.
    pub fn with_can_execute(
        action: impl Fn(CommandParam) + 'static,
        predicate: impl Fn(&CommandParam) -> bool + 'static,
    ) -> Self {
        Self {
            action: Box::new(action),
            predicate: Some(Box::new(predicate)),
            enabled_changed: EnabledChanged::new(),
        }
    }
}

impl Command for RelayCommand {
    fn can_execute(&self, parameter: &CommandParam) -> bool {
        self.predicate.as_ref().map_or(true, |p| p(parameter))
    }

    fn execute(&self, parameter: CommandParam) {
        (self.action)(parameter);
    }

    fn enabled_changed(&self) -> &EnabledChanged {
        &self.enabled_changed
    }
}

impl std::fmt::Debug for RelayCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayCommand")
            .field("gated", &self.predicate.is_some())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// TypedRelayCommand
// ---------------------------------------------------------------------------

/// Relay command over a concrete parameter type.
///
/// Disabled (and a no-op on execute) when the parameter is absent or not a
/// `P` — a wrongly-typed binding cannot invoke the action.
pub struct TypedRelayCommand<P: 'static> {
    action: Box<dyn Fn(&P)>,
    predicate: Option<Box<dyn Fn(&P) -> bool>>,
    enabled_changed: EnabledChanged,
}

impl<P: 'static> TypedRelayCommand<P> {
    /// Create a typed command enabled for any well-typed parameter.
    pub fn new(action: impl Fn(&P) + 'static) -> Self {
        Self {
            action: Box::new(action),
            predicate: None,
            enabled_changed: EnabledChanged::new(),
        }
    }

    /// Create a typed command gated by `predicate` over the parameter.
    pub fn with_can_execute(
        action: impl Fn(&P) + 'static,
        predicate: impl Fn(&P) -> bool + 'static,
    ) -> Self {
        Self {
            action: Box::new(action),
            predicate: Some(Box::new(predicate)),
            enabled_changed: EnabledChanged::new(),
        }
    }

    fn downcast(parameter: &CommandParam) -> Option<&P> {
        parameter.as_deref().and_then(|p| p.downcast_ref::<P>())
    }
}

impl<P: 'static> Command for TypedRelayCommand<P> {
    fn can_execute(&self, parameter: &CommandParam) -> bool {
        match Self::downcast(parameter) {
            Some(value) => self.predicate.as_ref().map_or(true, |p| p(value)),
            None => false,
        }
    }

    fn execute(&self, parameter: CommandParam) {
        if let Some(value) = Self::downcast(&parameter) {
            (self.action)(value);
        }
    }

    fn enabled_changed(&self) -> &EnabledChanged {
        &self.enabled_changed
    }
}

// ---------------------------------------------------------------------------
// EventCommand
// ---------------------------------------------------------------------------

/// Event-driven command: execution raises a subscriber list instead of a
/// single owned action, so multiple handlers can observe one command.
#[derive(Default)]
pub struct EventCommand {
    executed: RefCell<Vec<(u64, Rc<dyn Fn(&CommandParam)>)>>,
    next: Cell<u64>,
    enabled_changed: EnabledChanged,
}

impl EventCommand {
    /// Create an event command with no handlers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an execution handler; fires on every `execute`.
    pub fn on_executed(&self, f: impl Fn(&CommandParam) + 'static) -> Subscription {
        let id = self.next.get();
        self.next.set(id + 1);
        self.executed.borrow_mut().push((id, Rc::new(f)));
        Subscription::from_raw(id)
    }

    /// Remove an execution handler. Returns `false` if it was not found.
    pub fn remove_handler(&self, subscription: Subscription) -> bool {
        let mut handlers = self.executed.borrow_mut();
        let before = handlers.len();
        handlers.retain(|(id, _)| *id != subscription.raw());
        handlers.len() != before
    }
}

impl Command for EventCommand {
    fn can_execute(&self, _parameter: &CommandParam) -> bool {
        true
    }

    fn execute(&self, parameter: CommandParam) {
        let handlers: Vec<Rc<dyn Fn(&CommandParam)>> = self
            .executed
            .borrow()
            .iter()
            .map(|(_, f)| f.clone())
            .collect();
        for handler in handlers {
            handler(&parameter);
        }
    }

    fn enabled_changed(&self) -> &EnabledChanged {
        &self.enabled_changed
    }
}

// ===========================================================================
// Tests
// ===========================================================================
