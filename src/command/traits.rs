//! The object-safe command contract and its enabled-changed event.
//!
//! Commands are polymorphic over relay, typed, event-driven, and async-gated
//! implementations; consumers hold them as `Rc<dyn Command>`. Parameters are
//! type-erased (`Option<Rc<dyn Any>>`) so the contract stays object-safe.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::observable::Subscription;

/// Type-erased command parameter. `None` models a parameterless invocation.
pub type CommandParam = Option<Rc<dyn Any>>;

// ---------------------------------------------------------------------------
// Command
// ---------------------------------------------------------------------------

/// Object-safe command contract.
pub trait Command {
    /// Whether the command may currently execute with `parameter`.
    fn can_execute(&self, parameter: &CommandParam) -> bool;

    /// Execute the command.
    fn execute(&self, parameter: CommandParam);

    /// The enabled-state-changed event of this command.
    fn enabled_changed(&self) -> &EnabledChanged;

    /// Signal that `can_execute` may now answer differently.
    ///
    /// Fired by property monitors when a declared dependency changes.
    fn notify_enabled_changed(&self) {
        self.enabled_changed().raise();
    }
}

// ---------------------------------------------------------------------------
// EnabledChanged
// ---------------------------------------------------------------------------

/// Subscriber list backing a command's enabled-state-changed event.
#[derive(Default)]
pub struct EnabledChanged {
    listeners: RefCell<Vec<(u64, Rc<dyn Fn()>)>>,
    next: Cell<u64>,
}

impl EnabledChanged {
    /// Create an empty event.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener; fires on every `raise`.
    pub fn subscribe(&self, f: impl Fn() + 'static) -> Subscription {
        let id = self.next.get();
        self.next.set(id + 1);
        self.listeners.borrow_mut().push((id, Rc::new(f)));
        Subscription::from_raw(id)
    }

    /// Remove a listener. Returns `false` if it was not found.
    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(id, _)| *id != subscription.raw());
        listeners.len() != before
    }

    /// Invoke all listeners in registration order.
    ///
    /// The list is snapshotted first, so listeners may subscribe or
    /// unsubscribe re-entrantly.
    pub fn raise(&self) {
        let listeners: Vec<Rc<dyn Fn()>> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, f)| f.clone())
            .collect();
        for listener in listeners {
            listener();
        }
    }
}

impl std::fmt::Debug for EnabledChanged {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnabledChanged")
            .field("listeners", &self.listeners.borrow().len())
            .finish()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
