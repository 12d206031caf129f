//! The observable-entity core: declared properties, raw listeners, the
//! monitor cache, and the raise path.
//!
//! [`Observable`] is a cloneable handle embedded in each view-model. Property
//! names are declared up front (directly via [`Observable::define`] or
//! implicitly by [`Observable::field`]); registration against an undeclared
//! name fails fast with [`RegistrationError::UnknownProperty`] rather than
//! silently never firing.
//!
//! All notification propagation is synchronous and recursive on the calling
//! thread. Listener lists are snapshotted before invocation, so re-entrant
//! registration from inside a callback never observes a half-updated list.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::{Rc, Weak};

use super::change::{ChangedArgs, PropertyName};
use super::field::Field;
use super::suppression::SuppressionLedger;
use crate::monitor::PropertyMonitor;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Configuration errors raised at registration time, never deferred to
/// first use.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationError {
    /// A registration named a property the target entity never declared.
    #[error("property {property:?} is not declared on the target entity")]
    UnknownProperty {
        /// The offending property name.
        property: PropertyName,
    },
    /// A dependency declaration named no source properties.
    #[error("dependency declaration names no source properties")]
    EmptyDependencyList,
}

// ---------------------------------------------------------------------------
// Subscription
// ---------------------------------------------------------------------------

/// Token identifying one registered listener, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

impl Subscription {
    pub(crate) fn from_raw(id: u64) -> Self {
        Self(id)
    }

    pub(crate) fn raw(self) -> u64 {
        self.0
    }
}

// ---------------------------------------------------------------------------
// Observable
// ---------------------------------------------------------------------------

pub(crate) struct ObservableInner {
    properties: RefCell<HashSet<PropertyName>>,
    listeners: RefCell<Vec<(u64, Rc<dyn Fn(&ChangedArgs)>)>>,
    pub(crate) monitors: RefCell<HashMap<PropertyName, Rc<PropertyMonitor>>>,
    ledger: SuppressionLedger,
    next_listener: Cell<u64>,
}

impl ObservableInner {
    /// Deliver a change notification: raw listeners first (in registration
    /// order), then the property's monitor if one exists. Suppressed
    /// properties deliver nothing.
    pub(crate) fn raise(&self, args: &ChangedArgs) {
        if self.ledger.is_suppressed(args.property) {
            return;
        }
        let listeners: Vec<Rc<dyn Fn(&ChangedArgs)>> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, f)| f.clone())
            .collect();
        for listener in listeners {
            listener(args);
        }
        let monitor = self.monitors.borrow().get(args.property).cloned();
        if let Some(monitor) = monitor {
            monitor.fire(args);
        }
    }
}

/// Cloneable handle to an entity's change-notification core.
///
/// Cloning the handle shares the same listener list, monitor cache, and
/// suppression ledger.
#[derive(Clone)]
pub struct Observable {
    inner: Rc<ObservableInner>,
}

/// Non-owning form of [`Observable`], held by monitors and binders so a
/// dropped entity never keeps its dependency graph alive.
#[derive(Clone)]
pub struct WeakObservable {
    inner: Weak<ObservableInner>,
}

impl WeakObservable {
    /// Attempt to upgrade back to a strong handle.
    pub fn upgrade(&self) -> Option<Observable> {
        self.inner.upgrade().map(|inner| Observable { inner })
    }
}

impl Observable {
    /// Create a new entity core with no declared properties.
    pub fn new() -> Self {
        Self {
            inner: Rc::new(ObservableInner {
                properties: RefCell::new(HashSet::new()),
                listeners: RefCell::new(Vec::new()),
                monitors: RefCell::new(HashMap::new()),
                ledger: SuppressionLedger::new(),
                next_listener: Cell::new(0),
            }),
        }
    }

    /// Declare a property name on this entity. Idempotent.
    pub fn define(&self, property: PropertyName) {
        self.inner.properties.borrow_mut().insert(property);
    }

    /// Whether `property` has been declared.
    pub fn is_defined(&self, property: PropertyName) -> bool {
        self.inner.properties.borrow().contains(property)
    }

    /// Declare `name` and create a value cell for it.
    pub fn field<T: PartialEq + Clone + 'static>(&self, name: PropertyName, initial: T) -> Field<T> {
        self.define(name);
        Field::new(name, initial, self.downgrade())
    }

    /// Downgrade to a non-owning handle.
    pub fn downgrade(&self) -> WeakObservable {
        WeakObservable {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Whether two handles refer to the same entity core.
    pub fn same_entity(&self, other: &Observable) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    // -- listeners ---------------------------------------------------------

    /// Register an entity-wide listener fired for every unsuppressed change.
    pub fn subscribe(&self, f: impl Fn(&ChangedArgs) + 'static) -> Subscription {
        let id = self.inner.next_listener.get();
        self.inner.next_listener.set(id + 1);
        self.inner.listeners.borrow_mut().push((id, Rc::new(f)));
        Subscription(id)
    }

    /// Remove a previously registered listener.
    ///
    /// Returns `false` if the subscription was not found.
    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        let mut listeners = self.inner.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(id, _)| *id != subscription.0);
        listeners.len() != before
    }

    // -- raising -----------------------------------------------------------

    /// Deliver a change notification with captured old/new values.
    pub fn raise(&self, args: ChangedArgs) {
        self.inner.raise(&args);
    }

    /// Force-fire a change notification for `property` with no captured
    /// values. Detailed callbacks observe `None` on both sides.
    pub fn notify_changed(&self, property: PropertyName) {
        self.inner.raise(&ChangedArgs::name_only(property));
    }

    // -- monitors ----------------------------------------------------------

    /// Obtain the monitor for `property`, creating and caching it on first
    /// request. Repeated requests return the same instance.
    pub fn monitor(&self, property: PropertyName) -> Result<Rc<PropertyMonitor>, RegistrationError> {
        if !self.is_defined(property) {
            return Err(RegistrationError::UnknownProperty { property });
        }
        let mut monitors = self.inner.monitors.borrow_mut();
        let monitor = monitors
            .entry(property)
            .or_insert_with(|| {
                Rc::new(PropertyMonitor::new(property, Rc::downgrade(&self.inner)))
            })
            .clone();
        Ok(monitor)
    }

    // -- suppression -------------------------------------------------------

    /// Silence notifications for `property`, capturing `current` as the
    /// before-value. Idempotent while a suppression is active.
    pub fn suppress<T: PartialEq + Clone + 'static>(&self, property: PropertyName, current: T) {
        self.inner.ledger.suppress(property, current);
    }

    /// Lift an active suppression.
    ///
    /// Fires one reconciliation notification (captured-before -> `current`)
    /// only if the value changed while suppressed. Without an active
    /// suppression this is a silent no-op.
    pub fn restore<T: PartialEq + Clone + 'static>(&self, property: PropertyName, current: T) {
        let Some(entry) = self.inner.ledger.take(property) else {
            return;
        };
        if !entry.equals_before(&current) {
            self.raise(ChangedArgs {
                property,
                old: Some(entry.before),
                new: Some(Rc::new(current)),
            });
        }
    }

    /// Whether `property` is currently suppressed.
    pub fn is_suppressed(&self, property: PropertyName) -> bool {
        self.inner.ledger.is_suppressed(property)
    }

    /// Run `action` with `property` suppressed, then reconcile.
    ///
    /// Any number of writes inside `action` collapse to at most one observed
    /// change; none fires if the final value equals the starting value.
    pub fn run_suppressed<T: PartialEq + Clone + 'static>(
        &self,
        property: PropertyName,
        current: impl Fn() -> T,
        action: impl FnOnce(),
    ) {
        self.suppress(property, current());
        action();
        self.restore(property, current());
    }
}

impl Default for Observable {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Observable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observable")
            .field("properties", &self.inner.properties.borrow().len())
            .field("listeners", &self.inner.listeners.borrow().len())
            .field("monitors", &self.inner.monitors.borrow().len())
            .finish()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
