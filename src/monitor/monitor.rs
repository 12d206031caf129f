//! `PropertyMonitor`: the per-(entity, property) fan-out point.
//!
//! A monitor is created and cached by its owning entity (`Observable::monitor`)
//! and fires whenever that one property raises an unsuppressed change. It
//! fans out, in order: direct callbacks, dependent-property force-fires, and
//! command enabled-state refreshes.
//!
//! Dependent entities and commands are held weakly; dead references are
//! pruned on fire so a dropped view-model or command leaves no edge behind.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::command::Command;
use crate::observable::change::{ChangedArgs, PropertyName};
use crate::observable::entity::{ObservableInner, RegistrationError, WeakObservable};
use crate::observable::Observable;

// ---------------------------------------------------------------------------
// Callbacks
// ---------------------------------------------------------------------------

/// A registered monitor callback, in one of the two accepted shapes.
#[derive(Clone)]
pub(crate) enum MonitorCallback {
    /// Parameterless notification.
    Simple(Rc<dyn Fn()>),
    /// Detailed notification carrying the change args.
    Detailed(Rc<dyn Fn(&ChangedArgs)>),
}

// ---------------------------------------------------------------------------
// PropertyMonitor
// ---------------------------------------------------------------------------

/// Subscription object bound to one (entity, property) pair.
///
/// Remains hooked to its source entity for its entire lifetime unless
/// [`dispose`](Self::dispose)d, and never fires for another property name.
pub struct PropertyMonitor {
    property: PropertyName,
    source: Weak<ObservableInner>,
    callbacks: RefCell<Vec<MonitorCallback>>,
    dependents: RefCell<Vec<(WeakObservable, PropertyName)>>,
    commands: RefCell<Vec<Weak<dyn Command>>>,
}

impl PropertyMonitor {
    pub(crate) fn new(property: PropertyName, source: Weak<ObservableInner>) -> Self {
        Self {
            property,
            source,
            callbacks: RefCell::new(Vec::new()),
            dependents: RefCell::new(Vec::new()),
            commands: RefCell::new(Vec::new()),
        }
    }

    /// The property name this monitor watches.
    pub fn property(&self) -> PropertyName {
        self.property
    }

    /// Register a parameterless callback. Returns `self` for chaining.
    ///
    /// Callbacks fire in registration order; registering the same callback
    /// twice makes it fire twice.
    pub fn on_changed(&self, f: impl Fn() + 'static) -> &Self {
        self.callbacks
            .borrow_mut()
            .push(MonitorCallback::Simple(Rc::new(f)));
        self
    }

    /// Register a detailed callback receiving the change args.
    ///
    /// The args may carry no values when the origin force-fired the
    /// notification.
    pub fn on_changed_detailed(&self, f: impl Fn(&ChangedArgs) + 'static) -> &Self {
        self.callbacks
            .borrow_mut()
            .push(MonitorCallback::Detailed(Rc::new(f)));
        self
    }

    pub(crate) fn push_callback(&self, callback: MonitorCallback) {
        self.callbacks.borrow_mut().push(callback);
    }

    /// Register a dependent property: firing this monitor force-fires a
    /// change notification for `property` on `target`.
    ///
    /// Fails fast if `property` is not declared on `target`.
    pub fn notify_property(
        &self,
        target: &Observable,
        property: PropertyName,
    ) -> Result<&Self, RegistrationError> {
        if !target.is_defined(property) {
            return Err(RegistrationError::UnknownProperty { property });
        }
        self.dependents
            .borrow_mut()
            .push((target.downgrade(), property));
        Ok(self)
    }

    /// Register a command whose enabled state is refreshed alongside this
    /// monitor. Held weakly; the caller keeps the command alive.
    pub fn register_command(&self, command: &Rc<dyn Command>) {
        self.commands.borrow_mut().push(Rc::downgrade(command));
    }

    /// Remove a previously registered command. Unknown commands are a
    /// silent no-op.
    pub fn unregister_command(&self, command: &Rc<dyn Command>) {
        let target = Rc::as_ptr(command) as *const ();
        self.commands.borrow_mut().retain(|weak| {
            weak.upgrade()
                .is_none_or(|c| Rc::as_ptr(&c) as *const () != target)
        });
    }

    /// Number of live registered commands.
    pub fn command_count(&self) -> usize {
        self.commands
            .borrow()
            .iter()
            .filter(|w| w.strong_count() > 0)
            .count()
    }

    /// Unhook this monitor from its source entity. After disposal the
    /// monitor never fires again; a later `Observable::monitor` call creates
    /// a fresh one.
    pub fn dispose(&self) {
        if let Some(source) = self.source.upgrade() {
            source.monitors.borrow_mut().remove(self.property);
        }
    }

    /// Fan out one unsuppressed change. Lists are snapshotted first so a
    /// callback may register or rewire without observing a half-updated list.
    pub(crate) fn fire(&self, args: &ChangedArgs) {
        let callbacks: Vec<MonitorCallback> = self.callbacks.borrow().clone();
        for callback in callbacks {
            match callback {
                MonitorCallback::Simple(f) => f(),
                MonitorCallback::Detailed(f) => f(args),
            }
        }

        let dependents: Vec<(WeakObservable, PropertyName)> = {
            let mut list = self.dependents.borrow_mut();
            list.retain(|(weak, _)| weak.upgrade().is_some());
            list.clone()
        };
        for (weak, property) in dependents {
            if let Some(target) = weak.upgrade() {
                target.notify_changed(property);
            }
        }

        let commands: Vec<Rc<dyn Command>> = {
            let mut list = self.commands.borrow_mut();
            list.retain(|weak| weak.strong_count() > 0);
            list.iter().filter_map(Weak::upgrade).collect()
        };
        for command in commands {
            command.notify_enabled_changed();
        }
    }
}

impl std::fmt::Debug for PropertyMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertyMonitor")
            .field("property", &self.property)
            .field("callbacks", &self.callbacks.borrow().len())
            .field("dependents", &self.dependents.borrow().len())
            .field("commands", &self.commands.borrow().len())
            .finish()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
