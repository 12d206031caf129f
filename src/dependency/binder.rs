//! Re-wiring of command dependency edges across command replacement.
//!
//! A command-holding property can be assigned a new command object at any
//! time. The edges "this command's enabled state depends on these
//! properties" are registrations against the *command object*, so a plain
//! assignment would leave them pointing at the old instance. The
//! [`CommandBinder`] watches the holder property and swaps the registrations
//! on every change.

use std::cell::RefCell;
use std::rc::Rc;

use crate::command::Command;
use crate::observable::{Observable, PropertyName, RegistrationError, WeakObservable};

use super::table::CommandReader;

/// Keeps the command held in one property registered against its declared
/// source-property monitors, across replacements of the command object.
pub struct CommandBinder {
    entity: WeakObservable,
    holder: PropertyName,
    sources: Vec<PropertyName>,
    /// The command currently registered on the source monitors — exactly
    /// what `detach` must unregister, independent of what `read` returns now.
    current: RefCell<Option<Rc<dyn Command>>>,
    read: CommandReader,
}

impl CommandBinder {
    /// Wire up re-binding for the command held in `holder`.
    ///
    /// Registers the currently held command immediately and re-wires on
    /// every change of `holder`. All property names are validated fail-fast.
    pub fn bind(
        entity: &Observable,
        holder: PropertyName,
        sources: Vec<PropertyName>,
        read: CommandReader,
    ) -> Result<Rc<Self>, RegistrationError> {
        if sources.is_empty() {
            return Err(RegistrationError::EmptyDependencyList);
        }
        if !entity.is_defined(holder) {
            return Err(RegistrationError::UnknownProperty { property: holder });
        }
        for &source in &sources {
            if !entity.is_defined(source) {
                return Err(RegistrationError::UnknownProperty { property: source });
            }
        }

        let binder = Rc::new(Self {
            entity: entity.downgrade(),
            holder,
            sources,
            current: RefCell::new(None),
            read,
        });
        binder.attach((binder.read)());

        let hook = binder.clone();
        entity.monitor(holder)?.on_changed(move || hook.rewire());
        Ok(binder)
    }

    /// The command currently registered on the source monitors.
    pub fn current(&self) -> Option<Rc<dyn Command>> {
        self.current.borrow().clone()
    }

    /// The property names this binder registers commands against.
    pub fn sources(&self) -> &[PropertyName] {
        &self.sources
    }

    /// Drop the current registrations and register the freshly read command.
    ///
    /// Safe under rapid replacement: each rewire unregisters exactly what
    /// the previous one registered.
    pub fn rewire(&self) {
        self.detach();
        let next = (self.read)();
        tracing::debug!(
            holder = self.holder,
            attached = next.is_some(),
            "command dependency rewired"
        );
        self.attach(next);
    }

    /// Unregister the current command from every source monitor, leaving
    /// nothing registered.
    pub fn detach(&self) {
        let Some(command) = self.current.borrow_mut().take() else {
            return;
        };
        let Some(entity) = self.entity.upgrade() else {
            return;
        };
        for &source in &self.sources {
            let monitor = entity.monitor(source).expect("source validated at bind");
            monitor.unregister_command(&command);
        }
    }

    fn attach(&self, command: Option<Rc<dyn Command>>) {
        let Some(command) = command else {
            return;
        };
        let Some(entity) = self.entity.upgrade() else {
            return;
        };
        for &source in &self.sources {
            let monitor = entity.monitor(source).expect("source validated at bind");
            monitor.register_command(&command);
        }
        *self.current.borrow_mut() = Some(command);
    }
}

impl std::fmt::Debug for CommandBinder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandBinder")
            .field("holder", &self.holder)
            .field("sources", &self.sources)
            .field("attached", &self.current.borrow().is_some())
            .finish()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
