//! `Field<T>`: the minimal change-notification primitive.
//!
//! A field holds one named value for an owning entity. Writing an equal value
//! is silently dropped; a real change stores the value first, then raises an
//! old/new notification through the owner, so callbacks reading the field
//! during the cascade observe the new value.

use std::cell::RefCell;

use super::change::{ChangedArgs, PropertyName};
use super::entity::WeakObservable;

/// A named value cell owned by one observable entity.
///
/// Obtained from `Observable::field`, which also declares the property name.
pub struct Field<T> {
    name: PropertyName,
    value: RefCell<T>,
    owner: WeakObservable,
}

impl<T: PartialEq + Clone + 'static> Field<T> {
    pub(crate) fn new(name: PropertyName, initial: T, owner: WeakObservable) -> Self {
        Self {
            name,
            value: RefCell::new(initial),
            owner,
        }
    }

    /// The declared property name.
    pub fn name(&self) -> PropertyName {
        self.name
    }

    /// Clone out the current value.
    pub fn get(&self) -> T {
        self.value.borrow().clone()
    }

    /// Read by reference without cloning.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.value.borrow())
    }

    /// Write a new value, raising an old/new notification on a real change.
    ///
    /// Returns `false` (and fires nothing) when the new value equals the
    /// current one. The stored value is updated before the notification
    /// cascade starts.
    pub fn set(&self, value: T) -> bool {
        let old = {
            let mut current = self.value.borrow_mut();
            if *current == value {
                return false;
            }
            std::mem::replace(&mut *current, value.clone())
        };
        if let Some(owner) = self.owner.upgrade() {
            owner.raise(ChangedArgs::with_values(self.name, old, value));
        }
        true
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Field<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("value", &self.value.borrow())
            .finish()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
