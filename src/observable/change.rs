//! Change-event payloads: property names and [`ChangedArgs`].
//!
//! A change notification carries the property name and, when the origin
//! captured them, the old and new values as type-erased `Rc<dyn Any>`.
//! Force-fired notifications (see `Observable::notify_changed`) carry no
//! values — consumers must tolerate `None` on both sides.

use std::any::Any;
use std::rc::Rc;

/// Property names are static string keys, declared once per entity.
pub type PropertyName = &'static str;

// ---------------------------------------------------------------------------
// ChangedArgs
// ---------------------------------------------------------------------------

/// Detailed payload of a property-change notification.
#[derive(Clone)]
pub struct ChangedArgs {
    /// The property that changed.
    pub property: PropertyName,
    /// Value before the change, if the origin captured it.
    pub old: Option<Rc<dyn Any>>,
    /// Value after the change, if the origin captured it.
    pub new: Option<Rc<dyn Any>>,
}

impl ChangedArgs {
    /// Create args carrying both values.
    pub fn with_values<T: 'static>(property: PropertyName, old: T, new: T) -> Self {
        Self {
            property,
            old: Some(Rc::new(old)),
            new: Some(Rc::new(new)),
        }
    }

    /// Create args for a force-fired notification with no captured values.
    pub fn name_only(property: PropertyName) -> Self {
        Self {
            property,
            old: None,
            new: None,
        }
    }

    /// Downcast the old value to a concrete type.
    ///
    /// Returns `None` when no value was captured or the type does not match.
    pub fn old_as<T: 'static>(&self) -> Option<&T> {
        self.old.as_deref().and_then(|v| v.downcast_ref::<T>())
    }

    /// Downcast the new value to a concrete type.
    ///
    /// Returns `None` when no value was captured or the type does not match.
    pub fn new_as<T: 'static>(&self) -> Option<&T> {
        self.new.as_deref().and_then(|v| v.downcast_ref::<T>())
    }

    /// Whether this notification carries captured values.
    pub fn has_values(&self) -> bool {
        self.old.is_some() || self.new.is_some()
    }
}

impl std::fmt::Debug for ChangedArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangedArgs")
            .field("property", &self.property)
            .field("old", &self.old.as_ref().map(|_| "<value>"))
            .field("new", &self.new.as_ref().map(|_| "<value>"))
            .finish()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
