//! Per-entity suppression ledger.
//!
//! Suppression temporarily silences change notifications for one property,
//! capturing the value at suppress time. Restoring removes the entry and
//! reports whether (and from what value) a reconciliation notification should
//! fire. The raise path consults [`SuppressionLedger::is_suppressed`] before
//! invoking any listener.

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::change::PropertyName;

/// A captured before-value plus a typed equality check against it.
pub(crate) struct SuppressionEntry {
    pub(crate) before: Rc<dyn Any>,
    equals_before: Box<dyn Fn(&dyn Any) -> bool>,
}

impl SuppressionEntry {
    /// Whether `current` equals the captured before-value.
    ///
    /// A type mismatch counts as "changed" so restore still reconciles.
    pub(crate) fn equals_before(&self, current: &dyn Any) -> bool {
        (self.equals_before)(current)
    }
}

/// Table of currently suppressed properties for one entity.
#[derive(Default)]
pub(crate) struct SuppressionLedger {
    entries: RefCell<HashMap<PropertyName, SuppressionEntry>>,
}

impl SuppressionLedger {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Mark `property` suppressed, capturing `current` as the before-value.
    ///
    /// Idempotent: while a suppression is active, further calls keep the
    /// first captured value and change nothing.
    pub(crate) fn suppress<T: PartialEq + Clone + 'static>(
        &self,
        property: PropertyName,
        current: T,
    ) {
        let mut entries = self.entries.borrow_mut();
        entries.entry(property).or_insert_with(|| {
            let captured = current.clone();
            SuppressionEntry {
                before: Rc::new(current),
                equals_before: Box::new(move |other: &dyn Any| {
                    other.downcast_ref::<T>().is_some_and(|v| *v == captured)
                }),
            }
        });
    }

    /// Remove and return the active entry for `property`, if any.
    pub(crate) fn take(&self, property: PropertyName) -> Option<SuppressionEntry> {
        self.entries.borrow_mut().remove(property)
    }

    /// Whether `property` is currently suppressed.
    pub(crate) fn is_suppressed(&self, property: PropertyName) -> bool {
        self.entries.borrow().contains_key(property)
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suppress_marks_property() {
        let ledger = SuppressionLedger::new();
        assert!(!ledger.is_suppressed("X"));
        ledger.suppress("X", 1_i32);
        assert!(ledger.is_suppressed("X"));
        assert!(!ledger.is_suppressed("Y"));
    }

    #[test]
    fn take_removes_entry() {
        let ledger = SuppressionLedger::new();
        ledger.suppress("X", 1_i32);
        let entry = ledger.take("X");
        assert!(entry.is_some());
        assert!(!ledger.is_suppressed("X"));
        assert!(ledger.take("X").is_none());
    }

    #[test]
    fn nested_suppress_keeps_first_value() {
        let ledger = SuppressionLedger::new();
        ledger.suppress("X", 1_i32);
        ledger.suppress("X", 99_i32);
        let entry = ledger.take("X").unwrap();
        assert_eq!(entry.before.downcast_ref::<i32>(), Some(&1));
    }

    #[test]
    fn entry_equality_against_before() {
        let ledger = SuppressionLedger::new();
        ledger.suppress("X", 5_i32);
        let entry = ledger.take("X").unwrap();
        assert!(entry.equals_before(&5_i32));
        assert!(!entry.equals_before(&6_i32));
    }

    #[test]
    fn entry_type_mismatch_counts_as_changed() {
        let ledger = SuppressionLedger::new();
        ledger.suppress("X", 5_i32);
        let entry = ledger.take("X").unwrap();
        assert!(!entry.equals_before(&"5".to_string()));
    }
}
