//! Validation adapter: closure rules re-run through property monitors.
//!
//! The adapter's only coupling to the engine is the property-changed event
//! the engine already manages — a rule for property `P` re-runs whenever
//! `P`'s monitor fires. Rule authoring itself stays with the application:
//! a rule is any closure from change args to an optional error message.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use crate::observable::{
    ChangedArgs, Observable, PropertyName, RegistrationError, Subscription, WeakObservable,
};

type Rule = Rc<dyn Fn(&ChangedArgs) -> Option<String>>;

/// Per-entity validation state: rules, current errors, and an
/// errors-changed event.
///
/// Lives as long as the entity it watches — the monitor hooks hold the
/// adapter strongly, the adapter holds the entity weakly.
pub struct ValidationAdapter {
    entity: WeakObservable,
    rules: RefCell<HashMap<PropertyName, Vec<Rule>>>,
    errors: RefCell<HashMap<PropertyName, Vec<String>>>,
    errors_changed: RefCell<Vec<(u64, Rc<dyn Fn(PropertyName)>)>>,
    next_listener: Cell<u64>,
}

impl ValidationAdapter {
    /// Create an adapter for `entity` with no rules.
    pub fn new(entity: &Observable) -> Rc<Self> {
        Rc::new(Self {
            entity: entity.downgrade(),
            rules: RefCell::new(HashMap::new()),
            errors: RefCell::new(HashMap::new()),
            errors_changed: RefCell::new(Vec::new()),
            next_listener: Cell::new(0),
        })
    }

    /// Attach a rule to `property`. Fails fast if the property is not
    /// declared on the entity.
    ///
    /// The rule re-runs on every change of the property; returning
    /// `Some(message)` records an error, `None` records none. Change args
    /// may carry no values (force-fired notifications).
    pub fn rule(
        self: &Rc<Self>,
        property: PropertyName,
        f: impl Fn(&ChangedArgs) -> Option<String> + 'static,
    ) -> Result<(), RegistrationError> {
        let Some(entity) = self.entity.upgrade() else {
            return Ok(());
        };
        if !entity.is_defined(property) {
            return Err(RegistrationError::UnknownProperty { property });
        }

        let first_rule = {
            let mut rules = self.rules.borrow_mut();
            let list = rules.entry(property).or_default();
            list.push(Rc::new(f));
            list.len() == 1
        };
        if first_rule {
            let adapter = self.clone();
            entity
                .monitor(property)?
                .on_changed_detailed(move |args| adapter.revalidate(args));
        }
        Ok(())
    }

    /// Re-run the rules for one property with explicit args.
    ///
    /// Usually driven by the monitor hook; callable directly to force a
    /// validation pass without an underlying change.
    pub fn revalidate(&self, args: &ChangedArgs) {
        let rules: Vec<Rule> = self
            .rules
            .borrow()
            .get(args.property)
            .map(|list| list.clone())
            .unwrap_or_default();
        let messages: Vec<String> = rules.iter().filter_map(|rule| rule(args)).collect();

        let changed = {
            let mut errors = self.errors.borrow_mut();
            let previous = errors.get(args.property);
            if previous.map_or(messages.is_empty(), |p| *p == messages) {
                false
            } else {
                if messages.is_empty() {
                    errors.remove(args.property);
                } else {
                    errors.insert(args.property, messages);
                }
                true
            }
        };
        if changed {
            let listeners: Vec<Rc<dyn Fn(PropertyName)>> = self
                .errors_changed
                .borrow()
                .iter()
                .map(|(_, f)| f.clone())
                .collect();
            for listener in listeners {
                listener(args.property);
            }
        }
    }

    /// Force a validation pass for `property` without captured values.
    pub fn revalidate_property(&self, property: PropertyName) {
        self.revalidate(&ChangedArgs::name_only(property));
    }

    /// Current error messages for `property`. Empty when valid.
    pub fn errors(&self, property: PropertyName) -> Vec<String> {
        self.errors
            .borrow()
            .get(property)
            .cloned()
            .unwrap_or_default()
    }

    /// Whether any property currently has errors.
    pub fn has_errors(&self) -> bool {
        !self.errors.borrow().is_empty()
    }

    /// Register a listener fired with the property name whenever a
    /// property's error set changes.
    pub fn on_errors_changed(&self, f: impl Fn(PropertyName) + 'static) -> Subscription {
        let id = self.next_listener.get();
        self.next_listener.set(id + 1);
        self.errors_changed.borrow_mut().push((id, Rc::new(f)));
        Subscription::from_raw(id)
    }

    /// Remove an errors-changed listener.
    pub fn unsubscribe_errors_changed(&self, subscription: Subscription) -> bool {
        let mut listeners = self.errors_changed.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(id, _)| *id != subscription.raw());
        listeners.len() != before
    }
}

impl std::fmt::Debug for ValidationAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidationAdapter")
            .field("rules", &self.rules.borrow().len())
            .field("properties_with_errors", &self.errors.borrow().len())
            .finish()
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn person() -> (Observable, crate::observable::Field<String>) {
        let entity = Observable::new();
        let name = entity.field("Name", String::new());
        (entity, name)
    }

    fn require_name(args: &ChangedArgs) -> Option<String> {
        match args.new_as::<String>() {
            Some(value) if value.is_empty() => Some("name must not be empty".into()),
            Some(_) => None,
            None => None,
        }
    }

    #[test]
    fn rule_on_undeclared_property_fails() {
        let (entity, _name) = person();
        let adapter = ValidationAdapter::new(&entity);
        let err = adapter.rule("Nope", |_| None).unwrap_err();
        assert_eq!(err, RegistrationError::UnknownProperty { property: "Nope" });
    }

    #[test]
    fn rule_runs_on_property_change() {
        let (entity, name) = person();
        let adapter = ValidationAdapter::new(&entity);
        adapter.rule("Name", require_name).unwrap();

        name.set("Klaus".into());
        assert!(!adapter.has_errors());

        name.set(String::new());
        assert!(adapter.has_errors());
        assert_eq!(adapter.errors("Name"), vec!["name must not be empty"]);
    }

    #[test]
    fn clearing_the_error_empties_the_set() {
        let (entity, name) = person();
        let adapter = ValidationAdapter::new(&entity);
        adapter.rule("Name", require_name).unwrap();

        name.set(String::new());
        assert!(adapter.has_errors());
        name.set("Klaus".into());
        assert!(!adapter.has_errors());
        assert!(adapter.errors("Name").is_empty());
    }

    #[test]
    fn errors_changed_fires_only_on_set_transitions() {
        let (entity, name) = person();
        let adapter = ValidationAdapter::new(&entity);
        adapter.rule("Name", require_name).unwrap();

        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        adapter.on_errors_changed(move |property| {
            assert_eq!(property, "Name");
            h.set(h.get() + 1);
        });

        name.set("Klaus".into()); // valid -> valid: no transition
        assert_eq!(hits.get(), 0);
        name.set(String::new()); // valid -> invalid
        assert_eq!(hits.get(), 1);
        name.set("x".into()); // invalid -> valid
        assert_eq!(hits.get(), 2);
        name.set("y".into()); // valid -> valid
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn multiple_rules_accumulate_messages() {
        let (entity, name) = person();
        let adapter = ValidationAdapter::new(&entity);
        adapter.rule("Name", require_name).unwrap();
        adapter
            .rule("Name", |args| {
                args.new_as::<String>()
                    .and_then(|v| (v.len() < 2).then(|| "name too short".to_string()))
            })
            .unwrap();

        name.set("K".into());
        assert_eq!(adapter.errors("Name"), vec!["name too short"]);
        // Set twice so both rules fail at once, in rule order.
        name.set("x".into());
        name.set(String::new());
        assert_eq!(
            adapter.errors("Name"),
            vec!["name must not be empty", "name too short"]
        );
    }

    #[test]
    fn rules_tolerate_force_fired_changes() {
        let (entity, _name) = person();
        let adapter = ValidationAdapter::new(&entity);
        adapter.rule("Name", require_name).unwrap();

        entity.notify_changed("Name");
        assert!(!adapter.has_errors());
    }

    #[test]
    fn revalidate_property_forces_a_pass() {
        let (entity, _name) = person();
        let adapter = ValidationAdapter::new(&entity);
        adapter
            .rule("Name", |args| {
                (!args.has_values()).then(|| "no values captured".to_string())
            })
            .unwrap();

        adapter.revalidate_property("Name");
        assert_eq!(adapter.errors("Name"), vec!["no values captured"]);
    }

    #[test]
    fn unsubscribe_errors_changed_stops_delivery() {
        let (entity, name) = person();
        let adapter = ValidationAdapter::new(&entity);
        adapter.rule("Name", require_name).unwrap();

        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        let sub = adapter.on_errors_changed(move |_| h.set(h.get() + 1));
        name.set(String::new());
        assert_eq!(hits.get(), 1);
        assert!(adapter.unsubscribe_errors_changed(sub));
        name.set("Klaus".into());
        assert_eq!(hits.get(), 1);
    }
}
