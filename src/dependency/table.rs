//! The fluent dependency-declaration surface.
//!
//! A [`DependencyTable`] is built once, in an entity's constructor, and
//! consumed by [`register`](super::register). Declarations are inert until
//! registration, which is where all validation happens.

use std::rc::Rc;

use crate::command::Command;
use crate::monitor::MonitorCallback;
use crate::observable::{ChangedArgs, PropertyName};

pub(crate) type CommandReader = Rc<dyn Fn() -> Option<Rc<dyn Command>>>;

pub(crate) enum Declaration {
    /// `target` is re-notified whenever any of `sources` changes.
    Property {
        target: PropertyName,
        sources: Vec<PropertyName>,
    },
    /// `callback` runs whenever any of `sources` changes.
    Callback {
        sources: Vec<PropertyName>,
        callback: MonitorCallback,
    },
    /// The command held in property `holder` has its enabled state refreshed
    /// by `sources`; replacing the command re-wires the edges.
    Command {
        holder: PropertyName,
        sources: Vec<PropertyName>,
        read: CommandReader,
    },
}

/// Declarative table of an entity's dependency edges.
#[derive(Default)]
pub struct DependencyTable {
    pub(crate) entries: Vec<Declaration>,
}

impl DependencyTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare that `target` depends on each of `sources` (builder).
    pub fn property(mut self, target: PropertyName, sources: &[PropertyName]) -> Self {
        self.entries.push(Declaration::Property {
            target,
            sources: sources.to_vec(),
        });
        self
    }

    /// Declare a parameterless callback run when any of `sources` changes
    /// (builder).
    pub fn callback(mut self, sources: &[PropertyName], f: impl Fn() + 'static) -> Self {
        self.entries.push(Declaration::Callback {
            sources: sources.to_vec(),
            callback: MonitorCallback::Simple(Rc::new(f)),
        });
        self
    }

    /// Declare a detailed callback receiving the change args (builder).
    ///
    /// The args carry no values for force-fired notifications; the callback
    /// must tolerate that.
    pub fn callback_detailed(
        mut self,
        sources: &[PropertyName],
        f: impl Fn(&ChangedArgs) + 'static,
    ) -> Self {
        self.entries.push(Declaration::Callback {
            sources: sources.to_vec(),
            callback: MonitorCallback::Detailed(Rc::new(f)),
        });
        self
    }

    /// Declare that the command held in `holder` is enabled-refreshed by
    /// `sources` (builder). `read` returns the currently held command.
    pub fn command(
        mut self,
        holder: PropertyName,
        sources: &[PropertyName],
        read: impl Fn() -> Option<Rc<dyn Command>> + 'static,
    ) -> Self {
        self.entries.push(Declaration::Command {
            holder,
            sources: sources.to_vec(),
            read: Rc::new(read),
        });
        self
    }

    /// Number of declarations.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no declarations.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_table_is_empty() {
        let table = DependencyTable::new();
        assert!(table.is_empty());
        assert_eq!(table.len(), 0);
    }

    #[test]
    fn builders_accumulate_entries() {
        let table = DependencyTable::new()
            .property("AgedName", &["Name", "Age"])
            .callback(&["Name"], || {})
            .callback_detailed(&["Age"], |_| {})
            .command("SaveCommand", &["Name"], || None);
        assert_eq!(table.len(), 4);
        assert!(!table.is_empty());
    }
}
