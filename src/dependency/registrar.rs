//! Registration of a dependency table against an entity.
//!
//! [`register`] is the single consumption point of a [`DependencyTable`]:
//! it validates every declaration fail-fast, then wires monitors, dependent
//! properties, callbacks, and command binders. A failing table leaves the
//! entity completely untouched.
//!
//! The declared graph is not checked for cycles, matching the data-binding
//! frameworks this models: declaring `A` dependent on `B` **and** `B`
//! dependent on `A` recurses on the first change until stack exhaustion.
//! Keeping declarations acyclic is the caller's responsibility.

use std::rc::Rc;

use crate::observable::{Observable, RegistrationError};

use super::binder::CommandBinder;
use super::table::{Declaration, DependencyTable};

// ---------------------------------------------------------------------------
// DependencyBindings
// ---------------------------------------------------------------------------

/// Inspection handle for a registered table.
///
/// The wiring itself lives on the entity's monitors and persists for the
/// entity's lifetime; dropping this handle does not unwire anything.
pub struct DependencyBindings {
    binders: Vec<Rc<CommandBinder>>,
}

impl DependencyBindings {
    /// The command binders created for `command` declarations, in
    /// declaration order.
    pub fn binders(&self) -> &[Rc<CommandBinder>] {
        &self.binders
    }
}

impl std::fmt::Debug for DependencyBindings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DependencyBindings")
            .field("binders", &self.binders.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// register
// ---------------------------------------------------------------------------

/// Consume `table`, wiring every declaration against `entity`.
///
/// Validation is all-or-nothing: every declaration is checked before any
/// wiring happens, so a configuration error leaves no partial registration
/// behind.
pub fn register(
    entity: &Observable,
    table: DependencyTable,
) -> Result<DependencyBindings, RegistrationError> {
    for entry in &table.entries {
        validate(entity, entry)?;
    }

    let mut binders = Vec::new();
    for entry in table.entries {
        match entry {
            Declaration::Property { target, sources } => {
                for source in sources {
                    entity.monitor(source)?.notify_property(entity, target)?;
                }
            }
            Declaration::Callback { sources, callback } => {
                for source in sources {
                    entity.monitor(source)?.push_callback(callback.clone());
                }
            }
            Declaration::Command {
                holder,
                sources,
                read,
            } => {
                binders.push(CommandBinder::bind(entity, holder, sources, read)?);
            }
        }
    }
    Ok(DependencyBindings { binders })
}

fn validate(entity: &Observable, entry: &Declaration) -> Result<(), RegistrationError> {
    let (sources, target) = match entry {
        Declaration::Property { target, sources } => (sources, Some(*target)),
        Declaration::Callback { sources, .. } => (sources, None),
        Declaration::Command {
            holder, sources, ..
        } => (sources, Some(*holder)),
    };
    if sources.is_empty() {
        return Err(RegistrationError::EmptyDependencyList);
    }
    for &source in sources {
        if !entity.is_defined(source) {
            return Err(RegistrationError::UnknownProperty { property: source });
        }
    }
    if let Some(target) = target {
        if !entity.is_defined(target) {
            return Err(RegistrationError::UnknownProperty { property: target });
        }
    }
    Ok(())
}

// ===========================================================================
// Tests
// ===========================================================================
