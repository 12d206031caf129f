//! Declarative property-dependency graph: declaration table, registrar,
//! and command re-binding.

pub mod binder;
pub mod registrar;
pub mod table;

pub use binder::CommandBinder;
pub use registrar::{register, DependencyBindings};
pub use table::DependencyTable;
