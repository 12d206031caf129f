//! # bindery
//!
//! MVVM data-binding support for retained-mode GUI applications.
//!
//! bindery gives view-models a change-notification core, a declarative
//! property-dependency graph ("property X depends on properties Y, Z"),
//! commands wired to enable/disable state, async execution with busy
//! tracking and cooperative cancellation, tree-structured view-model
//! helpers, and a validation adapter. Everything is single-threaded and
//! synchronous: notifications cascade on the calling thread, in the same
//! call stack as the property write that started them.
//!
//! ## Core Systems
//!
//! - **[`observable`]** — Observable entities, value cells, suppression ledger
//! - **[`monitor`]** — Per-(entity, property) monitors: the fan-out points of the graph
//! - **[`dependency`]** — Declarative dependency table, registrar, command re-binding
//! - **[`command`]** — Command contract, relay/typed/event variants, async busy gate
//! - **[`tree`]** — Slotmap-backed tree view-models with notification bubbling
//! - **[`validation`]** — Closure-rule validation re-driven by property changes

// Change notification
pub mod observable;

// Dependency graph
pub mod dependency;
pub mod monitor;

// Commands
pub mod command;

// View-model helpers
pub mod tree;
pub mod validation;
