//! Change-notification core: observable entities, value cells, suppression.

pub mod change;
pub mod entity;
pub mod field;
mod suppression;

pub use change::{ChangedArgs, PropertyName};
pub use entity::{Observable, RegistrationError, Subscription, WeakObservable};
pub use field::Field;
