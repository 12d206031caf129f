//! Commands: the object-safe contract, relay variants, and async execution.

pub mod async_command;
pub mod gate;
pub mod relay;
pub mod traits;

pub use async_command::{AsyncCommand, ExecutionError, HandlerResult};
pub use gate::{AsyncExecutionGate, GateError, IS_BUSY};
pub use relay::{EventCommand, RelayCommand, TypedRelayCommand};
pub use traits::{Command, CommandParam, EnabledChanged};
