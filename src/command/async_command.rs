//! Async-gated command execution.
//!
//! [`AsyncCommand`] couples an async handler to an [`AsyncExecutionGate`]:
//! `run` prepares the gate (busy before the first await), awaits the handler
//! with the gate's cancellation token, finalizes on every exit path, then
//! routes a handler error through the optional exception handler. Errors the
//! handler does not claim propagate to the caller as [`ExecutionError`].

use std::cell::RefCell;
use std::error::Error;
use std::future::Future;
use std::pin::Pin;
use std::rc::{Rc, Weak};

use tokio_util::sync::CancellationToken;

use super::gate::{AsyncExecutionGate, IS_BUSY};
use super::traits::{Command, CommandParam, EnabledChanged};

type BoxedHandler = Box<
    dyn Fn(CommandParam, CancellationToken) -> Pin<Box<dyn Future<Output = HandlerResult>>>,
>;

/// What an async handler returns; the error side is routed through the
/// optional exception handler before propagating.
pub type HandlerResult = Result<(), Box<dyn Error>>;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failure of one async command execution.
#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    /// An execution is already in flight on this command's gate.
    #[error("async command is already executing")]
    AlreadyBusy,
    /// The handler failed and no exception handler claimed the error.
    #[error("command handler failed: {0}")]
    Handler(Box<dyn Error>),
}

// ---------------------------------------------------------------------------
// AsyncCommand
// ---------------------------------------------------------------------------

/// A command whose execution is an async operation guarded by a busy gate.
///
/// Enabled exactly while the gate is idle; `Command::execute` spawns the
/// async run on the current-thread task set (requires a Tokio `LocalSet`).
pub struct AsyncCommand {
    this: Weak<AsyncCommand>,
    gate: Rc<AsyncExecutionGate>,
    handler: BoxedHandler,
    error_handler: RefCell<Option<Box<dyn Fn(&dyn Error) -> bool>>>,
    enabled_changed: EnabledChanged,
}

impl AsyncCommand {
    /// Create a command with its own private gate.
    pub fn new<F, Fut>(handler: F) -> Rc<Self>
    where
        F: Fn(CommandParam, CancellationToken) -> Fut + 'static,
        Fut: Future<Output = HandlerResult> + 'static,
    {
        Self::with_gate(AsyncExecutionGate::new(), handler)
    }

    /// Create a command sharing `gate` with other executions (one flight at
    /// a time across all of them).
    pub fn with_gate<F, Fut>(gate: Rc<AsyncExecutionGate>, handler: F) -> Rc<Self>
    where
        F: Fn(CommandParam, CancellationToken) -> Fut + 'static,
        Fut: Future<Output = HandlerResult> + 'static,
    {
        let command = Rc::new_cyclic(|this: &Weak<Self>| Self {
            this: this.clone(),
            gate: gate.clone(),
            handler: Box::new(move |param, token| Box::pin(handler(param, token))),
            error_handler: RefCell::new(None),
            enabled_changed: EnabledChanged::new(),
        });
        gate.events()
            .monitor(IS_BUSY)
            .expect("IsBusy is declared")
            .register_command(&(command.clone() as Rc<dyn Command>));
        command
    }

    /// The gate guarding this command.
    pub fn gate(&self) -> &Rc<AsyncExecutionGate> {
        &self.gate
    }

    /// Install the exception handler. It is consulted exactly once per
    /// failed execution; returning `true` marks the error fully handled.
    pub fn set_error_handler(&self, f: impl Fn(&dyn Error) -> bool + 'static) {
        *self.error_handler.borrow_mut() = Some(Box::new(f));
    }

    /// Remove the exception handler; subsequent errors propagate.
    pub fn clear_error_handler(&self) {
        self.error_handler.borrow_mut().take();
    }

    /// Execute the handler through the gate.
    ///
    /// The gate is busy before the first await and finalized on every exit
    /// path, including handler failure.
    pub async fn run(&self, parameter: CommandParam) -> Result<(), ExecutionError> {
        let token = self
            .gate
            .prepare()
            .map_err(|_| ExecutionError::AlreadyBusy)?;
        let result = (self.handler)(parameter, token).await;
        self.gate.finalize();

        match result {
            Ok(()) => Ok(()),
            Err(error) => {
                // Take the handler out while it runs so it can replace
                // itself without a re-entrant borrow.
                let handler = self.error_handler.borrow_mut().take();
                let handled = handler.as_ref().is_some_and(|h| h(error.as_ref()));
                if let Some(h) = handler {
                    let mut slot = self.error_handler.borrow_mut();
                    if slot.is_none() {
                        *slot = Some(h);
                    }
                }
                if handled {
                    Ok(())
                } else {
                    tracing::warn!(error = %error, "async command failed");
                    Err(ExecutionError::Handler(error))
                }
            }
        }
    }
}

impl Command for AsyncCommand {
    fn can_execute(&self, _parameter: &CommandParam) -> bool {
        !self.gate.is_busy()
    }

    fn execute(&self, parameter: CommandParam) {
        if self.gate.is_busy() {
            return;
        }
        let Some(this) = self.this.upgrade() else {
            return;
        };
        tokio::task::spawn_local(async move {
            // run() already reports unhandled errors through tracing.
            let _ = this.run(parameter).await;
        });
    }

    fn enabled_changed(&self) -> &EnabledChanged {
        &self.enabled_changed
    }
}

// ===========================================================================
// Tests
// ===========================================================================
