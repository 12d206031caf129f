//! Busy-gate for asynchronous command execution.
//!
//! [`AsyncExecutionGate`] owns the `IsBusy` property, the active
//! [`CancellationToken`], and a built-in cancel command enabled exactly while
//! busy. `prepare` flips `IsBusy` synchronously, before any suspension point,
//! so interleaved UI work always observes the in-flight execution;
//! `finalize` unconditionally returns to idle and discards the token.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use tokio_util::sync::CancellationToken;

use crate::command::relay::RelayCommand;
use crate::command::traits::Command;
use crate::observable::{Field, Observable, PropertyName};

/// Name of the gate's busy property, declared on [`AsyncExecutionGate::events`].
pub const IS_BUSY: PropertyName = "IsBusy";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// State errors raised by the gate at call time.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum GateError {
    /// `prepare` was called while an execution is already in flight.
    #[error("an asynchronous execution is already in flight")]
    AlreadyBusy,
}

// ---------------------------------------------------------------------------
// AsyncExecutionGate
// ---------------------------------------------------------------------------

/// Mutual-exclusion and cancellation lifecycle for one in-flight async
/// execution.
///
/// `IsBusy` is an ordinary observable property: commands gated on "not busy"
/// register against its monitor and re-evaluate synchronously, on the same
/// call stack as the flip.
pub struct AsyncExecutionGate {
    events: Observable,
    busy: Field<bool>,
    token: RefCell<Option<CancellationToken>>,
    cancel: Rc<RelayCommand>,
}

impl AsyncExecutionGate {
    /// Create a new idle gate.
    pub fn new() -> Rc<Self> {
        Rc::new_cyclic(|weak: &Weak<Self>| {
            let events = Observable::new();
            let busy = events.field(IS_BUSY, false);

            let cancel_weak = weak.clone();
            let enabled_weak = weak.clone();
            let cancel = Rc::new(RelayCommand::with_can_execute(
                move |_| {
                    if let Some(gate) = cancel_weak.upgrade() {
                        gate.request_cancel();
                    }
                },
                move |_| enabled_weak.upgrade().is_some_and(|gate| gate.is_busy()),
            ));

            let monitor = events.monitor(IS_BUSY).expect("IsBusy is declared");
            monitor.register_command(&(cancel.clone() as Rc<dyn Command>));

            Self {
                events,
                busy,
                token: RefCell::new(None),
                cancel,
            }
        })
    }

    /// Whether an execution is in flight.
    pub fn is_busy(&self) -> bool {
        self.busy.get()
    }

    /// The gate's observable core, for wiring dependencies on [`IS_BUSY`].
    pub fn events(&self) -> &Observable {
        &self.events
    }

    /// The built-in cancel command: enabled exactly while busy, requests
    /// cancellation on the active token only.
    pub fn cancel_command(&self) -> Rc<dyn Command> {
        self.cancel.clone()
    }

    /// Enter the busy state and hand out a fresh cancellation token.
    ///
    /// The token is installed before `IsBusy` flips, so synchronous
    /// observers of the flip always see an active token. Fails with
    /// [`GateError::AlreadyBusy`] if an execution is already in flight.
    pub fn prepare(&self) -> Result<CancellationToken, GateError> {
        if self.busy.get() {
            return Err(GateError::AlreadyBusy);
        }
        let token = CancellationToken::new();
        *self.token.borrow_mut() = Some(token.clone());
        self.busy.set(true);
        tracing::debug!("execution gate busy");
        Ok(token)
    }

    /// Return to idle, discarding the token source.
    ///
    /// Runs on every exit path of an execution — success, handler error, or
    /// cancellation — and is safe to call while already idle.
    pub fn finalize(&self) {
        self.token.borrow_mut().take();
        self.busy.set(false);
        tracing::debug!("execution gate idle");
    }

    /// Request cancellation on the active token. Without an active token
    /// this is a silent no-op.
    pub fn request_cancel(&self) {
        let token = self.token.borrow().clone();
        if let Some(token) = token {
            tracing::debug!("cancellation requested");
            token.cancel();
        }
    }

    /// Whether cancellation has been requested on the active token.
    pub fn is_cancellation_requested(&self) -> bool {
        self.token
            .borrow()
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }

    /// Whether a cancellation token is currently installed.
    pub fn has_active_token(&self) -> bool {
        self.token.borrow().is_some()
    }
}

impl std::fmt::Debug for AsyncExecutionGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncExecutionGate")
            .field("busy", &self.busy.get())
            .field("active_token", &self.has_active_token())
            .finish()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
