//! Per-action request bookkeeping shared by every panel.

use futures::future::{AbortHandle, Abortable};
use parking_lot::Mutex;
use shared::error::GatewayError;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::PanelError;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ActionStatus {
    #[default]
    Idle,
    Pending,
    Failed(String),
}

/// Status plus the last successful value. A failure never clears the value.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionSlot<T> {
    pub status: ActionStatus,
    pub value: Option<T>,
}

impl<T> Default for ActionSlot<T> {
    fn default() -> Self {
        Self {
            status: ActionStatus::Idle,
            value: None,
        }
    }
}

impl<T> ActionSlot<T> {
    pub fn with_value(value: T) -> Self {
        Self {
            status: ActionStatus::Idle,
            value: Some(value),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == ActionStatus::Pending
    }

    pub fn error(&self) -> Option<&str> {
        match &self.status {
            ActionStatus::Failed(msg) => Some(msg),
            _ => None,
        }
    }
}

/// How a triggered action ended, when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Completed,
    /// Input was empty; nothing was sent.
    Skipped,
    /// Torn down while in flight.
    Cancelled,
}

/// Allows one in-flight run at a time and remembers how to abort it.
#[derive(Default)]
pub(crate) struct ActionGuard {
    busy: AtomicBool,
    abort: Mutex<Option<AbortHandle>>,
}

pub(crate) struct InFlight<'a> {
    busy: &'a AtomicBool,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

impl ActionGuard {
    pub(crate) fn acquire(&self) -> Result<InFlight<'_>, PanelError> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| PanelError::Busy)?;
        Ok(InFlight { busy: &self.busy })
    }

    pub(crate) fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Wrap `fut` so that `abort` stops it.
    pub(crate) fn abortable<F: Future>(&self, fut: F) -> Abortable<F> {
        let (handle, registration) = AbortHandle::new_pair();
        *self.abort.lock() = Some(handle);
        Abortable::new(fut, registration)
    }

    pub(crate) fn abort(&self) {
        if let Some(handle) = self.abort.lock().take() {
            handle.abort();
        }
    }
}

impl Drop for ActionGuard {
    fn drop(&mut self) {
        self.abort();
    }
}

/// One input field, one request kind, one result.
pub struct PromptAction<T> {
    label: &'static str,
    input: Mutex<String>,
    slot: Mutex<ActionSlot<T>>,
    guard: ActionGuard,
}

impl<T: Clone> PromptAction<T> {
    pub(crate) fn new(label: &'static str) -> Self {
        Self::with_input(label, String::new())
    }

    pub(crate) fn with_input(label: &'static str, input: impl Into<String>) -> Self {
        Self {
            label,
            input: Mutex::new(input.into()),
            slot: Mutex::new(ActionSlot::default()),
            guard: ActionGuard::default(),
        }
    }

    pub fn set_input(&self, text: impl Into<String>) {
        *self.input.lock() = text.into();
    }

    pub fn input(&self) -> String {
        self.input.lock().clone()
    }

    pub fn slot(&self) -> ActionSlot<T> {
        self.slot.lock().clone()
    }

    pub fn value(&self) -> Option<T> {
        self.slot.lock().value.clone()
    }

    pub fn is_busy(&self) -> bool {
        self.guard.is_busy()
    }

    /// Send the current input through `call` unless it is blank.
    pub(crate) async fn run<F, Fut>(&self, call: F) -> Result<ActionOutcome, PanelError>
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = Result<T, GatewayError>>,
    {
        let input = self.input();
        if input.trim().is_empty() {
            return Ok(ActionOutcome::Skipped);
        }
        run_action(self.label, &self.guard, &self.slot, call(input)).await
    }

    pub(crate) fn teardown(&self) {
        self.guard.abort();
    }
}

/// Drive one gateway call through `slot`: pending while in flight, then
/// committed, failed, or back to idle when aborted.
pub(crate) async fn run_action<T, Fut>(
    label: &'static str,
    guard: &ActionGuard,
    slot: &Mutex<ActionSlot<T>>,
    call: Fut,
) -> Result<ActionOutcome, PanelError>
where
    Fut: Future<Output = Result<T, GatewayError>>,
{
    let _in_flight = guard.acquire()?;
    slot.lock().status = ActionStatus::Pending;
    tracing::debug!(action = label, "request started");

    match guard.abortable(call).await {
        Ok(Ok(value)) => {
            let mut slot = slot.lock();
            slot.value = Some(value);
            slot.status = ActionStatus::Idle;
            tracing::info!(action = label, "request completed");
            Ok(ActionOutcome::Completed)
        }
        Ok(Err(err)) => {
            tracing::warn!(action = label, error = %err, "request failed");
            slot.lock().status = ActionStatus::Failed(err.to_string());
            Err(err.into())
        }
        Err(_aborted) => {
            tracing::debug!(action = label, "request cancelled");
            slot.lock().status = ActionStatus::Idle;
            Ok(ActionOutcome::Cancelled)
        }
    }
}
