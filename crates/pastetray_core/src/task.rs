//! Background submission tasks.
//!
//! A [`SubmissionTask`] runs one [`Invoker`] call on its own worker thread and
//! hands the [`PasteResult`] back over a channel. The interactive thread polls
//! it; nothing here blocks except [`SubmissionTask::wait`].

use crate::error::TaskError;
use crate::invoker::Invoker;
use crate::models::{FailureKind, PasteRequest, PasteResult};
use crossbeam_channel::{bounded, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::debug;

/// Lifecycle of a submission. `Completed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Pending,
    Running,
    Completed,
}

/// One pollable paste submission.
///
/// Dropping a running task detaches its worker; the worker still finishes
/// (bounded by the invoker's timeouts) and its result is discarded.
pub struct SubmissionTask {
    invoker: Arc<dyn Invoker>,
    request: PasteRequest,
    state: TaskState,
    result_rx: Option<Receiver<PasteResult>>,
    result: Option<PasteResult>,
    recorded: bool,
}

impl std::fmt::Debug for SubmissionTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubmissionTask")
            .field("backend", &self.request.backend().name())
            .field("state", &self.state)
            .field("result", &self.result)
            .finish()
    }
}

impl SubmissionTask {
    /// Create a pending task. Nothing runs until [`Self::start`].
    pub fn new(invoker: Arc<dyn Invoker>, request: PasteRequest) -> Self {
        Self {
            invoker,
            request,
            state: TaskState::Pending,
            result_rx: None,
            result: None,
            recorded: false,
        }
    }

    /// Request this task submits; kept so callers can resubmit it.
    pub fn request(&self) -> &PasteRequest {
        &self.request
    }

    /// Spawn the worker and return immediately.
    ///
    /// # Errors
    /// [`TaskError::AlreadyStarted`] unless pending, [`TaskError::Spawn`] if
    /// the OS refuses a new thread (the task stays pending).
    pub fn start(&mut self) -> Result<(), TaskError> {
        if self.state != TaskState::Pending {
            return Err(TaskError::AlreadyStarted);
        }

        let (result_tx, result_rx) = bounded(1);
        let invoker = Arc::clone(&self.invoker);
        let request = self.request.clone();
        let backend = request.backend().name().to_string();
        thread::Builder::new()
            .name(format!("pastetray-submit-{}", backend))
            .spawn(move || {
                let result = invoker.invoke(&request);
                if result_tx.send(result).is_err() {
                    debug!(backend = backend.as_str(), "submission finished after its task was dropped");
                }
            })
            .map_err(TaskError::Spawn)?;

        self.result_rx = Some(result_rx);
        self.state = TaskState::Running;
        Ok(())
    }

    fn complete(&mut self, result: PasteResult) {
        self.result = Some(result);
        self.result_rx = None;
        self.state = TaskState::Completed;
    }

    /// Check for a finished worker without blocking.
    ///
    /// # Returns
    /// The state after the check.
    pub fn poll(&mut self) -> TaskState {
        if self.state != TaskState::Running {
            return self.state;
        }
        let received = match &self.result_rx {
            Some(rx) => rx.try_recv(),
            None => Err(TryRecvError::Disconnected),
        };
        match received {
            Ok(result) => self.complete(result),
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => self.complete(PasteResult::failure(
                FailureKind::Internal,
                "submission worker exited without a result",
            )),
        }
        self.state
    }

    /// Non-blocking: `true` while the worker has not reported back.
    pub fn is_running(&mut self) -> bool {
        self.poll() == TaskState::Running
    }

    /// State as of the last poll.
    pub fn state(&self) -> TaskState {
        self.state
    }

    /// Outcome of a completed task.
    ///
    /// # Errors
    /// [`TaskError::NotReady`] before completion. Treat it as a logic bug.
    pub fn result(&self) -> Result<&PasteResult, TaskError> {
        self.result.as_ref().ok_or(TaskError::NotReady)
    }

    /// Claim the finished result for history. `true` exactly once per
    /// completed task.
    pub(crate) fn mark_recorded(&mut self) -> bool {
        if self.result.is_none() || self.recorded {
            return false;
        }
        self.recorded = true;
        true
    }

    /// Consume a completed task.
    pub fn into_result(self) -> Result<PasteResult, TaskError> {
        self.result.ok_or(TaskError::NotReady)
    }

    /// Poll every `interval` until completion, starting a pending task first.
    ///
    /// `on_tick` runs once per still-running poll (progress pulses).
    pub fn wait(
        &mut self,
        interval: Duration,
        mut on_tick: impl FnMut(),
    ) -> Result<&PasteResult, TaskError> {
        if self.state == TaskState::Pending {
            self.start()?;
        }
        while self.is_running() {
            on_tick();
            thread::sleep(interval);
        }
        self.result()
    }
}
