//! Process-level wiring of registry, history and invoker.

use crate::backend::{BackendDescriptor, BackendRegistry};
use crate::config::Config;
use crate::error::{AppError, HistoryError, RegistryError, TaskError};
use crate::history::{self, PasteHistory};
use crate::invoker::{Invoker, NetworkInvoker};
use crate::models::{PasteRequest, PasteResult};
use crate::task::SubmissionTask;
use std::sync::Arc;
use tracing::{debug, info};

/// Everything one PasteTray process needs to submit pastes.
///
/// The registry is read-only after construction. History is only touched
/// through `&mut self`, i.e. from the polling context.
pub struct Session {
    config: Config,
    registry: BackendRegistry,
    history: PasteHistory,
    invoker: Arc<dyn Invoker>,
}

impl Session {
    /// Build the network invoker and load backends and history from the
    /// locations in `config`.
    ///
    /// # Errors
    /// Fails when the HTTP client cannot be built, a backend document is
    /// invalid or duplicated, or the history file exists but is unreadable.
    pub fn open(config: Config) -> Result<Self, AppError> {
        let invoker = NetworkInvoker::new(config.invoker_settings())?;
        let registry = BackendRegistry::load_dir(&config.pastebins_dir())?;
        let history = history::load(&config.history_path(), config.history_capacity)?;
        info!(
            backends = registry.len(),
            recent = history.len(),
            config_dir = %config.config_dir().display(),
            "session opened"
        );
        Ok(Self::with_parts(config, registry, history, Arc::new(invoker)))
    }

    /// Assemble a session from prepared parts.
    pub fn with_parts(
        config: Config,
        registry: BackendRegistry,
        history: PasteHistory,
        invoker: Arc<dyn Invoker>,
    ) -> Self {
        Self {
            config,
            registry,
            history,
            invoker,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &BackendRegistry {
        &self.registry
    }

    pub fn history(&self) -> &PasteHistory {
        &self.history
    }

    pub fn backend(&self, name: &str) -> Result<Arc<BackendDescriptor>, RegistryError> {
        self.registry.lookup(name)
    }

    /// Start submitting `request` in the background.
    ///
    /// # Errors
    /// [`TaskError::Spawn`] when no worker thread can be created.
    pub fn submit(&self, request: PasteRequest) -> Result<SubmissionTask, AppError> {
        let mut task = SubmissionTask::new(Arc::clone(&self.invoker), request);
        task.start()?;
        Ok(task)
    }

    /// Finish a task: a successful URL goes to the front of history.
    ///
    /// A task that is still running is left untouched so the caller can keep
    /// polling it. Completing the same task again returns its result without
    /// recording it twice.
    ///
    /// # Errors
    /// [`TaskError::NotReady`] when the task has not completed; poll or
    /// [`SubmissionTask::wait`] first.
    pub fn complete(&mut self, task: &mut SubmissionTask) -> Result<PasteResult, TaskError> {
        task.poll();
        let result = task.result()?.clone();
        if let Some(url) = result.url() {
            if task.mark_recorded() {
                debug!("recording {} in history", url);
                self.history.record(url);
            }
        }
        Ok(result)
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Persist history to the configured history file.
    pub fn save_history(&self) -> Result<(), HistoryError> {
        history::save(&self.config.history_path(), &self.history)
    }
}
