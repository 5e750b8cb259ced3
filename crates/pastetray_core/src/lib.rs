//! Core library for PasteTray (backends, posting pipeline, recent pastes).

/// Backend descriptors, the registry and bundled defaults.
pub mod backend;
/// Configuration loading and path resolution.
pub mod config;
/// Shared constants.
pub mod constants;
/// Process-global environment mutation helpers.
pub mod env;
/// Library error types.
pub mod error;
/// Recent-paste history and its flat-file store.
pub mod history;
/// Network strategies that turn a request into a paste URL.
pub mod invoker;
/// Paste request and result models.
pub mod models;
/// Process-level wiring of registry, history and invoker.
pub mod session;
/// Background submission tasks.
pub mod task;

#[cfg(test)]
pub(crate) mod test_support;

pub use backend::{BackendDescriptor, BackendRegistry, Expiry, Parameter};
pub use config::Config;
pub use constants::*;
pub use error::AppError;
pub use history::PasteHistory;
pub use invoker::{Invoker, InvokerSettings, NetworkInvoker};
pub use models::{FailureKind, PasteRequest, PasteResult};
pub use session::Session;
pub use task::{SubmissionTask, TaskState};
