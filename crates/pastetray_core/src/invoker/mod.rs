//! Network invokers that turn a [`PasteRequest`] into a [`PasteResult`].
//!
//! Invocation blocks on the network and must run off the interactive
//! thread; see [`crate::task::SubmissionTask`].

mod form;
mod socket;

use crate::backend::Transport;
use crate::constants::{
    default_user_agent, DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_READ_TIMEOUT_SECS,
};
use crate::models::{PasteRequest, PasteResult};
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Performs one submission. Implementations never retry.
pub trait Invoker: Send + Sync {
    fn invoke(&self, request: &PasteRequest) -> PasteResult;
}

/// Timeouts and identity used for every network call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvokerSettings {
    pub connect_timeout: Duration,
    /// Socket backends apply this to each read and write. Form backends use
    /// it as the deadline for the whole request, upload and response body
    /// included, since the blocking HTTP client has no per-read timeout.
    pub read_timeout: Duration,
    pub user_agent: String,
}

impl Default for InvokerSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            read_timeout: Duration::from_secs(DEFAULT_READ_TIMEOUT_SECS),
            user_agent: default_user_agent(),
        }
    }
}

/// Invoker dispatching on the backend's transport.
#[derive(Debug, Clone)]
pub struct NetworkInvoker {
    settings: InvokerSettings,
    http: reqwest::blocking::Client,
}

impl NetworkInvoker {
    /// Build the invoker and its HTTP client.
    ///
    /// # Errors
    /// Returns the client builder error (TLS backend initialization etc).
    pub fn new(settings: InvokerSettings) -> Result<Self, reqwest::Error> {
        let http = reqwest::blocking::Client::builder()
            .connect_timeout(settings.connect_timeout)
            // Total deadline; see `InvokerSettings::read_timeout`.
            .timeout(settings.read_timeout)
            .user_agent(settings.user_agent.as_str())
            .build()?;
        Ok(Self { settings, http })
    }

    pub fn settings(&self) -> &InvokerSettings {
        &self.settings
    }
}

impl Invoker for NetworkInvoker {
    fn invoke(&self, request: &PasteRequest) -> PasteResult {
        let backend = request.backend();
        let started = Instant::now();
        info!(
            backend = backend.name(),
            transport = backend.transport().kind(),
            content_len = request.content().len(),
            "submitting paste"
        );

        let result = match backend.transport() {
            Transport::Form(form) => {
                form::submit(&self.http, form, request, &self.settings.user_agent)
            }
            Transport::Socket(target) => socket::submit(target, request, &self.settings),
        };

        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        match &result {
            PasteResult::Success { url } => {
                info!(backend = backend.name(), elapsed_ms, url = url.as_str(), "paste created");
            }
            PasteResult::Failure { kind, message } => {
                warn!(
                    backend = backend.name(),
                    elapsed_ms,
                    kind = kind.as_str(),
                    "paste failed: {}",
                    message
                );
            }
        }
        result
    }
}
