//! Normalized outcome of one paste submission.

use serde::Serialize;
use std::fmt;

/// Category of a failed submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Connection refused, DNS failure, timeout and similar.
    Transport,
    /// The service answered with a non-success HTTP status.
    HttpStatus,
    /// The submission never produced an answer (worker died, bad template).
    Internal,
}

impl FailureKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FailureKind::Transport => "transport",
            FailureKind::HttpStatus => "http_status",
            FailureKind::Internal => "internal",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a submission produced. Failures are data, not errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PasteResult {
    Success { url: String },
    Failure { kind: FailureKind, message: String },
}

impl PasteResult {
    pub fn success(url: impl Into<String>) -> Self {
        PasteResult::Success { url: url.into() }
    }

    pub fn failure(kind: FailureKind, message: impl Into<String>) -> Self {
        PasteResult::Failure {
            kind,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, PasteResult::Success { .. })
    }

    /// URL of a successful paste.
    pub fn url(&self) -> Option<&str> {
        match self {
            PasteResult::Success { url } => Some(url),
            PasteResult::Failure { .. } => None,
        }
    }

    /// Failure category, `None` on success.
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            PasteResult::Success { .. } => None,
            PasteResult::Failure { kind, .. } => Some(*kind),
        }
    }
}

impl fmt::Display for PasteResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PasteResult::Success { url } => f.write_str(url),
            PasteResult::Failure { kind, message } => write!(f, "{} error: {}", kind, message),
        }
    }
}
