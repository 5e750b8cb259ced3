//! Error types for registry loading, history storage, request validation
//! and task polling.
use crate::backend::{Expiry, Parameter};
use std::path::PathBuf;
use thiserror::Error;

/// Registry membership errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("a backend named '{0}' is already registered")]
    DuplicateBackend(String),

    #[error("no backend named '{0}'")]
    UnknownBackend(String),
}

/// A backend document that parsed but violates descriptor invariants.
#[derive(Error, Debug)]
pub enum DescriptorError {
    #[error("invalid backend document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("backend name must not be empty")]
    EmptyName,

    #[error("backend '{0}' accepts syntax but has no syntax choices")]
    MissingSyntaxChoices(String),

    #[error("backend '{backend}' default syntax '{label}' is not one of its syntax choices")]
    InvalidDefaultSyntax { backend: String, label: String },

    #[error("backend '{0}' has no expiry choices")]
    MissingExpiryChoices(String),

    #[error("backend '{backend}' template '{template}': {reason}")]
    Template {
        backend: String,
        template: String,
        reason: String,
    },
}

/// Failures while building the registry from a directory.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}: {source}")]
    Descriptor {
        path: PathBuf,
        #[source]
        source: DescriptorError,
    },

    #[error("{path}: {source}")]
    Registry {
        path: PathBuf,
        #[source]
        source: RegistryError,
    },
}

/// Flat-file history store failures.
#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("failed to read history {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write history {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A request that cannot be sent to its backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    #[error("backend '{backend}' does not accept the '{parameter}' parameter")]
    UnsupportedParameter {
        backend: String,
        parameter: Parameter,
    },

    #[error("backend '{backend}' has no syntax called '{label}'")]
    UnknownSyntax { backend: String, label: String },

    #[error("backend '{backend}' does not offer expiry '{expiry}'")]
    InvalidExpiry { backend: String, expiry: Expiry },
}

/// Submission task misuse.
#[derive(Error, Debug)]
pub enum TaskError {
    #[error("submission has not completed yet")]
    NotReady,

    #[error("submission was already started")]
    AlreadyStarted,

    #[error("failed to spawn submission worker: {0}")]
    Spawn(#[source] std::io::Error),
}

/// Top-level application error type.
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    History(#[from] HistoryError),

    #[error(transparent)]
    Request(#[from] RequestError),

    #[error(transparent)]
    Task(#[from] TaskError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
