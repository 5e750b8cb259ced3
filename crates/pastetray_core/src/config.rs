//! Configuration loading from environment variables.

use crate::constants::{
    default_user_agent, DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_HISTORY_CAPACITY,
    DEFAULT_READ_TIMEOUT_SECS, HISTORY_FILE_NAME, PASTEBINS_DIR_NAME,
};
use crate::invoker::InvokerSettings;
use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

/// Overrides the whole configuration directory.
pub const CONFIG_DIR_ENV: &str = "PASTETRAY_CONFIG_DIR";
pub const HISTORY_SIZE_ENV: &str = "PASTETRAY_HISTORY_SIZE";
pub const CONNECT_TIMEOUT_ENV: &str = "PASTETRAY_CONNECT_TIMEOUT_SECS";
pub const READ_TIMEOUT_ENV: &str = "PASTETRAY_READ_TIMEOUT_SECS";
pub const USER_AGENT_ENV: &str = "PASTETRAY_USER_AGENT";

/// Runtime configuration for PasteTray.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Holds `pastebins/` and the history file.
    pub config_dir: PathBuf,
    pub history_capacity: usize,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    pub user_agent: String,
}

/// `~` or `~/rest` against the home directory; anything else unchanged.
fn expand_tilde(path: String) -> PathBuf {
    let rest = match path.as_str() {
        "~" => "",
        other => match other.strip_prefix("~/") {
            Some(rest) => rest,
            None => return PathBuf::from(path),
        },
    };
    match resolve_home_dir() {
        Some(home) if rest.is_empty() => home,
        Some(home) => home.join(rest),
        None => PathBuf::from(path),
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

/// HOME, then USERPROFILE, then HOMEDRIVE+HOMEPATH, then the working directory.
fn resolve_home_dir() -> Option<PathBuf> {
    non_empty_var("HOME")
        .or_else(|| non_empty_var("USERPROFILE"))
        .or_else(|| Some(non_empty_var("HOMEDRIVE")? + &non_empty_var("HOMEPATH")?))
        .map(PathBuf::from)
        .or_else(|| env::current_dir().ok())
}

fn default_config_dir() -> PathBuf {
    if let Some(xdg) = non_empty_var("XDG_CONFIG_HOME") {
        return expand_tilde(xdg).join("pastetray");
    }
    resolve_home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("pastetray")
}

/// Parse a strictly positive number, rejecting zero and garbage.
///
/// # Returns
/// `None` for unparsable or zero values.
fn parse_positive<T>(value: &str) -> Option<T>
where
    T: FromStr + PartialEq + Default,
{
    value
        .trim()
        .parse::<T>()
        .ok()
        .filter(|parsed| *parsed != T::default())
}

fn positive_var<T>(name: &str, default: T) -> T
where
    T: FromStr + PartialEq + Default + std::fmt::Display,
{
    let Some(raw) = non_empty_var(name) else {
        return default;
    };
    match parse_positive(&raw) {
        Some(value) => value,
        None => {
            warn!("ignoring {}={:?}: expected a positive integer, using {}", name, raw, default);
            default
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Returns
    /// A populated [`Config`] with defaults applied when env vars are missing
    /// or invalid. Zero sizes and timeouts count as invalid.
    pub fn from_env() -> Self {
        Self {
            config_dir: non_empty_var(CONFIG_DIR_ENV)
                .map(expand_tilde)
                .unwrap_or_else(default_config_dir),
            history_capacity: positive_var(HISTORY_SIZE_ENV, DEFAULT_HISTORY_CAPACITY),
            connect_timeout: Duration::from_secs(positive_var(
                CONNECT_TIMEOUT_ENV,
                DEFAULT_CONNECT_TIMEOUT_SECS,
            )),
            read_timeout: Duration::from_secs(positive_var(
                READ_TIMEOUT_ENV,
                DEFAULT_READ_TIMEOUT_SECS,
            )),
            user_agent: non_empty_var(USER_AGENT_ENV).unwrap_or_else(default_user_agent),
        }
    }

    /// Defaults rooted at `config_dir`, ignoring the environment.
    pub fn in_dir(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            read_timeout: Duration::from_secs(DEFAULT_READ_TIMEOUT_SECS),
            user_agent: default_user_agent(),
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Directory scanned for backend documents.
    pub fn pastebins_dir(&self) -> PathBuf {
        self.config_dir.join(PASTEBINS_DIR_NAME)
    }

    pub fn history_path(&self) -> PathBuf {
        self.config_dir.join(HISTORY_FILE_NAME)
    }

    pub fn invoker_settings(&self) -> InvokerSettings {
        InvokerSettings {
            connect_timeout: self.connect_timeout,
            read_timeout: self.read_timeout,
            user_agent: self.user_agent.clone(),
        }
    }
}
