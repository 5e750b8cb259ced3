//! Shared constants used across PasteTray crates.

use std::time::Duration;

/// Default number of recent pastes kept in history.
pub const DEFAULT_HISTORY_CAPACITY: usize = 10;

/// Default TCP/HTTP connect timeout in seconds.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default read timeout in seconds.
pub const DEFAULT_READ_TIMEOUT_SECS: u64 = 30;

/// Interval at which interactive callers poll a running submission.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Directory (under the config dir) holding backend documents.
pub const PASTEBINS_DIR_NAME: &str = "pastebins";

/// File (under the config dir) holding the recent paste list.
pub const HISTORY_FILE_NAME: &str = "recent_pastes.txt";

/// Extension of backend documents picked up by the loader.
pub const BACKEND_DOCUMENT_EXTENSION: &str = "json";

/// Build the default `User-Agent` value sent to pastebins.
///
/// # Returns
/// `PasteTray/<crate version>`.
pub fn default_user_agent() -> String {
    format!("PasteTray/{}", env!("CARGO_PKG_VERSION"))
}
