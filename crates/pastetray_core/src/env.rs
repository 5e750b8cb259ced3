//! Process-global environment mutation helpers.
//!
//! [`crate::Config::from_env`] reads process-wide state, so tests that change
//! `PASTETRAY_*` variables serialize on [`env_lock`] and restore through
//! [`EnvScope`].

use std::sync::{Mutex, MutexGuard, OnceLock};

/// Return the global lock used to serialize environment mutations in tests.
pub fn env_lock() -> &'static Mutex<()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
}

/// Lock the environment, recovering from a test that panicked while holding it.
pub fn lock_env() -> MutexGuard<'static, ()> {
    env_lock()
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

// Rust toolchains differ on whether env mutation APIs are `unsafe`.
#[allow(unused_unsafe)]
fn write_var(key: &str, value: Option<&str>) {
    // SAFETY: callers hold `env_lock` while tests may run in parallel.
    unsafe {
        match value {
            Some(value) => std::env::set_var(key, value),
            None => std::env::remove_var(key),
        }
    }
}

/// A set of environment overrides restored, in reverse order, on drop.
///
/// ```no_run
/// use pastetray_core::env::{lock_env, EnvScope};
///
/// let _lock = lock_env();
/// let _scope = EnvScope::new()
///     .set("PASTETRAY_CONFIG_DIR", "/tmp/pastetray")
///     .remove("PASTETRAY_USER_AGENT");
/// ```
#[derive(Debug, Default)]
pub struct EnvScope {
    saved: Vec<(String, Option<String>)>,
}

impl EnvScope {
    pub fn new() -> Self {
        Self::default()
    }

    fn remember(&mut self, key: &str) {
        self.saved.push((key.to_string(), std::env::var(key).ok()));
    }

    /// Set `key=value` for the lifetime of the scope.
    pub fn set(mut self, key: &str, value: impl AsRef<str>) -> Self {
        self.remember(key);
        write_var(key, Some(value.as_ref()));
        self
    }

    /// Unset `key` for the lifetime of the scope.
    pub fn remove(mut self, key: &str) -> Self {
        self.remember(key);
        write_var(key, None);
        self
    }
}

impl Drop for EnvScope {
    fn drop(&mut self) {
        while let Some((key, previous)) = self.saved.pop() {
            write_var(&key, previous.as_deref());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{lock_env, EnvScope};

    #[test]
    fn scope_restores_previous_value() {
        let _lock = lock_env();
        let key = "PASTETRAY_TEST_ENV_SCOPE_RESTORE";
        let _baseline = EnvScope::new().set(key, "before");
        {
            let _override = EnvScope::new().set(key, "after");
            assert_eq!(std::env::var(key).ok().as_deref(), Some("after"));
        }
        assert_eq!(std::env::var(key).ok().as_deref(), Some("before"));
    }

    #[test]
    fn scope_undoes_repeated_keys_in_reverse() {
        let _lock = lock_env();
        let key = "PASTETRAY_TEST_ENV_SCOPE_REPEAT";
        {
            let _scope = EnvScope::new().set(key, "one").set(key, "two").remove(key);
            assert!(std::env::var(key).is_err());
        }
        assert!(std::env::var(key).is_err());
    }
}
