use std::sync::{LazyLock, Mutex, MutexGuard};

static ENV_LOCK: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

/// Serializes env-var mutation across tests and restores every touched
/// variable when dropped.
pub(super) struct ScopedEnv {
    saved: Vec<(&'static str, Option<String>)>,
    _lock: MutexGuard<'static, ()>,
}

impl ScopedEnv {
    pub(super) fn lock() -> Self {
        let lock = ENV_LOCK
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        Self {
            saved: Vec::new(),
            _lock: lock,
        }
    }

    pub(super) fn set(&mut self, key: &'static str, value: &str) -> &mut Self {
        self.remember(key);
        // SAFETY: ENV_LOCK is held for the lifetime of `self`.
        unsafe {
            std::env::set_var(key, value);
        }
        self
    }

    pub(super) fn unset(&mut self, key: &'static str) -> &mut Self {
        self.remember(key);
        // SAFETY: ENV_LOCK is held for the lifetime of `self`.
        unsafe {
            std::env::remove_var(key);
        }
        self
    }

    fn remember(&mut self, key: &'static str) {
        if self.saved.iter().all(|(saved, _)| *saved != key) {
            self.saved.push((key, std::env::var(key).ok()));
        }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (key, previous) in self.saved.drain(..).rev() {
            // SAFETY: the lock guard field is dropped after this body runs.
            unsafe {
                match previous {
                    Some(value) => std::env::set_var(key, value),
                    None => std::env::remove_var(key),
                }
            }
        }
    }
}
