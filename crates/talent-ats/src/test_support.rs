use std::sync::{Mutex, OnceLock};

/// Serializes tests that read or write process environment variables.
pub(crate) fn env_guard() -> &'static Mutex<()> {
    static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
    GUARD.get_or_init(|| Mutex::new(()))
}
