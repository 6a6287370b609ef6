use std::{
    path::Path,
    sync::{Mutex, MutexGuard, OnceLock},
};

fn env_lock() -> &'static Mutex<()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(Mutex::default)
}

/// Points the asset directory and database at throwaway locations for one
/// test, restoring the previous values on drop. Tests holding a guard run
/// serially; process environment is shared state.
pub struct TestEnvGuard {
    _lock: MutexGuard<'static, ()>,
    saved: Vec<(&'static str, Option<String>)>,
}

impl TestEnvGuard {
    pub fn new(temp_root: &Path, db_url: String) -> Self {
        let lock = env_lock().lock().unwrap_or_else(|err| err.into_inner());
        let overrides = [
            ("ROOMERY_ASSET_DIR", temp_root.display().to_string()),
            ("DATABASE_URL", db_url),
        ];
        let mut saved = Vec::new();
        for (key, value) in overrides {
            saved.push((key, std::env::var(key).ok()));
            // SAFETY: env_lock serializes every test that touches these vars.
            unsafe { std::env::set_var(key, value) };
        }
        Self { _lock: lock, saved }
    }
}

impl Drop for TestEnvGuard {
    fn drop(&mut self) {
        for (key, previous) in self.saved.drain(..) {
            // SAFETY: env_lock serializes every test that touches these vars.
            unsafe {
                match previous {
                    Some(value) => std::env::set_var(key, value),
                    None => std::env::remove_var(key),
                }
            }
        }
    }
}
