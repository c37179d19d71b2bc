use std::sync::{Mutex, MutexGuard};
use tokio::runtime::Runtime;

/// Creates a single-threaded Tokio runtime
///
/// The favorites session is event-driven on one thread; a multi-threaded
/// runtime would only add worker threads nobody uses.
///
/// Returns `Ok(Runtime)` if successful, or `Err(String)` with error message
pub fn create_runtime() -> Result<Runtime, String> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("Failed to create runtime: {}", e))
}

/// Safely locks a mutex with poisoning recovery
///
/// If the mutex is poisoned (previous holder panicked), the inner value is
/// recovered. Used for subscriber lists and call logs where a half-finished
/// update is harmless.
pub fn safe_lock<'a, T>(mutex: &'a Mutex<T>, context: &str) -> MutexGuard<'a, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            log::warn!("[{}] Mutex poisoned, recovering from panic", context);
            poisoned.into_inner()
        }
    }
}
