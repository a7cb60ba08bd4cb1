use std::sync::{Mutex, MutexGuard, PoisonError};

/// Lock `mutex`, recovering the guard if a panicking holder poisoned it.
///
/// Slideshow state stays internally consistent across a handler panic (every
/// mutation completes before handlers run), so poisoning carries no extra
/// information here.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
