#[cfg(not(feature = "parking-lot"))]
pub use std::sync::{Mutex, MutexGuard, PoisonError};

#[cfg(feature = "parking-lot")]
pub use parking_lot::{Mutex, MutexGuard};

/// Locks `mutex`, mapping poisoning to [`crate::Error::LockPoisoned`].
#[cfg(not(feature = "parking-lot"))]
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> crate::Result<MutexGuard<'_, T>> {
    Ok(mutex.lock()?)
}

/// Locks `mutex`. `parking_lot` mutexes never poison.
#[cfg(feature = "parking-lot")]
#[allow(clippy::unnecessary_wraps)]
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> crate::Result<MutexGuard<'_, T>> {
    Ok(mutex.lock())
}
