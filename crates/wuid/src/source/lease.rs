use core::fmt;

type Release = Box<dyn FnOnce() + Send + 'static>;

/// An epoch claimed from an [`EpochSource`], plus an optional release action.
///
/// Stores that guard the claim with a distributed lock attach the unlock as
/// the release action. It runs exactly once, when the lease is dropped, which
/// the generator does after it has finished with the epoch whether or not the
/// epoch was accepted.
///
/// ```
/// use std::sync::{
///     Arc,
///     atomic::{AtomicBool, Ordering},
/// };
/// use wuid::Lease;
///
/// let released = Arc::new(AtomicBool::new(false));
/// let flag = Arc::clone(&released);
/// let lease = Lease::with_release(42, move || flag.store(true, Ordering::SeqCst));
///
/// assert_eq!(lease.epoch(), 42);
/// drop(lease);
/// assert!(released.load(Ordering::SeqCst));
/// ```
///
/// [`EpochSource`]: crate::EpochSource
pub struct Lease {
    epoch: u64,
    release: Option<Release>,
}

impl Lease {
    /// A lease with nothing to release.
    pub const fn new(epoch: u64) -> Self {
        Self {
            epoch,
            release: None,
        }
    }

    /// A lease that runs `release` when dropped.
    pub fn with_release(epoch: u64, release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            epoch,
            release: Some(Box::new(release)),
        }
    }

    pub const fn epoch(&self) -> u64 {
        self.epoch
    }

    pub const fn has_release(&self) -> bool {
        self.release.is_some()
    }
}

impl From<u64> for Lease {
    fn from(epoch: u64) -> Self {
        Self::new(epoch)
    }
}

impl Drop for Lease {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl fmt::Debug for Lease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lease")
            .field("epoch", &self.epoch)
            .field("release", &self.release.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    #[test]
    fn release_runs_once_on_drop() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let lease = Lease::with_release(7, move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert!(lease.has_release());
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        drop(lease);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn plain_lease_has_no_release() {
        let lease = Lease::from(3);
        assert_eq!(lease.epoch(), 3);
        assert!(!lease.has_release());
        assert_eq!(format!("{lease:?}"), "Lease { epoch: 3, release: false }");
    }
}
