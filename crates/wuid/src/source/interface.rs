use crate::{BoxError, source::Lease};

/// A trait for external stores that hand out epochs.
///
/// An implementation claims a fresh epoch from a shared coordination store
/// (typically an atomic increment on a key) and returns it in its natural
/// low-order form, e.g. `0x000123`, not pre-shifted into the 64-bit layout.
///
/// The generator keeps the source it was loaded with and calls it again for
/// every later renewal, so implementations must be callable repeatedly.
/// Retries and timeouts belong here, not in the generator.
///
/// Closures returning `Result<Lease, E>` implement this trait directly.
///
/// # Example
/// ```
/// use std::sync::atomic::{AtomicU64, Ordering};
/// use wuid::{BoxError, EpochSource, Lease};
///
/// struct CounterStore {
///     next: AtomicU64,
/// }
///
/// impl EpochSource for CounterStore {
///     fn fetch(&self) -> Result<Lease, BoxError> {
///         Ok(Lease::new(self.next.fetch_add(1, Ordering::Relaxed)))
///     }
/// }
///
/// let store = CounterStore { next: AtomicU64::new(1) };
/// assert_eq!(store.fetch().unwrap().epoch(), 1);
/// assert_eq!(store.fetch().unwrap().epoch(), 2);
/// ```
pub trait EpochSource: Send + Sync {
    /// Claims the next epoch.
    ///
    /// # Errors
    ///
    /// Any store failure. It reaches the caller of the renewal unmodified.
    fn fetch(&self) -> Result<Lease, BoxError>;
}

impl<F, E> EpochSource for F
where
    F: Fn() -> Result<Lease, E> + Send + Sync,
    E: Into<BoxError>,
{
    fn fetch(&self) -> Result<Lease, BoxError> {
        self().map_err(Into::into)
    }
}
