use std::borrow::Cow;

/// A type-erased error returned by an [`EpochSource`] or a custom verifier.
///
/// [`EpochSource`]: crate::EpochSource
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A result type defaulting to the crate [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All error variants that `wuid` can emit.
///
/// Every variant is returned to the direct caller of [`Wuid::new`],
/// [`Wuid::load_epoch`] or [`Wuid::renew_now`]. Nothing is retried
/// internally. [`Wuid::next_id`] never fails.
///
/// [`Wuid::new`]: crate::Wuid::new
/// [`Wuid::load_epoch`]: crate::Wuid::load_epoch
/// [`Wuid::renew_now`]: crate::Wuid::renew_now
/// [`Wuid::next_id`]: crate::Wuid::next_id
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The epoch source failed. The source's error is carried unmodified and
    /// can be recovered with [`BoxError::downcast_ref`].
    #[error(transparent)]
    FetchFailed(BoxError),

    /// The epoch does not fit the layout, or the custom verifier rejected it.
    #[error("invalid epoch {epoch}: {reason}. tag: {tag}")]
    InvalidEpoch {
        tag: String,
        epoch: u64,
        reason: Cow<'static, str>,
    },

    /// The epoch equals the one already loaded. Seeding it again would
    /// re-issue numbers already handed out.
    #[error("the epoch should be a different value other than {epoch}. tag: {tag}")]
    EpochNotChanged { tag: String, epoch: u64 },

    /// The section option is outside `[1, 15]`.
    #[error("section {section} is outside [1, 15]. tag: {tag}")]
    InvalidSection { tag: String, section: u8 },

    /// Renewal was requested before any epoch was loaded.
    #[error("no epoch source installed, load an epoch first. tag: {tag}")]
    NoRenewalConfigured { tag: String },

    /// The renewal lock was **poisoned** by a thread that panicked while
    /// holding it.
    ///
    /// When the `parking-lot` feature is enabled, mutexes do **not** poison,
    /// so this variant is not available.
    #[cfg(not(feature = "parking-lot"))]
    #[error("renewal lock poisoned")]
    LockPoisoned,
}

#[cfg(not(feature = "parking-lot"))]
use crate::generator::{MutexGuard, PoisonError};
#[cfg(not(feature = "parking-lot"))]
// Convert all poisoned lock errors to a simplified `LockPoisoned`
impl<T> From<PoisonError<MutexGuard<'_, T>>> for Error {
    fn from(_: PoisonError<MutexGuard<'_, T>>) -> Self {
        Self::LockPoisoned
    }
}
