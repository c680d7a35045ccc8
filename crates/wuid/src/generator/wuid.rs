use std::{
    borrow::Cow,
    sync::{Arc, Weak},
    thread,
};

#[cfg(feature = "instrument")]
use tracing::instrument;

use crate::{
    Error, EpochSource, Layout, Logger, Options, Result, TracingLogger, WuidId,
    generator::{Mutex, SequenceCounter, mutex::lock},
    options::Verifier,
};

/// A lock-free generator of 64-bit unique numbers.
///
/// The high bits of every number are an epoch claimed from an external
/// [`EpochSource`]; the low 36 bits are a sequence incremented locally with a
/// single atomic operation. As long as the source never hands the same epoch
/// to two generators, numbers are unique across the fleet.
///
/// A fresh generator is **not** ready for use: load an epoch with
/// [`Wuid::load_epoch`] first. The source passed to the first successful load
/// is kept and reused by [`Wuid::renew_now`] and by the automatic renewal
/// that starts when the sequence space of an epoch runs out.
///
/// Cloning is cheap and every clone shares the same counter.
///
/// ## Features
/// - ✅ Thread-safe, [`Wuid::next_id`] never blocks and never fails
/// - ✅ Renews its epoch in the background on sequence overflow
///
/// # Example
/// ```
/// use wuid::{Lease, Options, Wuid};
///
/// let generator = Wuid::with_tracing("t1", Options::new()).unwrap();
/// generator.load_epoch(|| Ok::<_, std::io::Error>(Lease::new(5))).unwrap();
///
/// assert_eq!(generator.next_id(), 5 << 36);
/// assert_eq!(generator.next_id(), (5 << 36) + 1);
/// ```
#[derive(Clone)]
pub struct Wuid {
    inner: Arc<Inner>,
}

struct Inner {
    tag: String,
    layout: Layout,
    verifier: Option<Verifier>,
    logger: Box<dyn Logger>,
    counter: SequenceCounter,
    // Serializes seeding.
    renewal: Mutex<Renewal>,
}

struct Renewal {
    // Reused by later renewals.
    source: Option<Arc<dyn EpochSource>>,
    // Last epoch seeded, zero before the first load.
    epoch: u64,
}

impl Wuid {
    /// Creates an unseeded generator.
    ///
    /// `tag` only appears in diagnostics and errors. `logger` receives a
    /// message for every renewal and a warning for every failed background
    /// renewal.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSection`] if a section outside `[1, 15]` was
    /// requested.
    pub fn new(
        tag: impl Into<String>,
        logger: impl Logger + 'static,
        options: Options,
    ) -> Result<Self> {
        let tag = tag.into();
        let config = options.resolve(&tag)?;
        Ok(Self {
            inner: Arc::new(Inner {
                tag,
                layout: config.layout,
                verifier: config.verifier,
                logger: Box::new(logger),
                counter: SequenceCounter::new(0),
                renewal: Mutex::new(Renewal {
                    source: None,
                    epoch: 0,
                }),
            }),
        })
    }

    /// Creates an unseeded generator that logs through [`TracingLogger`].
    ///
    /// # Errors
    ///
    /// See [`Wuid::new`].
    pub fn with_tracing(tag: impl Into<String>, options: Options) -> Result<Self> {
        Self::new(tag, TracingLogger, options)
    }

    /// Returns the next unique number.
    ///
    /// A single atomic increment. The caller that takes the last sequence of
    /// an epoch starts a background renewal and still returns immediately;
    /// a renewal failure there is only logged as a warning.
    #[cfg_attr(feature = "instrument", instrument(level = "trace", skip(self)))]
    #[inline]
    pub fn next_id(&self) -> u64 {
        let produced = self.inner.counter.produce();
        if produced.exhausted {
            self.cold_renew_in_background();
        }
        self.inner.layout.apply_section(produced.value)
    }

    /// Like [`Wuid::next_id`], returning the typed [`WuidId`].
    pub fn next_wuid(&self) -> WuidId {
        WuidId::from_raw(self.next_id(), self.inner.layout)
    }

    /// Claims an epoch from `source` and seeds the counter with it.
    ///
    /// Steps, in order:
    /// 1. `source.fetch()`; its error is returned as [`Error::FetchFailed`].
    /// 2. The epoch must fit the layout and pass the custom verifier, else
    ///    [`Error::InvalidEpoch`].
    /// 3. Under the renewal lock, the epoch must differ from the last one
    ///    seeded, else [`Error::EpochNotChanged`].
    /// 4. The counter is seeded with the epoch and a zero sequence. The first
    ///    source ever loaded is kept for renewals.
    ///
    /// If the counter already ran past the previous epoch into this one, the
    /// numbers issued since are kept and counting continues from there.
    ///
    /// The lease's release action runs before this returns, on every path
    /// past step 1. The renewal lock is never held across `fetch`.
    ///
    /// # Errors
    ///
    /// Any of the variants above, or `LockPoisoned` if another thread
    /// panicked while seeding.
    pub fn load_epoch<S>(&self, source: S) -> Result<()>
    where
        S: EpochSource + 'static,
    {
        self.inner.load_from(Arc::new(source))
    }

    /// Claims a new epoch from the source kept by the first successful
    /// [`Wuid::load_epoch`].
    ///
    /// # Errors
    ///
    /// [`Error::NoRenewalConfigured`] if no epoch was ever loaded, otherwise
    /// the same errors as [`Wuid::load_epoch`].
    pub fn renew_now(&self) -> Result<()> {
        self.inner.renew_now()
    }

    /// The tag given at construction.
    pub fn tag(&self) -> &str {
        &self.inner.tag
    }

    /// The section tag, if one was configured.
    pub fn section(&self) -> Option<u8> {
        self.inner
            .layout
            .has_section()
            .then_some(self.inner.layout.section())
    }

    /// The bit layout every number of this generator follows.
    pub fn layout(&self) -> Layout {
        self.inner.layout
    }

    /// The epoch portion of the live counter.
    ///
    /// Between a sequence wrap and the renewal it starts, this is the epoch
    /// the counter carried into.
    pub fn current_epoch(&self) -> u64 {
        self.inner.current_epoch()
    }

    /// Whether an epoch was ever loaded successfully.
    ///
    /// # Errors
    ///
    /// `LockPoisoned` if another thread panicked while seeding.
    pub fn is_seeded(&self) -> Result<bool> {
        Ok(lock(&self.inner.renewal)?.source.is_some())
    }

    #[cold]
    #[inline(never)]
    fn cold_renew_in_background(&self) {
        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        let spawned = thread::Builder::new()
            .name(format!("wuid-renew-{}", self.inner.tag))
            .spawn(move || {
                // Every handle is gone, nothing left to renew.
                let Some(inner) = weak.upgrade() else {
                    return;
                };
                if let Err(e) = inner.renew_now() {
                    inner.logger.warn(&format!(
                        "<wuid> renew failed. tag: {}, reason: {e}",
                        inner.tag
                    ));
                }
            });
        if let Err(e) = spawned {
            self.inner.logger.warn(&format!(
                "<wuid> failed to start renewal. tag: {}, reason: {e}",
                self.inner.tag
            ));
        }
    }

    #[cfg(test)]
    pub(crate) fn seed_raw(&self, value: u64) {
        self.inner.counter.seed(value);
    }
}

impl Inner {
    fn current_epoch(&self) -> u64 {
        self.layout.decompose_epoch(self.counter.load())
    }

    fn renew_now(&self) -> Result<()> {
        let source = lock(&self.renewal)?.source.clone();
        match source {
            Some(source) => self.load_from(source),
            None => Err(Error::NoRenewalConfigured {
                tag: self.tag.clone(),
            }),
        }
    }

    #[cfg_attr(
        feature = "instrument",
        instrument(level = "debug", skip_all, fields(tag = %self.tag))
    )]
    fn load_from(&self, source: Arc<dyn EpochSource>) -> Result<()> {
        // Dropped on every return path below, which runs the release action.
        let lease = source.fetch().map_err(Error::FetchFailed)?;
        let epoch = lease.epoch();

        let seed = self.verify(epoch)?;

        let mut renewal = lock(&self.renewal)?;
        // Compared with the last seeded epoch, never the live counter, which
        // may already have carried into `epoch`.
        self.ensure_changed(epoch, renewal.epoch)?;
        if self.current_epoch() != epoch {
            self.counter.seed(seed);
        }
        renewal.epoch = epoch;
        self.logger
            .info(&format!("<wuid> new epoch: {epoch}. tag: {}", self.tag));

        if renewal.source.is_none() {
            renewal.source = Some(source);
        }

        drop(renewal);
        drop(lease);
        Ok(())
    }

    /// Checks `epoch` against the layout, then the custom verifier, and
    /// returns the counter value it seeds.
    fn verify(&self, epoch: u64) -> Result<u64> {
        let seed = self
            .layout
            .compose(epoch, 0)
            .map_err(|e| self.invalid_epoch(epoch, Cow::Owned(e.to_string())))?;
        if let Some(verifier) = &self.verifier {
            verifier(epoch).map_err(|e| self.invalid_epoch(epoch, Cow::Owned(e.to_string())))?;
        }
        Ok(seed)
    }

    fn ensure_changed(&self, epoch: u64, last: u64) -> Result<()> {
        if epoch == last {
            return Err(Error::EpochNotChanged {
                tag: self.tag.clone(),
                epoch,
            });
        }
        Ok(())
    }

    fn invalid_epoch(&self, epoch: u64, reason: Cow<'static, str>) -> Error {
        Error::InvalidEpoch {
            tag: self.tag.clone(),
            epoch,
            reason,
        }
    }
}

impl core::fmt::Debug for Wuid {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Wuid")
            .field("tag", &self.inner.tag)
            .field("layout", &self.inner.layout)
            .field("counter", &self.inner.counter.load())
            .finish_non_exhaustive()
    }
}
