use portable_atomic::{AtomicU64, Ordering};

use crate::id::Layout;

/// The lock-free hot-path state of a generator: one 64-bit word holding the
/// section tag, the epoch and the sequence. Past a wrap the carry is left in
/// the word; the generator re-applies the section before handing it out.
///
/// `produce` is a single `fetch_add`, so concurrent callers never observe
/// the same value. Renewal replaces the whole word through [`seed`].
///
/// [`seed`]: SequenceCounter::seed
#[derive(Debug)]
pub(crate) struct SequenceCounter {
    #[cfg(feature = "cache-padded")]
    state: crossbeam_utils::CachePadded<AtomicU64>,
    #[cfg(not(feature = "cache-padded"))]
    state: AtomicU64,
}

/// The outcome of one [`SequenceCounter::produce`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Produced {
    /// The number handed to the caller.
    pub(crate) value: u64,
    /// `true` for the single caller that consumed the last sequence of the
    /// current epoch. The counter now points past the epoch's sequence space.
    pub(crate) exhausted: bool,
}

impl SequenceCounter {
    pub(crate) fn new(initial: u64) -> Self {
        Self {
            #[cfg(feature = "cache-padded")]
            state: crossbeam_utils::CachePadded::new(AtomicU64::new(initial)),
            #[cfg(not(feature = "cache-padded"))]
            state: AtomicU64::new(initial),
        }
    }

    /// Hands out the current value and advances the counter by one.
    ///
    /// The post-increment value having a zero sequence means the sequence
    /// wrapped. Exactly one caller per wrap sees `exhausted`.
    #[inline]
    pub(crate) fn produce(&self) -> Produced {
        let value = self.state.fetch_add(1, Ordering::Relaxed);
        let next = value.wrapping_add(1);
        Produced {
            value,
            exhausted: Layout::decompose_sequence(next) == 0,
        }
    }

    /// Replaces the counter. Only called while holding the renewal lock.
    pub(crate) fn seed(&self, value: u64) {
        self.state.store(value, Ordering::Release);
    }

    /// The value the next [`produce`] will hand out.
    ///
    /// [`produce`]: SequenceCounter::produce
    pub(crate) fn load(&self) -> u64 {
        self.state.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{collections::HashSet, sync::Mutex, thread::scope};

    #[test]
    fn produce_hands_out_consecutive_values() {
        let counter = SequenceCounter::new(5 << 36);
        assert_eq!(counter.produce().value, 5 << 36);
        assert_eq!(counter.produce().value, (5 << 36) + 1);
        assert_eq!(counter.load(), (5 << 36) + 2);
    }

    #[test]
    fn produce_flags_the_last_sequence_of_an_epoch() {
        let last = (5 << 36) | Layout::max_sequence();
        let counter = SequenceCounter::new(last - 1);

        let before = counter.produce();
        assert_eq!(before.value, last - 1);
        assert!(!before.exhausted);

        let edge = counter.produce();
        assert_eq!(edge.value, last);
        assert!(edge.exhausted);

        // Carries into the epoch bits until renewal reseeds.
        let after = counter.produce();
        assert_eq!(after.value, 6 << 36);
        assert!(!after.exhausted);
    }

    #[test]
    fn seed_replaces_the_counter() {
        let counter = SequenceCounter::new(0);
        counter.produce();
        counter.seed(9 << 36);
        assert_eq!(counter.produce().value, 9 << 36);
    }

    #[test]
    fn concurrent_produce_is_contiguous() {
        const THREADS: usize = 8;
        const PER_THREAD: usize = 4096;
        const START: u64 = 3 << 36;

        let counter = SequenceCounter::new(START);
        let seen = Mutex::new(HashSet::with_capacity(THREADS * PER_THREAD));

        scope(|s| {
            for _ in 0..THREADS {
                s.spawn(|| {
                    let mut local = Vec::with_capacity(PER_THREAD);
                    for _ in 0..PER_THREAD {
                        local.push(counter.produce().value);
                    }
                    let mut seen = seen.lock().unwrap();
                    for value in local {
                        assert!(seen.insert(value), "duplicate value {value}");
                    }
                });
            }
        });

        let seen = seen.into_inner().unwrap();
        let total = (THREADS * PER_THREAD) as u64;
        assert_eq!(seen.len() as u64, total);
        assert!((START..START + total).all(|v| seen.contains(&v)));
    }
}
