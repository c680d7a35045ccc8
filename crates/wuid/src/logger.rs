/// The diagnostic sink a generator reports renewals to.
///
/// Called synchronously from whichever thread performed the renewal, so
/// implementations must be safe to call concurrently and must not block for
/// long.
pub trait Logger: Send + Sync {
    fn info(&self, message: &str);

    fn warn(&self, message: &str);
}

/// A [`Logger`] that forwards to [`tracing`] events under the `wuid` target.
///
/// Install any subscriber (e.g. `tracing_subscriber::fmt`) to see them.
#[derive(Default, Clone, Copy, Debug)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn info(&self, message: &str) {
        tracing::info!(target: "wuid", "{message}");
    }

    fn warn(&self, message: &str) {
        tracing::warn!(target: "wuid", "{message}");
    }
}

impl<L: Logger + ?Sized> Logger for std::sync::Arc<L> {
    fn info(&self, message: &str) {
        (**self).info(message);
    }

    fn warn(&self, message: &str) {
        (**self).warn(message);
    }
}
