use core::fmt;
use std::sync::Arc;

use crate::{BoxError, Error, Layout, Result};

/// A custom epoch check that runs after the built-in width check.
pub type Verifier = Arc<dyn Fn(u64) -> Result<(), BoxError> + Send + Sync>;

/// Construction-time options for a [`Wuid`].
///
/// Options are resolved once by [`Wuid::new`] and cannot change afterwards.
///
/// ```
/// use wuid::{Options, Wuid};
///
/// let options = Options::new()
///     .with_section(2)
///     .with_verifier(|epoch| {
///         if epoch < 10 {
///             return Err("reserved epoch");
///         }
///         Ok(())
///     });
///
/// let generator = Wuid::with_tracing("orders", options).unwrap();
/// assert_eq!(generator.section(), Some(2));
/// ```
///
/// [`Wuid`]: crate::Wuid
/// [`Wuid::new`]: crate::Wuid::new
#[derive(Clone, Default)]
pub struct Options {
    section: Option<u8>,
    verifier: Option<Verifier>,
}

impl Options {
    /// Options with no section and no custom verifier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves the top 4 bits of every number for `section`, which must be
    /// within `[1, 15]`. The epoch narrows to 24 bits.
    #[must_use]
    pub fn with_section(mut self, section: u8) -> Self {
        self.section = Some(section);
        self
    }

    /// Adds a check every candidate epoch must pass before it is seeded.
    #[must_use]
    pub fn with_verifier<F, E>(mut self, verifier: F) -> Self
    where
        F: Fn(u64) -> Result<(), E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        self.verifier = Some(Arc::new(move |epoch| verifier(epoch).map_err(Into::into)));
        self
    }

    pub(crate) fn resolve(self, tag: &str) -> Result<Config> {
        let layout = match self.section {
            None => Layout::plain(),
            Some(section) => {
                Layout::sectioned(section).map_err(|_| Error::InvalidSection {
                    tag: tag.to_owned(),
                    section,
                })?
            }
        };
        Ok(Config {
            layout,
            verifier: self.verifier,
        })
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("section", &self.section)
            .field("verifier", &self.verifier.is_some())
            .finish()
    }
}

/// Resolved, immutable generator identity.
pub(crate) struct Config {
    pub(crate) layout: Layout,
    pub(crate) verifier: Option<Verifier>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_section_resolves_to_plain_layout() {
        let config = Options::new().resolve("t").unwrap();
        assert_eq!(config.layout, Layout::plain());
        assert!(config.verifier.is_none());
    }

    #[test]
    fn section_out_of_range_is_rejected() {
        for section in [0, 16, u8::MAX] {
            let Err(err) = Options::new().with_section(section).resolve("t") else {
                panic!("section {section} should be rejected");
            };
            assert!(
                matches!(err, Error::InvalidSection { ref tag, section: s } if tag == "t" && s == section),
                "unexpected error: {err:?}"
            );
        }
    }

    #[test]
    fn section_in_range_is_kept() {
        for section in 1..=15 {
            let config = Options::new().with_section(section).resolve("t").unwrap();
            assert_eq!(config.layout.section(), section);
        }
    }

    #[test]
    fn verifier_errors_are_boxed() {
        let config = Options::new()
            .with_verifier(|epoch| if epoch == 0 { Err("zero") } else { Ok(()) })
            .resolve("t")
            .unwrap();
        let verifier = config.verifier.unwrap();
        assert!(verifier(1).is_ok());
        assert_eq!(verifier(0).unwrap_err().to_string(), "zero");
    }
}
