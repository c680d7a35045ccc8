//! # wuid
//!
//! Fast 64-bit unique numbers for fleets of processes that share one
//! coordination store.
//!
//! Every number is split into a slowly changing **epoch**, claimed from the
//! store through an [`EpochSource`], and a fast **sequence** produced by a
//! local atomic increment. The store is consulted once per epoch, not once
//! per number.
//!
//! ```
//! use wuid::{Lease, Options, Wuid};
//!
//! let generator = Wuid::with_tracing("orders", Options::new().with_section(1)).unwrap();
//! generator
//!     .load_epoch(|| Ok::<_, std::io::Error>(Lease::new(0x123)))
//!     .unwrap();
//!
//! let id = generator.next_wuid();
//! assert_eq!(id.section(), Some(1));
//! assert_eq!(id.epoch(), 0x123);
//! assert_eq!(id.sequence(), 0);
//! ```
mod generator;
mod id;
mod logger;
mod options;
mod source;

pub use crate::generator::*;
pub use crate::id::*;
pub use crate::logger::*;
pub use crate::options::*;
pub use crate::source::*;
