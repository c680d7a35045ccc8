mod counter;
mod error;
mod mutex;
mod wuid;

pub(crate) use counter::*;
pub use error::*;
pub(crate) use mutex::*;
pub use wuid::*;
