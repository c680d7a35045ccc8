mod layout;
mod wuid_id;

pub use layout::*;
pub use wuid_id::*;
