mod interface;
mod lease;

pub use interface::*;
pub use lease::*;
