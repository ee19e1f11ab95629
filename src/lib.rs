pub mod cs;

pub use cs::{channel, compression, ecc, transmission};
pub use cs::error::{Error, Result};
