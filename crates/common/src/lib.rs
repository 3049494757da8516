//! Common types for the Aria client workspace

mod error;
mod time;

pub use error::{Error, Result};
pub use time::unix_millis;
