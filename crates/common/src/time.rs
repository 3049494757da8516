//! Wall-clock helper

use std::time::{SystemTime, UNIX_EPOCH};

/// Current time as unix milliseconds.
///
/// Session expiry is stored as an absolute unix millisecond timestamp, so
/// every comparison against it goes through this single helper. A clock
/// before the epoch yields 0 rather than panicking.
pub fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
