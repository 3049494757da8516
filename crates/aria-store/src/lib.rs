//! Persisted key-value store for the Aria client
//!
//! A durable, string-keyed store that survives process restarts — the
//! native analogue of browser local storage. Backed by a single JSON file
//! with atomic temp-file + rename writes. The auth crate keeps tokens and
//! PKCE material here; nothing in this crate knows what the keys mean.

mod error;
mod kv;

pub use error::{Error, Result};
pub use kv::KvStore;
