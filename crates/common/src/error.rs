//! Workspace-wide error type
//!
//! Covers the failure modes shared across crates: configuration values
//! that don't validate, filesystem access, and TOML parsing. Domain
//! failures (OAuth flow, store persistence) live in their own crates.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Result alias using the shared Error
pub type Result<T> = std::result::Result<T, Error>;
