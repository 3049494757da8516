//! OAuth 2.0 authorization-code-with-PKCE client for the Aria music client
//!
//! Provides PKCE flow generation, callback validation, token exchange and
//! refresh, and session lifecycle over a persisted key-value store. This
//! crate is a standalone library with no dependency on any UI shell — it
//! can be tested and used independently.
//!
//! Flow:
//! 1. Shell calls `SessionManager::initiate()` and navigates the user to
//!    the returned authorization URL
//! 2. The redirect back is parsed with `CallbackResult::parse()`
//! 3. `SessionManager::handle_callback()` validates the anti-forgery state
//!    and exchanges the code for a session
//! 4. API calls obtain a token via `SessionManager::valid_access_token()`,
//!    which refreshes opportunistically and single-flight
//! 5. `SessionManager::logout()` clears every persisted auth entry

pub mod callback;
pub mod config;
pub mod error;
pub mod pkce;
pub mod session;
pub mod token;
pub mod user;

pub use callback::CallbackResult;
pub use config::AuthConfig;
pub use error::{Error, Result};
pub use pkce::{build_authorization_url, compute_challenge, generate_state, generate_verifier};
pub use session::{AuthSession, REFRESH_SKEW_MS, SessionManager};
pub use token::{TokenResponse, exchange_code, exchange_refresh_token};
pub use user::{UserProfile, fetch_current_user};
