//! Error types for OAuth authentication operations

/// Errors from OAuth authentication operations.
///
/// Failures of the authorization flow itself (`AuthorizationDenied`,
/// `CallbackMalformed`, `StateMismatch`, `MissingVerifier`) return the user
/// to the unauthenticated state and are never retried automatically.
/// `TokenExchangeFailed` and `RefreshFailed` wrap the specific transport or
/// protocol cause; recovering from them means re-running the interactive
/// flow.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("secure random source unavailable: {0}")]
    EntropyUnavailable(String),

    #[error("authorization denied: {0}")]
    AuthorizationDenied(String),

    #[error("callback URL is malformed or missing required parameters")]
    CallbackMalformed,

    #[error("callback state does not match stored anti-forgery value")]
    StateMismatch,

    #[error("no stored PKCE verifier for this callback")]
    MissingVerifier,

    #[error("stored session has no refresh token")]
    NoRefreshToken,

    #[error("token exchange failed: {0}")]
    TokenExchangeFailed(#[source] Box<Error>),

    #[error("token refresh failed: {0}")]
    RefreshFailed(#[source] Box<Error>),

    #[error("endpoint returned HTTP {0}")]
    HttpError(u16),

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("invalid endpoint URL: {0}")]
    InvalidEndpoint(String),

    #[error("user profile fetch failed with HTTP {0}")]
    UserFetchFailed(u16),

    #[error("no valid access token available")]
    NotAuthenticated,

    #[error("invalid session record: {0}")]
    SessionParse(String),

    #[error("store error: {0}")]
    Store(#[from] aria_store::Error),
}

/// Result alias for auth operations.
pub type Result<T> = std::result::Result<T, Error>;
