//! Auth session lifecycle
//!
//! The session manager is the sole owner of credential state. It drives the
//! full flow — initiate, callback, validity check, refresh, logout — over a
//! persisted key-value store and the token exchange client.
//!
//! Persistence shape: the whole session is one JSON record under a single
//! store key, so the access token and its expiry can never be stored
//! without each other. The PKCE verifier and anti-forgery state live under
//! their own keys for the duration of exactly one authorization attempt.
//!
//! The core correctness property of the flow lives in `handle_callback`:
//! the stored verifier and state are removed from the store before any
//! validation, so they are consumed exactly once per attempt whether the
//! exchange succeeds, the state check fails, or the server denied the
//! request. A consumed code/verifier pair can never be replayed.

use std::collections::BTreeSet;
use std::sync::Arc;

use aria_store::KvStore;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::callback::CallbackResult;
use crate::config::AuthConfig;
use crate::error::{Error, Result};
use crate::token::{self, TokenResponse};
use crate::user::{self, UserProfile};

/// Store key holding the serialized [`AuthSession`].
pub const SESSION_KEY: &str = "auth.session";
/// Store key holding the PKCE verifier between initiation and callback.
pub const VERIFIER_KEY: &str = "auth.pkce_verifier";
/// Store key holding the anti-forgery state between initiation and callback.
pub const STATE_KEY: &str = "auth.state";

/// How long before expiry a token is considered due for refresh.
pub const REFRESH_SKEW_MS: u64 = 5 * 60 * 1000;

/// A complete authenticated session.
///
/// `expires_at_ms` is an absolute unix millisecond timestamp, computed from
/// the token endpoint's `expires_in` delta at the moment the response was
/// received.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    /// Absent when the server never issued one; refresh is then impossible.
    pub refresh_token: Option<String>,
    pub expires_at_ms: u64,
    pub scopes: BTreeSet<String>,
}

impl AuthSession {
    /// Whether the access token is still within its lifetime.
    pub fn is_fresh(&self, now_ms: u64) -> bool {
        now_ms < self.expires_at_ms
    }

    /// Whether the token is due for refresh (inside the skew window or past
    /// expiry).
    fn needs_refresh(&self, now_ms: u64) -> bool {
        now_ms > self.expires_at_ms.saturating_sub(REFRESH_SKEW_MS)
    }
}

/// Orchestrates the OAuth authorization-code-with-PKCE flow.
///
/// One instance per account/config. All configuration is explicit — nothing
/// here reads process-wide state, so tests run as many managers as they
/// like side by side.
pub struct SessionManager {
    config: AuthConfig,
    store: Arc<KvStore>,
    http: reqwest::Client,
    /// Serializes refreshes: concurrent expiry detections share the one
    /// in-flight refresh instead of each issuing their own.
    refresh_gate: Mutex<()>,
}

impl SessionManager {
    pub fn new(config: AuthConfig, store: Arc<KvStore>, http: reqwest::Client) -> Self {
        Self {
            config,
            store,
            http,
            refresh_gate: Mutex::new(()),
        }
    }

    /// Start an authorization attempt.
    ///
    /// Generates fresh PKCE and anti-forgery values, persists them, and
    /// returns the authorization URL for the embedding shell to navigate
    /// to. Initiating again before a prior attempt's callback arrives
    /// overwrites the stored values — only the newest attempt can complete.
    pub async fn initiate(&self) -> Result<String> {
        let verifier = crate::pkce::generate_verifier()?;
        let challenge = crate::pkce::compute_challenge(&verifier);
        let state = crate::pkce::generate_state()?;

        self.store.set(VERIFIER_KEY, verifier).await?;
        self.store.set(STATE_KEY, state.clone()).await?;

        let url = crate::pkce::build_authorization_url(&self.config, &challenge, &state)?;
        info!("authorization flow initiated");
        Ok(url)
    }

    /// Complete an authorization attempt from the redirect callback.
    ///
    /// The stored state and verifier are taken out of the store up front,
    /// unconditionally — whatever happens below, a second callback with the
    /// same payload finds nothing and fails with `MissingVerifier`.
    pub async fn handle_callback(&self, result: CallbackResult) -> Result<AuthSession> {
        let stored_state = self.store.remove(STATE_KEY).await?;
        let stored_verifier = self.store.remove(VERIFIER_KEY).await?;

        let (code, state) = match result {
            CallbackResult::Success { code, state } => (code, state),
            CallbackResult::Denied { error } => {
                warn!(error, "authorization denied by server");
                return Err(Error::AuthorizationDenied(error));
            }
            CallbackResult::Malformed => return Err(Error::CallbackMalformed),
        };

        // Both values already gone means this attempt was consumed: a
        // re-delivered callback, not forgery.
        if stored_state.is_none() && stored_verifier.is_none() {
            return Err(Error::MissingVerifier);
        }
        match &stored_state {
            Some(stored) if stored.as_bytes() == state.as_bytes() => {}
            _ => {
                warn!("anti-forgery state mismatch on callback");
                return Err(Error::StateMismatch);
            }
        }
        let verifier = stored_verifier.ok_or(Error::MissingVerifier)?;

        let response = token::exchange_code(&self.http, &self.config, &code, &verifier)
            .await
            .map_err(|e| Error::TokenExchangeFailed(Box::new(e)))?;

        let session = self.persist_session(response, None).await?;
        info!("token exchange succeeded, session established");
        Ok(session)
    }

    /// The persisted session, if any.
    pub async fn session(&self) -> Result<Option<AuthSession>> {
        match self.store.get(SESSION_KEY).await {
            Some(json) => serde_json::from_str(&json)
                .map(Some)
                .map_err(|e| Error::SessionParse(e.to_string())),
            None => Ok(None),
        }
    }

    /// Non-mutating authentication predicate: a session exists and its
    /// access token has not expired. Never triggers a refresh, so it is
    /// safe to call on every render.
    pub async fn is_authenticated(&self) -> bool {
        match self.session().await {
            Ok(Some(session)) => session.is_fresh(common::unix_millis()),
            _ => false,
        }
    }

    /// A usable access token, refreshing opportunistically.
    ///
    /// Returns `Ok(None)` when no session exists, or when the token is due
    /// and the refresh fails — in the latter case the session is cleared,
    /// since a session whose refresh failed is assumed unrecoverable.
    pub async fn valid_access_token(&self) -> Result<Option<String>> {
        let Some(session) = self.session().await? else {
            return Ok(None);
        };
        if !session.needs_refresh(common::unix_millis()) {
            return Ok(Some(session.access_token));
        }

        // Single-flight refresh: the first caller through the gate performs
        // the exchange; callers that were queued behind it re-read the
        // session it persisted and return without touching the network.
        let _gate = self.refresh_gate.lock().await;
        if let Some(session) = self.session().await?
            && !session.needs_refresh(common::unix_millis())
        {
            return Ok(Some(session.access_token));
        }

        match self.refresh().await {
            Ok(session) => Ok(Some(session.access_token)),
            Err(e) => {
                warn!(error = %e, "refresh failed, clearing session");
                self.logout().await?;
                Ok(None)
            }
        }
    }

    /// Exchange the stored refresh token for a new access token.
    ///
    /// The access token is always replaced; the refresh token only when the
    /// server rotated it, otherwise the prior one is retained. Whether this
    /// server rotates on every refresh should be confirmed against its
    /// documentation — retention is the permissive reading.
    pub async fn refresh(&self) -> Result<AuthSession> {
        let session = self.session().await?.ok_or(Error::NoRefreshToken)?;
        let refresh_token = session.refresh_token.ok_or(Error::NoRefreshToken)?;

        let response = token::exchange_refresh_token(&self.http, &self.config, &refresh_token)
            .await
            .map_err(|e| Error::RefreshFailed(Box::new(e)))?;

        let session = self.persist_session(response, Some(refresh_token)).await?;
        info!("token refresh succeeded");
        Ok(session)
    }

    /// Clear every persisted auth entry, including any leftover verifier or
    /// state from an abandoned attempt. Idempotent from any state.
    pub async fn logout(&self) -> Result<()> {
        for key in [SESSION_KEY, VERIFIER_KEY, STATE_KEY] {
            self.store.remove(key).await?;
        }
        debug!("cleared persisted auth entries");
        Ok(())
    }

    /// Fetch the authenticated user's profile, refreshing the token first
    /// if needed.
    pub async fn current_user(&self) -> Result<UserProfile> {
        let token = self
            .valid_access_token()
            .await?
            .ok_or(Error::NotAuthenticated)?;
        user::fetch_current_user(&self.http, &self.config, &token).await
    }

    /// Convert a token response into a persisted session.
    ///
    /// `expires_at_ms` is fixed here, at receipt time. `prior_refresh`
    /// carries the previous refresh token for servers that don't rotate.
    async fn persist_session(
        &self,
        response: TokenResponse,
        prior_refresh: Option<String>,
    ) -> Result<AuthSession> {
        let session = AuthSession {
            access_token: response.access_token,
            refresh_token: response.refresh_token.or(prior_refresh),
            expires_at_ms: common::unix_millis()
                .saturating_add(response.expires_in.saturating_mul(1000)),
            scopes: response.scope.split_whitespace().map(String::from).collect(),
        };
        let json = serde_json::to_string(&session)
            .map_err(|e| Error::SessionParse(e.to_string()))?;
        self.store.set(SESSION_KEY, json).await?;
        debug!(expires_at_ms = session.expires_at_ms, "persisted session");
        Ok(session)
    }
}
