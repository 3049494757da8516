//! OAuth token exchange and refresh
//!
//! Handles the two token endpoint interactions:
//! 1. Authorization code exchange (initial flow completion)
//! 2. Token refresh (opportunistic, when the access token nears expiry)
//!
//! Both operations POST a form-encoded body to the configured token
//! endpoint with different grant types. Responses are parsed into
//! [`TokenResponse`]; the session manager converts `expires_in` (a seconds
//! delta) into an absolute unix millisecond timestamp at receipt time. That
//! conversion trusts the local clock — skew against the server is not
//! corrected for.

use serde::Deserialize;
use tracing::warn;

use crate::config::AuthConfig;
use crate::error::{Error, Result};

/// Response from the token endpoint for both exchange and refresh.
///
/// `refresh_token` is optional: on refresh, servers that don't rotate the
/// token omit it, and the caller keeps the prior one.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    /// Seconds until the access token expires (delta, not absolute)
    pub expires_in: u64,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Granted scopes, space-joined
    pub scope: String,
}

/// Exchange an authorization code for tokens (initial flow).
///
/// The second step of the PKCE flow: the user has authorized in their
/// browser and the callback delivered the code. The PKCE verifier sent
/// alongside proves we are the party that initiated the flow.
pub async fn exchange_code(
    client: &reqwest::Client,
    config: &AuthConfig,
    code: &str,
    verifier: &str,
) -> Result<TokenResponse> {
    let response = client
        .post(&config.token_endpoint)
        .form(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", config.redirect_uri.as_str()),
            ("client_id", config.client_id.as_str()),
            ("code_verifier", verifier),
        ])
        .send()
        .await
        .map_err(|e| Error::Http(format!("token exchange request failed: {e}")))?;

    parse_token_response(response).await
}

/// Refresh an access token using a refresh token.
pub async fn exchange_refresh_token(
    client: &reqwest::Client,
    config: &AuthConfig,
    refresh_token: &str,
) -> Result<TokenResponse> {
    let response = client
        .post(&config.token_endpoint)
        .form(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", config.client_id.as_str()),
        ])
        .send()
        .await
        .map_err(|e| Error::Http(format!("token refresh request failed: {e}")))?;

    parse_token_response(response).await
}

/// Shared response handling for both grant types.
///
/// Non-success statuses become `HttpError(status)`; a success body missing
/// required fields (access token, expiry, scope) becomes
/// `MalformedResponse`.
async fn parse_token_response(response: reqwest::Response) -> Result<TokenResponse> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| String::from("<no body>"));
        warn!(status = status.as_u16(), body = %body, "token endpoint returned error");
        return Err(Error::HttpError(status.as_u16()));
    }

    response
        .json::<TokenResponse>()
        .await
        .map_err(|e| Error::MalformedResponse(format!("token response: {e}")))
}
