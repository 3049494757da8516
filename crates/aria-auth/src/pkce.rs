//! PKCE (Proof Key for Code Exchange) implementation per RFC 7636
//!
//! Generates the code verifier and S256 challenge used during the OAuth
//! authorization flow, plus the independent anti-forgery state value. The
//! verifier is persisted until the callback and sent during token exchange;
//! the challenge is included in the authorization URL so the authorization
//! server can verify the exchange request came from the same party that
//! initiated the flow.
//!
//! All randomness comes from the OS secure RNG. There is no fallback: if
//! the entropy source is unavailable, initiation fails.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::TryRngCore;
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};
use url::Url;

use crate::config::AuthConfig;
use crate::error::{Error, Result};

/// Generate a cryptographically random PKCE code verifier.
///
/// Produces a 32-byte random value encoded as URL-safe base64 (no padding),
/// 43 characters — the minimum length RFC 7636 allows and the same draw the
/// browser clients this mirrors use.
pub fn generate_verifier() -> Result<String> {
    Ok(URL_SAFE_NO_PAD.encode(random_bytes::<32>()?))
}

/// Compute the S256 code challenge from a verifier.
///
/// `challenge = BASE64URL(SHA256(verifier))`
///
/// The authorization server compares this against the challenge sent in
/// the authorization URL to verify the token exchange request is legitimate.
pub fn compute_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

/// Generate the anti-forgery state value.
///
/// An independent 16-byte random draw — never derived from the PKCE
/// verifier. The authorization server returns it unchanged in the callback,
/// where it is compared byte-for-byte against the stored copy.
pub fn generate_state() -> Result<String> {
    Ok(URL_SAFE_NO_PAD.encode(random_bytes::<16>()?))
}

/// Build the full authorization URL with all required OAuth parameters.
pub fn build_authorization_url(
    config: &AuthConfig,
    challenge: &str,
    state: &str,
) -> Result<String> {
    let mut url = Url::parse(&config.authorize_endpoint)
        .map_err(|e| Error::InvalidEndpoint(format!("{}: {e}", config.authorize_endpoint)))?;
    url.query_pairs_mut()
        .append_pair("client_id", &config.client_id)
        .append_pair("response_type", "code")
        .append_pair("redirect_uri", &config.redirect_uri)
        .append_pair("code_challenge_method", "S256")
        .append_pair("code_challenge", challenge)
        .append_pair("scope", &config.scope_param())
        .append_pair("state", state);
    Ok(url.into())
}

fn random_bytes<const N: usize>() -> Result<[u8; N]> {
    let mut bytes = [0u8; N];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| Error::EntropyUnavailable(e.to_string()))?;
    Ok(bytes)
}
