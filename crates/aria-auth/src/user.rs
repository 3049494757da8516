//! Current-user profile fetch
//!
//! The one bearer-authorized API call the auth flow owns: fetching the
//! authenticated user's profile. The rest of the API surface belongs to
//! the application layers.

use serde::Deserialize;

use crate::config::AuthConfig;
use crate::error::{Error, Result};

/// The authenticated user's profile, as the `/v1/me` endpoint returns it.
/// Only the fields the client uses are deserialized.
#[derive(Debug, Clone, Deserialize)]
pub struct UserProfile {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    /// Subscription tier, when the server reports one
    #[serde(default)]
    pub product: Option<String>,
}

/// Fetch the current user's profile with a bearer token.
pub async fn fetch_current_user(
    client: &reqwest::Client,
    config: &AuthConfig,
    access_token: &str,
) -> Result<UserProfile> {
    let url = format!("{}/v1/me", config.api_endpoint.trim_end_matches('/'));
    let response = client
        .get(url)
        .bearer_auth(access_token)
        .send()
        .await
        .map_err(|e| Error::Http(format!("user profile request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(Error::UserFetchFailed(status.as_u16()));
    }

    response
        .json::<UserProfile>()
        .await
        .map_err(|e| Error::MalformedResponse(format!("user profile: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(uri: &str) -> AuthConfig {
        AuthConfig {
            client_id: "test-client".into(),
            redirect_uri: "http://127.0.0.1:8080/callback".into(),
            scopes: vec!["user-read-private".into()],
            authorize_endpoint: format!("{uri}/authorize"),
            token_endpoint: format!("{uri}/api/token"),
            api_endpoint: uri.to_string(),
        }
    }

    #[tokio::test]
    async fn sends_bearer_token_and_parses_profile() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/me"))
            .and(header("authorization", "Bearer AT1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "user-1",
                "display_name": "Test Listener",
                "email": "listener@example.com",
                "product": "premium"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let config = config_for(&server.uri());
        let profile = fetch_current_user(&reqwest::Client::new(), &config, "AT1")
            .await
            .unwrap();
        assert_eq!(profile.id, "user-1");
        assert_eq!(profile.display_name.as_deref(), Some("Test Listener"));
        assert_eq!(profile.product.as_deref(), Some("premium"));
    }

    #[tokio::test]
    async fn non_success_status_is_user_fetch_failed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/me"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let config = config_for(&server.uri());
        let err = fetch_current_user(&reqwest::Client::new(), &config, "stale")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UserFetchFailed(401)), "got: {err:?}");
    }

    #[tokio::test]
    async fn optional_fields_may_be_absent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/me"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "user-2"})),
            )
            .mount(&server)
            .await;

        let config = config_for(&server.uri());
        let profile = fetch_current_user(&reqwest::Client::new(), &config, "AT1")
            .await
            .unwrap();
        assert_eq!(profile.id, "user-2");
        assert!(profile.display_name.is_none());
        assert!(profile.email.is_none());
    }
}
