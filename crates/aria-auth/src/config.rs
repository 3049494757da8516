//! Client configuration
//!
//! All flow parameters (client id, redirect target, scopes, endpoints) live
//! in an explicit `AuthConfig` value passed to the session manager at
//! construction. Nothing here is process-wide state, so tests and multiple
//! accounts can run their own instances side by side.
//!
//! The client id is a public OAuth client identifier, not a secret — PKCE
//! clients have no client secret at all.

use std::path::Path;

use serde::Deserialize;
use url::Url;

/// OAuth client configuration for a PKCE public client.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Public OAuth client identifier
    pub client_id: String,
    /// Redirect target registered with the authorization server
    pub redirect_uri: String,
    /// Requested scopes, space-joined into the authorize request
    pub scopes: Vec<String>,
    /// Authorization endpoint (interactive consent page)
    pub authorize_endpoint: String,
    /// Token endpoint (code exchange and refresh)
    pub token_endpoint: String,
    /// Base URL of the REST API (current-user endpoint lives here)
    pub api_endpoint: String,
}

impl AuthConfig {
    /// Load configuration from a TOML file and validate it.
    pub fn load(path: &Path) -> common::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: AuthConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// Every URL must parse with an http(s) scheme, and the client id and
    /// scope list must be non-empty.
    pub fn validate(&self) -> common::Result<()> {
        if self.client_id.trim().is_empty() {
            return Err(common::Error::Config("client_id must not be empty".into()));
        }
        if self.scopes.is_empty() {
            return Err(common::Error::Config(
                "at least one scope must be requested".into(),
            ));
        }
        for (name, value) in [
            ("redirect_uri", &self.redirect_uri),
            ("authorize_endpoint", &self.authorize_endpoint),
            ("token_endpoint", &self.token_endpoint),
            ("api_endpoint", &self.api_endpoint),
        ] {
            let url = Url::parse(value)
                .map_err(|e| common::Error::Config(format!("{name} is not a valid URL: {e}")))?;
            if url.scheme() != "http" && url.scheme() != "https" {
                return Err(common::Error::Config(format!(
                    "{name} must use http or https, got: {value}"
                )));
            }
        }
        Ok(())
    }

    /// Scopes joined with spaces, as the authorize and token endpoints
    /// expect them.
    pub fn scope_param(&self) -> String {
        self.scopes.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> AuthConfig {
        AuthConfig {
            client_id: "test-client".into(),
            redirect_uri: "http://127.0.0.1:8080/callback".into(),
            scopes: vec!["user-read-private".into(), "user-library-read".into()],
            authorize_endpoint: "https://accounts.example.com/authorize".into(),
            token_endpoint: "https://accounts.example.com/api/token".into(),
            api_endpoint: "https://api.example.com".into(),
        }
    }

    #[test]
    fn valid_config_passes_validation() {
        valid_config().validate().unwrap();
    }

    #[test]
    fn empty_client_id_rejected() {
        let mut config = valid_config();
        config.client_id = "  ".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn empty_scopes_rejected() {
        let mut config = valid_config();
        config.scopes.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn non_http_endpoint_rejected() {
        let mut config = valid_config();
        config.token_endpoint = "ftp://accounts.example.com/token".into();
        let err = config.validate().unwrap_err();
        assert!(
            err.to_string().contains("token_endpoint"),
            "error should name the field, got: {err}"
        );
    }

    #[test]
    fn unparseable_redirect_rejected() {
        let mut config = valid_config();
        config.redirect_uri = "not a url".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn scope_param_is_space_joined() {
        assert_eq!(
            valid_config().scope_param(),
            "user-read-private user-library-read"
        );
    }

    #[test]
    fn load_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("auth.toml");
        std::fs::write(
            &path,
            r#"
client_id = "test-client"
redirect_uri = "http://127.0.0.1:8080/callback"
scopes = ["user-read-private"]
authorize_endpoint = "https://accounts.example.com/authorize"
token_endpoint = "https://accounts.example.com/api/token"
api_endpoint = "https://api.example.com"
"#,
        )
        .unwrap();

        let config = AuthConfig::load(&path).unwrap();
        assert_eq!(config.client_id, "test-client");
        assert_eq!(config.scopes.len(), 1);
    }

    #[test]
    fn load_missing_file_errors() {
        let result = AuthConfig::load(Path::new("/nonexistent/auth.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn load_invalid_toml_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "not valid {{{{ toml").unwrap();
        assert!(AuthConfig::load(&path).is_err());
    }
}
