//! Redirect callback parsing
//!
//! After the interactive consent step the authorization server navigates
//! back to the registered redirect URI with the outcome in query
//! parameters. This module classifies that URL before the session manager
//! acts on it.

use url::Url;

/// Outcome parsed from the redirect URL's query parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackResult {
    /// `code` and `state` both present — exchange can proceed.
    Success { code: String, state: String },
    /// Server reported an error (user declined consent, invalid request).
    Denied { error: String },
    /// Unparseable URL or required parameters missing.
    Malformed,
}

impl CallbackResult {
    /// Classify a callback URL.
    ///
    /// An `error` parameter wins over everything else: the server reported
    /// a denial even if it also echoed other parameters.
    pub fn parse(callback_url: &str) -> Self {
        let Ok(url) = Url::parse(callback_url) else {
            return CallbackResult::Malformed;
        };

        let mut code = None;
        let mut state = None;
        let mut error = None;
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "code" => code = Some(value.into_owned()),
                "state" => state = Some(value.into_owned()),
                "error" => error = Some(value.into_owned()),
                _ => {}
            }
        }

        if let Some(error) = error {
            return CallbackResult::Denied { error };
        }
        match (code, state) {
            (Some(code), Some(state)) => CallbackResult::Success { code, state },
            _ => CallbackResult::Malformed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_success_callback() {
        let result =
            CallbackResult::parse("http://127.0.0.1:8080/callback?code=AC1&state=xyz");
        assert_eq!(
            result,
            CallbackResult::Success {
                code: "AC1".into(),
                state: "xyz".into()
            }
        );
    }

    #[test]
    fn error_param_is_denied_even_with_code() {
        let result = CallbackResult::parse(
            "http://127.0.0.1:8080/callback?error=access_denied&state=xyz&code=AC1",
        );
        assert_eq!(
            result,
            CallbackResult::Denied {
                error: "access_denied".into()
            }
        );
    }

    #[test]
    fn missing_code_is_malformed() {
        let result = CallbackResult::parse("http://127.0.0.1:8080/callback?state=xyz");
        assert_eq!(result, CallbackResult::Malformed);
    }

    #[test]
    fn missing_state_is_malformed() {
        let result = CallbackResult::parse("http://127.0.0.1:8080/callback?code=AC1");
        assert_eq!(result, CallbackResult::Malformed);
    }

    #[test]
    fn unparseable_url_is_malformed() {
        assert_eq!(CallbackResult::parse("::not a url::"), CallbackResult::Malformed);
    }

    #[test]
    fn query_values_are_percent_decoded() {
        let result =
            CallbackResult::parse("http://127.0.0.1:8080/callback?code=a%2Fb&state=x%20y");
        assert_eq!(
            result,
            CallbackResult::Success {
                code: "a/b".into(),
                state: "x y".into()
            }
        );
    }
}
