//! Installed-app OAuth consent flow with a loopback redirect listener.

use crate::config::Config;
use crate::error::AuthError;
use crate::shutdown::wait_for_signal;
use tracing::{info, warn};
use url::Url;

pub const AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const SCOPES: &str = "https://www.googleapis.com/auth/calendar.readonly";

/// Build the consent page URL
pub fn authorization_url(config: &Config, state: &str) -> Result<Url, AuthError> {
    if config.google_client_id.is_empty() {
        return Err(AuthError::NotConfigured("GOOGLE_CLIENT_ID"));
    }

    let mut url = Url::parse(AUTH_URL).map_err(|e| AuthError::Callback(e.to_string()))?;
    url.query_pairs_mut()
        .append_pair("client_id", &config.google_client_id)
        .append_pair("redirect_uri", &config.redirect_uri())
        .append_pair("response_type", "code")
        .append_pair("access_type", "offline")
        .append_pair("prompt", "consent")
        .append_pair("scope", SCOPES)
        .append_pair("state", state);
    Ok(url)
}

/// Pull the authorization code out of the redirect request target (`/?code=..&state=..`)
pub fn parse_callback(request_target: &str, expected_state: &str) -> Result<String, AuthError> {
    let url = Url::parse(&format!("http://localhost{}", request_target))
        .map_err(|e| AuthError::Callback(format!("Malformed callback URL: {}", e)))?;

    let mut code = None;
    let mut state = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            "error" => return Err(AuthError::Denied(value.into_owned())),
            _ => {}
        }
    }

    if state.as_deref() != Some(expected_state) {
        return Err(AuthError::StateMismatch);
    }

    code.filter(|c| !c.is_empty()).ok_or(AuthError::MissingCode)
}

/// Open the consent page and wait for the redirect. Returns the authorization code.
pub async fn request_authorization_code(config: &Config) -> Result<String, AuthError> {
    let state = uuid::Uuid::new_v4().to_string();
    let auth_url = authorization_url(config, &state)?;

    // Bind before opening the browser so the redirect cannot arrive first
    let address = format!("127.0.0.1:{}", config.oauth_redirect_port);
    let server =
        tiny_http::Server::http(&address).map_err(|e| AuthError::Callback(e.to_string()))?;

    println!("Opening browser for Google Calendar authorization...");
    if let Err(e) = webbrowser::open(auth_url.as_str()) {
        warn!("Could not open a browser: {}", e);
    }
    println!("If the browser did not open, visit:\n{}", auth_url);
    info!("Waiting for authorization callback on {}", address);

    let listener = tokio::task::spawn_blocking(move || -> Result<String, AuthError> {
        let request = server
            .recv()
            .map_err(|e| AuthError::Callback(e.to_string()))?;
        let result = parse_callback(request.url(), &state);

        let message = match &result {
            Ok(_) => "Authorization successful! You can close this window.".to_string(),
            Err(e) => format!("Authorization failed: {}", e),
        };
        if let Err(e) = request.respond(tiny_http::Response::from_string(message)) {
            warn!("Failed to answer the browser: {}", e);
        }
        result
    });

    tokio::select! {
        joined = listener => joined.map_err(|e| AuthError::Callback(e.to_string()))?,
        _ = wait_for_signal() => Err(AuthError::Cancelled),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorization_url_carries_state_and_scope() {
        let config = Config {
            google_client_id: "client-123".to_string(),
            ..Default::default()
        };
        let url = authorization_url(&config, "xyz").unwrap();
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        assert!(pairs.contains(&("client_id".to_string(), "client-123".to_string())));
        assert!(pairs.contains(&("state".to_string(), "xyz".to_string())));
        assert!(pairs.contains(&("scope".to_string(), SCOPES.to_string())));
        assert!(pairs.contains(&(
            "redirect_uri".to_string(),
            "http://localhost:8080".to_string()
        )));
    }

    #[test]
    fn test_authorization_url_requires_client_id() {
        let err = authorization_url(&Config::default(), "xyz").unwrap_err();
        assert!(matches!(err, AuthError::NotConfigured("GOOGLE_CLIENT_ID")));
    }

    #[test]
    fn test_parse_callback_success() {
        let code = parse_callback("/?state=abc&code=4%2F0Ab&scope=x", "abc").unwrap();
        assert_eq!(code, "4/0Ab");
    }

    #[test]
    fn test_parse_callback_state_mismatch() {
        let err = parse_callback("/?state=other&code=c", "abc").unwrap_err();
        assert!(matches!(err, AuthError::StateMismatch));
    }

    #[test]
    fn test_parse_callback_denied() {
        let err = parse_callback("/?error=access_denied&state=abc", "abc").unwrap_err();
        assert!(matches!(err, AuthError::Denied(reason) if reason == "access_denied"));
    }

    #[test]
    fn test_parse_callback_missing_code() {
        let err = parse_callback("/?state=abc", "abc").unwrap_err();
        assert!(matches!(err, AuthError::MissingCode));
    }
}
