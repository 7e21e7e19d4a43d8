use crate::components::storage::{keys, KeyValueStore};
use crate::config::Config;
use crate::error::{AuthError, Error, JobResult};
use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

pub const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const REVOKE_URL: &str = "https://oauth2.googleapis.com/revoke";

/// Seconds before expiry at which a token is treated as expired
const EXPIRY_MARGIN_SECS: i64 = 60;

/// OAuth token as persisted in storage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredToken {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Unix timestamp (seconds)
    pub expires_at: i64,
}

impl StoredToken {
    pub fn is_expired(&self, now: i64) -> bool {
        self.expires_at - EXPIRY_MARGIN_SECS <= now
    }
}

/// Token endpoint response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
}

impl TokenResponse {
    /// Convert into a stored token, keeping `previous_refresh` when Google omits a new one
    fn into_stored(self, previous_refresh: Option<String>) -> StoredToken {
        StoredToken {
            access_token: self.access_token,
            refresh_token: self.refresh_token.or(previous_refresh),
            expires_at: Utc::now().timestamp() + self.expires_in.unwrap_or(3600),
        }
    }
}

/// Loads, refreshes, exchanges, revokes and persists OAuth tokens
#[derive(Clone)]
pub struct TokenManager {
    config: Arc<Config>,
    storage: Arc<dyn KeyValueStore>,
    client: Client,
    token_url: String,
    revoke_url: String,
}

impl TokenManager {
    pub fn new(config: Arc<Config>, storage: Arc<dyn KeyValueStore>, client: Client) -> Self {
        Self {
            config,
            storage,
            client,
            token_url: TOKEN_URL.to_string(),
            revoke_url: REVOKE_URL.to_string(),
        }
    }

    /// Point the token and revoke requests somewhere other than Google
    pub fn with_endpoints(mut self, token_url: &str, revoke_url: &str) -> Self {
        self.token_url = token_url.to_string();
        self.revoke_url = revoke_url.to_string();
        self
    }

    /// Stored token as-is, expired or not
    pub async fn stored_token(&self) -> JobResult<Option<StoredToken>> {
        let Some(raw) = self.storage.get(keys::GOOGLE_CALENDAR_TOKEN).await? else {
            return Ok(None);
        };

        match serde_json::from_str(&raw) {
            Ok(token) => Ok(Some(token)),
            Err(e) => {
                warn!("Discarding unreadable stored token: {}", e);
                Ok(None)
            }
        }
    }

    /// Stored token, refreshed if it has expired. `None` when nothing usable is stored.
    ///
    /// A refresh that Google rejects, or that cannot reach Google, drops the stored
    /// token so the caller can sign in again.
    pub async fn get_token(&self) -> JobResult<Option<StoredToken>> {
        let Some(token) = self.stored_token().await? else {
            return Ok(None);
        };

        if !token.is_expired(Utc::now().timestamp()) {
            return Ok(Some(token));
        }

        match &token.refresh_token {
            Some(refresh_token) => {
                info!("Access token expired, refreshing");
                match self.refresh_token(refresh_token).await {
                    Ok(refreshed) => Ok(Some(refreshed)),
                    Err(Error::Auth(AuthError::TokenExchange(reason))) => {
                        warn!("Token refresh failed, signing in again: {}", reason);
                        self.clear_token().await?;
                        Ok(None)
                    }
                    Err(e) => Err(e),
                }
            }
            None => Ok(None),
        }
    }

    /// Exchange a refresh token for a new access token
    async fn refresh_token(&self, refresh_token: &str) -> JobResult<StoredToken> {
        self.ensure_configured()?;
        let params = [
            ("client_id", self.config.google_client_id.as_str()),
            ("client_secret", self.config.google_client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ];

        let response = self.request_token(&params).await?;
        let token = response.into_stored(Some(refresh_token.to_string()));
        self.set_token(&token).await?;
        Ok(token)
    }

    /// Exchange an authorization code for tokens and store them
    pub async fn exchange_code(&self, code: &str) -> JobResult<StoredToken> {
        self.ensure_configured()?;
        let redirect_uri = self.config.redirect_uri();
        let params = [
            ("client_id", self.config.google_client_id.as_str()),
            ("client_secret", self.config.google_client_secret.as_str()),
            ("code", code),
            ("redirect_uri", redirect_uri.as_str()),
            ("grant_type", "authorization_code"),
        ];

        let response = self.request_token(&params).await?;
        let token = response.into_stored(None);
        self.set_token(&token).await?;
        Ok(token)
    }

    async fn request_token(&self, params: &[(&str, &str)]) -> JobResult<TokenResponse> {
        let response = self
            .client
            .post(&self.token_url)
            .form(params)
            .send()
            .await
            .map_err(|e| AuthError::TokenExchange(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(
                AuthError::TokenExchange(format!("HTTP {} - {}", status, error_body)).into(),
            );
        }

        let token = response
            .json::<TokenResponse>()
            .await
            .map_err(|e| AuthError::TokenExchange(format!("Invalid token response: {}", e)))?;
        Ok(token)
    }

    /// Revoke the token at Google. Failures are logged, not returned.
    pub async fn revoke(&self, token: &StoredToken) {
        // Revoking the refresh token also invalidates its access tokens
        let value = token
            .refresh_token
            .as_deref()
            .unwrap_or(&token.access_token);

        match self
            .client
            .post(&self.revoke_url)
            .form(&[("token", value)])
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => info!("Token revoked"),
            Ok(response) => warn!("Token revocation returned HTTP {}", response.status()),
            Err(e) => warn!("Token revocation failed: {}", e),
        }
    }

    /// Persist a token
    pub async fn set_token(&self, token: &StoredToken) -> JobResult<()> {
        let json = serde_json::to_string(token)?;
        self.storage.set(keys::GOOGLE_CALENDAR_TOKEN, json).await
    }

    /// Forget the stored token
    pub async fn clear_token(&self) -> JobResult<()> {
        self.storage.delete(keys::GOOGLE_CALENDAR_TOKEN).await
    }

    fn ensure_configured(&self) -> Result<(), AuthError> {
        if self.config.google_client_id.is_empty() {
            return Err(AuthError::NotConfigured("GOOGLE_CLIENT_ID"));
        }
        if self.config.google_client_secret.is_empty() {
            return Err(AuthError::NotConfigured("GOOGLE_CLIENT_SECRET"));
        }
        Ok(())
    }
}
