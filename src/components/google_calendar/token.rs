use crate::error::{config_error, google_calendar_error, ShiftResult};
use crate::storage::CredentialStore;
use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar";
pub const TOKEN_KEY: &str = "google-token";

/// Seconds before expiry at which a token is already treated as expired
const EXPIRY_LEEWAY_SECS: i64 = 60;

/// OAuth client credentials from a Google `client_secret.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientSecrets {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default)]
    pub redirect_uris: Vec<String>,
}

#[derive(Deserialize)]
struct ClientSecretsFile {
    installed: Option<ClientSecrets>,
    web: Option<ClientSecrets>,
}

impl ClientSecrets {
    /// Parse either the `installed` or the `web` flavour
    pub fn from_json(json: &str) -> ShiftResult<Self> {
        let file: ClientSecretsFile = serde_json::from_str(json)
            .map_err(|e| config_error(&format!("Invalid Google client secrets: {}", e)))?;
        file.installed.or(file.web).ok_or_else(|| {
            config_error("Google client secrets contain neither an 'installed' nor a 'web' client")
        })
    }

    pub fn from_file(path: impl AsRef<Path>) -> ShiftResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            config_error(&format!(
                "Could not read Google client secrets {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json(&json)
    }
}

/// Stored OAuth token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OAuthToken {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Unix timestamp in seconds
    pub expires_at: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
}

impl OAuthToken {
    fn is_expired(&self) -> bool {
        self.expires_at - EXPIRY_LEEWAY_SECS <= Utc::now().timestamp()
    }

    fn from_response(response: TokenResponse, previous_refresh: Option<String>) -> Self {
        Self {
            access_token: response.access_token,
            refresh_token: response.refresh_token.or(previous_refresh),
            expires_at: Utc::now().timestamp() + response.expires_in.unwrap_or(3600),
        }
    }
}

/// Hands out valid access tokens, refreshing and persisting them as needed
#[derive(Clone)]
pub struct TokenManager {
    store: CredentialStore,
    secrets: ClientSecrets,
    client: Client,
    token_url: String,
    cached: Arc<RwLock<Option<OAuthToken>>>,
}

impl TokenManager {
    pub fn new(store: CredentialStore, secrets: ClientSecrets) -> Self {
        Self {
            store,
            secrets,
            client: Client::new(),
            token_url: GOOGLE_TOKEN_URL.to_string(),
            cached: Arc::new(RwLock::new(None)),
        }
    }

    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }

    pub fn secrets(&self) -> &ClientSecrets {
        &self.secrets
    }

    /// A currently valid access token
    pub async fn access_token(&self) -> ShiftResult<String> {
        if let Some(token) = self.cached.read().await.as_ref() {
            if !token.is_expired() {
                return Ok(token.access_token.clone());
            }
        }

        let mut cached = self.cached.write().await;
        let token = match cached.take() {
            Some(token) => token,
            None => self.store.load::<OAuthToken>(TOKEN_KEY)?.ok_or_else(|| {
                config_error("No Google Calendar token stored, run get_calendar_token first")
            })?,
        };

        let token = if token.is_expired() {
            self.refresh(&token).await?
        } else {
            token
        };

        let access_token = token.access_token.clone();
        *cached = Some(token);
        Ok(access_token)
    }

    async fn refresh(&self, token: &OAuthToken) -> ShiftResult<OAuthToken> {
        let refresh_token = token
            .refresh_token
            .clone()
            .ok_or_else(|| google_calendar_error("No refresh token in stored token"))?;

        debug!("Refreshing Google Calendar access token");
        let params = [
            ("client_id", self.secrets.client_id.as_str()),
            ("client_secret", self.secrets.client_secret.as_str()),
            ("refresh_token", refresh_token.as_str()),
            ("grant_type", "refresh_token"),
        ];
        let response = self.post_form(&params).await?;

        let refreshed = OAuthToken::from_response(response, Some(refresh_token));
        self.store.save(TOKEN_KEY, &refreshed)?;
        info!("Google Calendar access token refreshed");
        Ok(refreshed)
    }

    /// Exchange an authorization code for a token and store it
    pub async fn exchange_code(&self, code: &str, redirect_uri: &str) -> ShiftResult<OAuthToken> {
        let params = [
            ("client_id", self.secrets.client_id.as_str()),
            ("client_secret", self.secrets.client_secret.as_str()),
            ("code", code),
            ("redirect_uri", redirect_uri),
            ("grant_type", "authorization_code"),
        ];
        let response = self.post_form(&params).await?;

        let token = OAuthToken::from_response(response, None);
        self.set_token(token.clone()).await?;
        Ok(token)
    }

    pub async fn set_token(&self, token: OAuthToken) -> ShiftResult<()> {
        self.store.save(TOKEN_KEY, &token)?;
        *self.cached.write().await = Some(token);
        Ok(())
    }

    async fn post_form(&self, params: &[(&str, &str)]) -> ShiftResult<TokenResponse> {
        let response = self
            .client
            .post(&self.token_url)
            .form(params)
            .send()
            .await
            .map_err(|e| google_calendar_error(&format!("Token request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(google_calendar_error(&format!(
                "Token request failed: HTTP {} - {}",
                status, error_body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| google_calendar_error(&format!("Failed to parse token response: {}", e)))
    }
}
