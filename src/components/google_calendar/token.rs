use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::{calendar_store_error, AgentResult};

const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Seconds before expiry at which a token is treated as stale
const EXPIRY_MARGIN_SECS: i64 = 60;

/// OAuth token as persisted on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredToken {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Unix timestamp
    #[serde(default)]
    pub expires_at: Option<i64>,
}

impl StoredToken {
    pub fn is_fresh(&self, now: i64) -> bool {
        self.expires_at
            .map(|expiry| expiry - EXPIRY_MARGIN_SECS > now)
            .unwrap_or(false)
    }
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    refresh_token: Option<String>,
}

/// Loads the OAuth token from disk and refreshes it when it expires
#[derive(Clone)]
pub struct TokenManager {
    path: PathBuf,
    client_id: String,
    client_secret: String,
    client: Client,
    cached: Arc<RwLock<Option<StoredToken>>>,
}

impl TokenManager {
    pub fn new(
        path: impl Into<PathBuf>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        client: Client,
    ) -> Self {
        Self {
            path: path.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            client,
            cached: Arc::new(RwLock::new(None)),
        }
    }

    /// A usable access token, refreshing it first when needed
    pub async fn access_token(&self) -> AgentResult<String> {
        let now = Utc::now().timestamp();

        if let Some(token) = self.cached.read().await.as_ref() {
            if token.is_fresh(now) {
                return Ok(token.access_token.clone());
            }
        }

        let mut cached = self.cached.write().await;
        let token = match cached.take() {
            Some(token) => token,
            None => self.load().await?,
        };

        let token = if token.is_fresh(now) {
            token
        } else {
            self.refresh(&token).await?
        };

        let access_token = token.access_token.clone();
        *cached = Some(token);
        Ok(access_token)
    }

    async fn load(&self) -> AgentResult<StoredToken> {
        debug!("Loading Google token from {}", self.path.display());
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            calendar_store_error(&format!(
                "No valid token found at {} ({}). Run get_calendar_token first.",
                self.path.display(),
                e
            ))
        })?;
        serde_json::from_str(&content)
            .map_err(|e| calendar_store_error(&format!("Failed to parse token JSON: {}", e)))
    }

    /// Persist a token, e.g. one obtained through the consent flow
    pub async fn save(&self, token: &StoredToken) -> AgentResult<()> {
        let content = serde_json::to_string_pretty(token)?;
        tokio::fs::write(&self.path, content).await?;
        *self.cached.write().await = Some(token.clone());
        Ok(())
    }

    async fn refresh(&self, token: &StoredToken) -> AgentResult<StoredToken> {
        let refresh_token = token
            .refresh_token
            .clone()
            .ok_or_else(|| calendar_store_error("No refresh token in token data"))?;

        info!("Refreshing Google access token");
        let params = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("refresh_token", refresh_token.as_str()),
            ("grant_type", "refresh_token"),
        ];

        let response = self
            .client
            .post(TOKEN_URL)
            .form(&params)
            .send()
            .await
            .map_err(|e| calendar_store_error(&format!("Failed to refresh token: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(calendar_store_error(&format!(
                "Failed to refresh token: HTTP {} - {}",
                status, error_body
            )));
        }

        let refreshed: RefreshResponse = response
            .json()
            .await
            .map_err(|e| calendar_store_error(&format!("Failed to parse token response: {}", e)))?;

        // Google usually omits the refresh token on refresh; keep the old one
        let new_token = StoredToken {
            access_token: refreshed.access_token,
            refresh_token: refreshed.refresh_token.or(Some(refresh_token)),
            expires_at: Some(Utc::now().timestamp() + refreshed.expires_in.unwrap_or(3600)),
        };

        let content = serde_json::to_string_pretty(&new_token)?;
        tokio::fs::write(&self.path, content).await?;

        Ok(new_token)
    }
}
