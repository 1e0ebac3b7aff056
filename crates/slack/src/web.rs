//! Minimal Slack Web API client, used to confirm the bot token at startup.

use std::time::Duration;

use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;

const WEB_API_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error)]
pub enum SlackApiError {
    #[error("slack web api request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("slack web api returned status {0}")]
    Status(u16),
    #[error("slack web api call `{method}` failed: {error}")]
    Api { method: &'static str, error: String },
}

/// Identity reported by `auth.test` for the configured bot token.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct BotIdentity {
    #[serde(default)]
    pub team: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub bot_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AuthTestResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(flatten)]
    identity: BotIdentity,
}

#[derive(Clone)]
pub struct SlackWebClient {
    client: Client,
    base_url: String,
    bot_token: SecretString,
}

impl SlackWebClient {
    pub fn new(client: Client, base_url: impl Into<String>, bot_token: SecretString) -> Self {
        let base_url: String = base_url.into();
        Self { client, base_url: base_url.trim_end_matches('/').to_owned(), bot_token }
    }

    pub async fn auth_test(&self) -> Result<BotIdentity, SlackApiError> {
        let response = self
            .client
            .post(format!("{}/auth.test", self.base_url))
            .bearer_auth(self.bot_token.expose_secret())
            .timeout(Duration::from_secs(WEB_API_TIMEOUT_SECS))
            .send()
            .await
            .map_err(SlackApiError::Transport)?;

        if !response.status().is_success() {
            return Err(SlackApiError::Status(response.status().as_u16()));
        }

        let body: AuthTestResponse = response.json().await.map_err(SlackApiError::Transport)?;
        if !body.ok {
            return Err(SlackApiError::Api {
                method: "auth.test",
                error: body.error.unwrap_or_else(|| "unknown_error".to_owned()),
            });
        }
        Ok(body.identity)
    }
}
