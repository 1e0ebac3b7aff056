use std::sync::Arc;

use axum::Router;
use docbrowse_core::config::{AppConfig, ConfigError};
use docbrowse_core::{ContentGateway, DocumentBrowser, FolderId, NavigationStore};
use docbrowse_drive::{DriveGateway, DriveSetupError};
use docbrowse_slack::{
    browser_dispatcher, BotIdentity, BrowserService, ResponseUrlSink, SignatureVerifier,
    SlackApiError, SlackWebClient,
};
use thiserror::Error;
use tracing::info;

use crate::health::{self, HealthState};
use crate::slack_http::{self, SlackState};

pub struct Application {
    pub config: AppConfig,
    pub bot: BotIdentity,
    pub slack: SlackState,
    pub health: HealthState,
}

impl Application {
    pub fn router(&self) -> Router {
        slack_http::router(self.slack.clone()).merge(health::router(self.health.clone()))
    }
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("drive gateway setup failed: {0}")]
    Drive(#[from] DriveSetupError),
    #[error("http client setup failed: {0}")]
    HttpClient(#[source] reqwest::Error),
    #[error("slack login failed: {0}")]
    SlackLogin(#[source] SlackApiError),
}

/// Builds the application from loaded config; fails on bad credentials or a rejected bot token.
pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );
    let gateway = DriveGateway::from_config(&config.drive)?;
    info!(
        event_name = "system.bootstrap.drive_ready",
        correlation_id = "bootstrap",
        root_folder_id = %config.drive.root_folder_id,
        "drive gateway configured"
    );

    assemble(config, Arc::new(gateway)).await
}

/// Logs in to Slack and wires the browser around an already-built gateway.
pub async fn assemble(
    config: AppConfig,
    gateway: Arc<dyn ContentGateway>,
) -> Result<Application, BootstrapError> {
    let http = reqwest::Client::builder().build().map_err(BootstrapError::HttpClient)?;

    let web = SlackWebClient::new(
        http.clone(),
        config.slack.api_base_url.clone(),
        config.slack.bot_token.clone(),
    );
    let bot = web.auth_test().await.map_err(BootstrapError::SlackLogin)?;
    info!(
        event_name = "system.bootstrap.slack_authenticated",
        correlation_id = "bootstrap",
        bot_user_id = %bot.user_id,
        team = %bot.team,
        "slack bot token accepted"
    );

    let browser =
        DocumentBrowser::new(gateway, FolderId::new(config.drive.root_folder_id.clone()));
    let service =
        BrowserService::new(browser, Arc::new(NavigationStore::new()), config.browser.clone());

    let slack = SlackState::new(
        SignatureVerifier::new(config.slack.signing_secret.clone()),
        browser_dispatcher(service),
        Arc::new(ResponseUrlSink::new(http)),
    );
    let health = HealthState::new(bot.user_id.clone(), config.drive.root_folder_id.clone());

    Ok(Application { config, bot, slack, health })
}
