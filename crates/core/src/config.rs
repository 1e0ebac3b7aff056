use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Slack rejects section text longer than this.
pub const SLACK_SECTION_TEXT_LIMIT: usize = 3000;
/// Characters added around each chunk by the code fence.
pub const CODE_FENCE_OVERHEAD: usize = 8;
/// One section per result plus the button rows must stay under Slack's 50-block cap.
pub const MAX_SEARCH_LIMIT: usize = 25;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub drive: DriveConfig,
    pub slack: SlackConfig,
    pub browser: BrowserConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct DriveConfig {
    pub root_folder_id: String,
    pub credentials_json: Option<SecretString>,
    pub credentials_path: Option<PathBuf>,
    pub api_base_url: String,
    pub docs_base_url: String,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct SlackConfig {
    pub bot_token: SecretString,
    pub signing_secret: SecretString,
    pub api_base_url: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BrowserConfig {
    pub max_message_chars: usize,
    pub browse_limit: usize,
    pub search_limit: usize,
    pub preview_chars: usize,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub root_folder_id: Option<String>,
    pub credentials_json: Option<String>,
    pub credentials_path: Option<PathBuf>,
    pub slack_bot_token: Option<String>,
    pub slack_signing_secret: Option<String>,
    pub server_port: Option<u16>,
    pub log_level: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            drive: DriveConfig {
                root_folder_id: String::new(),
                credentials_json: None,
                credentials_path: None,
                api_base_url: "https://www.googleapis.com/drive/v3".to_string(),
                docs_base_url: "https://docs.googleapis.com/v1".to_string(),
                timeout_secs: 20,
            },
            slack: SlackConfig {
                bot_token: String::new().into(),
                signing_secret: String::new().into(),
                api_base_url: "https://slack.com/api".to_string(),
            },
            browser: BrowserConfig::default(),
            server: ServerConfig { bind_address: "0.0.0.0".to_string(), port: 3000 },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self { max_message_chars: 2000, browse_limit: 20, search_limit: 15, preview_chars: 600 }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("docbrowse.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(drive) = patch.drive {
            if let Some(root_folder_id) = drive.root_folder_id {
                self.drive.root_folder_id = root_folder_id;
            }
            if let Some(credentials_json) = drive.credentials_json {
                self.drive.credentials_json = Some(secret_value(credentials_json));
            }
            if let Some(credentials_path) = drive.credentials_path {
                self.drive.credentials_path = Some(credentials_path);
            }
            if let Some(api_base_url) = drive.api_base_url {
                self.drive.api_base_url = api_base_url;
            }
            if let Some(docs_base_url) = drive.docs_base_url {
                self.drive.docs_base_url = docs_base_url;
            }
            if let Some(timeout_secs) = drive.timeout_secs {
                self.drive.timeout_secs = timeout_secs;
            }
        }

        if let Some(slack) = patch.slack {
            if let Some(bot_token) = slack.bot_token {
                self.slack.bot_token = secret_value(bot_token);
            }
            if let Some(signing_secret) = slack.signing_secret {
                self.slack.signing_secret = secret_value(signing_secret);
            }
            if let Some(api_base_url) = slack.api_base_url {
                self.slack.api_base_url = api_base_url;
            }
        }

        if let Some(browser) = patch.browser {
            if let Some(max_message_chars) = browser.max_message_chars {
                self.browser.max_message_chars = max_message_chars;
            }
            if let Some(browse_limit) = browser.browse_limit {
                self.browser.browse_limit = browse_limit;
            }
            if let Some(search_limit) = browser.search_limit {
                self.browser.search_limit = search_limit;
            }
            if let Some(preview_chars) = browser.preview_chars {
                self.browser.preview_chars = preview_chars;
            }
        }

        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        let root_folder_id = read_env("DOCBROWSE_DRIVE_ROOT_FOLDER_ID")
            .or_else(|| read_env("GOOGLE_DRIVE_FOLDER_ID"));
        if let Some(value) = root_folder_id {
            self.drive.root_folder_id = value;
        }
        let credentials_json = read_env("DOCBROWSE_DRIVE_CREDENTIALS_JSON")
            .or_else(|| read_env("GOOGLE_CREDENTIALS"));
        if let Some(value) = credentials_json {
            self.drive.credentials_json = Some(secret_value(value));
        }
        if let Some(value) = read_env("DOCBROWSE_DRIVE_CREDENTIALS_PATH") {
            self.drive.credentials_path = Some(PathBuf::from(value));
        }
        if let Some(value) = read_env("DOCBROWSE_DRIVE_API_BASE_URL") {
            self.drive.api_base_url = value;
        }
        if let Some(value) = read_env("DOCBROWSE_DRIVE_DOCS_BASE_URL") {
            self.drive.docs_base_url = value;
        }
        if let Some(value) = read_env("DOCBROWSE_DRIVE_TIMEOUT_SECS") {
            self.drive.timeout_secs = parse_u64("DOCBROWSE_DRIVE_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("DOCBROWSE_SLACK_BOT_TOKEN") {
            self.slack.bot_token = secret_value(value);
        }
        if let Some(value) = read_env("DOCBROWSE_SLACK_SIGNING_SECRET") {
            self.slack.signing_secret = secret_value(value);
        }
        if let Some(value) = read_env("DOCBROWSE_SLACK_API_BASE_URL") {
            self.slack.api_base_url = value;
        }

        if let Some(value) = read_env("DOCBROWSE_BROWSER_MAX_MESSAGE_CHARS") {
            self.browser.max_message_chars =
                parse_usize("DOCBROWSE_BROWSER_MAX_MESSAGE_CHARS", &value)?;
        }
        if let Some(value) = read_env("DOCBROWSE_BROWSER_BROWSE_LIMIT") {
            self.browser.browse_limit = parse_usize("DOCBROWSE_BROWSER_BROWSE_LIMIT", &value)?;
        }
        if let Some(value) = read_env("DOCBROWSE_BROWSER_SEARCH_LIMIT") {
            self.browser.search_limit = parse_usize("DOCBROWSE_BROWSER_SEARCH_LIMIT", &value)?;
        }
        if let Some(value) = read_env("DOCBROWSE_BROWSER_PREVIEW_CHARS") {
            self.browser.preview_chars = parse_usize("DOCBROWSE_BROWSER_PREVIEW_CHARS", &value)?;
        }

        if let Some(value) = read_env("DOCBROWSE_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        let port_key = if read_env("DOCBROWSE_SERVER_PORT").is_some() {
            "DOCBROWSE_SERVER_PORT"
        } else {
            "PORT"
        };
        if let Some(value) = read_env(port_key) {
            self.server.port = parse_u16(port_key, &value)?;
        }

        let log_level =
            read_env("DOCBROWSE_LOGGING_LEVEL").or_else(|| read_env("DOCBROWSE_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("DOCBROWSE_LOGGING_FORMAT").or_else(|| read_env("DOCBROWSE_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(root_folder_id) = overrides.root_folder_id {
            self.drive.root_folder_id = root_folder_id;
        }
        if let Some(credentials_json) = overrides.credentials_json {
            self.drive.credentials_json = Some(secret_value(credentials_json));
        }
        if let Some(credentials_path) = overrides.credentials_path {
            self.drive.credentials_path = Some(credentials_path);
        }
        if let Some(bot_token) = overrides.slack_bot_token {
            self.slack.bot_token = secret_value(bot_token);
        }
        if let Some(signing_secret) = overrides.slack_signing_secret {
            self.slack.signing_secret = secret_value(signing_secret);
        }
        if let Some(port) = overrides.server_port {
            self.server.port = port;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_drive(&self.drive)?;
        validate_slack(&self.slack)?;
        validate_browser(&self.browser)?;
        validate_server(&self.server)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("docbrowse.toml"), PathBuf::from("config/docbrowse.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_drive(drive: &DriveConfig) -> Result<(), ConfigError> {
    if drive.root_folder_id.trim().is_empty() {
        return Err(ConfigError::Validation(
            "drive.root_folder_id is required. Copy the folder id from the Drive URL (…/folders/<id>)"
                .to_string(),
        ));
    }

    let has_inline = drive
        .credentials_json
        .as_ref()
        .map(|value| !value.expose_secret().trim().is_empty())
        .unwrap_or(false);
    if !has_inline && drive.credentials_path.is_none() {
        return Err(ConfigError::Validation(
            "drive.credentials_json or drive.credentials_path is required (service account key)"
                .to_string(),
        ));
    }

    for (key, url) in [
        ("drive.api_base_url", &drive.api_base_url),
        ("drive.docs_base_url", &drive.docs_base_url),
    ] {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ConfigError::Validation(format!(
                "{key} must start with http:// or https://"
            )));
        }
    }

    if drive.timeout_secs == 0 || drive.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "drive.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    Ok(())
}

fn validate_slack(slack: &SlackConfig) -> Result<(), ConfigError> {
    let bot_token = slack.bot_token.expose_secret();
    if bot_token.is_empty() {
        return Err(ConfigError::Validation(
            "slack.bot_token is required. Get it from https://api.slack.com/apps > Your App > OAuth & Permissions > Bot User OAuth Token".to_string()
        ));
    }
    if !bot_token.starts_with("xoxb-") {
        let hint = if bot_token.starts_with("xapp-") {
            " (hint: you may have used an app-level token instead of the bot token)"
        } else {
            ""
        };
        return Err(ConfigError::Validation(format!(
            "slack.bot_token must start with `xoxb-`{hint}. Get it from https://api.slack.com/apps"
        )));
    }

    if slack.signing_secret.expose_secret().trim().is_empty() {
        return Err(ConfigError::Validation(
            "slack.signing_secret is required. Get it from https://api.slack.com/apps > Your App > Basic Information > Signing Secret".to_string()
        ));
    }

    if !slack.api_base_url.starts_with("http://") && !slack.api_base_url.starts_with("https://") {
        return Err(ConfigError::Validation(
            "slack.api_base_url must start with http:// or https://".to_string(),
        ));
    }

    Ok(())
}

fn validate_browser(browser: &BrowserConfig) -> Result<(), ConfigError> {
    let max_chunk = SLACK_SECTION_TEXT_LIMIT - CODE_FENCE_OVERHEAD;
    if browser.max_message_chars < 100 || browser.max_message_chars > max_chunk {
        return Err(ConfigError::Validation(format!(
            "browser.max_message_chars must be in range 100..={max_chunk}"
        )));
    }

    if browser.browse_limit == 0 || browser.browse_limit > 40 {
        return Err(ConfigError::Validation(
            "browser.browse_limit must be in range 1..=40".to_string(),
        ));
    }

    if browser.search_limit == 0 || browser.search_limit > MAX_SEARCH_LIMIT {
        return Err(ConfigError::Validation(
            format!("browser.search_limit must be in range 1..={MAX_SEARCH_LIMIT}"),
        ));
    }

    if browser.preview_chars == 0 || browser.preview_chars > browser.max_message_chars {
        return Err(ConfigError::Validation(
            "browser.preview_chars must be in range 1..=browser.max_message_chars".to_string(),
        ));
    }

    Ok(())
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.port == 0 {
        return Err(ConfigError::Validation("server.port must be greater than zero".to_string()));
    }

    if server.bind_address.trim().is_empty() {
        return Err(ConfigError::Validation("server.bind_address is required".to_string()));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.parse::<u16>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_usize(key: &str, value: &str) -> Result<usize, ConfigError> {
    value.parse::<usize>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    drive: Option<DrivePatch>,
    slack: Option<SlackPatch>,
    browser: Option<BrowserPatch>,
    server: Option<ServerPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct DrivePatch {
    root_folder_id: Option<String>,
    credentials_json: Option<String>,
    credentials_path: Option<PathBuf>,
    api_base_url: Option<String>,
    docs_base_url: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct SlackPatch {
    bot_token: Option<String>,
    signing_secret: Option<String>,
    api_base_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct BrowserPatch {
    max_message_chars: Option<usize>,
    browse_limit: Option<usize>,
    search_limit: Option<usize>,
    preview_chars: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
