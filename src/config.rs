//! Global configuration parsing, validation, and credential loading.

use std::env;
use std::fs;
use std::path::Path;

use secrecy::SecretString;
use serde::Deserialize;
use tracing::warn;

use crate::{AppError, Result};

/// Keychain service name used for credential lookup.
pub const KEYRING_SERVICE: &str = "slack-approval-bot";

/// HTTP listener settings.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct ServerConfig {
    /// Interface to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port shared by the Slack webhook and the liveness responder.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Path Slack posts commands and interactions to.
    #[serde(default = "default_events_path")]
    pub events_path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            events_path: default_events_path(),
        }
    }
}

/// Slack application settings.
///
/// Tokens are loaded at runtime from the environment or OS keychain,
/// never from the TOML file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SlackConfig {
    /// Slash command that opens the approval modal.
    #[serde(default = "default_command")]
    pub command: String,
    /// Upper bound on `chat.postMessage` attempts when Slack rate-limits us.
    #[serde(default = "default_max_send_attempts")]
    pub max_send_attempts: u32,
    /// Maximum clock skew accepted on `X-Slack-Request-Timestamp`.
    #[serde(default = "default_signature_tolerance")]
    pub signature_tolerance_seconds: u64,
    /// Bot user token (populated at runtime).
    #[serde(skip)]
    pub bot_token: Option<SecretString>,
    /// Signing secret for inbound request verification (populated at runtime).
    #[serde(skip)]
    pub signing_secret: Option<SecretString>,
}

impl Default for SlackConfig {
    fn default() -> Self {
        Self {
            command: default_command(),
            max_send_attempts: default_max_send_attempts(),
            signature_tolerance_seconds: default_signature_tolerance(),
            bot_token: None,
            signing_secret: None,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".into()
}

fn default_port() -> u16 {
    3000
}

fn default_events_path() -> String {
    "/slack/events".into()
}

fn default_command() -> String {
    "/approval-test".into()
}

fn default_max_send_attempts() -> u32 {
    3
}

fn default_signature_tolerance() -> u64 {
    300
}

/// Global configuration parsed from an optional `config.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct GlobalConfig {
    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Slack application settings.
    #[serde(default)]
    pub slack: SlackConfig,
}

impl GlobalConfig {
    /// Load and validate configuration from a TOML file path.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the file cannot be read or contains
    /// invalid TOML, or if validation fails.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|err| AppError::Config(format!("failed to read config: {err}")))?;
        Self::from_toml_str(&raw)
    }

    /// Parse configuration from a TOML string. Missing keys take defaults.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if parsing or validation fails.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply the `PORT` environment variable on top of file values.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `PORT` is set but not a valid port.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(raw) = env::var("PORT") {
            self.server.port = raw
                .trim()
                .parse()
                .map_err(|err| AppError::Config(format!("invalid PORT {raw:?}: {err}")))?;
        }
        Ok(())
    }

    /// Load Slack credentials from the environment with keychain fallback.
    ///
    /// Reads `SLACK_BOT_TOKEN` / `SLACK_SIGNING_SECRET` first, then the
    /// `slack-approval-bot` keyring service.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if neither source provides a credential.
    pub async fn load_credentials(&mut self) -> Result<()> {
        self.slack.bot_token = Some(load_credential("slack_bot_token", "SLACK_BOT_TOKEN").await?);
        self.slack.signing_secret =
            Some(load_credential("slack_signing_secret", "SLACK_SIGNING_SECRET").await?);
        Ok(())
    }

    /// Socket address string for the HTTP listener.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    fn validate(&self) -> Result<()> {
        if !self.slack.command.starts_with('/') {
            return Err(AppError::Config(format!(
                "slack.command must start with '/': {}",
                self.slack.command
            )));
        }

        if !self.server.events_path.starts_with('/') {
            return Err(AppError::Config(format!(
                "server.events_path must start with '/': {}",
                self.server.events_path
            )));
        }

        if self.slack.max_send_attempts == 0 {
            return Err(AppError::Config(
                "slack.max_send_attempts must be greater than zero".into(),
            ));
        }

        Ok(())
    }
}

/// Load a single credential from the environment with keychain fallback.
async fn load_credential(keyring_key: &str, env_key: &str) -> Result<SecretString> {
    match env::var(env_key) {
        Ok(value) if !value.is_empty() => return Ok(SecretString::from(value)),
        Ok(_) => warn!(key = env_key, "env var is empty, trying keychain"),
        Err(_) => {}
    }

    let key = keyring_key.to_owned();

    // keyring is synchronous I/O.
    let keychain_result = tokio::task::spawn_blocking(move || {
        keyring::Entry::new(KEYRING_SERVICE, &key).and_then(|entry| entry.get_password())
    })
    .await
    .map_err(|err| AppError::Config(format!("keychain task panicked: {err}")))?;

    match keychain_result {
        Ok(value) if !value.is_empty() => Ok(SecretString::from(value)),
        Ok(_) => Err(AppError::Config(format!(
            "credential {keyring_key} is empty in keychain and {env_key} is unset"
        ))),
        Err(err) => Err(AppError::Config(format!(
            "credential {keyring_key} not found in {env_key} env var or keychain: {err}"
        ))),
    }
}
