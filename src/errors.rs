//! Error types shared across the application.

use std::fmt::{Display, Formatter};

/// Shared application result type.
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error enumeration covering all failure modes.
#[derive(Debug)]
pub enum AppError {
    /// Configuration parsing, credential loading, or validation failure.
    Config(String),
    /// Slack Web API call failure.
    Slack(String),
    /// Inbound request failed signing-secret verification.
    Signature(String),
    /// Inbound payload was malformed or missing a required field.
    Payload(String),
    /// Socket or file-system failure.
    Io(String),
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "config: {msg}"),
            Self::Slack(msg) => write!(f, "slack: {msg}"),
            Self::Signature(msg) => write!(f, "signature: {msg}"),
            Self::Payload(msg) => write!(f, "payload: {msg}"),
            Self::Io(msg) => write!(f, "io: {msg}"),
        }
    }
}

impl std::error::Error for AppError {}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(format!("invalid config: {err}"))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::Payload(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
