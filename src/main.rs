#![forbid(unsafe_code)]

//! `slack-approval-bot`: Slack approval workflow server binary.
//!
//! Loads configuration and credentials, verifies the bot token with Slack,
//! and serves the webhook endpoint and liveness responder on one port.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use secrecy::SecretString;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use slack_approval_bot::config::GlobalConfig;
use slack_approval_bot::server;
use slack_approval_bot::slack::client::SlackService;
use slack_approval_bot::slack::signature::SignatureVerifier;
use slack_approval_bot::{AppError, AppState, Result};

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "slack-approval-bot", about = "Slack approval request bot", version, long_about = None)]
struct Cli {
    /// Optional path to a TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Listening port; overrides the config file and the PORT env var.
    #[arg(long)]
    port: Option<u16>,

    /// Log output format (text or json).
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

fn main() -> Result<()> {
    // A missing .env file is normal in production.
    let _ = dotenvy::dotenv();

    let args = Cli::parse();
    init_tracing(args.log_format)?;
    info!("slack-approval-bot bootstrap");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::Config(format!("failed to build tokio runtime: {err}")))?;

    runtime.block_on(run(args)).inspect_err(|err| {
        error!(%err, "failed to start slack app");
    })
}

async fn run(args: Cli) -> Result<()> {
    // ── Load configuration ──────────────────────────────
    let mut config = match args.config {
        Some(ref path) => GlobalConfig::load_from_path(path)?,
        None => GlobalConfig::default(),
    };
    config.apply_env_overrides()?;
    if let Some(port) = args.port {
        config.server.port = port;
    }
    config.load_credentials().await?;
    info!("configuration loaded");

    // ── Connect to Slack ────────────────────────────────
    let slack = SlackService::new(&config.slack)?;
    slack.verify_connection().await?;

    let signing_secret: SecretString = config
        .slack
        .signing_secret
        .clone()
        .ok_or_else(|| AppError::Config("slack signing secret not loaded".into()))?;
    let verifier = SignatureVerifier::new(signing_secret, config.slack.signature_tolerance_seconds);

    let config = Arc::new(config);
    let state = AppState::new(Arc::clone(&config), Arc::new(slack), verifier);

    // ── Start HTTP listener ─────────────────────────────
    let listener = server::bind(&config).await?;
    info!(port = config.server.port, "⚡️ slack app is running");

    let ct = CancellationToken::new();
    let server_ct = ct.clone();
    let server_handle = tokio::spawn(server::serve(listener, state, server_ct));

    // ── Wait for shutdown signal ────────────────────────
    shutdown_signal().await;
    info!("shutdown signal received");
    ct.cancel();

    match server_handle.await {
        Ok(result) => result?,
        Err(err) => error!(%err, "http listener task panicked"),
    }
    info!("slack-approval-bot shut down");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(err) => {
                tracing::warn!(%err, "failed to register SIGTERM handler, using ctrl-c only");
                if let Err(err) = ctrl_c.await {
                    tracing::error!(%err, "ctrl-c signal handler failed");
                }
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(err) = ctrl_c.await {
            tracing::error!(%err, "ctrl-c signal handler failed");
        }
    }
}

fn init_tracing(log_format: LogFormat) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt().with_env_filter(env_filter);

    match log_format {
        LogFormat::Text => subscriber
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
        LogFormat::Json => subscriber
            .json()
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
    }

    Ok(())
}
