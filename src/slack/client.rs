//! Outbound Slack Web API access.
//!
//! Handlers talk to Slack through the [`SlackApi`] trait so the workflow can
//! run against a recording fake in tests. [`SlackService`] is the production
//! implementation backed by `slack-morphism`.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use secrecy::ExposeSecret;
use slack_morphism::errors::SlackClientError;
use slack_morphism::prelude::{
    SlackApiChatPostMessageRequest, SlackApiToken, SlackApiTokenType, SlackApiTokenValue,
    SlackApiViewsOpenRequest, SlackBlock, SlackChannelId, SlackClient,
    SlackClientHyperHttpsConnector, SlackClientSession, SlackMessageContent, SlackTriggerId,
    SlackView,
};
use tokio::time::sleep;
use tracing::{info, warn};

use crate::{config::SlackConfig, AppError, Result};

const INITIAL_RETRY_DELAY: Duration = Duration::from_secs(1);
const MAX_RETRY_DELAY: Duration = Duration::from_secs(30);

/// Boxed future returned by [`SlackApi`] methods.
pub type SlackFuture<'a> = Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

/// Message to be delivered to Slack via `chat.postMessage`.
#[derive(Debug, Clone)]
pub struct SlackMessage {
    /// Channel or user ID; a user ID delivers to the bot's DM with them.
    pub channel: SlackChannelId,
    /// Notification and fallback text.
    pub text: Option<String>,
    /// Block Kit layout, if any.
    pub blocks: Option<Vec<SlackBlock>>,
}

impl SlackMessage {
    /// Create a plain-text message for a channel.
    #[must_use]
    pub fn plain(channel: SlackChannelId, text: impl Into<String>) -> Self {
        Self {
            channel,
            text: Some(text.into()),
            blocks: None,
        }
    }

    /// Create a block message with a plain-text fallback.
    #[must_use]
    pub fn with_blocks(
        channel: SlackChannelId,
        text: impl Into<String>,
        blocks: Vec<SlackBlock>,
    ) -> Self {
        Self {
            channel,
            text: Some(text.into()),
            blocks: Some(blocks),
        }
    }

    fn into_request(self) -> SlackApiChatPostMessageRequest {
        let content = SlackMessageContent::new()
            .opt_text(self.text)
            .opt_blocks(self.blocks);

        SlackApiChatPostMessageRequest::new(self.channel, content).with_link_names(true)
    }
}

/// Outbound Slack operations used by the approval workflow.
pub trait SlackApi: Send + Sync {
    /// Open a modal view in response to an interaction trigger.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Slack` if the `views.open` call fails.
    fn open_view(&self, trigger_id: &str, view: SlackView) -> SlackFuture<'_>;

    /// Post a message to a channel or a user's DM.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Slack` if the `chat.postMessage` call fails.
    fn post_message(&self, message: SlackMessage) -> SlackFuture<'_>;
}

/// `slack-morphism` client bound to the bot token.
pub struct SlackService {
    client: Arc<SlackClient<SlackClientHyperHttpsConnector>>,
    bot_token: SlackApiToken,
    max_send_attempts: u32,
}

impl SlackService {
    /// Build the HTTPS client from loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the bot token has not been loaded, or
    /// `AppError::Slack` if the HTTPS connector cannot be created.
    pub fn new(config: &SlackConfig) -> Result<Self> {
        let token = config
            .bot_token
            .as_ref()
            .ok_or_else(|| AppError::Config("slack bot token not loaded".into()))?;
        let connector = SlackClientHyperHttpsConnector::new()
            .map_err(|err| AppError::Slack(format!("failed to init slack connector: {err}")))?;
        let bot_token = SlackApiToken {
            token_value: SlackApiTokenValue(token.expose_secret().to_owned()),
            cookie: None,
            team_id: None,
            scope: None,
            token_type: Some(SlackApiTokenType::Bot),
        };

        Ok(Self {
            client: Arc::new(SlackClient::new(connector)),
            bot_token,
            max_send_attempts: config.max_send_attempts,
        })
    }

    /// Create an HTTP session for direct API calls using the bot token.
    #[must_use]
    pub fn http_session(&self) -> SlackClientSession<'_, SlackClientHyperHttpsConnector> {
        self.client.open_session(&self.bot_token)
    }

    /// Confirm the bot token is accepted by Slack (`auth.test`).
    ///
    /// # Errors
    ///
    /// Returns `AppError::Slack` if Slack rejects the token or is unreachable.
    pub async fn verify_connection(&self) -> Result<()> {
        self.http_session()
            .auth_test()
            .await
            .map_err(|err| AppError::Slack(format!("auth.test failed: {err}")))?;
        info!("slack bot token verified");
        Ok(())
    }

    async fn send_with_retry(&self, message: SlackMessage) -> Result<()> {
        let request = message.into_request();
        let session = self.http_session();
        let mut backoff = INITIAL_RETRY_DELAY;
        let mut attempt = 1;
        loop {
            let err = match session.chat_post_message(&request).await {
                Ok(_) => {
                    info!(channel = %request.channel.0, attempt, "sent slack message");
                    return Ok(());
                }
                Err(err) => err,
            };

            let Some(delay) = retry_delay(&err, attempt, self.max_send_attempts, backoff) else {
                return Err(AppError::Slack(format!(
                    "failed to post message to {}: {err}",
                    request.channel.0
                )));
            };
            warn!(channel = %request.channel.0, attempt, delay = ?delay, "slack rate limited; retrying");
            sleep(delay).await;
            backoff = next_backoff(backoff);
            attempt += 1;
        }
    }
}

/// Delay before retrying a failed send, or `None` to give up.
///
/// Only rate-limit errors are retried, and only while `attempt` is below
/// `max_attempts`. Slack's `Retry-After` wins over the local `backoff`.
#[must_use]
pub fn retry_delay(
    err: &SlackClientError,
    attempt: u32,
    max_attempts: u32,
    backoff: Duration,
) -> Option<Duration> {
    match err {
        SlackClientError::RateLimitError(rate) if attempt < max_attempts => {
            Some(rate.retry_after.unwrap_or(backoff))
        }
        _ => None,
    }
}

/// Double `backoff`, capped at thirty seconds.
#[must_use]
pub fn next_backoff(backoff: Duration) -> Duration {
    (backoff * 2).min(MAX_RETRY_DELAY)
}

impl SlackApi for SlackService {
    fn open_view(&self, trigger_id: &str, view: SlackView) -> SlackFuture<'_> {
        let request = SlackApiViewsOpenRequest::new(SlackTriggerId(trigger_id.to_owned()), view);
        Box::pin(async move {
            self.http_session()
                .views_open(&request)
                .await
                .map_err(|err| AppError::Slack(format!("failed to open modal: {err}")))?;
            Ok(())
        })
    }

    fn post_message(&self, message: SlackMessage) -> SlackFuture<'_> {
        Box::pin(self.send_with_retry(message))
    }
}
