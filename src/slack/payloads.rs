//! Inbound Slack webhook payloads.
//!
//! Slack posts `application/x-www-form-urlencoded` bodies to the events
//! endpoint. Slash commands arrive as flat form fields; interactive
//! components arrive as a single `payload` field holding JSON. Only the
//! fields the handlers read are modelled; serde ignores the rest.

use std::collections::HashMap;

use serde::Deserialize;

use crate::{AppError, Result};

/// A slash command invocation.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct SlashCommand {
    /// Command name including the leading slash, e.g. `/approval-test`.
    pub command: String,
    /// Invoking user.
    pub user_id: String,
    /// Channel the command was typed in.
    #[serde(default)]
    pub channel_id: Option<String>,
    /// Short-lived token required to open a modal.
    pub trigger_id: String,
}

/// Decoded body of an events-endpoint request.
#[derive(Debug, Clone)]
pub enum InboundEvent {
    /// Slash command invocation.
    Command(SlashCommand),
    /// Interactive component payload.
    Interaction(InteractionPayload),
    /// Slack's periodic `ssl_check=1` probe of the request URL.
    SslCheck,
}

impl InboundEvent {
    /// Decode a raw form-urlencoded request body.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Payload` if the body is not a slash command, an
    /// interaction payload or an SSL check, or if the embedded JSON is
    /// malformed.
    pub fn from_form_body(body: &[u8]) -> Result<Self> {
        let fields: HashMap<String, String> =
            url::form_urlencoded::parse(body).into_owned().collect();

        if let Some(payload) = fields.get("payload") {
            let interaction: InteractionPayload = serde_json::from_str(payload)?;
            return Ok(Self::Interaction(interaction));
        }

        if fields.get("ssl_check").is_some_and(|v| v == "1") {
            return Ok(Self::SslCheck);
        }

        if fields.contains_key("command") {
            let value = serde_json::to_value(&fields)?;
            let command: SlashCommand = serde_json::from_value(value)?;
            return Ok(Self::Command(command));
        }

        Err(AppError::Payload(
            "body carries neither `payload` nor `command`".into(),
        ))
    }
}

/// Interactive component payload, tagged by Slack's `type` field.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InteractionPayload {
    /// Button click (or other block element interaction).
    BlockActions(BlockActionsPayload),
    /// Modal form submission.
    ViewSubmission(ViewSubmissionPayload),
    /// Any interaction type this bot does not handle.
    #[serde(other)]
    Unsupported,
}

/// Slack user reference.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct UserRef {
    /// Slack user ID.
    pub id: String,
}

/// The message that carried the clicked element.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct MessageRef {
    /// Stored author of the message.
    #[serde(default)]
    pub user: Option<String>,
}

/// A single element interaction inside a `block_actions` payload.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ActionRef {
    /// Application-chosen identifier of the element.
    pub action_id: String,
    /// Button value.
    #[serde(default)]
    pub value: Option<String>,
}

/// `block_actions` payload.
#[derive(Debug, Clone, Deserialize)]
pub struct BlockActionsPayload {
    /// User who clicked.
    pub user: UserRef,
    /// Message holding the clicked element.
    #[serde(default)]
    pub message: Option<MessageRef>,
    /// Element interactions, usually exactly one.
    #[serde(default)]
    pub actions: Vec<ActionRef>,
}

/// `view_submission` payload.
#[derive(Debug, Clone, Deserialize)]
pub struct ViewSubmissionPayload {
    /// User who submitted the modal.
    pub user: UserRef,
    /// Submitted view.
    pub view: SubmittedView,
}

/// Submitted modal view.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmittedView {
    /// Modal callback id set when the view was opened.
    #[serde(default)]
    pub callback_id: Option<String>,
    /// Input values keyed by block id then action id.
    #[serde(default)]
    pub state: ViewState,
}

/// `view.state` of a submitted modal.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ViewState {
    /// `block_id -> action_id -> value`.
    #[serde(default)]
    pub values: HashMap<String, HashMap<String, StateValue>>,
}

impl ViewState {
    /// Look up the value of one input element.
    #[must_use]
    pub fn get(&self, block_id: &str, action_id: &str) -> Option<&StateValue> {
        self.values.get(block_id)?.get(action_id)
    }
}

/// Value of a single modal input element.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct StateValue {
    /// Text input value.
    #[serde(default)]
    pub value: Option<String>,
    /// User selector value.
    #[serde(default)]
    pub selected_user: Option<String>,
}
