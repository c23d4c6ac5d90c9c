//! Approve / Reject button handler.
//!
//! Buttons are never disabled after a click, so every click produces a
//! notification, including a second click or an approve followed by a
//! reject.

use slack_morphism::prelude::SlackChannelId;
use tracing::info;

use crate::models::approval::{Decision, DecisionOutcome};
use crate::slack::client::SlackMessage;
use crate::slack::payloads::{ActionRef, BlockActionsPayload};
use crate::state::AppState;
use crate::{AppError, Result};

/// Work out whom to notify and who decided.
///
/// The requester comes from the button `value`, written when the request
/// was sent. Messages posted without a value fall back to the stored author
/// of the message that held the buttons.
///
/// # Errors
///
/// Returns `AppError::Payload` if neither source names a requester.
pub fn resolve_outcome(
    decision: Decision,
    action: &ActionRef,
    payload: &BlockActionsPayload,
) -> Result<DecisionOutcome> {
    let requester = action
        .value
        .as_deref()
        .filter(|v| !v.is_empty())
        .or_else(|| {
            payload
                .message
                .as_ref()
                .and_then(|m| m.user.as_deref())
                .filter(|u| !u.is_empty())
        })
        .ok_or_else(|| {
            AppError::Payload(format!(
                "cannot determine requester for action {}",
                action.action_id
            ))
        })?;

    Ok(DecisionOutcome {
        decision,
        requester: requester.to_owned(),
        decider: payload.user.id.clone(),
    })
}

/// Notify the requester of a decision.
///
/// # Errors
///
/// Returns `AppError::Payload` if the requester cannot be resolved, or
/// `AppError::Slack` if `chat.postMessage` fails.
pub async fn handle_decision(
    decision: Decision,
    action: &ActionRef,
    payload: &BlockActionsPayload,
    state: &AppState,
) -> Result<()> {
    let outcome = resolve_outcome(decision, action, payload)?;

    info!(
        decision = %outcome.decision,
        requester = %outcome.requester,
        decider = %outcome.decider,
        "notifying requester of decision"
    );

    let message = SlackMessage::plain(
        SlackChannelId(outcome.requester.clone()),
        outcome.notification_text(),
    );
    state.slack.post_message(message).await
}
