//! Approval modal submission handler.
//!
//! Reads the approver and request text out of the submitted view state and
//! sends the approver a direct message with Approve / Reject buttons.

use std::collections::BTreeMap;

use slack_morphism::prelude::SlackChannelId;
use tracing::info;

use crate::models::approval::{ApprovalForm, ApprovalRequest};
use crate::slack::blocks::{
    self, APPROVER_ACTION_ID, APPROVER_BLOCK_ID, REQUEST_ACTION_ID, REQUEST_BLOCK_ID,
};
use crate::slack::client::SlackMessage;
use crate::slack::payloads::ViewState;
use crate::state::AppState;
use crate::Result;

/// Per-block validation messages, keyed by `block_id`.
///
/// Returned to Slack as a `response_action: errors` acknowledgment so the
/// modal stays open with the message under the offending input.
pub type FieldErrors = BTreeMap<String, String>;

/// Extract the approval form from a submitted view.
///
/// # Errors
///
/// Returns the missing fields when no approver was picked or the request
/// text is blank.
pub fn extract_form(view_state: &ViewState) -> std::result::Result<ApprovalForm, FieldErrors> {
    let approver = view_state
        .get(APPROVER_BLOCK_ID, APPROVER_ACTION_ID)
        .and_then(|v| v.selected_user.clone())
        .filter(|id| !id.is_empty());
    let request_text = view_state
        .get(REQUEST_BLOCK_ID, REQUEST_ACTION_ID)
        .and_then(|v| v.value.clone())
        .filter(|text| !text.trim().is_empty());

    match (approver, request_text) {
        (Some(approver), Some(request_text)) => Ok(ApprovalForm {
            approver,
            request_text,
        }),
        (approver, request_text) => {
            let mut errors = FieldErrors::new();
            if approver.is_none() {
                errors.insert(APPROVER_BLOCK_ID.to_owned(), "Select an approver".to_owned());
            }
            if request_text.is_none() {
                errors.insert(
                    REQUEST_BLOCK_ID.to_owned(),
                    "Describe what needs approval".to_owned(),
                );
            }
            Err(errors)
        }
    }
}

/// Send the approval request to the approver's DM.
///
/// # Errors
///
/// Returns `AppError::Slack` if `chat.postMessage` fails.
pub async fn send_approval_request(request: &ApprovalRequest, state: &AppState) -> Result<()> {
    info!(
        requester = %request.requester,
        approver = %request.approver,
        text_len = request.request_text.len(),
        "sending approval request"
    );

    let message = SlackMessage::with_blocks(
        SlackChannelId(request.approver.clone()),
        request.fallback_text(),
        blocks::approval_request_blocks(request),
    );
    state.slack.post_message(message).await
}
