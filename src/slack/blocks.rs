//! Slack Block Kit message and modal builders.
//!
//! Block and action identifiers defined here are the contract between the
//! outbound payloads and the inbound interaction handlers that read them
//! back.

use slack_morphism::prelude::{
    SlackActionBlockElement, SlackActionId, SlackActionsBlock, SlackBlock, SlackBlockButtonElement,
    SlackBlockButtonStyle, SlackBlockId, SlackBlockPlainTextInputElement, SlackBlockPlainTextOnly, SlackBlockText,
    SlackBlockUsersSelectElement, SlackCallbackId, SlackInputBlock, SlackInputBlockElement,
    SlackModalView, SlackSectionBlock, SlackView,
};

use crate::models::approval::{ApprovalRequest, Decision};

/// `callback_id` of the approval modal.
pub const APPROVAL_MODAL_CALLBACK_ID: &str = "approval_modal";
/// Input block holding the approver selector.
pub const APPROVER_BLOCK_ID: &str = "approver_block";
/// Action id of the approver selector.
pub const APPROVER_ACTION_ID: &str = "approver";
/// Input block holding the request text.
pub const REQUEST_BLOCK_ID: &str = "request_block";
/// Action id of the request text input.
pub const REQUEST_ACTION_ID: &str = "request";
/// Actions block carrying the Approve / Reject buttons.
pub const APPROVAL_ACTIONS_BLOCK_ID: &str = "approval_actions";

/// Build a plain mrkdwn section block.
#[must_use]
pub fn text_section(text: &str) -> SlackBlock {
    SlackBlock::Section(SlackSectionBlock::new().with_text(SlackBlockText::MarkDown(text.into())))
}

/// Build the modal opened by the slash command.
///
/// Two required inputs: a user selector for the approver and a multiline
/// text field for the request body.
#[must_use]
pub fn approval_modal() -> SlackView {
    let approver_element =
        SlackBlockUsersSelectElement::new()
            .with_action_id(SlackActionId(APPROVER_ACTION_ID.to_owned()))
            .with_placeholder(SlackBlockPlainTextOnly::from("Select an approver"));

    let approver_block = SlackInputBlock::new(
        SlackBlockPlainTextOnly::from("Approver"),
        SlackInputBlockElement::UsersSelect(approver_element),
    )
    .with_block_id(SlackBlockId(APPROVER_BLOCK_ID.to_owned()));

    let request_element =
        SlackBlockPlainTextInputElement::new()
            .with_action_id(SlackActionId(REQUEST_ACTION_ID.to_owned()))
            .with_multiline(true);

    let request_block = SlackInputBlock::new(
        SlackBlockPlainTextOnly::from("Approval Request"),
        SlackInputBlockElement::PlainTextInput(request_element),
    )
    .with_block_id(SlackBlockId(REQUEST_BLOCK_ID.to_owned()));

    SlackView::Modal(
        SlackModalView::new(
            SlackBlockPlainTextOnly::from("Approval Request"),
            vec![approver_block.into(), request_block.into()],
        )
        .with_callback_id(SlackCallbackId(APPROVAL_MODAL_CALLBACK_ID.to_owned()))
        .with_submit(SlackBlockPlainTextOnly::from("Submit")),
    )
}

/// Approve is the primary action; Reject is destructive.
#[must_use]
pub fn button_style(decision: Decision) -> SlackBlockButtonStyle {
    match decision {
        Decision::Approved => SlackBlockButtonStyle::Primary,
        Decision::Rejected => SlackBlockButtonStyle::Danger,
    }
}

/// Build the Approve / Reject actions block.
///
/// Both buttons carry the requester's user ID as their `value` so the
/// decision handler knows whom to notify.
#[must_use]
pub fn decision_buttons(requester: &str) -> SlackBlock {
    let elements: Vec<SlackActionBlockElement> = Decision::ALL
        .iter()
        .map(|decision| {
            SlackActionBlockElement::Button(
                SlackBlockButtonElement::new(SlackBlockPlainTextOnly::from(decision.button_text()))
                    .with_action_id(SlackActionId(decision.action_id().to_owned()))
                    .with_style(button_style(*decision))
                    .with_value(requester.to_owned()),
            )
        })
        .collect();
    SlackBlock::Actions(
        SlackActionsBlock::new(elements)
            .with_block_id(SlackBlockId(APPROVAL_ACTIONS_BLOCK_ID.into())),
    )
}

/// Build the message blocks shown to the approver.
#[must_use]
pub fn approval_request_blocks(request: &ApprovalRequest) -> Vec<SlackBlock> {
    vec![
        text_section(&format!("*Approval Request:* {}", request.request_text)),
        decision_buttons(&request.requester),
    ]
}
