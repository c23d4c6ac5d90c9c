//! Unit tests for the Block Kit builders.
//!
//! Checks the serialised payloads Slack will receive: identifiers the
//! inbound handlers depend on, captions, and button styles.

use slack_approval_bot::models::approval::{ApprovalRequest, Decision};
use slack_approval_bot::slack::blocks;
use slack_morphism::prelude::{SlackBlockButtonStyle, SlackView};

fn modal_json() -> String {
    serde_json::to_string(&blocks::approval_modal()).expect("serialise SlackView")
}

fn sample_request() -> ApprovalRequest {
    ApprovalRequest {
        requester: "U789".into(),
        approver: "U123".into(),
        request_text: "Please approve my PTO".into(),
    }
}

#[test]
fn approval_modal_returns_modal_variant() {
    assert!(
        matches!(blocks::approval_modal(), SlackView::Modal(_)),
        "approval_modal must produce SlackView::Modal"
    );
}

#[test]
fn approval_modal_carries_callback_id() {
    assert!(modal_json().contains("approval_modal"));
}

#[test]
fn approval_modal_has_approver_selector() {
    let json = modal_json();
    assert!(json.contains("approver_block"));
    assert!(json.contains("users_select"));
    assert!(json.contains("Select an approver"));
    assert!(json.contains("\"Approver\""));
}

#[test]
fn approval_modal_has_multiline_request_input() {
    let json = modal_json();
    assert!(json.contains("request_block"));
    assert!(json.contains("plain_text_input"));
    assert!(json.contains("\"multiline\":true"));
}

#[test]
fn approval_modal_has_title_and_submit() {
    let json = modal_json();
    assert!(json.contains("Approval Request"));
    assert!(json.contains("Submit"));
}

#[test]
fn request_blocks_quote_the_text_in_bold_prefix() {
    let json = serde_json::to_string(&blocks::approval_request_blocks(&sample_request()))
        .expect("serialise blocks");
    assert!(json.contains("*Approval Request:* Please approve my PTO"));
}

#[test]
fn request_blocks_end_with_actions_block() {
    let blocks = blocks::approval_request_blocks(&sample_request());
    assert_eq!(blocks.len(), 2);
    let json = serde_json::to_string(&blocks[1]).expect("serialise actions");
    assert!(json.contains("approval_actions"));
    assert!(json.contains("\"Approve\""));
    assert!(json.contains("\"Reject\""));
}

#[test]
fn decision_buttons_are_styled() {
    let json = serde_json::to_string(&blocks::decision_buttons("U789")).expect("serialise");
    assert!(json.contains("\"primary\""));
    assert!(json.contains("\"danger\""));
    assert!(json.contains("U789"));
}

#[test]
fn text_section_is_markdown() {
    let json = serde_json::to_string(&blocks::text_section("*bold*")).expect("serialise");
    assert!(json.contains("mrkdwn"));
    assert!(json.contains("*bold*"));
}

#[test]
fn approve_is_primary_and_reject_is_danger() {
    assert_eq!(
        blocks::button_style(Decision::Approved),
        SlackBlockButtonStyle::Primary
    );
    assert_eq!(
        blocks::button_style(Decision::Rejected),
        SlackBlockButtonStyle::Danger
    );
}
