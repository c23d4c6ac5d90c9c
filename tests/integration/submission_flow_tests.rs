//! Integration tests for the modal submission → approver DM flow.

use slack_approval_bot::slack::events::{self, Ack};
use slack_approval_bot::slack::payloads::{InboundEvent, InteractionPayload};

use super::test_helpers::{collect_ids, test_state, view_submission, SlackCall};

fn submission(user: &str, approver: Option<&str>, text: Option<&str>) -> InboundEvent {
    let payload: InteractionPayload =
        serde_json::from_value(view_submission(user, approver, text)).expect("payload");
    InboundEvent::Interaction(payload)
}

#[tokio::test]
async fn submission_posts_request_to_approver_dm() {
    let (state, slack) = test_state();

    let ack = events::dispatch(
        submission("U789", Some("U123"), Some("Please approve my PTO")),
        &state,
    )
    .await
    .expect("dispatch");
    assert_eq!(ack, Ack::Empty);

    let calls = slack.calls();
    assert_eq!(calls.len(), 1);
    let SlackCall::PostMessage {
        channel,
        text,
        blocks,
    } = &calls[0]
    else {
        panic!("expected chat.postMessage, got {calls:?}");
    };
    assert_eq!(channel, "U123");
    assert_eq!(
        text.as_deref(),
        Some("Approval Request: Please approve my PTO")
    );
    assert!(blocks
        .to_string()
        .contains("*Approval Request:* Please approve my PTO"));
}

#[tokio::test]
async fn request_message_has_two_distinct_actions() {
    let (state, slack) = test_state();

    events::dispatch(submission("U789", Some("U123"), Some("New laptop")), &state)
        .await
        .expect("dispatch");

    let calls = slack.calls();
    let SlackCall::PostMessage { blocks, .. } = &calls[0] else {
        panic!("expected chat.postMessage");
    };
    let action_ids = collect_ids(blocks, "action_id");
    assert_eq!(action_ids, vec!["approve".to_owned(), "reject".to_owned()]);

    let styles = collect_ids(blocks, "style");
    assert_eq!(styles, vec!["primary".to_owned(), "danger".to_owned()]);
}

#[tokio::test]
async fn buttons_carry_the_requester_id() {
    let (state, slack) = test_state();

    events::dispatch(submission("U789", Some("U123"), Some("Budget")), &state)
        .await
        .expect("dispatch");

    let calls = slack.calls();
    let SlackCall::PostMessage { blocks, .. } = &calls[0] else {
        panic!("expected chat.postMessage");
    };
    assert_eq!(
        collect_ids(blocks, "value"),
        vec!["U789".to_owned(), "U789".to_owned()]
    );
}

#[tokio::test]
async fn missing_approver_keeps_modal_open() {
    let (state, slack) = test_state();

    let ack = events::dispatch(submission("U789", None, Some("Budget")), &state)
        .await
        .expect("dispatch");

    let Ack::FormErrors(errors) = ack else {
        panic!("expected form errors");
    };
    assert!(errors.contains_key("approver_block"));
    assert!(!errors.contains_key("request_block"));
    assert!(slack.calls().is_empty());
}

#[tokio::test]
async fn blank_request_text_keeps_modal_open() {
    let (state, slack) = test_state();

    let ack = events::dispatch(submission("U789", Some("U123"), Some("   ")), &state)
        .await
        .expect("dispatch");

    let Ack::FormErrors(errors) = ack else {
        panic!("expected form errors");
    };
    assert!(errors.contains_key("request_block"));
    assert!(slack.calls().is_empty());
}

#[tokio::test]
async fn submission_for_other_modal_is_ignored() {
    let (state, slack) = test_state();
    let mut raw = view_submission("U789", Some("U123"), Some("text"));
    raw["view"]["callback_id"] = serde_json::json!("some_other_modal");
    let payload: InteractionPayload = serde_json::from_value(raw).expect("payload");

    let ack = events::dispatch(InboundEvent::Interaction(payload), &state)
        .await
        .expect("dispatch");

    assert_eq!(ack, Ack::Empty);
    assert!(slack.calls().is_empty());
}
