//! Integration tests for Approve / Reject clicks → requester notification.

use slack_approval_bot::slack::events::{self, Ack};
use slack_approval_bot::slack::payloads::{InboundEvent, InteractionPayload};

use super::test_helpers::{block_action, test_state, RecordingSlack, SlackCall};

fn click(
    clicker: &str,
    action_id: &str,
    value: Option<&str>,
    message_user: Option<&str>,
) -> InboundEvent {
    let payload: InteractionPayload =
        serde_json::from_value(block_action(clicker, action_id, value, message_user))
            .expect("payload");
    InboundEvent::Interaction(payload)
}

fn posted(slack: &RecordingSlack) -> Vec<(String, String)> {
    slack
        .calls()
        .into_iter()
        .filter_map(|call| match call {
            SlackCall::PostMessage { channel, text, .. } => Some((channel, text.unwrap_or_default())),
            SlackCall::OpenView { .. } => None,
        })
        .collect()
}

#[tokio::test]
async fn approve_notifies_stored_message_author() {
    let (state, slack) = test_state();

    let ack = events::dispatch(click("U456", "approve", None, Some("U789")), &state)
        .await
        .expect("dispatch");
    assert_eq!(ack, Ack::Empty);

    assert_eq!(
        posted(&slack),
        vec![(
            "U789".to_owned(),
            "Your request has been approved by <@U456>.".to_owned()
        )]
    );
}

#[tokio::test]
async fn reject_notification_names_decider() {
    let (state, slack) = test_state();

    events::dispatch(click("U456", "reject", None, Some("U789")), &state)
        .await
        .expect("dispatch");

    let messages = posted(&slack);
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].0, "U789");
    assert!(messages[0].1.contains("rejected"));
    assert!(messages[0].1.contains("U456"));
}

#[tokio::test]
async fn button_value_takes_precedence_over_message_author() {
    let (state, slack) = test_state();

    // Bot-posted messages carry the bot as author; the button value names the requester.
    events::dispatch(click("U456", "approve", Some("U789"), Some("UBOT")), &state)
        .await
        .expect("dispatch");

    let messages = posted(&slack);
    assert_eq!(messages[0].0, "U789");
}

#[tokio::test]
async fn empty_button_value_falls_back_to_message_author() {
    let (state, slack) = test_state();

    events::dispatch(click("U456", "approve", Some(""), Some("U789")), &state)
        .await
        .expect("dispatch");

    assert_eq!(posted(&slack)[0].0, "U789");
}

#[tokio::test]
async fn repeated_clicks_send_repeated_notifications() {
    let (state, slack) = test_state();

    for _ in 0..2 {
        events::dispatch(click("U456", "approve", Some("U789"), None), &state)
            .await
            .expect("dispatch");
    }

    let messages = posted(&slack);
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0], messages[1]);
}

#[tokio::test]
async fn approve_then_reject_sends_both_outcomes() {
    let (state, slack) = test_state();

    events::dispatch(click("U456", "approve", Some("U789"), None), &state)
        .await
        .expect("dispatch");
    events::dispatch(click("U456", "reject", Some("U789"), None), &state)
        .await
        .expect("dispatch");

    let texts: Vec<String> = posted(&slack).into_iter().map(|(_, text)| text).collect();
    assert_eq!(
        texts,
        vec![
            "Your request has been approved by <@U456>.".to_owned(),
            "Your request has been rejected by <@U456>.".to_owned(),
        ]
    );
}

#[tokio::test]
async fn unknown_action_id_sends_nothing() {
    let (state, slack) = test_state();

    events::dispatch(click("U456", "escalate", Some("U789"), None), &state)
        .await
        .expect("dispatch");

    assert!(slack.calls().is_empty());
}

#[tokio::test]
async fn unresolvable_requester_is_logged_not_raised() {
    let (state, slack) = test_state();

    let result = events::dispatch(click("U456", "approve", None, None), &state).await;

    assert!(result.is_ok());
    assert!(slack.calls().is_empty());
}

#[tokio::test]
async fn notification_failure_does_not_propagate() {
    let (state, slack) = test_state();
    slack.fail_all();

    let result = events::dispatch(click("U456", "reject", Some("U789"), None), &state).await;

    assert!(result.is_ok());
    assert!(slack.calls().is_empty());
}
