//! Unit tests for reading the approval form out of submitted view state.

use serde_json::json;

use slack_approval_bot::slack::handlers::modal::extract_form;
use slack_approval_bot::slack::payloads::ViewState;

fn state(approver: serde_json::Value, text: serde_json::Value) -> ViewState {
    serde_json::from_value(json!({
        "values": {
            "approver_block": { "approver": { "type": "users_select", "selected_user": approver } },
            "request_block": { "request": { "type": "plain_text_input", "value": text } }
        }
    }))
    .expect("view state")
}

#[test]
fn complete_state_yields_form() {
    let form = extract_form(&state(json!("U123"), json!("Please approve my PTO"))).expect("form");
    assert_eq!(form.approver, "U123");
    assert_eq!(form.request_text, "Please approve my PTO");
}

#[test]
fn request_text_is_kept_verbatim() {
    let form = extract_form(&state(json!("U123"), json!("  line one\nline two  "))).expect("form");
    assert_eq!(form.request_text, "  line one\nline two  ");
}

#[test]
fn null_approver_is_reported() {
    let errors = extract_form(&state(json!(null), json!("text"))).expect_err("missing approver");
    assert_eq!(errors.len(), 1);
    assert!(errors.contains_key("approver_block"));
}

#[test]
fn empty_text_is_reported() {
    let errors = extract_form(&state(json!("U123"), json!(""))).expect_err("missing text");
    assert_eq!(errors.len(), 1);
    assert!(errors.contains_key("request_block"));
}

#[test]
fn absent_blocks_report_both_fields() {
    let errors = extract_form(&ViewState::default()).expect_err("empty state");
    assert_eq!(errors.len(), 2);
}

#[test]
fn whitespace_only_text_is_reported() {
    let errors = extract_form(&state(json!("U123"), json!("   \n\t"))).expect_err("blank text");
    assert_eq!(
        errors.get("request_block").map(String::as_str),
        Some("Describe what needs approval")
    );
}

#[test]
fn empty_selected_user_is_reported() {
    let errors = extract_form(&state(json!(""), json!("text"))).expect_err("empty approver");
    assert_eq!(
        errors.get("approver_block").map(String::as_str),
        Some("Select an approver")
    );
}
