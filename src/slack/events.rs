//! Slack event dispatch.
//!
//! Splits every inbound event into an immediate acknowledgment ([`Ack`])
//! and the deferred work ([`Job`]) that runs after Slack has its response.
//! Slack expects the acknowledgment within three seconds; the follow-up API
//! calls are not bound by that deadline.

use std::collections::BTreeMap;

use serde_json::json;
use tracing::{debug, info, warn};

use crate::models::approval::{ApprovalRequest, Decision};
use crate::slack::blocks::APPROVAL_MODAL_CALLBACK_ID;
use crate::slack::payloads::{BlockActionsPayload, InboundEvent, InteractionPayload, SlashCommand};
use crate::slack::{commands, handlers};
use crate::state::AppState;
use crate::Result;

/// Synchronous response returned to Slack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ack {
    /// Plain `200 OK` with an empty body.
    Empty,
    /// Keep the modal open and show these messages under the named blocks.
    FormErrors(BTreeMap<String, String>),
}

impl Ack {
    /// JSON body for the acknowledgment, if any.
    #[must_use]
    pub fn body(&self) -> Option<serde_json::Value> {
        match self {
            Self::Empty => None,
            Self::FormErrors(errors) => Some(json!({
                "response_action": "errors",
                "errors": errors,
            })),
        }
    }
}

/// Work performed after the acknowledgment has been sent.
#[derive(Debug, Clone)]
pub enum Job {
    /// Open the approval modal for a slash command.
    OpenApprovalModal(SlashCommand),
    /// DM the approver with the submitted request.
    SendApprovalRequest(ApprovalRequest),
    /// Notify requesters of the clicked decisions.
    NotifyDecisions(BlockActionsPayload),
}

impl Job {
    /// Short name used in tracing spans.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::OpenApprovalModal(_) => "open_approval_modal",
            Self::SendApprovalRequest(_) => "send_approval_request",
            Self::NotifyDecisions(_) => "notify_decisions",
        }
    }
}

/// Decide the acknowledgment and deferred work for an inbound event.
///
/// Cheap and free of I/O so it can run inside the request handler.
#[must_use]
pub fn triage(event: InboundEvent, state: &AppState) -> (Ack, Option<Job>) {
    match event {
        InboundEvent::Command(command) => {
            if commands::is_approval_command(&command, state) {
                (Ack::Empty, Some(Job::OpenApprovalModal(command)))
            } else {
                info!(command = %command.command, "ignoring unrecognised slash command");
                (Ack::Empty, None)
            }
        }
        InboundEvent::Interaction(InteractionPayload::ViewSubmission(submission)) => {
            let callback_id = submission.view.callback_id.as_deref().unwrap_or_default();
            if callback_id != APPROVAL_MODAL_CALLBACK_ID {
                info!(callback_id, "ignoring view submission for unknown modal");
                return (Ack::Empty, None);
            }

            match handlers::modal::extract_form(&submission.view.state) {
                Ok(form) => {
                    let request = ApprovalRequest::new(submission.user.id, form);
                    (Ack::Empty, Some(Job::SendApprovalRequest(request)))
                }
                Err(errors) => {
                    info!(user_id = %submission.user.id, ?errors, "approval modal incomplete");
                    (Ack::FormErrors(errors), None)
                }
            }
        }
        InboundEvent::Interaction(InteractionPayload::BlockActions(payload)) => {
            if payload.actions.is_empty() {
                warn!(user_id = %payload.user.id, "block action without actions; ignoring");
                return (Ack::Empty, None);
            }
            (Ack::Empty, Some(Job::NotifyDecisions(payload)))
        }
        InboundEvent::SslCheck => {
            debug!("ssl check");
            (Ack::Empty, None)
        }
        InboundEvent::Interaction(InteractionPayload::Unsupported) => {
            info!("unhandled interaction event type");
            (Ack::Empty, None)
        }
    }
}

/// Execute deferred work.
///
/// Decision failures are logged per action and do not stop the remaining
/// actions in the same payload.
///
/// # Errors
///
/// Returns the Slack failure from opening the modal or sending the
/// approval request.
pub async fn run(job: Job, state: &AppState) -> Result<()> {
    match job {
        Job::OpenApprovalModal(command) => commands::handle_command(&command, state).await,
        Job::SendApprovalRequest(request) => {
            handlers::modal::send_approval_request(&request, state).await
        }
        Job::NotifyDecisions(payload) => {
            for action in &payload.actions {
                let Some(decision) = Decision::from_action_id(&action.action_id) else {
                    warn!(action_id = %action.action_id, "unknown action_id");
                    continue;
                };
                info!(action_id = %action.action_id, user_id = %payload.user.id, "dispatching block action");
                if let Err(err) =
                    handlers::approval::handle_decision(decision, action, &payload, state).await
                {
                    warn!(%err, action_id = %action.action_id, "decision action failed");
                }
            }
            Ok(())
        }
    }
}

/// Triage and run an event inline, returning the acknowledgment.
///
/// # Errors
///
/// Propagates the error from [`run`].
pub async fn dispatch(event: InboundEvent, state: &AppState) -> Result<Ack> {
    let (ack, job) = triage(event, state);
    if let Some(job) = job {
        run(job, state).await?;
    }
    Ok(ack)
}
