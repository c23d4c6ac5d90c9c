//! Approval request and decision models.
//!
//! None of these are persisted. An [`ApprovalRequest`] lives only inside the
//! message posted to the approver, and a [`DecisionOutcome`] only inside the
//! notification sent back to the requester.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Approver's verdict on a request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// The approver clicked "Approve".
    Approved,
    /// The approver clicked "Reject".
    Rejected,
}

impl Decision {
    /// Every decision, in button order.
    pub const ALL: [Self; 2] = [Self::Approved, Self::Rejected];

    /// Map a block-action `action_id` to its decision.
    #[must_use]
    pub fn from_action_id(action_id: &str) -> Option<Self> {
        match action_id {
            "approve" => Some(Self::Approved),
            "reject" => Some(Self::Rejected),
            _ => None,
        }
    }

    /// The `action_id` carried by this decision's button.
    #[must_use]
    pub fn action_id(self) -> &'static str {
        match self {
            Self::Approved => "approve",
            Self::Rejected => "reject",
        }
    }

    /// Past-tense label used in the requester notification.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Button caption.
    #[must_use]
    pub fn button_text(self) -> &'static str {
        match self {
            Self::Approved => "Approve",
            Self::Rejected => "Reject",
        }
    }
}

impl Display for Decision {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Field values read from a submitted approval modal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApprovalForm {
    /// Slack user ID picked in the "Approver" selector.
    pub approver: String,
    /// Free text typed into the "Approval Request" input.
    pub request_text: String,
}

/// A request on its way to an approver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApprovalRequest {
    /// Slack user ID of whoever submitted the form.
    pub requester: String,
    /// Slack user ID of the chosen approver. Also the DM channel.
    pub approver: String,
    /// Request body shown to the approver.
    pub request_text: String,
}

impl ApprovalRequest {
    /// Combine a submitted form with the submitting user.
    #[must_use]
    pub fn new(requester: impl Into<String>, form: ApprovalForm) -> Self {
        Self {
            requester: requester.into(),
            approver: form.approver,
            request_text: form.request_text,
        }
    }

    /// Plain-text fallback for clients that cannot render blocks.
    #[must_use]
    pub fn fallback_text(&self) -> String {
        format!("Approval Request: {}", self.request_text)
    }
}

/// A decision ready to be reported to the requester.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionOutcome {
    /// Approve or reject.
    pub decision: Decision,
    /// Slack user ID to notify.
    pub requester: String,
    /// Slack user ID of whoever clicked the button.
    pub decider: String,
}

impl DecisionOutcome {
    /// Text of the direct message sent to the requester.
    #[must_use]
    pub fn notification_text(&self) -> String {
        format!(
            "Your request has been {} by <@{}>.",
            self.decision.label(),
            self.decider
        )
    }
}
