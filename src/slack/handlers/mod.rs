//! Slack interaction handler sub-modules.

pub mod approval;
pub mod modal;
