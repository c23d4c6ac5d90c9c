#![forbid(unsafe_code)]

//! Slack approval bot: a slash command opens a form, the chosen approver
//! gets Approve / Reject buttons, and the requester hears the outcome.

pub mod config;
pub mod errors;
pub mod models;
pub mod server;
pub mod slack;
pub mod state;

pub use config::GlobalConfig;
pub use errors::{AppError, Result};
pub use state::AppState;
