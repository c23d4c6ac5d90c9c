//! Slack slash command handler.

use tracing::info;

use crate::slack::blocks;
use crate::slack::payloads::SlashCommand;
use crate::state::AppState;
use crate::Result;

/// Open the approval modal for the invoking user.
///
/// Runs after the command has been acknowledged, so a failure here is only
/// visible in the logs.
///
/// # Errors
///
/// Returns `AppError::Slack` if `views.open` fails.
pub async fn handle_command(command: &SlashCommand, state: &AppState) -> Result<()> {
    info!(
        command = %command.command,
        user_id = %command.user_id,
        channel_id = command.channel_id.as_deref().unwrap_or_default(),
        "opening approval modal"
    );
    state
        .slack
        .open_view(&command.trigger_id, blocks::approval_modal())
        .await
}

/// Whether `command` is the one this bot answers.
#[must_use]
pub fn is_approval_command(command: &SlashCommand, state: &AppState) -> bool {
    command.command == state.config.slack.command
}
