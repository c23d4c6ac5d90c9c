//! Shared application state handed to every handler.

use std::sync::Arc;

use crate::config::GlobalConfig;
use crate::slack::client::SlackApi;
use crate::slack::signature::SignatureVerifier;

/// Dependencies injected into the router and handlers.
///
/// Handlers keep no state of their own; everything they need arrives
/// through this struct.
#[derive(Clone)]
pub struct AppState {
    /// Loaded configuration.
    pub config: Arc<GlobalConfig>,
    /// Outbound Slack API.
    pub slack: Arc<dyn SlackApi>,
    /// Inbound request authenticator.
    pub verifier: SignatureVerifier,
}

impl AppState {
    /// Assemble state from its parts.
    #[must_use]
    pub fn new(
        config: Arc<GlobalConfig>,
        slack: Arc<dyn SlackApi>,
        verifier: SignatureVerifier,
    ) -> Self {
        Self {
            config,
            slack,
            verifier,
        }
    }
}
