//! Read access to the authenticated account.

use std::sync::Arc;

use tracing::debug;

use crate::domain::Account;
use crate::domain::ports::{CURRENT_ACCOUNT_PATH, UbiAgent, UbiAgentError};

/// Fetches `accounts/current` through a [`UbiAgent`].
#[derive(Clone)]
pub struct AccountService {
    agent: Arc<dyn UbiAgent>,
}

impl AccountService {
    /// Create a service over the given agent.
    pub fn new(agent: Arc<dyn UbiAgent>) -> Self {
        Self { agent }
    }

    /// The account the auth token belongs to.
    ///
    /// Returns `Ok(None)` when the server answers without an account document.
    ///
    /// # Errors
    ///
    /// Returns the agent's error unchanged.
    pub async fn current(&self) -> Result<Option<Account>, UbiAgentError> {
        let envelope = self.agent.get(CURRENT_ACCOUNT_PATH).await?;
        if let Some(account) = &envelope.account {
            debug!(id = account.id, currency = %account.currency, "fetched current account");
        }
        Ok(envelope.account)
    }
}
