//! Errors returned by the checkout façade.
//!
//! Agent failures pass through untranslated; the façade only adds the
//! failures it can detect itself.

use pagination::PageBudgetExceeded;

use super::ports::UbiAgentError;

/// Failure of a [`crate::domain::CheckoutManager`] operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CheckoutManagerError {
    /// The agent failed; carried verbatim.
    #[error(transparent)]
    Agent(#[from] UbiAgentError),
    /// A search kept receiving continuation URLs beyond its page budget.
    #[error(transparent)]
    PageBudgetExhausted(#[from] PageBudgetExceeded),
    /// A write succeeded but the response envelope carried no checkout.
    #[error("ubiregi response to {operation} carried no checkout")]
    MissingCheckout {
        /// Operation that expected a checkout back.
        operation: &'static str,
    },
}

impl CheckoutManagerError {
    /// Agent error, when this failure came from the agent.
    pub fn as_agent_error(&self) -> Option<&UbiAgentError> {
        match self {
            Self::Agent(error) => Some(error),
            _ => None,
        }
    }
}
