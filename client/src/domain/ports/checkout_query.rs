//! Driving port for reading checkouts.

use async_trait::async_trait;

use crate::domain::{Checkout, CheckoutId, CheckoutManagerError, SearchCriteria};

/// Read side of the checkout façade.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CheckoutQuery: Send + Sync {
    /// Return every checkout matching `criteria`, following all pages.
    ///
    /// `None` searches with [`SearchCriteria::default_window`].
    async fn search(
        &self,
        criteria: Option<SearchCriteria>,
    ) -> Result<Vec<Checkout>, CheckoutManagerError>;

    /// Fetch one checkout; `Ok(None)` when it does not exist.
    async fn get(&self, id: CheckoutId) -> Result<Option<Checkout>, CheckoutManagerError>;
}
