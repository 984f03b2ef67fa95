//! Driving port for writing checkouts.

use async_trait::async_trait;

use crate::domain::{Checkout, CheckoutDetails, CheckoutId, CheckoutManagerError, CheckoutPatch};

/// Write side of the checkout façade.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CheckoutCommand: Send + Sync {
    /// Create a checkout and return it with its server-assigned id.
    async fn add(&self, checkout: CheckoutDetails) -> Result<Checkout, CheckoutManagerError>;

    /// Apply a partial update and return the updated checkout.
    async fn update(
        &self,
        id: CheckoutId,
        patch: CheckoutPatch,
    ) -> Result<Checkout, CheckoutManagerError>;

    /// Delete a checkout.
    async fn delete(&self, id: CheckoutId) -> Result<(), CheckoutManagerError>;
}
