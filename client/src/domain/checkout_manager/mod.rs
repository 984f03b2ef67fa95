//! Checkout façade over a [`UbiAgent`].
//!
//! The manager owns the pagination protocol (follow continuation URLs verbatim
//! until the server stops sending one, within a [`PageBudget`]), the retry
//! policy for idempotent reads, and the "missing checkout is `None`"
//! normalisation for single fetches. Agent errors are passed through as-is.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::Clock;
use pagination::PageBudget;
use tracing::{debug, info, warn};

use crate::domain::ports::{
    CHECKOUTS_PATH, CheckoutCommand, CheckoutQuery, SearchTarget, UbiAgent, UbiAgentError,
    checkout_path,
};
use crate::domain::{
    Checkout, CheckoutDetails, CheckoutId, CheckoutManagerError, CheckoutPatch,
    CollectionEnvelope, SearchCriteria,
};

mod retry;

use retry::backoff_delay;
pub use retry::{AttemptJitter, BackoffJitter, RetryRuntime, RetrySleeper, TokioSleeper};

/// Manager configuration controlling pagination bounds and read retries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutManagerConfig {
    /// Page and wall-clock ceiling for one search.
    pub page_budget: PageBudget,
    /// Attempts per idempotent call, including the first one.
    pub max_attempts: u32,
    /// Initial retry backoff.
    pub initial_backoff: Duration,
    /// Maximum retry backoff.
    pub max_backoff: Duration,
}

impl Default for CheckoutManagerConfig {
    fn default() -> Self {
        Self {
            page_budget: PageBudget::default(),
            max_attempts: 3,
            initial_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_secs(5),
        }
    }
}

/// Public entry point for checkout operations.
pub struct CheckoutManager {
    agent: Arc<dyn UbiAgent>,
    clock: Arc<dyn Clock>,
    runtime: RetryRuntime,
    config: CheckoutManagerConfig,
}

impl CheckoutManager {
    /// Build a manager using the Tokio sleeper and default jitter.
    /// ```rust,ignore
    /// let manager = CheckoutManager::new(agent, Arc::new(DefaultClock), config);
    /// ```
    pub fn new(
        agent: Arc<dyn UbiAgent>,
        clock: Arc<dyn Clock>,
        config: CheckoutManagerConfig,
    ) -> Self {
        Self::with_runtime(agent, clock, RetryRuntime::default(), config)
    }

    /// Build a manager with injected retry runtime.
    pub fn with_runtime(
        agent: Arc<dyn UbiAgent>,
        clock: Arc<dyn Clock>,
        runtime: RetryRuntime,
        config: CheckoutManagerConfig,
    ) -> Self {
        Self {
            agent,
            clock,
            runtime,
            config,
        }
    }

    /// Return every checkout matching `criteria`, in server order.
    ///
    /// The first request carries the encoded criteria; each later request goes
    /// to the continuation URL exactly as received. The loop ends when a page
    /// arrives without a continuation URL.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutManagerError::PageBudgetExhausted`] when the server
    /// keeps paginating beyond the configured budget, and
    /// [`CheckoutManagerError::Agent`] for any agent failure left after
    /// retries.
    pub async fn search(
        &self,
        criteria: Option<SearchCriteria>,
    ) -> Result<Vec<Checkout>, CheckoutManagerError> {
        let window = criteria.unwrap_or_else(SearchCriteria::default_window);
        let started_at = self.clock.utc();
        let mut tracker = self.config.page_budget.tracker();
        let mut target = SearchTarget::checkouts(window);
        let mut checkouts = Vec::new();

        loop {
            let page = tracker.admit(self.elapsed_since(started_at))?;
            let CollectionEnvelope {
                next_url,
                checkouts: batch,
                ..
            } = self
                .with_retry("search", || self.agent.search(&target))
                .await?;
            debug!(
                page,
                received = batch.len(),
                more = next_url.is_some(),
                "fetched checkout page"
            );
            checkouts.extend(batch);

            match next_url {
                Some(next) => target = SearchTarget::Continuation(next),
                None => break,
            }
        }

        info!(
            pages = tracker.pages(),
            total = checkouts.len(),
            "checkout search complete"
        );
        Ok(checkouts)
    }

    /// Return checkouts updated at or after `cursor`.
    ///
    /// Feed the largest `updated_at` seen so far back in to sync incrementally.
    ///
    /// # Errors
    ///
    /// Same as [`Self::search`].
    pub async fn search_since(
        &self,
        cursor: DateTime<Utc>,
    ) -> Result<Vec<Checkout>, CheckoutManagerError> {
        let criteria = SearchCriteria::default().with_since(cursor.naive_utc());
        self.search(Some(criteria)).await
    }

    /// Fetch one checkout; `Ok(None)` when the server has no such checkout.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutManagerError::Agent`] for agent failures other than
    /// not-found.
    pub async fn get(&self, id: CheckoutId) -> Result<Option<Checkout>, CheckoutManagerError> {
        let path = checkout_path(id);
        match self.with_retry("get", || self.agent.get(&path)).await {
            Ok(envelope) => Ok(envelope.checkout),
            Err(UbiAgentError::NotFound { detail, .. }) => {
                debug!(%id, %detail, "checkout not found");
                Ok(None)
            }
            Err(error) => Err(error.into()),
        }
    }

    /// Create a checkout and return it as stored.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutManagerError::MissingCheckout`] when the response
    /// omits the checkout, or the agent's error.
    pub async fn add(&self, checkout: CheckoutDetails) -> Result<Checkout, CheckoutManagerError> {
        let envelope = self.agent.add(CHECKOUTS_PATH, &checkout).await?;
        let created = envelope
            .checkout
            .ok_or(CheckoutManagerError::MissingCheckout { operation: "add" })?;
        info!(id = %created.id, guid = %created.details.guid, "checkout added");
        Ok(created)
    }

    /// Apply a partial update and return the updated checkout.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutManagerError::MissingCheckout`] when the response
    /// omits the checkout, or the agent's error.
    pub async fn update(
        &self,
        id: CheckoutId,
        patch: CheckoutPatch,
    ) -> Result<Checkout, CheckoutManagerError> {
        if patch.is_empty() {
            warn!(%id, "sending empty checkout patch");
        }
        let envelope = self.agent.update(&checkout_path(id), &patch).await?;
        envelope
            .checkout
            .ok_or(CheckoutManagerError::MissingCheckout {
                operation: "update",
            })
    }

    /// Delete a checkout.
    ///
    /// # Errors
    ///
    /// Returns the agent's error unchanged.
    pub async fn delete(&self, id: CheckoutId) -> Result<(), CheckoutManagerError> {
        self.agent.delete(&checkout_path(id)).await?;
        info!(%id, "checkout deleted");
        Ok(())
    }

    async fn with_retry<T, F, Fut>(
        &self,
        operation: &'static str,
        mut call: F,
    ) -> Result<T, UbiAgentError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, UbiAgentError>>,
    {
        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match call().await {
                Ok(value) => return Ok(value),
                Err(error) if error.is_retryable() && attempt < max_attempts => {
                    let base =
                        backoff_delay(self.config.initial_backoff, self.config.max_backoff, attempt);
                    let delay = self
                        .runtime
                        .jitter
                        .jittered_delay(base, attempt, self.clock.utc());
                    warn!(operation, attempt, ?delay, %error, "retrying ubiregi call");
                    self.runtime.sleeper.sleep(delay).await;
                    attempt += 1;
                }
                Err(error) => return Err(error),
            }
        }
    }

    fn elapsed_since(&self, started_at: DateTime<Utc>) -> Duration {
        (self.clock.utc() - started_at)
            .to_std()
            .unwrap_or(Duration::ZERO)
    }
}

#[async_trait]
impl CheckoutQuery for CheckoutManager {
    async fn search(
        &self,
        criteria: Option<SearchCriteria>,
    ) -> Result<Vec<Checkout>, CheckoutManagerError> {
        CheckoutManager::search(self, criteria).await
    }

    async fn get(&self, id: CheckoutId) -> Result<Option<Checkout>, CheckoutManagerError> {
        CheckoutManager::get(self, id).await
    }
}

#[async_trait]
impl CheckoutCommand for CheckoutManager {
    async fn add(&self, checkout: CheckoutDetails) -> Result<Checkout, CheckoutManagerError> {
        CheckoutManager::add(self, checkout).await
    }

    async fn update(
        &self,
        id: CheckoutId,
        patch: CheckoutPatch,
    ) -> Result<Checkout, CheckoutManagerError> {
        CheckoutManager::update(self, id, patch).await
    }

    async fn delete(&self, id: CheckoutId) -> Result<(), CheckoutManagerError> {
        CheckoutManager::delete(self, id).await
    }
}
