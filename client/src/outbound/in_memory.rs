//! In-memory Ubiregi agent.
//!
//! Serves a fixed list of checkouts through the same [`UbiAgent`] port as the
//! HTTP agent so the checkout manager's pagination and filtering can be
//! exercised deterministically without a network.
//!
//! Paging uses one shared cursor (`window`, `current_pos`): a collection
//! request resets it and records the criteria, a continuation request carries
//! on from it. Interleaving two searches on one agent therefore corrupts both;
//! the agent is meant for a single caller at a time.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use mockable::Clock;
use pagination::ContinuationUrl;
use tracing::debug;

use crate::domain::ports::{
    CHECKOUTS_PATH, CURRENT_ACCOUNT_PATH, SearchTarget, UbiAgent, UbiAgentError,
};
use crate::domain::{
    Account, Checkout, CheckoutDetails, CheckoutId, CheckoutPatch, CollectionEnvelope,
    ResourceEnvelope, SearchCriteria,
};

/// Continuation value handed out while filtered checkouts remain.
pub const IN_MEMORY_CONTINUATION: &str = "memory://checkouts/next";

struct PageCursor {
    window: usize,
    current_pos: usize,
    criteria: SearchCriteria,
}

struct InMemoryState {
    checkouts: Vec<Checkout>,
    account: Option<Account>,
    cursor: PageCursor,
    search_requests: usize,
}

/// Agent backed by an in-process checkout list.
pub struct InMemoryUbiAgent {
    state: Mutex<InMemoryState>,
    clock: Arc<dyn Clock>,
}

impl InMemoryUbiAgent {
    /// Serve `checkouts` in pages of at most `window` records.
    ///
    /// A zero window is treated as one so searches always make progress.
    pub fn new(checkouts: Vec<Checkout>, window: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Mutex::new(InMemoryState {
                checkouts,
                account: None,
                cursor: PageCursor {
                    window: window.max(1),
                    current_pos: 0,
                    criteria: SearchCriteria::default(),
                },
                search_requests: 0,
            }),
            clock,
        }
    }

    /// Serve `account` from `accounts/current`.
    pub fn with_account(self, account: Account) -> Self {
        if let Ok(mut state) = self.state.lock() {
            state.account = Some(account);
        }
        self
    }

    /// Number of search requests served so far.
    pub fn search_requests(&self) -> usize {
        self.lock_state().map_or(0, |state| state.search_requests)
    }

    /// Current contents, in storage order.
    pub fn checkouts(&self) -> Vec<Checkout> {
        self.lock_state()
            .map(|state| state.checkouts.clone())
            .unwrap_or_default()
    }

    fn lock_state(&self) -> Result<MutexGuard<'_, InMemoryState>, UbiAgentError> {
        self.state
            .lock()
            .map_err(|_| UbiAgentError::transport("in-memory agent state poisoned"))
    }

    fn resource_envelope(&self, checkout: Option<Checkout>) -> ResourceEnvelope {
        ResourceEnvelope::with_checkout(self.clock.utc(), checkout)
    }
}

fn parse_checkout_path(path: &str) -> Result<CheckoutId, UbiAgentError> {
    path.strip_prefix(CHECKOUTS_PATH)
        .and_then(|raw| raw.trim_end_matches('/').parse::<i64>().ok())
        .map(CheckoutId::new)
        .ok_or_else(|| UbiAgentError::invalid_request(format!("unsupported resource path `{path}`")))
}

/// Mirrors the server's 404 for an unknown checkout id.
fn missing_checkout(id: CheckoutId) -> UbiAgentError {
    UbiAgentError::not_found(404_u16, format!("checkout {id}"), "")
}

fn continuation() -> Result<ContinuationUrl, UbiAgentError> {
    ContinuationUrl::new(IN_MEMORY_CONTINUATION)
        .map_err(|error| UbiAgentError::invalid_request(error.to_string()))
}

#[async_trait]
impl UbiAgent for InMemoryUbiAgent {
    async fn add(
        &self,
        path: &str,
        checkout: &CheckoutDetails,
    ) -> Result<ResourceEnvelope, UbiAgentError> {
        if path != CHECKOUTS_PATH {
            return Err(UbiAgentError::invalid_request(format!(
                "cannot add checkouts under `{path}`"
            )));
        }
        let mut state = self.lock_state()?;
        let next_id = state
            .checkouts
            .iter()
            .map(|existing| existing.id.get())
            .max()
            .map_or(1, |max| max.saturating_add(1));
        let created = Checkout::new(CheckoutId::new(next_id), checkout.clone());
        state.checkouts.push(created.clone());
        debug!(id = next_id, "in-memory checkout added");
        Ok(self.resource_envelope(Some(created)))
    }

    async fn search(&self, target: &SearchTarget) -> Result<CollectionEnvelope, UbiAgentError> {
        let mut state = self.lock_state()?;
        state.search_requests += 1;

        match target {
            SearchTarget::Collection { path, criteria } => {
                if path != CHECKOUTS_PATH {
                    return Err(UbiAgentError::invalid_request(format!(
                        "unsupported collection `{path}`"
                    )));
                }
                state.cursor.current_pos = 0;
                state.cursor.criteria = *criteria;
            }
            SearchTarget::Continuation(next) => {
                if next.as_str() != IN_MEMORY_CONTINUATION {
                    return Err(UbiAgentError::invalid_request(format!(
                        "unknown continuation `{next}`"
                    )));
                }
            }
        }

        let criteria = state.cursor.criteria;
        let page_size = criteria
            .limit()
            .map_or(state.cursor.window, |limit| {
                usize::try_from(limit)
                    .unwrap_or(usize::MAX)
                    .min(state.cursor.window)
            })
            .max(1);
        let matching: Vec<Checkout> = state
            .checkouts
            .iter()
            .filter(|checkout| criteria.meets(checkout))
            .cloned()
            .collect();

        let start = state.cursor.current_pos;
        let end = start.saturating_add(page_size).min(matching.len());
        let page = matching
            .get(start..end)
            .map(<[Checkout]>::to_vec)
            .unwrap_or_default();
        state.cursor.current_pos = start.saturating_add(page_size);

        let next_url = if matching.len() > state.cursor.current_pos {
            Some(continuation()?)
        } else {
            None
        };
        let last_updated_at = page.iter().map(Checkout::updated_at).max();

        Ok(CollectionEnvelope {
            timestamp: self.clock.utc(),
            next_batch_since: last_updated_at,
            last_updated_at,
            next_url,
            checkouts: page,
        })
    }

    async fn get(&self, path: &str) -> Result<ResourceEnvelope, UbiAgentError> {
        let state = self.lock_state()?;
        if path == CURRENT_ACCOUNT_PATH {
            return Ok(ResourceEnvelope {
                timestamp: self.clock.utc(),
                account: state.account.clone(),
                checkout: None,
            });
        }
        let id = parse_checkout_path(path)?;
        let found = state
            .checkouts
            .iter()
            .find(|checkout| checkout.id == id)
            .cloned();
        Ok(self.resource_envelope(found))
    }

    async fn update(
        &self,
        path: &str,
        patch: &CheckoutPatch,
    ) -> Result<ResourceEnvelope, UbiAgentError> {
        let id = parse_checkout_path(path)?;
        let mut state = self.lock_state()?;
        let stored = state
            .checkouts
            .iter_mut()
            .find(|checkout| checkout.id == id)
            .ok_or_else(|| missing_checkout(id))?;
        patch.apply_to(&mut stored.details);
        let updated = stored.clone();
        Ok(self.resource_envelope(Some(updated)))
    }

    async fn delete(&self, path: &str) -> Result<(), UbiAgentError> {
        let id = parse_checkout_path(path)?;
        let mut state = self.lock_state()?;
        let before = state.checkouts.len();
        state.checkouts.retain(|checkout| checkout.id != id);
        if state.checkouts.len() == before {
            return Err(missing_checkout(id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Cursor and CRUD behaviour of the in-memory agent.

    use super::*;
    use crate::domain::CheckoutStatus;
    use crate::domain::ports::checkout_path;
    use crate::test_support::checkouts::{sample_checkout, sample_details, updated_at};
    use crate::test_support::runtime::SteppingClock;
    use rstest::{fixture, rstest};

    fn agent_with(count: i64, window: usize) -> InMemoryUbiAgent {
        let checkouts = (1..=count)
            .map(|id| sample_checkout(id, updated_at(id)))
            .collect();
        InMemoryUbiAgent::new(checkouts, window, Arc::new(SteppingClock::fixed()))
    }

    #[fixture]
    fn agent() -> InMemoryUbiAgent {
        agent_with(5, 2)
    }

    fn ids(envelope: &CollectionEnvelope) -> Vec<i64> {
        envelope.checkouts.iter().map(|c| c.id.get()).collect()
    }

    #[rstest]
    #[tokio::test]
    async fn pages_through_filtered_records(agent: InMemoryUbiAgent) {
        let first = agent
            .search(&SearchTarget::checkouts(SearchCriteria::default()))
            .await
            .expect("first page");
        assert_eq!(ids(&first), vec![1, 2]);
        let next = first.next_url.clone().expect("more pages");
        assert_eq!(next.as_str(), IN_MEMORY_CONTINUATION);

        let second = agent
            .search(&SearchTarget::Continuation(next.clone()))
            .await
            .expect("second page");
        assert_eq!(ids(&second), vec![3, 4]);

        let third = agent
            .search(&SearchTarget::Continuation(next))
            .await
            .expect("third page");
        assert_eq!(ids(&third), vec![5]);
        assert!(third.next_url.is_none());
        assert_eq!(agent.search_requests(), 3);
    }

    #[rstest]
    #[tokio::test]
    async fn fresh_collection_request_resets_cursor(agent: InMemoryUbiAgent) {
        let criteria = SearchCriteria::default();
        agent
            .search(&SearchTarget::checkouts(criteria))
            .await
            .expect("first search");
        let again = agent
            .search(&SearchTarget::checkouts(criteria))
            .await
            .expect("second search");
        assert_eq!(ids(&again), vec![1, 2]);
    }

    #[rstest]
    #[tokio::test]
    async fn limit_caps_page_size() {
        let agent = agent_with(5, 4);
        let page = agent
            .search(&SearchTarget::checkouts(SearchCriteria::default().with_limit(3)))
            .await
            .expect("page");
        assert_eq!(ids(&page), vec![1, 2, 3]);
        assert!(page.next_url.is_some());
    }

    #[rstest]
    #[tokio::test]
    async fn glb_filter_is_applied(agent: InMemoryUbiAgent) {
        let page = agent
            .search(&SearchTarget::checkouts(SearchCriteria::default().with_glb(3)))
            .await
            .expect("page");
        assert_eq!(ids(&page), vec![4, 5]);
        assert!(page.next_url.is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn rejects_foreign_continuations(agent: InMemoryUbiAgent) {
        let foreign = ContinuationUrl::new("https://ubiregi.com/api/3/next").expect("valid");
        let result = agent.search(&SearchTarget::Continuation(foreign)).await;
        assert!(matches!(result, Err(UbiAgentError::InvalidRequest { .. })));
    }

    #[rstest]
    #[tokio::test]
    async fn add_assigns_next_identifier(agent: InMemoryUbiAgent) {
        let envelope = agent
            .add(CHECKOUTS_PATH, &sample_details("new-guid", updated_at(9)))
            .await
            .expect("add");
        let created = envelope.checkout.expect("checkout returned");
        assert_eq!(created.id.get(), 6);
        assert_eq!(agent.checkouts().len(), 6);
    }

    #[rstest]
    #[tokio::test]
    async fn add_into_empty_store_starts_at_one() {
        let agent = agent_with(0, 1);
        let envelope = agent
            .add(CHECKOUTS_PATH, &sample_details("first", updated_at(1)))
            .await
            .expect("add");
        assert_eq!(envelope.checkout.map(|c| c.id.get()), Some(1));
    }

    #[rstest]
    #[tokio::test]
    async fn get_returns_empty_envelope_for_unknown_id(agent: InMemoryUbiAgent) {
        let found = agent
            .get(&checkout_path(CheckoutId::new(3)))
            .await
            .expect("get");
        assert_eq!(found.checkout.map(|c| c.id.get()), Some(3));

        let missing = agent
            .get(&checkout_path(CheckoutId::new(99)))
            .await
            .expect("get");
        assert!(missing.checkout.is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn update_applies_patch(agent: InMemoryUbiAgent) {
        let patch = CheckoutPatch {
            status: Some(CheckoutStatus::Cancel),
            ..CheckoutPatch::default()
        };
        let envelope = agent
            .update(&checkout_path(CheckoutId::new(2)), &patch)
            .await
            .expect("update");
        assert_eq!(
            envelope.checkout.map(|c| c.details.status),
            Some(CheckoutStatus::Cancel)
        );
    }

    #[rstest]
    #[tokio::test]
    async fn delete_removes_and_reports_missing(agent: InMemoryUbiAgent) {
        let path = checkout_path(CheckoutId::new(4));
        agent.delete(&path).await.expect("delete");
        assert_eq!(agent.checkouts().len(), 4);
        assert!(matches!(
            agent.delete(&path).await,
            Err(UbiAgentError::NotFound { .. })
        ));
    }

    #[rstest]
    #[tokio::test]
    async fn rejects_unknown_resource_paths(agent: InMemoryUbiAgent) {
        let result = agent.get("accounts/current/menus/1").await;
        assert!(matches!(result, Err(UbiAgentError::InvalidRequest { .. })));
    }
}
