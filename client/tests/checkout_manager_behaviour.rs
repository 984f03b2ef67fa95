//! Behavioural tests for the checkout manager over the in-memory agent.

use std::sync::Arc;

use chrono::{NaiveDate, TimeZone, Utc};
use rstest::{fixture, rstest};
use ubiclient::domain::ports::UbiAgent;
use ubiclient::domain::{
    AccountService, Checkout, CheckoutId, CheckoutManager, CheckoutManagerConfig, CheckoutPatch,
    CheckoutStatus, SearchCriteria,
};
use ubiclient::outbound::InMemoryUbiAgent;
use ubiclient::test_support::accounts::sample_account_json;
use ubiclient::test_support::checkouts::{sample_checkout, sample_details, updated_at};
use ubiclient::test_support::runtime::SteppingClock;

const FIRST_ID: i64 = 284_886_684;
const SECOND_ID: i64 = 284_886_685;

fn two_checkouts() -> Vec<Checkout> {
    vec![
        sample_checkout(
            FIRST_ID,
            Utc.with_ymd_and_hms(2022, 6, 19, 20, 56, 38)
                .single()
                .expect("valid time"),
        ),
        sample_checkout(
            SECOND_ID,
            Utc.with_ymd_and_hms(2022, 6, 20, 8, 32, 52)
                .single()
                .expect("valid time"),
        ),
    ]
}

struct Harness {
    agent: Arc<InMemoryUbiAgent>,
    manager: CheckoutManager,
}

fn harness(checkouts: Vec<Checkout>, window: usize) -> Harness {
    let clock = Arc::new(SteppingClock::fixed());
    let agent = Arc::new(InMemoryUbiAgent::new(checkouts, window, clock.clone()));
    let manager = CheckoutManager::new(agent.clone(), clock, CheckoutManagerConfig::default());
    Harness { agent, manager }
}

#[fixture]
fn store() -> Harness {
    harness(two_checkouts(), 25)
}

fn ids(checkouts: &[Checkout]) -> Vec<i64> {
    checkouts.iter().map(|checkout| checkout.id.get()).collect()
}

#[rstest]
#[tokio::test]
async fn search_without_criteria_returns_everything(store: Harness) {
    let checkouts = store.manager.search(None).await.expect("search succeeds");
    assert_eq!(ids(&checkouts), vec![FIRST_ID, SECOND_ID]);
}

#[rstest]
#[tokio::test]
async fn search_since_filters_older_checkouts(store: Harness) {
    let since = NaiveDate::from_ymd_opt(2022, 6, 20)
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .expect("valid time");
    let checkouts = store
        .manager
        .search(Some(SearchCriteria::default().with_since(since)))
        .await
        .expect("search succeeds");
    assert_eq!(ids(&checkouts), vec![SECOND_ID]);
}

#[rstest]
#[tokio::test]
async fn window_of_one_walks_every_record_one_page_at_a_time() {
    let records = (1..=26).map(|id| sample_checkout(id, updated_at(id))).collect();
    let Harness { agent, manager } = harness(records, 1);

    let checkouts = manager.search(None).await.expect("search succeeds");

    assert_eq!(ids(&checkouts), (1..=26).collect::<Vec<_>>());
    assert_eq!(agent.search_requests(), 26);
}

#[rstest]
#[tokio::test]
async fn limit_shrinks_pages_without_dropping_records() {
    let records = (1..=7).map(|id| sample_checkout(id, updated_at(id))).collect();
    let Harness { agent, manager } = harness(records, 5);

    let checkouts = manager
        .search(Some(SearchCriteria::default().with_limit(2)))
        .await
        .expect("search succeeds");

    assert_eq!(ids(&checkouts), (1..=7).collect::<Vec<_>>());
    assert_eq!(agent.search_requests(), 4);
}

#[rstest]
#[tokio::test]
async fn filters_hold_on_every_continuation_page() {
    let records = (1..=8).map(|id| sample_checkout(id, updated_at(id))).collect();
    let Harness { agent, manager } = harness(records, 2);
    let criteria = SearchCriteria::default()
        .with_since(updated_at(2).naive_utc())
        .with_until(updated_at(7).naive_utc());

    let checkouts = manager
        .search(Some(criteria))
        .await
        .expect("search succeeds");

    assert_eq!(ids(&checkouts), vec![2, 3, 4, 5, 6]);
    assert_eq!(agent.search_requests(), 3);
}

#[rstest]
#[tokio::test]
async fn glb_resumes_after_a_known_id() {
    let records = (1..=6).map(|id| sample_checkout(id, updated_at(id))).collect();
    let Harness { manager, .. } = harness(records, 2);

    let checkouts = manager
        .search(Some(SearchCriteria::default().with_glb(4)))
        .await
        .expect("search succeeds");

    assert_eq!(ids(&checkouts), vec![5, 6]);
}

#[rstest]
#[tokio::test]
async fn incremental_sync_feeds_the_latest_updated_at_back_in() {
    let records = (1..=4).map(|id| sample_checkout(id, updated_at(id))).collect();
    let Harness { manager, .. } = harness(records, 3);

    let first = manager.search(None).await.expect("initial sync");
    let cursor = first
        .iter()
        .map(Checkout::updated_at)
        .max()
        .expect("records exist");
    manager
        .add(sample_details("late-arrival", updated_at(10)))
        .await
        .expect("add succeeds");

    let delta = manager.search_since(cursor).await.expect("delta sync");

    assert_eq!(ids(&delta), vec![4, 5]);
}

#[rstest]
#[tokio::test]
async fn added_checkout_is_returned_and_searchable(store: Harness) {
    let mut details = two_checkouts()
        .into_iter()
        .next()
        .expect("fixture checkout")
        .details;
    details.guid = "new_guid".to_owned();

    let inserted = store.manager.add(details).await.expect("add succeeds");

    assert_eq!(inserted.details.guid, "new_guid");
    assert_eq!(inserted.id.get(), SECOND_ID + 1);
    let all = store.manager.search(None).await.expect("search succeeds");
    assert_eq!(all.len(), 3);
    assert!(all.iter().any(|checkout| checkout.id == inserted.id));
}

#[rstest]
#[case::existing(FIRST_ID, true)]
#[case::missing(1, false)]
#[tokio::test]
async fn get_by_id(store: Harness, #[case] id: i64, #[case] present: bool) {
    let found = store
        .manager
        .get(CheckoutId::new(id))
        .await
        .expect("get succeeds");
    assert_eq!(found.is_some(), present);
    if let Some(checkout) = found {
        assert_eq!(checkout.id.get(), id);
    }
}

#[rstest]
#[tokio::test]
async fn update_then_get_sees_the_patch(store: Harness) {
    let patch = CheckoutPatch {
        status: Some(CheckoutStatus::Cancel),
        customers_count: Some(4),
        ..CheckoutPatch::default()
    };

    let updated = store
        .manager
        .update(CheckoutId::new(SECOND_ID), patch)
        .await
        .expect("update succeeds");
    let fetched = store
        .manager
        .get(CheckoutId::new(SECOND_ID))
        .await
        .expect("get succeeds")
        .expect("checkout present");

    assert_eq!(updated, fetched);
    assert_eq!(fetched.details.status, CheckoutStatus::Cancel);
    assert_eq!(fetched.details.customers_count, 4);
}

#[rstest]
#[tokio::test]
async fn delete_removes_the_checkout(store: Harness) {
    store
        .manager
        .delete(CheckoutId::new(FIRST_ID))
        .await
        .expect("delete succeeds");

    let remaining = store.manager.search(None).await.expect("search succeeds");
    assert_eq!(ids(&remaining), vec![SECOND_ID]);
    assert_eq!(store.agent.checkouts().len(), 1);

    let again = store.manager.delete(CheckoutId::new(FIRST_ID)).await;
    assert!(again.is_err(), "deleting twice reports the missing checkout");
}

#[rstest]
#[tokio::test]
async fn account_service_reads_the_configured_account() {
    let account = serde_json::from_value(sample_account_json()).expect("sample account decodes");
    let clock = Arc::new(SteppingClock::fixed());
    let agent: Arc<dyn UbiAgent> =
        Arc::new(InMemoryUbiAgent::new(Vec::new(), 10, clock).with_account(account));

    let found = AccountService::new(agent)
        .current()
        .await
        .expect("fetch succeeds")
        .expect("account configured");

    assert_eq!(found.currency, "JPY");
}
