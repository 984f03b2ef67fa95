//! Filter parameters for checkout collection searches.
//!
//! The server filters a collection as
//! `since <= updated_at < until && glb < id`, with `limit` capping each page.
//! [`SearchCriteria`] encodes those parameters for the wire and, for the
//! in-memory agent, evaluates the same filter locally.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone};

use super::checkout::{Checkout, CheckoutId};

const WIRE_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Search filter for `accounts/current/checkouts/`.
///
/// Timestamps are wall-clock values. The wire format always appends `Z`, so a
/// timestamp built from an offset-aware value keeps its local clock reading
/// and drops the offset; this matches what the API has always been sent.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use ubiclient::domain::SearchCriteria;
///
/// let since = NaiveDate::from_ymd_opt(2022, 6, 20)
///     .and_then(|day| day.and_hms_opt(8, 32, 52))
///     .unwrap();
/// let criteria = SearchCriteria::default().with_since(since).with_limit(50);
/// let query = criteria.to_query_string();
/// assert_eq!(query.get("since").map(String::as_str), Some("2022-06-20T08:32:52Z"));
/// assert_eq!(query.get("limit").map(String::as_str), Some("50"));
/// assert_eq!(query.len(), 2);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchCriteria {
    since: Option<NaiveDateTime>,
    until: Option<NaiveDateTime>,
    limit: Option<u32>,
    glb: Option<i64>,
}

impl SearchCriteria {
    /// Criteria used when a caller supplies none: everything since 1900.
    pub fn default_window() -> Self {
        let epoch = NaiveDate::from_ymd_opt(1900, 1, 1)
            .and_then(|day| day.and_hms_opt(0, 0, 0))
            .unwrap_or(NaiveDateTime::MIN);
        Self::default().with_since(epoch)
    }

    /// Inclusive lower bound on `updated_at`.
    pub fn with_since(mut self, since: NaiveDateTime) -> Self {
        self.since = Some(since);
        self
    }

    /// Exclusive upper bound on `updated_at`.
    pub fn with_until(mut self, until: NaiveDateTime) -> Self {
        self.until = Some(until);
        self
    }

    /// Inclusive lower bound taken from an offset-aware timestamp's wall clock.
    pub fn with_since_local<Tz: TimeZone>(self, since: &DateTime<Tz>) -> Self {
        self.with_since(since.naive_local())
    }

    /// Page size cap.
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Exclusive lower bound on checkout id.
    pub fn with_glb(mut self, glb: i64) -> Self {
        self.glb = Some(glb);
        self
    }

    /// Inclusive lower bound on `updated_at`, if set.
    pub fn since(&self) -> Option<NaiveDateTime> {
        self.since
    }

    /// Exclusive upper bound on `updated_at`, if set.
    pub fn until(&self) -> Option<NaiveDateTime> {
        self.until
    }

    /// Page size cap, if set.
    pub fn limit(&self) -> Option<u32> {
        self.limit
    }

    /// Exclusive lower bound on checkout id, if set.
    pub fn glb(&self) -> Option<i64> {
        self.glb
    }

    /// Encode the set parameters as query-string pairs.
    ///
    /// Unset parameters are omitted; an empty criteria yields an empty map.
    pub fn to_query_string(&self) -> BTreeMap<&'static str, String> {
        let mut query = BTreeMap::new();
        if let Some(since) = self.since {
            query.insert("since", format_wire_timestamp(since));
        }
        if let Some(until) = self.until {
            query.insert("until", format_wire_timestamp(until));
        }
        if let Some(limit) = self.limit {
            query.insert("limit", limit.to_string());
        }
        if let Some(glb) = self.glb {
            query.insert("glb", glb.to_string());
        }
        query
    }

    /// Evaluate the server-side filter against one checkout.
    ///
    /// `limit` is a page-size cap rather than a per-record predicate and is
    /// not considered here.
    pub fn meets(&self, checkout: &Checkout) -> bool {
        let updated_at = checkout.updated_at().naive_utc();
        let after_since = self.since.is_none_or(|since| updated_at >= since);
        let before_until = self.until.is_none_or(|until| updated_at < until);
        let above_glb = self
            .glb
            .is_none_or(|glb| checkout.id > CheckoutId::new(glb));
        after_since && before_until && above_glb
    }
}

fn format_wire_timestamp(value: NaiveDateTime) -> String {
    value.format(WIRE_TIMESTAMP_FORMAT).to_string()
}
