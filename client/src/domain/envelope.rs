//! Top-level response envelopes.

use chrono::{DateTime, Utc};
use pagination::ContinuationUrl;
use serde::{Deserialize, Deserializer, Serialize};

use super::account::Account;
use super::checkout::Checkout;
use super::timestamp;

/// Envelope wrapping a single resource (`checkout` and/or `account`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceEnvelope {
    /// Server time when the response was produced.
    #[serde(with = "timestamp")]
    pub timestamp: DateTime<Utc>,
    /// Account document, when requested.
    #[serde(default)]
    pub account: Option<Account>,
    /// Checkout document, when requested and found.
    #[serde(default)]
    pub checkout: Option<Checkout>,
}

impl ResourceEnvelope {
    /// Envelope carrying only a checkout.
    pub fn with_checkout(timestamp: DateTime<Utc>, checkout: Option<Checkout>) -> Self {
        Self {
            timestamp,
            account: None,
            checkout,
        }
    }
}

/// Envelope wrapping one page of a checkout collection.
///
/// ## Invariants
/// - `next_url` is present exactly when further pages exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionEnvelope {
    /// Server time when the response was produced.
    #[serde(with = "timestamp")]
    pub timestamp: DateTime<Utc>,
    /// Suggested `since` for the next incremental sync.
    #[serde(with = "timestamp::option", default)]
    pub next_batch_since: Option<DateTime<Utc>>,
    /// Latest `updated_at` in the collection.
    #[serde(with = "timestamp::option", default)]
    pub last_updated_at: Option<DateTime<Utc>>,
    /// Continuation pointer; absent at end-of-stream.
    #[serde(
        rename = "next-url",
        default,
        deserialize_with = "blank_as_end_of_stream"
    )]
    pub next_url: Option<ContinuationUrl>,
    /// Checkouts on this page, in server order.
    #[serde(default)]
    pub checkouts: Vec<Checkout>,
}

impl CollectionEnvelope {
    /// Whether the server signalled further pages.
    pub fn has_more(&self) -> bool {
        self.next_url.is_some()
    }
}

fn blank_as_end_of_stream<'de, D>(deserializer: D) -> Result<Option<ContinuationUrl>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)?
        .filter(|raw| !raw.trim().is_empty())
        .map(|raw| ContinuationUrl::new(raw).map_err(serde::de::Error::custom))
        .transpose()
}
