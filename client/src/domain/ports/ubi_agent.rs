//! Driven port for talking to the Ubiregi API.
//!
//! The domain owns the request shape (resource paths, search targets, payload
//! types) and the response contract (envelopes) so the checkout manager stays
//! agnostic of whether a live HTTP agent or the in-memory agent is wired in.

use async_trait::async_trait;
use pagination::ContinuationUrl;

use super::define_port_error;
use crate::domain::{
    CheckoutDetails, CheckoutId, CheckoutPatch, CollectionEnvelope, ResourceEnvelope,
    SearchCriteria,
};

/// Collection path for the current account's checkouts.
pub const CHECKOUTS_PATH: &str = "accounts/current/checkouts/";

/// Path of the current account document.
pub const CURRENT_ACCOUNT_PATH: &str = "accounts/current";

/// Path of one checkout.
///
/// ```
/// use ubiclient::domain::CheckoutId;
/// use ubiclient::domain::ports::checkout_path;
///
/// assert_eq!(checkout_path(CheckoutId::new(7)), "accounts/current/checkouts/7");
/// ```
pub fn checkout_path(id: CheckoutId) -> String {
    format!("{CHECKOUTS_PATH}{id}")
}

/// What one search call should fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchTarget {
    /// First page: the collection path, filtered by the given criteria.
    Collection {
        /// Path relative to the API base.
        path: String,
        /// Filter encoded into the query string.
        criteria: SearchCriteria,
    },
    /// Later page: the server's continuation URL, followed verbatim.
    Continuation(ContinuationUrl),
}

impl SearchTarget {
    /// First page of the checkout collection.
    pub fn checkouts(criteria: SearchCriteria) -> Self {
        Self::Collection {
            path: CHECKOUTS_PATH.to_owned(),
            criteria,
        }
    }
}

define_port_error! {
    /// Errors surfaced by a Ubiregi agent.
    pub enum UbiAgentError {
        /// Network transport failed before a response arrived.
        Transport { message: String } =>
            "ubiregi transport failed: {message}" [retryable],
        /// The call exceeded the client-side timeout.
        Timeout { message: String } =>
            "ubiregi timeout: {message}" [retryable],
        /// The API rate-limited the call.
        RateLimited { status: u16, detail: String, body: String } =>
            "ubiregi rate limited request with status {status}: {detail}" [retryable],
        /// The API answered with a transient server-side or gateway failure.
        Unavailable { status: u16, detail: String, body: String } =>
            "ubiregi unavailable with status {status}: {detail}" [retryable],
        /// The API answered with any other non-success status.
        Status { status: u16, detail: String, body: String } =>
            "ubiregi responded with status {status}: {detail}",
        /// The addressed resource does not exist.
        NotFound { status: u16, detail: String, body: String } =>
            "ubiregi resource not found: {detail}",
        /// The response body failed decoding or validation.
        Decode { message: String } =>
            "ubiregi response decode failed: {message}",
        /// The agent rejected the request before sending it.
        InvalidRequest { message: String } =>
            "ubiregi request invalid: {message}",
    }
}

impl UbiAgentError {
    /// HTTP status of the failed response, when the server answered.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::RateLimited { status, .. }
            | Self::Unavailable { status, .. }
            | Self::Status { status, .. }
            | Self::NotFound { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Response body exactly as the server sent it, when the server answered.
    pub fn response_body(&self) -> Option<&str> {
        match self {
            Self::RateLimited { body, .. }
            | Self::Unavailable { body, .. }
            | Self::Status { body, .. }
            | Self::NotFound { body, .. } => Some(body),
            _ => None,
        }
    }
}

/// Capability interface over the Ubiregi checkout API.
///
/// Implemented by the reqwest-backed `UbiHttpAgent` and by the in-memory
/// agent used in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UbiAgent: Send + Sync {
    /// Create a checkout under `path`.
    async fn add(
        &self,
        path: &str,
        checkout: &CheckoutDetails,
    ) -> Result<ResourceEnvelope, UbiAgentError>;

    /// Fetch one page of a collection.
    async fn search(&self, target: &SearchTarget) -> Result<CollectionEnvelope, UbiAgentError>;

    /// Fetch a single resource.
    async fn get(&self, path: &str) -> Result<ResourceEnvelope, UbiAgentError>;

    /// Partially update the resource at `path`.
    async fn update(
        &self,
        path: &str,
        patch: &CheckoutPatch,
    ) -> Result<ResourceEnvelope, UbiAgentError>;

    /// Delete the resource at `path`.
    async fn delete(&self, path: &str) -> Result<(), UbiAgentError>;
}
