//! Ubiregi POS checkout client.
//!
//! Reads, pages through and edits checkouts of the authenticated Ubiregi
//! account. The domain ([`domain`]) owns the documents, the pagination and
//! retry policy, and the `UbiAgent` port; [`outbound`] supplies the live
//! HTTP agent and an in-memory agent for tests.

pub mod config;
pub mod domain;
pub mod outbound;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use config::{ClientSettings, SettingsError};
pub use domain::{AccountService, CheckoutManager, CheckoutManagerConfig, CheckoutManagerError};
