//! Domain primitives, ports and services.
//!
//! Purpose: typed Ubiregi documents (checkouts, accounts, envelopes), the
//! search window used to page through checkouts, the ports separating the
//! domain from transport adapters, and the services driving those ports.
//! Serialisation contracts (serde) are documented on each type.
//!
//! Public surface:
//! - [`Checkout`], [`CheckoutDetails`], [`CheckoutPatch`]: checkout documents.
//! - [`Account`]: the authenticated account document.
//! - [`SearchCriteria`]: time window and cursor for checkout searches.
//! - [`CheckoutManager`]: pagination, retries and single-record lookups.
//! - [`AccountService`]: reads `accounts/current`.

pub mod account;
pub mod account_service;
pub mod amount;
pub mod checkout;
pub mod checkout_manager;
pub mod envelope;
pub mod error;
pub mod ports;
pub mod search_criteria;
pub mod timestamp;

pub use self::account::{Account, Cashier, CustomerTag, PaymentType, PriceBook};
pub use self::account_service::AccountService;
pub use self::amount::{Amount, AmountValidationError};
pub use self::checkout::{
    CalculationOption, Checkout, CheckoutDetails, CheckoutId, CheckoutItem, CheckoutPatch,
    CheckoutPayment, CheckoutStatus, CheckoutTax, RoundingMode, TaxCalculationLevel,
};
pub use self::checkout_manager::{
    AttemptJitter, BackoffJitter, CheckoutManager, CheckoutManagerConfig, RetryRuntime,
    RetrySleeper, TokioSleeper,
};
pub use self::envelope::{CollectionEnvelope, ResourceEnvelope};
pub use self::error::CheckoutManagerError;
pub use self::search_criteria::SearchCriteria;
pub use self::timestamp::{TimestampError, format_timestamp, parse_timestamp};
