//! Checkout (sales transaction) documents.
//!
//! Purpose: typed, validated snapshots of checkouts as served by
//! `accounts/current/checkouts/`. The client receives these, validates them at
//! the transport boundary and may send a [`CheckoutPatch`]; it never edits the
//! payment, tax or item breakdown of an existing checkout.
//!
//! Serialisation contract: field names match the Ubiregi wire format; money
//! travels as decimal strings ([`Amount`]); timestamps are normalised to UTC
//! (see [`super::timestamp`]). Unknown wire fields are ignored.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::amount::Amount;
use super::timestamp;

/// Server-assigned checkout identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CheckoutId(i64);

impl CheckoutId {
    /// Wrap a raw identifier.
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Raw identifier.
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl From<i64> for CheckoutId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl fmt::Display for CheckoutId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of a checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStatus {
    /// Still being rung up on a device.
    Open,
    /// Paid and closed.
    Close,
    /// Voided after closing.
    Cancel,
}

/// Rounding applied to computed prices or taxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingMode {
    /// Half-up rounding.
    Plain,
    /// Truncate towards zero.
    Down,
    /// Round away from zero.
    Up,
}

/// Granularity at which tax is calculated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxCalculationLevel {
    /// Tax computed once over the checkout total.
    Checkout,
    /// Tax computed per line item.
    Item,
}

/// Calculation options in force when the checkout was rung up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationOption {
    /// Tax rounding, e.g. `down`.
    pub tax_rounding_mode: RoundingMode,
    /// Price rounding, e.g. `plain`.
    pub price_rounding_mode: RoundingMode,
    /// Tax calculation level, e.g. `checkout`.
    pub tax_calculation_level: TaxCalculationLevel,
}

/// One tender applied to a checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutPayment {
    /// Payment identifier, absent on create payloads.
    #[serde(default)]
    pub id: Option<i64>,
    /// Account payment type (cash, card, ...).
    pub payment_type_id: i64,
    /// Tendered amount.
    pub amount: Amount,
}

/// One tax line of a checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutTax {
    /// Tax line identifier, absent on create payloads.
    #[serde(default)]
    pub id: Option<i64>,
    /// Account tax definition.
    pub tax_id: i64,
    /// Taxable base.
    pub taxable: Amount,
    /// Computed tax.
    pub amount: Amount,
}

/// One sold line of a checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutItem {
    /// Item line identifier, absent on create payloads.
    #[serde(default)]
    pub id: Option<i64>,
    /// Catalogue menu item, absent for ad-hoc lines.
    #[serde(default)]
    pub menu_item_id: Option<i64>,
    /// Units sold.
    pub count: i32,
    /// Unit price.
    pub price: Amount,
    /// Line total after discounts.
    pub sales: Amount,
    /// Line discount.
    #[serde(default)]
    pub discount: Option<Amount>,
}

/// Checkout body without the server-assigned identifier.
///
/// Used as the create payload and embedded (flattened) in [`Checkout`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutDetails {
    /// Globally unique transaction guid.
    pub guid: String,
    /// Device that rang up the checkout.
    pub device_id: String,
    /// Owning account.
    pub account_id: i64,
    /// Payment time.
    #[serde(with = "timestamp")]
    pub paid_at: DateTime<Utc>,
    /// Closing time.
    #[serde(with = "timestamp")]
    pub closed_at: DateTime<Utc>,
    /// Opening time, when tracked.
    #[serde(with = "timestamp::option", default)]
    pub opened_at: Option<DateTime<Utc>>,
    /// Deletion time for voided records.
    #[serde(with = "timestamp::option", default)]
    pub deleted_at: Option<DateTime<Utc>>,
    /// Server creation time.
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    /// Last server modification; the incremental sync cursor.
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
    /// Business day the sale is booked against.
    pub sales_date: NaiveDate,
    /// Checkout total.
    pub price: Amount,
    /// Change handed back.
    pub change: Amount,
    /// Cashier on duty.
    #[serde(default)]
    pub cashier_id: Option<i64>,
    /// Lifecycle state.
    pub status: CheckoutStatus,
    /// Number of customers served.
    pub customers_count: u32,
    /// Tenders.
    #[serde(default)]
    pub payments: Vec<CheckoutPayment>,
    /// Tax lines.
    #[serde(default)]
    pub taxes: Vec<CheckoutTax>,
    /// Sold lines.
    #[serde(default)]
    pub items: Vec<CheckoutItem>,
    /// Customer tags attached at the register.
    #[serde(default)]
    pub customer_tag_ids: Vec<i64>,
    /// Calculation options.
    pub calculation_option: CalculationOption,
}

/// Checkout as stored server-side.
///
/// # Examples
/// ```
/// use ubiclient::domain::Checkout;
///
/// let json = r#"{
///     "id": 284886684,
///     "guid": "8928309238-d987aerkeh-9847tdfkzhg4",
///     "device_id": "710b52d6-9d8f-11e5-9aac-af957c6aaf43",
///     "account_id": 1,
///     "paid_at": "2011-12-24T16:20:20Z",
///     "closed_at": "2022-06-19T16:20:20Z",
///     "deleted_at": null,
///     "created_at": "2022-06-19T20:56:38Z",
///     "updated_at": "2022-06-19T20:56:38Z",
///     "opened_at": null,
///     "sales_date": "2011-12-25",
///     "price": "385.0",
///     "change": "4000.0",
///     "cashier_id": 167226,
///     "status": "close",
///     "customers_count": 0,
///     "payments": [],
///     "taxes": [],
///     "items": [],
///     "customer_tag_ids": [10, 1003],
///     "calculation_option": {
///         "tax_rounding_mode": "down",
///         "price_rounding_mode": "plain",
///         "tax_calculation_level": "checkout"
///     }
/// }"#;
/// let checkout: Checkout = serde_json::from_str(json).unwrap();
/// assert_eq!(checkout.id.get(), 284886684);
/// assert_eq!(checkout.details.price.as_str(), "385.0");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkout {
    /// Server-assigned identifier.
    pub id: CheckoutId,
    /// Everything else.
    #[serde(flatten)]
    pub details: CheckoutDetails,
}

impl Checkout {
    /// Pair an identifier with a checkout body.
    pub fn new(id: CheckoutId, details: CheckoutDetails) -> Self {
        Self { id, details }
    }

    /// Incremental sync cursor.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.details.updated_at
    }
}

/// Partial update for an existing checkout.
///
/// Only fields that are `Some` are serialised, so the server leaves every
/// other field untouched. Payments, taxes and items are not patchable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutPatch {
    /// New lifecycle state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<CheckoutStatus>,
    /// Corrected payment time.
    #[serde(
        default,
        with = "timestamp::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub paid_at: Option<DateTime<Utc>>,
    /// Corrected closing time.
    #[serde(
        default,
        with = "timestamp::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub closed_at: Option<DateTime<Utc>>,
    /// Soft-delete time.
    #[serde(
        default,
        with = "timestamp::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub deleted_at: Option<DateTime<Utc>>,
    /// Corrected business day.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sales_date: Option<NaiveDate>,
    /// Reassigned cashier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cashier_id: Option<i64>,
    /// Corrected customer count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customers_count: Option<u32>,
    /// Replacement customer tags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_tag_ids: Option<Vec<i64>>,
}

impl CheckoutPatch {
    /// Whether the patch would change anything.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Apply the set fields to a checkout body.
    pub fn apply_to(&self, details: &mut CheckoutDetails) {
        if let Some(status) = self.status {
            details.status = status;
        }
        if let Some(paid_at) = self.paid_at {
            details.paid_at = paid_at;
        }
        if let Some(closed_at) = self.closed_at {
            details.closed_at = closed_at;
        }
        if self.deleted_at.is_some() {
            details.deleted_at = self.deleted_at;
        }
        if let Some(sales_date) = self.sales_date {
            details.sales_date = sales_date;
        }
        if self.cashier_id.is_some() {
            details.cashier_id = self.cashier_id;
        }
        if let Some(customers_count) = self.customers_count {
            details.customers_count = customers_count;
        }
        if let Some(tags) = &self.customer_tag_ids {
            details.customer_tag_ids.clone_from(tags);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::checkouts::sample_details;
    use chrono::TimeZone;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn patch_serialises_only_set_fields() {
        let patch = CheckoutPatch {
            status: Some(CheckoutStatus::Cancel),
            customers_count: Some(3),
            ..CheckoutPatch::default()
        };
        let value = serde_json::to_value(&patch).expect("patch serialises");
        assert_eq!(value, json!({ "status": "cancel", "customers_count": 3 }));
    }

    #[rstest]
    fn empty_patch_is_detected() {
        assert!(CheckoutPatch::default().is_empty());
        let patch = CheckoutPatch {
            cashier_id: Some(1),
            ..CheckoutPatch::default()
        };
        assert!(!patch.is_empty());
    }

    #[rstest]
    fn patch_application_leaves_unset_fields_alone() {
        let mut details = sample_details("guid-1", Utc.with_ymd_and_hms(2022, 6, 19, 20, 56, 38).unwrap());
        let original = details.clone();
        let patch = CheckoutPatch {
            status: Some(CheckoutStatus::Cancel),
            customer_tag_ids: Some(vec![7]),
            ..CheckoutPatch::default()
        };

        patch.apply_to(&mut details);

        assert_eq!(details.status, CheckoutStatus::Cancel);
        assert_eq!(details.customer_tag_ids, vec![7]);
        assert_eq!(details.price, original.price);
        assert_eq!(details.updated_at, original.updated_at);
        assert_eq!(details.payments, original.payments);
    }

    #[rstest]
    fn checkout_serialises_flat_with_zulu_timestamps() {
        let details = sample_details("guid-2", Utc.with_ymd_and_hms(2022, 6, 19, 21, 34, 20).unwrap());
        let checkout = Checkout::new(CheckoutId::new(42), details);

        let value = serde_json::to_value(&checkout).expect("checkout serialises");

        assert_eq!(value["id"], json!(42));
        assert_eq!(value["guid"], json!("guid-2"));
        assert_eq!(value["updated_at"], json!("2022-06-19T21:34:20Z"));
        assert_eq!(value["deleted_at"], json!(null));
        assert_eq!(value["calculation_option"]["tax_rounding_mode"], json!("down"));
    }

    #[rstest]
    #[case::unknown_status("status", json!("refunded"))]
    #[case::float_price("price", json!(385.0))]
    #[case::bad_timestamp("updated_at", json!("not-a-time"))]
    fn invalid_fields_fail_validation(#[case] field: &str, #[case] value: serde_json::Value) {
        let details = sample_details("guid-3", Utc.with_ymd_and_hms(2022, 6, 19, 21, 0, 0).unwrap());
        let mut raw = serde_json::to_value(Checkout::new(CheckoutId::new(1), details))
            .expect("checkout serialises");
        raw[field] = value;

        let parsed: Result<Checkout, _> = serde_json::from_value(raw);
        assert!(parsed.is_err(), "{field} should be rejected");
    }

    #[rstest]
    fn missing_required_field_fails_validation() {
        let details = sample_details("guid-4", Utc.with_ymd_and_hms(2022, 6, 19, 21, 0, 0).unwrap());
        let mut raw = serde_json::to_value(Checkout::new(CheckoutId::new(1), details))
            .expect("checkout serialises");
        raw.as_object_mut().expect("object").remove("guid");

        let parsed: Result<Checkout, _> = serde_json::from_value(raw);
        assert!(parsed.is_err(), "missing guid must not be defaulted");
    }
}
