//! Account document served by `accounts/current`.
//!
//! Read-only from the client's perspective: the whole aggregate (currency,
//! locale, payment types, cashiers, price books, tag catalogue) arrives as one
//! document and is never written back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::amount::Amount;
use super::timestamp;

/// Customer tag available at the register.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerTag {
    /// Tag identifier.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Sort position.
    #[serde(default)]
    pub position: Option<i32>,
    /// Base64-encoded icon.
    #[serde(default)]
    pub icon: Option<String>,
    /// Icon MIME type.
    pub icon_mime: String,
}

/// Payment type (cash, card, voucher, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentType {
    /// Payment type identifier.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Whether the register offers it.
    pub enabled: bool,
    /// Whether change can be given.
    pub change: bool,
    /// Sort position.
    pub position: i32,
    /// Kind, e.g. `cash`.
    pub kind: String,
    /// Whether it counts as a sale.
    pub marketable: bool,
    /// Icon URL.
    #[serde(default)]
    pub icon_url: Option<String>,
    /// Free-form annotations.
    #[serde(default)]
    pub annotations: Vec<Map<String, Value>>,
    /// Whether category restrictions apply by default.
    pub restricted_by_default: bool,
    /// Explicitly allowed categories.
    #[serde(default)]
    pub allowed_category_ids: Vec<i64>,
    /// Explicitly denied categories.
    #[serde(default)]
    pub denied_category_ids: Vec<i64>,
    /// Whether payments are capped at the checkout total.
    pub capped: bool,
}

/// Cashier registered on the account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cashier {
    /// Cashier identifier.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Whether the cashier can log in.
    pub enabled: bool,
    /// Creation time.
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

/// Price book (menu pricing and tax context).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBook {
    /// Price book identifier.
    pub id: i64,
    /// Owning account.
    pub account_id: i64,
    /// Display name, e.g. `Take Out`.
    pub name: String,
    /// Tax rate as a decimal string.
    pub tax_rate: Amount,
    /// Receipt marker for reduced-rate items.
    #[serde(default)]
    pub receipt_symbol: Option<String>,
    /// Receipt legend for the marker.
    #[serde(default)]
    pub receipt_text: Option<String>,
    /// Tax type.
    #[serde(default)]
    pub tax_type: Option<String>,
    /// Sort position.
    pub position: i32,
    /// First valid day as sent (`2019/10/01`).
    #[serde(default)]
    pub valid_since: Option<String>,
    /// Last valid day as sent.
    #[serde(default)]
    pub valid_until: Option<String>,
}

/// Current account aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Account identifier.
    pub id: i64,
    /// Login name.
    pub login: String,
    /// Contact email.
    pub email: String,
    /// Shop name.
    pub name: String,
    /// Subscription expiry.
    #[serde(with = "timestamp")]
    pub expire_at: DateTime<Utc>,
    /// Subscription plan, e.g. `trial`.
    pub subscription: String,
    /// ISO currency code.
    pub currency: String,
    /// UI language.
    pub lang: String,
    /// Business day rollover hour.
    pub date_offset: i32,
    /// IANA timezone name.
    pub timezone: String,
    /// Receipt header.
    pub receipt_title: String,
    /// Receipt footer.
    pub receipt_footer: String,
    /// Receipt logo.
    #[serde(default)]
    pub receipt_logo: Option<String>,
    /// Stamp tax threshold.
    pub stamp_tax_threshold: Amount,
    /// Stamp tax legend.
    pub stamp_tax_text: String,
    /// Menu identifiers.
    #[serde(default)]
    pub menus: Vec<i64>,
    /// Customer tag catalogue.
    #[serde(default)]
    pub customer_tags: Vec<CustomerTag>,
    /// Payment types.
    #[serde(default)]
    pub payment_types: Vec<PaymentType>,
    /// Cash in/out reasons.
    #[serde(default)]
    pub paid_inout_reasons: Vec<String>,
    /// Cashiers.
    #[serde(default)]
    pub cashiers: Vec<Cashier>,
    /// Price books.
    #[serde(default)]
    pub price_books: Vec<PriceBook>,
    /// Parent accounts.
    #[serde(default)]
    pub parent_ids: Vec<i64>,
    /// Child accounts.
    #[serde(default)]
    pub child_ids: Vec<i64>,
    /// Sibling accounts.
    #[serde(default)]
    pub sibling_ids: Vec<i64>,
    /// Creation time.
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
    /// Whether settings are locked.
    pub setting_disabled: bool,
    /// Whether menu groups may be edited.
    pub menu_group_editable: bool,
    /// Account-level calculation options.
    #[serde(default)]
    pub calculation_option: Map<String, Value>,
    /// Miscellaneous options.
    #[serde(default)]
    pub options: Map<String, Value>,
}
