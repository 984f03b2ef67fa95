//! Test utilities for the client crate.
//!
//! Shared by unit tests (in `src/`) and integration tests (in `tests/`). Only
//! compiled for tests or with the `test-support` feature.

pub mod checkouts {
    //! Sample checkout documents.

    use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
    use serde_json::{Value, json};

    use crate::domain::{
        Amount, CalculationOption, Checkout, CheckoutDetails, CheckoutId, CheckoutItem,
        CheckoutPayment, CheckoutStatus, CheckoutTax, RoundingMode, TaxCalculationLevel,
    };

    fn amount(raw: &str) -> Amount {
        match Amount::parse(raw) {
            Ok(value) => value,
            Err(error) => panic!("sample amount {raw} invalid: {error}"),
        }
    }

    /// Base instant the sample timelines are laid out from.
    pub fn base_time() -> DateTime<Utc> {
        match Utc.with_ymd_and_hms(2022, 6, 19, 20, 0, 0).single() {
            Some(instant) => instant,
            None => panic!("base sample time is unambiguous"),
        }
    }

    /// `updated_at` of the sample checkout with identifier `id`: one minute
    /// apart, ascending with the identifier.
    pub fn updated_at(id: i64) -> DateTime<Utc> {
        base_time() + Duration::minutes(id)
    }

    /// Closed cash checkout for 385 yen with one item and one tax line.
    pub fn sample_details(guid: &str, updated_at: DateTime<Utc>) -> CheckoutDetails {
        let paid_at = updated_at - Duration::minutes(5);
        CheckoutDetails {
            guid: guid.to_owned(),
            device_id: "710b52d6-9d8f-11e5-9aac-af957c6aaf43".to_owned(),
            account_id: 36872,
            paid_at,
            closed_at: paid_at,
            opened_at: None,
            deleted_at: None,
            created_at: updated_at,
            updated_at,
            sales_date: NaiveDate::from_ymd_opt(2022, 6, 19).unwrap_or_default(),
            price: amount("385.0"),
            change: amount("615.0"),
            cashier_id: Some(167_226),
            status: CheckoutStatus::Close,
            customers_count: 1,
            payments: vec![CheckoutPayment {
                id: None,
                payment_type_id: 1,
                amount: amount("1000.0"),
            }],
            taxes: vec![CheckoutTax {
                id: None,
                tax_id: 1,
                taxable: amount("357.0"),
                amount: amount("28.0"),
            }],
            items: vec![CheckoutItem {
                id: None,
                menu_item_id: Some(1001),
                count: 1,
                price: amount("385.0"),
                sales: amount("385.0"),
                discount: None,
            }],
            customer_tag_ids: vec![10, 1003],
            calculation_option: CalculationOption {
                tax_rounding_mode: RoundingMode::Down,
                price_rounding_mode: RoundingMode::Plain,
                tax_calculation_level: TaxCalculationLevel::Checkout,
            },
        }
    }

    /// Stored checkout with identifier `id`.
    pub fn sample_checkout(id: i64, updated_at: DateTime<Utc>) -> Checkout {
        Checkout::new(
            CheckoutId::new(id),
            sample_details(&format!("guid-{id}"), updated_at),
        )
    }

    /// Wire form of a stored checkout as the API returns it.
    pub fn sample_checkout_json(id: i64, updated_at: &str) -> Value {
        json!({
            "id": id,
            "guid": format!("guid-{id}"),
            "device_id": "710b52d6-9d8f-11e5-9aac-af957c6aaf43",
            "account_id": 36872,
            "paid_at": "2022-06-19T16:20:20Z",
            "closed_at": "2022-06-19T16:20:20Z",
            "opened_at": null,
            "deleted_at": null,
            "created_at": updated_at,
            "updated_at": updated_at,
            "sales_date": "2022-06-19",
            "price": "385.0",
            "change": "615.0",
            "cashier_id": 167226,
            "status": "close",
            "customers_count": 1,
            "payments": [
                { "id": id * 10, "payment_type_id": 1, "amount": "1000.0" }
            ],
            "taxes": [
                { "id": id * 10, "tax_id": 1, "taxable": "357.0", "amount": "28.0" }
            ],
            "items": [
                {
                    "id": id * 10,
                    "menu_item_id": 1001,
                    "count": 1,
                    "price": "385.0",
                    "sales": "385.0",
                    "discount": "0.0"
                }
            ],
            "customer_tag_ids": [10, 1003],
            "calculation_option": {
                "tax_rounding_mode": "down",
                "price_rounding_mode": "plain",
                "tax_calculation_level": "checkout"
            }
        })
    }
}

pub mod accounts {
    //! Sample account documents.

    use serde_json::{Value, json};

    /// Wire form of `accounts/current` for a single-store yen account.
    pub fn sample_account_json() -> Value {
        json!({
            "id": 36872,
            "login": "ubiregi-sample",
            "email": "owner@example.com",
            "name": "Sample Cafe",
            "expire_at": "2030-01-01T00:00:00Z",
            "subscription": "standard",
            "currency": "JPY",
            "lang": "ja",
            "date_offset": 0,
            "timezone": "Asia/Tokyo",
            "receipt_title": "Sample Cafe",
            "receipt_footer": "Thank you",
            "receipt_logo": null,
            "stamp_tax_threshold": "50000",
            "stamp_tax_text": "収入印紙",
            "menus": [1],
            "customer_tags": [
                {
                    "id": 10,
                    "name": "Regular",
                    "position": 1,
                    "icon": null,
                    "icon_mime": "image/png"
                }
            ],
            "payment_types": [
                {
                    "id": 1,
                    "name": "現金",
                    "enabled": true,
                    "change": true,
                    "position": 1,
                    "kind": "cash",
                    "marketable": true,
                    "icon_url": null,
                    "annotations": [],
                    "restricted_by_default": false,
                    "allowed_category_ids": [],
                    "denied_category_ids": [],
                    "capped": false
                }
            ],
            "paid_inout_reasons": ["両替"],
            "cashiers": [
                {
                    "id": 167226,
                    "name": "レジ1",
                    "enabled": true,
                    "created_at": "2015-12-01T00:00:00Z",
                    "updated_at": "2015-12-01T00:00:00Z"
                }
            ],
            "price_books": [
                {
                    "id": 5,
                    "account_id": 36872,
                    "name": "Standard",
                    "tax_rate": "8.0",
                    "receipt_symbol": null,
                    "receipt_text": null,
                    "tax_type": "exclusive",
                    "position": 1,
                    "valid_since": null,
                    "valid_until": null
                }
            ],
            "parent_ids": [],
            "child_ids": [],
            "sibling_ids": [],
            "created_at": "2015-12-01T00:00:00Z",
            "updated_at": "2022-06-19T20:56:38Z",
            "setting_disabled": false,
            "menu_group_editable": true,
            "calculation_option": {
                "tax_rounding_mode": "down",
                "price_rounding_mode": "plain",
                "tax_calculation_level": "checkout"
            },
            "options": {}
        })
    }
}

pub mod runtime {
    //! Clock and retry doubles.

    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::{DateTime, Local, TimeDelta, Utc};
    use mockable::Clock;

    use super::checkouts::base_time;
    use crate::domain::{BackoffJitter, RetrySleeper};

    /// Clock that moves forward by a fixed step on every reading.
    ///
    /// A zero step gives a frozen clock.
    #[derive(Debug)]
    pub struct SteppingClock {
        now: Mutex<DateTime<Utc>>,
        step: TimeDelta,
    }

    impl SteppingClock {
        /// Clock starting at `start`, advancing `step` per reading.
        pub fn new(start: DateTime<Utc>, step: TimeDelta) -> Self {
            Self {
                now: Mutex::new(start),
                step,
            }
        }

        /// Frozen clock at the sample base time.
        pub fn fixed() -> Self {
            Self::new(base_time(), TimeDelta::zero())
        }
    }

    impl Clock for SteppingClock {
        fn local(&self) -> DateTime<Local> {
            self.utc().with_timezone(&Local)
        }

        fn utc(&self) -> DateTime<Utc> {
            let mut now = self
                .now
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            let current = *now;
            *now = current + self.step;
            current
        }
    }

    /// Sleeper that returns at once.
    #[derive(Debug, Default, Clone, Copy)]
    pub struct ImmediateSleeper;

    #[async_trait]
    impl RetrySleeper for ImmediateSleeper {
        async fn sleep(&self, _duration: Duration) {}
    }

    /// Sleeper recording every requested delay without sleeping.
    #[derive(Debug, Default)]
    pub struct RecordingSleeper {
        delays: Mutex<Vec<Duration>>,
    }

    impl RecordingSleeper {
        /// Delays requested so far.
        pub fn delays(&self) -> Vec<Duration> {
            self.delays
                .lock()
                .map(|delays| delays.clone())
                .unwrap_or_default()
        }
    }

    #[async_trait]
    impl RetrySleeper for RecordingSleeper {
        async fn sleep(&self, duration: Duration) {
            if let Ok(mut delays) = self.delays.lock() {
                delays.push(duration);
            }
        }
    }

    /// Jitter that returns the base delay unchanged.
    #[derive(Debug, Default, Clone, Copy)]
    pub struct NoJitter;

    impl BackoffJitter for NoJitter {
        fn jittered_delay(&self, base: Duration, _attempt: u32, _now: DateTime<Utc>) -> Duration {
            base
        }
    }
}
