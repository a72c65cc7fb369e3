use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{Platform, generate_id, round_price};

/// A tracked product, keyed by its page URL.
///
/// `price` holds the last observed price; `Decimal::ZERO` means no real
/// price has been read yet. `last_checked` is refreshed on every
/// reconciliation touch that writes a price.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: String,
    pub url: String,
    pub name: String,
    pub price: Decimal,
    pub platform: Platform,
    pub last_checked: DateTime<Utc>,
}

impl Product {
    pub fn new(url: &str, name: &str, price: Decimal, platform: Platform) -> Self {
        Self {
            id: generate_id(),
            url: url.to_string(),
            name: name.to_string(),
            price: round_price(price),
            platform,
            last_checked: Utc::now(),
        }
    }

    /// True once a real price has been observed for this product.
    pub fn has_observed_price(&self) -> bool {
        !self.price.is_zero()
    }
}
