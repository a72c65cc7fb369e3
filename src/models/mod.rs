use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

pub mod product;

// Re-exports for convenience
pub use product::*;

/// Display name used when no extraction rule matched the page markup.
pub const UNKNOWN_PRODUCT_NAME: &str = "Unknown Product";

// Site variants with dedicated extraction rules; anything else is Generic.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "TEXT")]
pub enum Platform {
    #[sqlx(rename = "amazon")]
    Amazon,
    #[sqlx(rename = "flipkart")]
    Flipkart,
    #[sqlx(rename = "generic")]
    Generic,
}

impl Platform {
    /// Classifies a host by case-insensitive substring match.
    pub fn from_host(host: &str) -> Self {
        let host = host.to_ascii_lowercase();
        if host.contains("amazon") {
            Platform::Amazon
        } else if host.contains("flipkart") {
            Platform::Flipkart
        } else {
            Platform::Generic
        }
    }

    pub fn from_url(url: &Url) -> Self {
        url.host_str().map(Self::from_host).unwrap_or(Platform::Generic)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Platform::Amazon => "Amazon",
            Platform::Flipkart => "Flipkart",
            Platform::Generic => "Generic",
        })
    }
}

/// Normalizes a price to two decimal places before storage or comparison.
pub fn round_price(price: Decimal) -> Decimal {
    price.round_dp(2)
}

// Helper function to generate UUIDs in the format expected by the database
pub fn generate_id() -> String {
    Uuid::new_v4().simple().to_string()
}
