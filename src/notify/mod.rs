use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::detector::Direction;
use crate::models::Product;
use crate::utils::error::Result;

pub mod email;
pub mod log;

pub use email::EmailNotifier;
pub use log::LogNotifier;

/// Delivery channel for price alerts.
///
/// `product` carries the freshly observed name and new price; the previous
/// price travels separately. Implementations report failure through the
/// `Result`, but callers treat delivery as best-effort.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn send_price_change(
        &self,
        product: &Product,
        old_price: Decimal,
        direction: Direction,
    ) -> Result<()>;

    /// Single pass-wide message for a cycle in which no tracked price moved.
    async fn send_no_changes_summary(&self) -> Result<()>;
}

pub(crate) fn format_inr(price: Decimal) -> String {
    format!("₹{:.2}", price)
}
