use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::info;

use super::{NotificationSink, format_inr};
use crate::detector::Direction;
use crate::models::Product;
use crate::utils::error::Result;

/// Fallback sink used when SMTP is not configured. Alerts land in the
/// application log instead of a mailbox.
pub struct LogNotifier;

#[async_trait]
impl NotificationSink for LogNotifier {
    async fn send_price_change(
        &self,
        product: &Product,
        old_price: Decimal,
        direction: Direction,
    ) -> Result<()> {
        info!(
            name = %product.name,
            url = %product.url,
            platform = %product.platform,
            old_price = %format_inr(old_price),
            new_price = %format_inr(product.price),
            %direction,
            "price alert"
        );
        Ok(())
    }

    async fn send_no_changes_summary(&self) -> Result<()> {
        info!("all product prices remain the same");
        Ok(())
    }
}
