use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::models::Product;
use crate::utils::error::Result;

pub mod sqlite;

pub use sqlite::SqliteProductStore;

/// Persistence boundary for tracked products, keyed by URL uniqueness.
///
/// The monitor and the web surface share one implementation through
/// `Arc<dyn ProductStore>`; tests substitute fakes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Looks a product up by its exact URL.
    async fn find_by_url(&self, url: &str) -> Result<Option<Product>>;

    /// Every tracked product, in insertion order.
    async fn find_all(&self) -> Result<Vec<Product>>;

    /// Inserts a new product. An already-tracked URL is a logged no-op at
    /// this layer.
    async fn insert(&self, product: &Product) -> Result<()>;

    /// Writes a freshly observed price and bumps `last_checked`. The name
    /// written at add time is left alone.
    async fn update_price_and_timestamp(
        &self,
        id: &str,
        price: Decimal,
        checked_at: DateTime<Utc>,
    ) -> Result<()>;
}
