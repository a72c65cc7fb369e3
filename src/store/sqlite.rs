use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{FromRow, SqlitePool};
use tracing::{info, warn};

use super::ProductStore;
use crate::config::DatabaseConfig;
use crate::models::{Platform, Product, round_price};
use crate::utils::error::{AppError, Result};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS products (
    id TEXT PRIMARY KEY,
    url TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    price TEXT NOT NULL,
    platform TEXT NOT NULL,
    last_checked TEXT NOT NULL
)
"#;

/// SQLite-backed product store.
///
/// Prices are persisted as canonical two-decimal TEXT and mapped back to
/// `Decimal` on read; the driver has no native decimal type.
pub struct SqliteProductStore {
    pool: SqlitePool,
}

#[derive(Debug, FromRow)]
struct ProductRow {
    id: String,
    url: String,
    name: String,
    price: String,
    platform: Platform,
    last_checked: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = AppError;

    fn try_from(row: ProductRow) -> Result<Product> {
        let price = Decimal::from_str(&row.price).map_err(|e| {
            AppError::Internal(format!(
                "corrupt price '{}' stored for {}: {}",
                row.price, row.url, e
            ))
        })?;

        Ok(Product {
            id: row.id,
            url: row.url,
            name: row.name,
            price,
            platform: row.platform,
            last_checked: row.last_checked,
        })
    }
}

impl SqliteProductStore {
    /// Opens the pool and bootstraps the schema.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(&config.url)?.create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout))
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> Result<()> {
        sqlx::query(SCHEMA).execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl ProductStore for SqliteProductStore {
    async fn find_by_url(&self, url: &str) -> Result<Option<Product>> {
        let row: Option<ProductRow> = sqlx::query_as(
            "SELECT id, url, name, price, platform, last_checked FROM products WHERE url = ?",
        )
        .bind(url)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Product::try_from).transpose()
    }

    async fn find_all(&self) -> Result<Vec<Product>> {
        let rows: Vec<ProductRow> = sqlx::query_as(
            "SELECT id, url, name, price, platform, last_checked FROM products ORDER BY rowid",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Product::try_from).collect()
    }

    async fn insert(&self, product: &Product) -> Result<()> {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO products (id, url, name, price, platform, last_checked) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&product.id)
        .bind(&product.url)
        .bind(&product.name)
        .bind(format!("{:.2}", round_price(product.price)))
        .bind(product.platform)
        .bind(product.last_checked)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            info!(url = %product.url, "already tracked; insert skipped");
        }
        Ok(())
    }

    async fn update_price_and_timestamp(
        &self,
        id: &str,
        price: Decimal,
        checked_at: DateTime<Utc>,
    ) -> Result<()> {
        let result = sqlx::query("UPDATE products SET price = ?, last_checked = ? WHERE id = ?")
            .bind(format!("{:.2}", round_price(price)))
            .bind(checked_at)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            warn!(id, "price update targeted a product that no longer exists");
        }
        Ok(())
    }
}
