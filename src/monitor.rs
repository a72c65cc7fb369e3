use std::sync::Arc;

use chrono::Utc;
use metrics::counter;
use scraper::Html;
use serde::Serialize;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::detector::{Direction, PriceTransition, classify};
use crate::fetcher::PageFetcher;
use crate::models::Product;
use crate::notify::NotificationSink;
use crate::parsers::{ExtractedProduct, ParserRegistry, extract_product};
use crate::store::ProductStore;
use crate::utils::error::{AppError, Result};

/// Tallies for one reconciliation pass.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct PassSummary {
    pub products_checked: usize,
    pub fetch_failures: usize,
    pub unavailable: usize,
    pub initialized: usize,
    pub unchanged: usize,
    pub increased: usize,
    pub decreased: usize,
    pub errors: usize,
    pub alerts_sent: usize,
    pub summary_sent: bool,
}

impl PassSummary {
    /// Real price movements observed this pass.
    pub fn changes(&self) -> usize {
        self.increased + self.decreased
    }
}

/// Drives the fetch/extract/compare/record cycle over the tracked catalog.
///
/// One failing product never stops the pass: fetch failures are counted and
/// skipped, and store or sink errors for one product are logged before the
/// loop moves to the next.
pub struct PriceMonitor {
    store: Arc<dyn ProductStore>,
    sink: Arc<dyn NotificationSink>,
    fetcher: PageFetcher,
    registry: ParserRegistry,
}

impl PriceMonitor {
    pub fn new(
        store: Arc<dyn ProductStore>,
        sink: Arc<dyn NotificationSink>,
        fetcher: PageFetcher,
    ) -> Self {
        Self {
            store,
            sink,
            fetcher,
            registry: ParserRegistry::new(),
        }
    }

    /// Starts tracking a product URL.
    ///
    /// The page is fetched once up front so the record starts with real data
    /// when the site cooperates; a failed fetch or extraction still tracks
    /// the URL with sentinel values and lets the next pass fill them in.
    /// No notification is ever sent from here.
    pub async fn add_product(&self, raw_url: &str) -> Result<Product> {
        let url = validate_url(raw_url)?;
        let parser = self.registry.for_url(&url);

        let extracted = match self.fetcher.fetch(url.as_str()).await {
            Ok(markup) => {
                let doc = Html::parse_document(&markup);
                extract_product(parser, &doc)
            }
            Err(e) => {
                warn!(url = %url, error = %e, "initial fetch failed; tracking with sentinel values");
                ExtractedProduct::unknown()
            }
        };

        if self.store.find_by_url(url.as_str()).await?.is_some() {
            return Err(AppError::AlreadyTracked(url.to_string()));
        }

        let product = Product::new(url.as_str(), &extracted.name, extracted.price, parser.platform());
        self.store.insert(&product).await?;
        info!(url = %product.url, name = %product.name, price = %product.price, "product tracked");
        Ok(product)
    }

    /// One reconciliation pass over every tracked product.
    ///
    /// Sends the single "no changes" summary only when the whole pass saw
    /// zero real price movements.
    pub async fn run_pass(&self) -> Result<PassSummary> {
        let products = self.store.find_all().await?;

        let mut summary = PassSummary {
            products_checked: products.len(),
            ..PassSummary::default()
        };

        for product in &products {
            counter!("pricewatch_checks_total").increment(1);
            if let Err(e) = self.reconcile(product, &mut summary).await {
                error!(url = %product.url, error = %e, "reconciliation failed");
                summary.errors += 1;
            }
        }

        if summary.changes() == 0 {
            match self.sink.send_no_changes_summary().await {
                Ok(()) => summary.summary_sent = true,
                Err(e) => warn!(error = %e, "no-change summary delivery failed"),
            }
        }

        counter!("pricewatch_passes_total").increment(1);
        info!(
            checked = summary.products_checked,
            fetch_failures = summary.fetch_failures,
            initialized = summary.initialized,
            unchanged = summary.unchanged,
            increased = summary.increased,
            decreased = summary.decreased,
            errors = summary.errors,
            "reconciliation pass complete"
        );
        Ok(summary)
    }

    async fn reconcile(&self, product: &Product, summary: &mut PassSummary) -> Result<()> {
        let markup = match self.fetcher.fetch(&product.url).await {
            Ok(markup) => markup,
            Err(e) => {
                warn!(url = %product.url, error = %e, "fetch failed; skipped until next pass");
                counter!("pricewatch_fetch_failures_total").increment(1);
                summary.fetch_failures += 1;
                return Ok(());
            }
        };

        // Reuse the parser the product was registered with; the page may be
        // served from a mirror host but the markup dialect stays the same.
        let extracted = {
            let doc = Html::parse_document(&markup);
            let parser = self.registry.for_platform(product.platform);
            extract_product(parser, &doc)
        };

        match classify(product.price, extracted.price) {
            PriceTransition::Unavailable => {
                debug!(url = %product.url, "no usable price this cycle");
                summary.unavailable += 1;
            }
            PriceTransition::InitialPriceMissing => {
                self.store
                    .update_price_and_timestamp(&product.id, extracted.price, Utc::now())
                    .await?;
                info!(url = %product.url, price = %extracted.price, "baseline price recorded");
                summary.initialized += 1;
            }
            PriceTransition::Unchanged => {
                debug!(url = %product.url, price = %product.price, "price unchanged");
                summary.unchanged += 1;
            }
            transition @ (PriceTransition::Increased | PriceTransition::Decreased) => {
                self.record_change(product, &extracted, transition, summary).await?;
            }
        }
        Ok(())
    }

    async fn record_change(
        &self,
        product: &Product,
        extracted: &ExtractedProduct,
        transition: PriceTransition,
        summary: &mut PassSummary,
    ) -> Result<()> {
        let Some(direction) = transition.direction() else {
            return Ok(());
        };
        match direction {
            Direction::Increased => summary.increased += 1,
            Direction::Decreased => summary.decreased += 1,
        }
        counter!("pricewatch_price_changes_total", "direction" => direction.to_string())
            .increment(1);

        // Alert carries the freshly observed name even though the stored
        // record keeps its original one.
        let refreshed = Product {
            id: product.id.clone(),
            url: product.url.clone(),
            name: extracted.name.clone(),
            price: extracted.price,
            platform: product.platform,
            last_checked: Utc::now(),
        };

        match self.sink.send_price_change(&refreshed, product.price, direction).await {
            Ok(()) => {
                counter!("pricewatch_alerts_sent_total").increment(1);
                summary.alerts_sent += 1;
            }
            Err(e) => warn!(url = %product.url, error = %e, "alert delivery failed"),
        }

        self.store
            .update_price_and_timestamp(&product.id, refreshed.price, refreshed.last_checked)
            .await?;
        info!(
            url = %product.url,
            old_price = %product.price,
            new_price = %refreshed.price,
            %direction,
            "price change recorded"
        );
        Ok(())
    }
}

fn validate_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim())
        .map_err(|e| AppError::Validation(format!("invalid URL '{}': {}", raw, e)))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(AppError::Validation(format!(
            "unsupported URL scheme '{}'",
            url.scheme()
        )));
    }
    if url.host_str().is_none() {
        return Err(AppError::Validation("URL has no host".to_string()));
    }
    Ok(url)
}
