use rust_decimal::Decimal;
use scraper::{Html, Selector};
use tracing::warn;

use super::{ProductParser, SelectorChain, element_text, parse_price_text};
use crate::models::Platform;

/// Amazon product pages.
///
/// The visible price is split across a whole and a fraction span; the
/// hidden `a-offscreen` span carries the complete price and serves as the
/// fallback when the split spans are absent.
pub struct AmazonParser {
    name_rules: SelectorChain,
    price_whole: Selector,
    price_fraction: Selector,
    price_fallback: SelectorChain,
}

impl AmazonParser {
    pub fn new() -> Self {
        Self {
            name_rules: SelectorChain::new(&["span#productTitle"]),
            price_whole: Selector::parse("span.a-price-whole").expect("selector literal must parse"),
            price_fraction: Selector::parse("span.a-price-fraction")
                .expect("selector literal must parse"),
            price_fallback: SelectorChain::new(&["span.a-offscreen"]),
        }
    }

    /// Joins the whole and fraction spans as `whole.fraction`. The whole
    /// span sometimes renders with a trailing dot of its own.
    fn combined_price(&self, doc: &Html) -> Option<Decimal> {
        let whole = doc.select(&self.price_whole).next().map(element_text)?;
        let fraction = doc.select(&self.price_fraction).next().map(element_text)?;

        let whole = whole.replace(',', "");
        let whole = whole.trim_end_matches('.');
        parse_price_text(&format!("{whole}.{fraction}"))
    }
}

impl ProductParser for AmazonParser {
    fn platform(&self) -> Platform {
        Platform::Amazon
    }

    fn extract_name(&self, doc: &Html) -> Option<String> {
        let name = self.name_rules.first_text(doc);
        if name.is_none() {
            warn!("product title not found; Amazon may have changed its markup");
        }
        name
    }

    fn extract_price(&self, doc: &Html) -> Option<Decimal> {
        let price = self
            .combined_price(doc)
            .or_else(|| self.price_fallback.first_price(doc));
        if price.is_none() {
            warn!("price not found; Amazon may have changed its markup");
        }
        price
    }
}

impl Default for AmazonParser {
    fn default() -> Self {
        Self::new()
    }
}
