use rust_decimal::Decimal;
use scraper::Html;
use tracing::warn;

use super::{ProductParser, SelectorChain};
use crate::models::Platform;

/// Flipkart product pages.
///
/// Flipkart rotates its obfuscated class names between frontend releases,
/// so both chains keep the older generation of selectors behind the current
/// one, with a bare `h1` as the last resort for names.
pub struct FlipkartParser {
    name_rules: SelectorChain,
    price_rules: SelectorChain,
}

impl FlipkartParser {
    pub fn new() -> Self {
        Self {
            name_rules: SelectorChain::new(&["span.VU-ZEz", "h1._6EBuvT span", "h1"]),
            price_rules: SelectorChain::new(&[
                "div.Nx9bqj",
                "div._30jeq3._16Jk6d",
                "span._30jeq3",
            ]),
        }
    }
}

impl ProductParser for FlipkartParser {
    fn platform(&self) -> Platform {
        Platform::Flipkart
    }

    fn extract_name(&self, doc: &Html) -> Option<String> {
        let name = self.name_rules.first_text(doc);
        if name.is_none() {
            warn!("product title not found; Flipkart may have changed its markup");
        }
        name
    }

    fn extract_price(&self, doc: &Html) -> Option<Decimal> {
        let price = self.price_rules.first_price(doc);
        if price.is_none() {
            warn!("price not found; Flipkart may have changed its markup");
        }
        price
    }
}

impl Default for FlipkartParser {
    fn default() -> Self {
        Self::new()
    }
}
