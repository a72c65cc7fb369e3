use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::models::{Platform, UNKNOWN_PRODUCT_NAME, round_price};

pub mod amazon;
pub mod flipkart;
pub mod generic;

pub use amazon::AmazonParser;
pub use flipkart::FlipkartParser;
pub use generic::GenericParser;

/// Site-specific extraction capability.
///
/// Implementations are pure transforms over a parsed document: `None` means
/// no rule matched, and the caller substitutes the sentinels. Logging a
/// drift warning on a full-chain miss is the only side effect.
pub trait ProductParser: Send + Sync {
    fn platform(&self) -> Platform;
    fn extract_name(&self, doc: &Html) -> Option<String>;
    fn extract_price(&self, doc: &Html) -> Option<Decimal>;
}

/// Result of one extraction with sentinels already substituted.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedProduct {
    pub name: String,
    pub price: Decimal,
}

impl ExtractedProduct {
    pub fn unknown() -> Self {
        Self {
            name: UNKNOWN_PRODUCT_NAME.to_string(),
            price: Decimal::ZERO,
        }
    }
}

/// Runs both extractions over a document, filling in the sentinels for
/// whatever missed.
pub fn extract_product(parser: &dyn ProductParser, doc: &Html) -> ExtractedProduct {
    ExtractedProduct {
        name: parser
            .extract_name(doc)
            .unwrap_or_else(|| UNKNOWN_PRODUCT_NAME.to_string()),
        price: parser.extract_price(doc).unwrap_or(Decimal::ZERO),
    }
}

/// Ordered fallback rules over a document; the first rule yielding a usable
/// value wins and the rest are never consulted.
pub(crate) struct SelectorChain {
    selectors: Vec<Selector>,
}

impl SelectorChain {
    /// Chains are built from fixed literals at startup; a malformed literal
    /// is a programming error.
    pub(crate) fn new(selectors: &[&str]) -> Self {
        Self {
            selectors: selectors
                .iter()
                .map(|s| Selector::parse(s).expect("selector literal must parse"))
                .collect(),
        }
    }

    /// First rule producing non-empty text.
    pub(crate) fn first_text(&self, doc: &Html) -> Option<String> {
        self.selectors.iter().find_map(|selector| {
            doc.select(selector)
                .next()
                .map(element_text)
                .filter(|text| !text.is_empty())
        })
    }

    /// First rule whose text parses as a price.
    pub(crate) fn first_price(&self, doc: &Html) -> Option<Decimal> {
        self.selectors.iter().find_map(|selector| {
            doc.select(selector)
                .next()
                .and_then(|element| parse_price_text(&element_text(element)))
        })
    }
}

pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<Vec<_>>().join(" ").trim().to_string()
}

static PRICE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)?").expect("price pattern must parse"));

/// Strips currency symbols and group separators, then parses the first
/// decimal number in the text; anything around the number is ignored.
pub(crate) fn parse_price_text(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, '₹' | '$' | '€' | '£' | '¥' | ','))
        .collect();

    let matched = PRICE_PATTERN.find(&cleaned)?;
    Decimal::from_str(matched.as_str()).ok().map(round_price)
}

/// Owns one parser per site variant and selects by URL host or by the
/// platform tag recorded on a stored product.
pub struct ParserRegistry {
    amazon: AmazonParser,
    flipkart: FlipkartParser,
    generic: GenericParser,
}

impl ParserRegistry {
    pub fn new() -> Self {
        Self {
            amazon: AmazonParser::new(),
            flipkart: FlipkartParser::new(),
            generic: GenericParser::new(),
        }
    }

    pub fn for_url(&self, url: &Url) -> &dyn ProductParser {
        self.for_platform(Platform::from_url(url))
    }

    pub fn for_platform(&self, platform: Platform) -> &dyn ProductParser {
        match platform {
            Platform::Amazon => &self.amazon,
            Platform::Flipkart => &self.flipkart,
            Platform::Generic => &self.generic,
        }
    }
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::new()
    }
}
