use rust_decimal::Decimal;
use scraper::Html;

use super::ProductParser;
use crate::models::Platform;

/// Catch-all for hosts without dedicated extraction rules. It has no
/// selectors, so every extraction reports a miss and the caller falls back
/// to the sentinels.
pub struct GenericParser;

impl GenericParser {
    pub fn new() -> Self {
        Self
    }
}

impl ProductParser for GenericParser {
    fn platform(&self) -> Platform {
        Platform::Generic
    }

    fn extract_name(&self, _doc: &Html) -> Option<String> {
        None
    }

    fn extract_price(&self, _doc: &Html) -> Option<Decimal> {
        None
    }
}

impl Default for GenericParser {
    fn default() -> Self {
        Self::new()
    }
}
