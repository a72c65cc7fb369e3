use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::round_price;

/// Direction of a real price movement.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Increased,
    Decreased,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::Increased => "increased",
            Direction::Decreased => "decreased",
        })
    }
}

/// Outcome of comparing a fresh extraction against the stored price.
///
/// Checked in order: a sentinel fresh price means the page gave nothing
/// usable this cycle, and a sentinel stored price means the product is still
/// waiting for its first real read. Only after both short-circuits does the
/// three-way comparison run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PriceTransition {
    /// Fresh price is the 0.0 sentinel; nothing to compare against.
    Unavailable,
    /// Stored price is the 0.0 sentinel; the fresh value becomes the baseline.
    InitialPriceMissing,
    Increased,
    Decreased,
    Unchanged,
}

impl PriceTransition {
    pub fn direction(&self) -> Option<Direction> {
        match self {
            PriceTransition::Increased => Some(Direction::Increased),
            PriceTransition::Decreased => Some(Direction::Decreased),
            _ => None,
        }
    }

    /// Transitions that write price + last_checked back to the store.
    pub fn persists(&self) -> bool {
        matches!(
            self,
            PriceTransition::InitialPriceMissing
                | PriceTransition::Increased
                | PriceTransition::Decreased
        )
    }

    /// Transitions that alert the user about this product.
    pub fn notifies(&self) -> bool {
        self.direction().is_some()
    }
}

/// Classifies one reconciliation attempt for a product.
///
/// Both sides are normalized to two decimal places first so formatting
/// noise never reads as a change.
pub fn classify(stored: Decimal, fresh: Decimal) -> PriceTransition {
    let stored = round_price(stored);
    let fresh = round_price(fresh);

    if fresh.is_zero() {
        return PriceTransition::Unavailable;
    }
    if stored.is_zero() {
        return PriceTransition::InitialPriceMissing;
    }

    if fresh > stored {
        PriceTransition::Increased
    } else if fresh < stored {
        PriceTransition::Decreased
    } else {
        PriceTransition::Unchanged
    }
}
