//! Common types used across the platform

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// VAT multiplier (18%)
pub const VAT_MULTIPLIER: Decimal = Decimal::from_parts(118, 0, 0, false, 2);

/// Default profit target for a new quote, in whole percent
pub const DEFAULT_PROFIT_TARGET: Decimal = Decimal::from_parts(36, 0, 0, false, 0);

/// Result of persisting a quote to the record store
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SaveOutcome {
    pub quote_record_id: String,
    /// Record ids of the saved options, in option order
    pub option_ids: Vec<String>,
}

/// Catalog list envelope returned by the catalog endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse<T> {
    pub success: bool,
    pub data: Vec<T>,
    pub count: usize,
}

impl<T> ListResponse<T> {
    pub fn new(data: Vec<T>) -> Self {
        Self {
            success: true,
            count: data.len(),
            data,
        }
    }
}

/// Sort order for the catalog sidebar
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum SortOrder {
    #[default]
    All,
    PriceHighToLow,
    PriceLowToHigh,
}

impl SortOrder {
    pub fn label(&self) -> &'static str {
        match self {
            SortOrder::All => "הכל",
            SortOrder::PriceHighToLow => "מחיר - מהיקר לזול",
            SortOrder::PriceLowToHigh => "מחיר - מהזול ליקר",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "priceHighToLow" => SortOrder::PriceHighToLow,
            "priceLowToHigh" => SortOrder::PriceLowToHigh,
            _ => SortOrder::All,
        }
    }
}
