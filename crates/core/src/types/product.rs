//! The product catalog record.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::price::{CurrencyCode, Price};

/// One product in the catalog.
///
/// Immutable after load; a product's identity is its position in the loaded
/// catalog sequence. The catalog file stores prices as plain decimal amounts
/// in BRL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub title: String,
    pub description: String,
    /// Amount in BRL, as stored in the catalog file.
    pub price: Decimal,
    /// Image reference (URL or asset path).
    pub image: String,
}

impl Product {
    /// The product's price formatted for display (e.g., "R$ 199.90").
    #[must_use]
    pub fn display_price(&self) -> String {
        Price::new(self.price, CurrencyCode::BRL).display()
    }
}
