//! Type-safe price representation using decimal arithmetic.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., reais, not centavos).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Format for display with two decimal places (e.g., "R$ 199.90").
    #[must_use]
    pub fn display(&self) -> String {
        format!("{} {:.2}", self.currency_code.symbol(), self.amount)
    }
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    BRL,
    USD,
    EUR,
}

impl CurrencyCode {
    /// Currency symbol used in customer-facing text.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::BRL => "R$",
            Self::USD => "$",
            Self::EUR => "€",
        }
    }

    /// ISO 4217 code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::BRL => "BRL",
            Self::USD => "USD",
            Self::EUR => "EUR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_two_decimals() {
        let price = Price::new(Decimal::new(19990, 2), CurrencyCode::BRL);
        assert_eq!(price.display(), "R$ 199.90");
    }

    #[test]
    fn test_display_pads_whole_amounts() {
        let price = Price::new(Decimal::new(200, 0), CurrencyCode::BRL);
        assert_eq!(price.display(), "R$ 200.00");
    }

    #[test]
    fn test_display_other_currencies() {
        let price = Price::new(Decimal::new(1050, 2), CurrencyCode::USD);
        assert_eq!(price.display(), "$ 10.50");
        assert_eq!(CurrencyCode::EUR.code(), "EUR");
    }

    #[test]
    fn test_default_currency_is_brl() {
        assert_eq!(CurrencyCode::default(), CurrencyCode::BRL);
    }
}
