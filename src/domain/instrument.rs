use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

/// Hard floor below which a price is never allowed to drop.
pub const PRICE_FLOOR: Decimal = dec!(0.01);

/// A tradable symbol with an evolving mid-price.
#[derive(Debug, Clone, Serialize)]
pub struct Instrument {
    pub symbol: String,
    pub display_name: String,
    pub price: Decimal,
    pub previous_price: Decimal,
    pub updated_at: DateTime<Utc>,
}

impl Instrument {
    pub fn seed(symbol: &str, display_name: &str, price: Decimal, now: DateTime<Utc>) -> Self {
        Self {
            symbol: symbol.to_string(),
            display_name: display_name.to_string(),
            price,
            previous_price: price,
            updated_at: now,
        }
    }

    /// Percentage change of `price` relative to `previous_price`.
    pub fn pct_change(&self) -> f64 {
        if self.previous_price.is_zero() {
            return 0.0;
        }
        let delta = self.price - self.previous_price;
        ((delta / self.previous_price) * dec!(100))
            .to_string()
            .parse()
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pct_change_is_zero_before_any_update() {
        let inst = Instrument::seed("INFY", "Infosys", dec!(1500), Utc::now());
        assert_eq!(inst.pct_change(), 0.0);
    }

    #[test]
    fn pct_change_reflects_move() {
        let mut inst = Instrument::seed("INFY", "Infosys", dec!(1500), Utc::now());
        inst.previous_price = dec!(1500);
        inst.price = dec!(1530);
        assert!((inst.pct_change() - 2.0).abs() < 1e-9);
    }
}
