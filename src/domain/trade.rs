use rust_decimal::Decimal;

/// Side of a trade, derived from the sign of `qty` rather than a separate
/// field — a positive quantity buys, a negative one sells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn of(qty: i64) -> Option<Self> {
        match qty.cmp(&0) {
            std::cmp::Ordering::Greater => Some(Side::Buy),
            std::cmp::Ordering::Less => Some(Side::Sell),
            std::cmp::Ordering::Equal => None,
        }
    }
}

/// Result of a successfully applied trade.
#[derive(Debug, Clone)]
pub struct TradeOutcome {
    pub cash: Decimal,
    pub holdings: std::collections::HashMap<String, i64>,
}
