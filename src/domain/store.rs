//! The Store abstraction.
//!
//! The Store is the exclusive mutation path for instruments and
//! portfolios. Every operation is a serializable, atomic unit; the
//! concrete implementation (`infrastructure::persistence::SqliteStore`)
//! backs this with an embedded SQLite database plus a per-team mutex
//! layered on top of `apply_trade` for linearizability.

use crate::domain::errors::StoreError;
use crate::domain::instrument::Instrument;
use crate::domain::portfolio::Portfolio;
use crate::domain::trade::TradeOutcome;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

#[async_trait]
pub trait Store: Send + Sync {
    async fn list_instruments(&self) -> Result<Vec<Instrument>, StoreError>;

    async fn get_instrument(&self, symbol: &str) -> Result<Instrument, StoreError>;

    async fn upsert_price(
        &self,
        symbol: &str,
        new_price: Decimal,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    async fn create_portfolio(
        &self,
        team: &str,
        initial_cash: Decimal,
    ) -> Result<Portfolio, StoreError>;

    async fn get_portfolio(&self, team: &str) -> Result<Portfolio, StoreError>;

    /// Apply a single buy/sell. The caller (Trade Executor) has already
    /// checked `is_trading_open` and `qty != 0`; this operation reads the
    /// execution price from the instrument row itself, inside the same
    /// atomic section that checks cash/holdings sufficiency and mutates.
    /// No price is accepted from the caller: there is no reservation or
    /// quote token to go stale between check and mutation. It is safe to
    /// call directly in tests.
    async fn apply_trade(
        &self,
        team: &str,
        symbol: &str,
        qty: i64,
        now: DateTime<Utc>,
    ) -> Result<TradeOutcome, StoreError>;

    async fn list_portfolios(&self) -> Result<Vec<Portfolio>, StoreError>;
}
