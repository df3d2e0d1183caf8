use crate::application::round_controller::RoundController;
use crate::domain::errors::TradeError;
use crate::domain::store::Store;
use crate::domain::trade::TradeOutcome;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Executes a single buy/sell, checking round status, quantity, then
/// funds/holdings in order, and serializing concurrent trades against the
/// same team via a per-team mutex. Trades against different teams proceed
/// independently.
pub struct TradeExecutor {
    store: Arc<dyn Store>,
    round: Arc<RoundController>,
    team_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
    request_timeout: Duration,
}

impl TradeExecutor {
    pub fn new(store: Arc<dyn Store>, round: Arc<RoundController>, request_timeout: Duration) -> Self {
        Self {
            store,
            round,
            team_locks: Mutex::new(HashMap::new()),
            request_timeout,
        }
    }

    async fn lock_for(&self, team: &str) -> Arc<Mutex<()>> {
        let mut locks = self.team_locks.lock().await;
        locks
            .entry(team.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    pub async fn execute(&self, team: &str, symbol: &str, qty: i64) -> Result<TradeOutcome, TradeError> {
        if !self.round.is_trading_open(Utc::now()).await {
            return Err(TradeError::RoundClosed);
        }
        if qty == 0 {
            return Err(TradeError::ZeroQuantity);
        }

        let lock = self.lock_for(team).await;
        let _permit = tokio::time::timeout(self.request_timeout, lock.lock())
            .await
            .map_err(|_| TradeError::Timeout)?;

        let outcome = self
            .store
            .apply_trade(team, symbol, qty, Utc::now())
            .await?;
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::persistence::{Database, SqliteStore};
    use rust_decimal_macros::dec;

    async fn running_executor() -> (TradeExecutor, Arc<dyn Store>) {
        let db = Database::new(":memory:").await.unwrap();
        sqlx::query(
            "INSERT INTO instruments (symbol, display_name, price, previous_price, updated_at) VALUES ('INFY', 'Infosys', '1500.0', '1500.0', ?)",
        )
        .bind(Utc::now().to_rfc3339())
        .execute(&db.pool)
        .await
        .unwrap();
        let store: Arc<dyn Store> = Arc::new(SqliteStore::new(db.pool));
        store.create_portfolio("Alpha", dec!(100000)).await.unwrap();

        let round = Arc::new(RoundController::new(Duration::from_secs(1800)));
        round.start().await;
        let executor = TradeExecutor::new(store.clone(), round, Duration::from_secs(4));
        (executor, store)
    }

    #[tokio::test]
    async fn trade_rejected_when_round_not_running() {
        let db = Database::new(":memory:").await.unwrap();
        let store: Arc<dyn Store> = Arc::new(SqliteStore::new(db.pool));
        let round = Arc::new(RoundController::new(Duration::from_secs(1800)));
        let executor = TradeExecutor::new(store, round, Duration::from_secs(4));

        let err = executor.execute("Alpha", "INFY", 10).await.unwrap_err();
        assert!(matches!(err, TradeError::RoundClosed));
    }

    #[tokio::test]
    async fn zero_quantity_is_rejected() {
        let (executor, _store) = running_executor().await;
        let err = executor.execute("Alpha", "INFY", 0).await.unwrap_err();
        assert!(matches!(err, TradeError::ZeroQuantity));
    }

    #[tokio::test]
    async fn buy_then_sell_succeeds() {
        let (executor, _store) = running_executor().await;
        let out = executor.execute("Alpha", "INFY", 10).await.unwrap();
        assert_eq!(out.cash, dec!(85000));
        let out = executor.execute("Alpha", "INFY", -10).await.unwrap();
        assert_eq!(out.cash, dec!(100000));
    }

    #[tokio::test]
    async fn concurrent_buys_never_overspend_cash() {
        let (executor, store) = running_executor().await;
        let executor = Arc::new(executor);

        let handles: Vec<_> = (0..20)
            .map(|_| {
                let executor = executor.clone();
                tokio::spawn(async move { executor.execute("Alpha", "INFY", 10).await.is_ok() })
            })
            .collect();

        let mut successes = 0;
        for handle in handles {
            if handle.await.unwrap() {
                successes += 1;
            }
        }

        // cash=100000, cost per trade = 1500*10=15000 -> floor(100000/15000)=6
        assert_eq!(successes, 6);
        let portfolio = store.get_portfolio("Alpha").await.unwrap();
        assert_eq!(portfolio.cash, dec!(10000));
    }
}
