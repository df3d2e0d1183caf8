use crate::application::round_controller::RoundController;
use crate::domain::instrument::PRICE_FLOOR;
use crate::domain::store::Store;
use chrono::Utc;
use rand::Rng;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Background ticker that evolves instrument prices while the round is
/// RUNNING. A single long-lived task, not spawned per tick; exits promptly
/// when `shutdown` is cancelled.
pub struct MarketSimulator {
    store: Arc<dyn Store>,
    round: Arc<RoundController>,
    tick_interval: Duration,
}

impl MarketSimulator {
    pub fn new(store: Arc<dyn Store>, round: Arc<RoundController>, tick_interval: Duration) -> Self {
        Self {
            store,
            round,
            tick_interval,
        }
    }

    pub async fn run(self, shutdown: CancellationToken) {
        // `tokio::time::interval` fires its first tick immediately; start
        // the clock one full period out so a round that begins moments
        // after startup doesn't see a surprise price jump.
        let mut interval =
            tokio::time::interval_at(tokio::time::Instant::now() + self.tick_interval, self.tick_interval);
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.tick().await;
                }
                _ = shutdown.cancelled() => {
                    debug!("market simulator shutting down");
                    return;
                }
            }
        }
    }

    async fn tick(&self) {
        if !self.round.is_trading_open(Utc::now()).await {
            return;
        }

        let instruments = match self.store.list_instruments().await {
            Ok(instruments) => instruments,
            Err(e) => {
                warn!("simulator failed to list instruments: {e}");
                return;
            }
        };

        for instrument in instruments {
            let delta: f64 = rand::rng().random_range(-0.005..=0.005);
            let factor = Decimal::try_from(1.0 + delta).unwrap_or(dec!(1));
            let new_price = (instrument.price * factor).max(PRICE_FLOOR);

            if let Err(e) = self
                .store
                .upsert_price(&instrument.symbol, new_price, Utc::now())
                .await
            {
                warn!("simulator failed to update {}: {e}", instrument.symbol);
            } else {
                debug!("tick: {} -> {new_price}", instrument.symbol);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::persistence::{Database, SqliteStore};
    use rust_decimal_macros::dec;

    async fn seeded_store() -> Arc<dyn Store> {
        let db = Database::new(":memory:").await.unwrap();
        sqlx::query(
            "INSERT INTO instruments (symbol, display_name, price, previous_price, updated_at) VALUES ('INFY', 'Infosys', '1500.0', '1500.0', ?)",
        )
        .bind(Utc::now().to_rfc3339())
        .execute(&db.pool)
        .await
        .unwrap();
        Arc::new(SqliteStore::new(db.pool))
    }

    #[tokio::test]
    async fn tick_is_a_noop_while_round_is_idle() {
        let store = seeded_store().await;
        let round = Arc::new(RoundController::new(Duration::from_secs(1800)));
        let sim = MarketSimulator::new(store.clone(), round, Duration::from_millis(10));

        sim.tick().await;

        let instrument = store.get_instrument("INFY").await.unwrap();
        assert_eq!(instrument.price, dec!(1500.0));
    }

    #[tokio::test]
    async fn tick_moves_price_within_bounds_while_running() {
        let store = seeded_store().await;
        let round = Arc::new(RoundController::new(Duration::from_secs(1800)));
        round.start().await;
        let sim = MarketSimulator::new(store.clone(), round, Duration::from_millis(10));

        sim.tick().await;

        let instrument = store.get_instrument("INFY").await.unwrap();
        assert_ne!(instrument.price, instrument.previous_price);
        let ratio = instrument.price / instrument.previous_price;
        assert!(ratio >= dec!(0.99) && ratio <= dec!(1.01));
    }
}
