use crate::domain::errors::StoreError;
use crate::domain::instrument::Instrument;
use crate::domain::store::Store;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;

/// Read-only views over the Store: instrument snapshot, portfolio view,
/// and leaderboard ranking.
pub struct QueryService {
    store: Arc<dyn Store>,
}

#[derive(Debug, Clone)]
pub struct InstrumentView {
    pub symbol: String,
    pub display_name: String,
    pub price: Decimal,
    pub previous_price: Decimal,
    pub pct_change: f64,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone)]
pub struct HoldingView {
    pub qty: i64,
    pub current_price: Decimal,
    pub value: Decimal,
}

#[derive(Debug, Clone)]
pub struct PortfolioView {
    pub team: String,
    pub cash: Decimal,
    pub holdings: HashMap<String, HoldingView>,
    pub portfolio_value: Decimal,
}

#[derive(Debug, Clone)]
pub struct LeaderboardEntry {
    pub team: String,
    pub value: Decimal,
}

impl QueryService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn instruments(&self) -> Result<Vec<InstrumentView>, StoreError> {
        let instruments = self.store.list_instruments().await?;
        Ok(instruments.into_iter().map(Self::to_view).collect())
    }

    fn to_view(instrument: Instrument) -> InstrumentView {
        let pct_change = instrument.pct_change();
        InstrumentView {
            symbol: instrument.symbol,
            display_name: instrument.display_name,
            price: instrument.price.round_dp(2),
            previous_price: instrument.previous_price.round_dp(2),
            pct_change,
            updated_at: instrument.updated_at,
        }
    }

    pub async fn portfolio(&self, team: &str) -> Result<PortfolioView, StoreError> {
        let portfolio = self.store.get_portfolio(team).await?;
        // A single consistent price snapshot for every holding in this call.
        let prices = self.price_snapshot().await?;

        let mut holdings = HashMap::new();
        let mut total_value = portfolio.cash;
        for (symbol, qty) in &portfolio.holdings {
            let price = prices.get(symbol).copied().unwrap_or_default();
            let value = price * Decimal::from(*qty);
            total_value += value;
            holdings.insert(
                symbol.clone(),
                HoldingView {
                    qty: *qty,
                    current_price: price,
                    value,
                },
            );
        }

        Ok(PortfolioView {
            team: portfolio.team,
            cash: portfolio.cash,
            holdings,
            portfolio_value: total_value,
        })
    }

    pub async fn leaderboard(&self) -> Result<Vec<LeaderboardEntry>, StoreError> {
        let portfolios = self.store.list_portfolios().await?;
        let prices = self.price_snapshot().await?;

        let mut entries: Vec<LeaderboardEntry> = portfolios
            .into_iter()
            .map(|portfolio| {
                let value = portfolio.cash
                    + portfolio
                        .holdings
                        .iter()
                        .map(|(symbol, qty)| prices.get(symbol).copied().unwrap_or_default() * Decimal::from(*qty))
                        .sum::<Decimal>();
                LeaderboardEntry {
                    team: portfolio.team,
                    value,
                }
            })
            .collect();

        entries.sort_by(|a, b| b.value.cmp(&a.value).then_with(|| a.team.cmp(&b.team)));
        Ok(entries)
    }

    async fn price_snapshot(&self) -> Result<HashMap<String, Decimal>, StoreError> {
        let instruments = self.store.list_instruments().await?;
        Ok(instruments
            .into_iter()
            .map(|i| (i.symbol, i.price))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::persistence::{Database, SqliteStore};
    use chrono::Utc;
    use rust_decimal_macros::dec;

    async fn seeded() -> QueryService {
        let db = Database::new(":memory:").await.unwrap();
        sqlx::query(
            "INSERT INTO instruments (symbol, display_name, price, previous_price, updated_at) VALUES ('INFY', 'Infosys', '1500.0', '1500.0', ?)",
        )
        .bind(Utc::now().to_rfc3339())
        .execute(&db.pool)
        .await
        .unwrap();
        let store: Arc<dyn Store> = Arc::new(SqliteStore::new(db.pool));

        store.create_portfolio("A", dec!(100000)).await.unwrap();
        store.create_portfolio("B", dec!(110000)).await.unwrap();
        store.create_portfolio("C", dec!(105000)).await.unwrap();
        store.apply_trade("B", "INFY", 40, Utc::now()).await.unwrap();
        store.apply_trade("C", "INFY", 10, Utc::now()).await.unwrap();

        QueryService::new(store)
    }

    #[tokio::test]
    async fn leaderboard_orders_by_value_desc_team_asc() {
        let service = seeded().await;
        let board = service.leaderboard().await.unwrap();
        let teams: Vec<_> = board.iter().map(|e| e.team.clone()).collect();
        assert_eq!(teams, vec!["B", "C", "A"]);
        assert_eq!(board[0].value, dec!(110000));
        assert_eq!(board[1].value, dec!(105000));
        assert_eq!(board[2].value, dec!(100000));
    }

    #[tokio::test]
    async fn portfolio_view_uses_one_price_snapshot() {
        let service = seeded().await;
        let view = service.portfolio("B").await.unwrap();
        assert_eq!(view.portfolio_value, dec!(110000));
        assert_eq!(view.holdings["INFY"].value, dec!(60000));
    }
}
