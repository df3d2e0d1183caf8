use crate::domain::errors::StoreError;
use crate::domain::instrument::Instrument;
use crate::domain::portfolio::Portfolio;
use crate::domain::store::Store;
use crate::domain::trade::{Side, TradeOutcome};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Row, SqlitePool};
use std::collections::HashMap;
use std::str::FromStr;

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn parse_decimal(raw: &str) -> Result<Decimal, StoreError> {
        Decimal::from_str(raw)
            .map_err(|e| StoreError::Internal(anyhow::anyhow!("corrupt decimal {raw:?}: {e}")))
    }

    fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, StoreError> {
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| StoreError::Internal(anyhow::anyhow!("corrupt timestamp {raw:?}: {e}")))
    }

    async fn load_holdings(
        executor: impl sqlx::Executor<'_, Database = sqlx::Sqlite>,
        team: &str,
    ) -> Result<HashMap<String, i64>, StoreError> {
        let rows = sqlx::query("SELECT symbol, qty FROM holdings WHERE team = ?")
            .bind(team)
            .fetch_all(executor)
            .await
            .map_err(|e| StoreError::Internal(e.into()))?;

        let mut holdings = HashMap::new();
        for row in rows {
            let symbol: String = row.try_get("symbol").map_err(|e| StoreError::Internal(e.into()))?;
            let qty: i64 = row.try_get("qty").map_err(|e| StoreError::Internal(e.into()))?;
            holdings.insert(symbol, qty);
        }
        Ok(holdings)
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn list_instruments(&self) -> Result<Vec<Instrument>, StoreError> {
        let rows = sqlx::query(
            "SELECT symbol, display_name, price, previous_price, updated_at FROM instruments ORDER BY rowid ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Internal(e.into()))?;

        rows.into_iter()
            .map(|row| {
                let price: String = row.try_get("price").map_err(|e| StoreError::Internal(e.into()))?;
                let previous_price: String = row
                    .try_get("previous_price")
                    .map_err(|e| StoreError::Internal(e.into()))?;
                let updated_at: String = row
                    .try_get("updated_at")
                    .map_err(|e| StoreError::Internal(e.into()))?;
                Ok(Instrument {
                    symbol: row.try_get("symbol").map_err(|e| StoreError::Internal(e.into()))?,
                    display_name: row
                        .try_get("display_name")
                        .map_err(|e| StoreError::Internal(e.into()))?,
                    price: Self::parse_decimal(&price)?,
                    previous_price: Self::parse_decimal(&previous_price)?,
                    updated_at: Self::parse_timestamp(&updated_at)?,
                })
            })
            .collect()
    }

    async fn get_instrument(&self, symbol: &str) -> Result<Instrument, StoreError> {
        let row = sqlx::query(
            "SELECT symbol, display_name, price, previous_price, updated_at FROM instruments WHERE symbol = ?",
        )
        .bind(symbol)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Internal(e.into()))?
        .ok_or_else(|| StoreError::UnknownSymbol(symbol.to_string()))?;

        let price: String = row.try_get("price").map_err(|e| StoreError::Internal(e.into()))?;
        let previous_price: String = row
            .try_get("previous_price")
            .map_err(|e| StoreError::Internal(e.into()))?;
        let updated_at: String = row.try_get("updated_at").map_err(|e| StoreError::Internal(e.into()))?;

        Ok(Instrument {
            symbol: row.try_get("symbol").map_err(|e| StoreError::Internal(e.into()))?,
            display_name: row
                .try_get("display_name")
                .map_err(|e| StoreError::Internal(e.into()))?,
            price: Self::parse_decimal(&price)?,
            previous_price: Self::parse_decimal(&previous_price)?,
            updated_at: Self::parse_timestamp(&updated_at)?,
        })
    }

    async fn upsert_price(
        &self,
        symbol: &str,
        new_price: Decimal,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE instruments
            SET previous_price = price, price = ?, updated_at = ?
            WHERE symbol = ?
            "#,
        )
        .bind(new_price.to_string())
        .bind(now.to_rfc3339())
        .bind(symbol)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Internal(e.into()))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::UnknownSymbol(symbol.to_string()));
        }
        Ok(())
    }

    async fn create_portfolio(
        &self,
        team: &str,
        initial_cash: Decimal,
    ) -> Result<Portfolio, StoreError> {
        let mut tx = self.pool.begin().await.map_err(|e| StoreError::Internal(e.into()))?;

        let existing = sqlx::query("SELECT 1 FROM portfolios WHERE team = ?")
            .bind(team)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| StoreError::Internal(e.into()))?;
        if existing.is_some() {
            return Err(StoreError::TeamAlreadyExists(team.to_string()));
        }

        let now = Utc::now();
        sqlx::query("INSERT INTO portfolios (team, cash, last_updated) VALUES (?, ?, ?)")
            .bind(team)
            .bind(initial_cash.to_string())
            .bind(now.to_rfc3339())
            .execute(&mut *tx)
            .await
            .map_err(|e| StoreError::Internal(e.into()))?;

        tx.commit().await.map_err(|e| StoreError::Internal(e.into()))?;

        Ok(Portfolio::new(team, initial_cash, now))
    }

    async fn get_portfolio(&self, team: &str) -> Result<Portfolio, StoreError> {
        let row = sqlx::query("SELECT cash, last_updated FROM portfolios WHERE team = ?")
            .bind(team)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::Internal(e.into()))?
            .ok_or_else(|| StoreError::UnknownTeam(team.to_string()))?;

        let cash: String = row.try_get("cash").map_err(|e| StoreError::Internal(e.into()))?;
        let last_updated: String = row
            .try_get("last_updated")
            .map_err(|e| StoreError::Internal(e.into()))?;

        let holdings = Self::load_holdings(&self.pool, team).await?;

        Ok(Portfolio {
            team: team.to_string(),
            cash: Self::parse_decimal(&cash)?,
            holdings,
            last_updated: Self::parse_timestamp(&last_updated)?,
        })
    }

    async fn apply_trade(
        &self,
        team: &str,
        symbol: &str,
        qty: i64,
        now: DateTime<Utc>,
    ) -> Result<TradeOutcome, StoreError> {
        let side = Side::of(qty).ok_or(StoreError::Internal(anyhow::anyhow!(
            "apply_trade called with zero quantity"
        )))?;

        let mut tx = self.pool.begin().await.map_err(|e| StoreError::Internal(e.into()))?;

        let price_row = sqlx::query("SELECT price FROM instruments WHERE symbol = ?")
            .bind(symbol)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| StoreError::Internal(e.into()))?
            .ok_or_else(|| StoreError::UnknownSymbol(symbol.to_string()))?;
        let price: String = price_row.try_get("price").map_err(|e| StoreError::Internal(e.into()))?;
        let price = Self::parse_decimal(&price)?;

        let portfolio_row = sqlx::query("SELECT cash FROM portfolios WHERE team = ?")
            .bind(team)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| StoreError::Internal(e.into()))?
            .ok_or_else(|| StoreError::UnknownTeam(team.to_string()))?;
        let cash: String = portfolio_row
            .try_get("cash")
            .map_err(|e| StoreError::Internal(e.into()))?;
        let cash = Self::parse_decimal(&cash)?;

        let abs_qty = qty.unsigned_abs() as i64;
        let notional = price * Decimal::from(abs_qty);

        let new_cash = match side {
            Side::Buy => {
                if cash < notional {
                    return Err(StoreError::InsufficientCash {
                        need: notional,
                        available: cash,
                    });
                }
                cash - notional
            }
            Side::Sell => {
                let held: i64 = sqlx::query("SELECT qty FROM holdings WHERE team = ? AND symbol = ?")
                    .bind(team)
                    .bind(symbol)
                    .fetch_optional(&mut *tx)
                    .await
                    .map_err(|e| StoreError::Internal(e.into()))?
                    .map(|row| row.try_get::<i64, _>("qty"))
                    .transpose()
                    .map_err(|e| StoreError::Internal(e.into()))?
                    .unwrap_or(0);

                if held < abs_qty {
                    return Err(StoreError::InsufficientHoldings {
                        need: abs_qty,
                        available: held,
                    });
                }
                cash + notional
            }
        };

        sqlx::query("UPDATE portfolios SET cash = ?, last_updated = ? WHERE team = ?")
            .bind(new_cash.to_string())
            .bind(now.to_rfc3339())
            .bind(team)
            .execute(&mut *tx)
            .await
            .map_err(|e| StoreError::Internal(e.into()))?;

        let delta = match side {
            Side::Buy => abs_qty,
            Side::Sell => -abs_qty,
        };

        sqlx::query(
            r#"
            INSERT INTO holdings (team, symbol, qty) VALUES (?, ?, ?)
            ON CONFLICT(team, symbol) DO UPDATE SET qty = qty + excluded.qty
            "#,
        )
        .bind(team)
        .bind(symbol)
        .bind(delta)
        .execute(&mut *tx)
        .await
        .map_err(|e| StoreError::Internal(e.into()))?;

        sqlx::query("DELETE FROM holdings WHERE team = ? AND symbol = ? AND qty = 0")
            .bind(team)
            .bind(symbol)
            .execute(&mut *tx)
            .await
            .map_err(|e| StoreError::Internal(e.into()))?;

        let holdings = Self::load_holdings(&mut *tx, team).await?;

        tx.commit().await.map_err(|e| StoreError::Internal(e.into()))?;

        Ok(TradeOutcome {
            cash: new_cash,
            holdings,
        })
    }

    async fn list_portfolios(&self) -> Result<Vec<Portfolio>, StoreError> {
        let rows = sqlx::query("SELECT team, cash, last_updated FROM portfolios ORDER BY rowid ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::Internal(e.into()))?;

        let mut portfolios = Vec::with_capacity(rows.len());
        for row in rows {
            let team: String = row.try_get("team").map_err(|e| StoreError::Internal(e.into()))?;
            let cash: String = row.try_get("cash").map_err(|e| StoreError::Internal(e.into()))?;
            let last_updated: String = row
                .try_get("last_updated")
                .map_err(|e| StoreError::Internal(e.into()))?;
            let holdings = Self::load_holdings(&self.pool, &team).await?;
            portfolios.push(Portfolio {
                team,
                cash: Self::parse_decimal(&cash)?,
                holdings,
                last_updated: Self::parse_timestamp(&last_updated)?,
            });
        }
        Ok(portfolios)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::persistence::database::Database;
    use rust_decimal_macros::dec;

    async fn test_store() -> SqliteStore {
        let db = Database::new(":memory:").await.unwrap();
        SqliteStore::new(db.pool)
    }

    async fn seed_infy(store: &SqliteStore) {
        sqlx::query(
            "INSERT INTO instruments (symbol, display_name, price, previous_price, updated_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind("INFY")
        .bind("Infosys")
        .bind("1500.0")
        .bind("1500.0")
        .bind(Utc::now().to_rfc3339())
        .execute(&store.pool)
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn create_portfolio_then_duplicate_conflicts() {
        let store = test_store().await;
        store.create_portfolio("Alpha", dec!(100000)).await.unwrap();
        let err = store.create_portfolio("Alpha", dec!(100000)).await.unwrap_err();
        assert!(matches!(err, StoreError::TeamAlreadyExists(_)));
    }

    #[tokio::test]
    async fn buy_then_sell_round_trips_cash_and_holdings() {
        let store = test_store().await;
        seed_infy(&store).await;
        store.create_portfolio("Alpha", dec!(100000)).await.unwrap();

        let out = store.apply_trade("Alpha", "INFY", 10, Utc::now()).await.unwrap();
        assert_eq!(out.cash, dec!(85000));
        assert_eq!(out.holdings.get("INFY"), Some(&10));

        let out = store.apply_trade("Alpha", "INFY", -10, Utc::now()).await.unwrap();
        assert_eq!(out.cash, dec!(100000));
        assert_eq!(out.holdings.get("INFY"), None);
    }

    #[tokio::test]
    async fn insufficient_cash_is_rejected_and_portfolio_untouched() {
        let store = test_store().await;
        seed_infy(&store).await;
        store.create_portfolio("Alpha", dec!(100000)).await.unwrap();

        let err = store.apply_trade("Alpha", "INFY", 1000, Utc::now()).await.unwrap_err();
        assert!(matches!(err, StoreError::InsufficientCash { .. }));

        let portfolio = store.get_portfolio("Alpha").await.unwrap();
        assert_eq!(portfolio.cash, dec!(100000));
        assert!(portfolio.holdings.is_empty());
    }

    #[tokio::test]
    async fn insufficient_holdings_is_rejected() {
        let store = test_store().await;
        seed_infy(&store).await;
        store.create_portfolio("Alpha", dec!(100000)).await.unwrap();

        let err = store.apply_trade("Alpha", "INFY", -1, Utc::now()).await.unwrap_err();
        assert!(matches!(err, StoreError::InsufficientHoldings { .. }));
    }

    #[tokio::test]
    async fn upsert_price_tracks_previous_price() {
        let store = test_store().await;
        seed_infy(&store).await;
        store.upsert_price("INFY", dec!(1530), Utc::now()).await.unwrap();
        let inst = store.get_instrument("INFY").await.unwrap();
        assert_eq!(inst.price, dec!(1530));
        assert_eq!(inst.previous_price, dec!(1500));
    }

    #[tokio::test]
    async fn leaderboard_input_lists_all_portfolios() {
        let store = test_store().await;
        store.create_portfolio("B", dec!(50000)).await.unwrap();
        store.create_portfolio("A", dec!(100000)).await.unwrap();
        let all = store.list_portfolios().await.unwrap();
        assert_eq!(all.len(), 2);
    }
}
