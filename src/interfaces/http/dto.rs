use crate::application::query_service::{InstrumentView, LeaderboardEntry, PortfolioView};
use crate::application::round_controller::RoundSnapshot;
use crate::domain::round::RoundStatus;
use crate::domain::trade::TradeOutcome;
use crate::infrastructure::news::Article;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Deserialize)]
pub struct InitTeamRequest {
    pub team: String,
}

#[derive(Serialize)]
pub struct InitTeamResponse {
    pub ok: bool,
    pub cash: Decimal,
}

#[derive(Deserialize)]
pub struct TradeRequest {
    pub team: String,
    pub symbol: String,
    pub qty: i64,
}

#[derive(Serialize)]
pub struct TradeResponse {
    pub ok: bool,
    pub cash: Decimal,
    pub holdings: HashMap<String, i64>,
}

impl From<TradeOutcome> for TradeResponse {
    fn from(outcome: TradeOutcome) -> Self {
        Self {
            ok: true,
            cash: outcome.cash,
            holdings: outcome.holdings,
        }
    }
}

#[derive(Serialize)]
pub struct StockDto {
    pub symbol: String,
    pub name: String,
    pub price: Decimal,
    pub last_price: Decimal,
    pub pct_change: f64,
    pub updated_at: DateTime<Utc>,
}

impl From<InstrumentView> for StockDto {
    fn from(view: InstrumentView) -> Self {
        Self {
            symbol: view.symbol,
            name: view.display_name,
            price: view.price,
            last_price: view.previous_price,
            pct_change: view.pct_change,
            updated_at: view.updated_at,
        }
    }
}

#[derive(Serialize)]
pub struct HoldingDto {
    pub qty: i64,
    pub price: Decimal,
    pub value: Decimal,
}

#[derive(Serialize)]
pub struct PortfolioDto {
    pub team: String,
    pub cash: Decimal,
    pub holdings: HashMap<String, HoldingDto>,
    pub portfolio_value: Decimal,
}

impl From<PortfolioView> for PortfolioDto {
    fn from(view: PortfolioView) -> Self {
        Self {
            team: view.team,
            cash: view.cash,
            holdings: view
                .holdings
                .into_iter()
                .map(|(symbol, holding)| {
                    (
                        symbol,
                        HoldingDto {
                            qty: holding.qty,
                            price: holding.current_price,
                            value: holding.value,
                        },
                    )
                })
                .collect(),
            portfolio_value: view.portfolio_value,
        }
    }
}

#[derive(Serialize)]
pub struct LeaderboardEntryDto {
    pub team: String,
    pub value: Decimal,
}

impl From<LeaderboardEntry> for LeaderboardEntryDto {
    fn from(entry: LeaderboardEntry) -> Self {
        Self {
            team: entry.team,
            value: entry.value,
        }
    }
}

#[derive(Serialize)]
pub struct RoundDto {
    pub status: RoundStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining: Option<u64>,
}

impl From<RoundSnapshot> for RoundDto {
    fn from(snapshot: RoundSnapshot) -> Self {
        Self {
            status: snapshot.status,
            deadline: snapshot.deadline,
            remaining: snapshot.remaining.map(|d| d.as_secs()),
        }
    }
}

#[derive(Serialize)]
pub struct RoundActionResponse {
    pub ok: bool,
    pub status: RoundStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining: Option<u64>,
}

impl From<RoundSnapshot> for RoundActionResponse {
    fn from(snapshot: RoundSnapshot) -> Self {
        Self {
            ok: true,
            status: snapshot.status,
            deadline: snapshot.deadline,
            remaining: snapshot.remaining.map(|d| d.as_secs()),
        }
    }
}

#[derive(Serialize)]
pub struct NewsResponse {
    pub articles: Vec<Article>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}
