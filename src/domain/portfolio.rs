use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;

/// The `(cash, holdings)` state owned by one team.
#[derive(Debug, Clone, Serialize)]
pub struct Portfolio {
    pub team: String,
    pub cash: Decimal,
    /// symbol -> quantity. A key MUST NOT be present with quantity zero.
    pub holdings: HashMap<String, i64>,
    pub last_updated: DateTime<Utc>,
}

impl Portfolio {
    pub fn new(team: &str, initial_cash: Decimal, now: DateTime<Utc>) -> Self {
        Self {
            team: team.to_string(),
            cash: initial_cash,
            holdings: HashMap::new(),
            last_updated: now,
        }
    }
}
