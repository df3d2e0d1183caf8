use crate::application::executor::TradeExecutor;
use crate::application::query_service::QueryService;
use crate::application::round_controller::RoundController;
use crate::application::simulator::MarketSimulator;
use crate::config::Config;
use crate::domain::store::Store;
use crate::infrastructure::news::NewsService;
use crate::infrastructure::persistence::{Database, SqliteStore};
use chrono::Utc;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// The fixed seed table of instruments. Seeded once at startup and never
/// dropped; `ON CONFLICT DO NOTHING` makes re-seeding idempotent across
/// restarts against the same database file.
const SEED_INSTRUMENTS: &[(&str, &str, &str)] = &[
    ("INFY", "Infosys", "1500.0"),
    ("TCS", "Tata Consultancy Services", "3800.0"),
    ("RELI", "Reliance Industries", "2500.0"),
    ("HDFC", "HDFC Bank", "1650.0"),
    ("WIPRO", "Wipro", "450.0"),
];

/// Everything the HTTP layer needs, wired once at startup.
pub struct Services {
    pub store: Arc<dyn Store>,
    pub round: Arc<RoundController>,
    pub executor: Arc<TradeExecutor>,
    pub query: Arc<QueryService>,
    pub news: Arc<NewsService>,
    pub simulator_shutdown: CancellationToken,
}

impl Services {
    pub async fn build(config: &Config) -> anyhow::Result<Self> {
        let db = Database::new(&config.db_path).await?;
        seed_instruments(&db).await?;
        let store: Arc<dyn Store> = Arc::new(SqliteStore::new(db.pool));

        let round = Arc::new(RoundController::new(config.round_duration));
        let executor = Arc::new(TradeExecutor::new(
            store.clone(),
            round.clone(),
            config.request_timeout,
        ));
        let query = Arc::new(QueryService::new(store.clone()));
        let news = Arc::new(NewsService::new(
            config.news_upstream_url.clone(),
            config.request_timeout,
            config.news_cache,
        ));

        let simulator_shutdown = CancellationToken::new();
        let simulator = MarketSimulator::new(store.clone(), round.clone(), config.tick_interval);
        let shutdown = simulator_shutdown.clone();
        tokio::spawn(async move {
            simulator.run(shutdown).await;
        });

        Ok(Self {
            store,
            round,
            executor,
            query,
            news,
            simulator_shutdown,
        })
    }

    pub fn shutdown(&self) {
        self.simulator_shutdown.cancel();
    }
}

async fn seed_instruments(db: &Database) -> anyhow::Result<()> {
    let now = Utc::now().to_rfc3339();
    for (symbol, display_name, price) in SEED_INSTRUMENTS {
        sqlx::query(
            r#"
            INSERT INTO instruments (symbol, display_name, price, previous_price, updated_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(symbol) DO NOTHING
            "#,
        )
        .bind(symbol)
        .bind(display_name)
        .bind(price)
        .bind(price)
        .bind(&now)
        .execute(&db.pool)
        .await?;
    }
    info!("seeded {} instruments", SEED_INSTRUMENTS.len());
    Ok(())
}
