pub mod dto;
pub mod error;
pub mod handlers;

use crate::application::bootstrap::Services;
use axum::routing::{get, post};
use axum::Router;
use rust_decimal::Decimal;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub services: Arc<Services>,
    pub organizer_secret: Arc<String>,
    pub initial_cash: Decimal,
}

/// Builds the router. Route path and method both matter to clients.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/init_team", post(handlers::init_team))
        .route("/portfolio/{team}", get(handlers::get_portfolio))
        .route("/trade", post(handlers::trade))
        .route("/stocks", get(handlers::stocks))
        .route("/leaderboard", get(handlers::leaderboard))
        .route("/round", get(handlers::round_status))
        .route("/round/start", post(handlers::round_start))
        .route("/round/pause", post(handlers::round_pause))
        .route("/round/resume", post(handlers::round_resume))
        .route("/round/reset", post(handlers::round_reset))
        .route("/news", get(handlers::news))
        .route("/healthz", get(handlers::healthz))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
