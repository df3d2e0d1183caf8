use crate::interfaces::http::dto::{
    HealthResponse, InitTeamRequest, InitTeamResponse, NewsResponse, PortfolioDto, RoundActionResponse,
    RoundDto, StockDto, TradeRequest, TradeResponse,
};
use crate::interfaces::http::error::ApiError;
use crate::interfaces::http::AppState;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;

pub async fn init_team(
    State(state): State<AppState>,
    Json(body): Json<InitTeamRequest>,
) -> Result<Json<InitTeamResponse>, ApiError> {
    let team = body.team.trim();
    if team.is_empty() {
        return Err(ApiError::BadRequest("team name must not be empty".to_string()));
    }

    let portfolio = state
        .services
        .store
        .create_portfolio(team, state.initial_cash)
        .await?;

    Ok(Json(InitTeamResponse {
        ok: true,
        cash: portfolio.cash,
    }))
}

pub async fn get_portfolio(
    State(state): State<AppState>,
    Path(team): Path<String>,
) -> Result<Json<PortfolioDto>, ApiError> {
    let view = state.services.query.portfolio(&team).await?;
    Ok(Json(view.into()))
}

pub async fn trade(
    State(state): State<AppState>,
    Json(body): Json<TradeRequest>,
) -> Result<Json<TradeResponse>, ApiError> {
    let outcome = state
        .services
        .executor
        .execute(&body.team, &body.symbol, body.qty)
        .await?;
    Ok(Json(outcome.into()))
}

pub async fn stocks(State(state): State<AppState>) -> Result<Json<Vec<StockDto>>, ApiError> {
    let views = state.services.query.instruments().await?;
    Ok(Json(views.into_iter().map(StockDto::from).collect()))
}

pub async fn leaderboard(
    State(state): State<AppState>,
) -> Result<Json<Vec<crate::interfaces::http::dto::LeaderboardEntryDto>>, ApiError> {
    let entries = state.services.query.leaderboard().await?;
    Ok(Json(entries.into_iter().map(Into::into).collect()))
}

pub async fn round_status(State(state): State<AppState>) -> Json<RoundDto> {
    Json(state.services.round.snapshot().await.into())
}

pub async fn round_start(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<RoundActionResponse>, ApiError> {
    require_organizer(&state, &headers)?;
    Ok(Json(state.services.round.start().await.into()))
}

pub async fn round_pause(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<RoundActionResponse>, ApiError> {
    require_organizer(&state, &headers)?;
    let snapshot = state.services.round.pause().await?;
    Ok(Json(snapshot.into()))
}

pub async fn round_resume(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<RoundActionResponse>, ApiError> {
    require_organizer(&state, &headers)?;
    let snapshot = state.services.round.resume().await?;
    Ok(Json(snapshot.into()))
}

pub async fn round_reset(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<RoundActionResponse>, ApiError> {
    require_organizer(&state, &headers)?;
    Ok(Json(state.services.round.reset().await.into()))
}

pub async fn news(State(state): State<AppState>) -> Json<NewsResponse> {
    Json(NewsResponse {
        articles: state.services.news.articles().await,
    })
}

pub async fn healthz() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

fn require_organizer(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let provided = headers
        .get("X-Organizer-Secret")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    if constant_time_eq(provided.as_bytes(), state.organizer_secret.as_bytes()) {
        Ok(())
    } else {
        Err(ApiError::Unauthorized)
    }
}

/// Compares two byte strings without short-circuiting on the first
/// mismatch, so the organizer secret's length and prefix cannot be
/// inferred from response timing.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff: u8 = 0;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}
