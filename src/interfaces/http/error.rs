use crate::domain::errors::{RoundError, StoreError, TradeError};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

/// The single place a domain result becomes an HTTP status code and JSON
/// body. `internal` is the only branch that logs server-side detail and
/// withholds it from the client.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized,
    Forbidden(String),
    NotFound(String),
    Conflict(String),
    Timeout,
    Internal,
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "missing or incorrect organizer secret".to_string(),
            ),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg),
            ApiError::Timeout => (
                StatusCode::GATEWAY_TIMEOUT,
                "timeout",
                "trade could not be serialized within the request deadline".to_string(),
            ),
            ApiError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal",
                "internal server error".to_string(),
            ),
        };

        (status, Json(ErrorBody { error, message })).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UnknownSymbol(s) => ApiError::NotFound(format!("unknown symbol: {s}")),
            StoreError::UnknownTeam(t) => ApiError::NotFound(format!("unknown team: {t}")),
            StoreError::TeamAlreadyExists(t) => ApiError::Conflict(format!("team already exists: {t}")),
            StoreError::InsufficientCash { need, available } => ApiError::BadRequest(format!(
                "insufficient cash: need {need}, available {available}"
            )),
            StoreError::InsufficientHoldings { need, available } => ApiError::BadRequest(format!(
                "insufficient holdings: need {need}, available {available}"
            )),
            StoreError::Internal(e) => {
                error!("store error: {e:#}");
                ApiError::Internal
            }
        }
    }
}

impl From<TradeError> for ApiError {
    fn from(err: TradeError) -> Self {
        match err {
            TradeError::RoundClosed => ApiError::Forbidden("round_closed".to_string()),
            TradeError::ZeroQuantity => ApiError::BadRequest("zero_quantity".to_string()),
            TradeError::Timeout => ApiError::Timeout,
            TradeError::Store(e) => e.into(),
        }
    }
}

impl From<RoundError> for ApiError {
    fn from(err: RoundError) -> Self {
        match err {
            RoundError::InvalidTransition => ApiError::Conflict("invalid round transition".to_string()),
        }
    }
}
