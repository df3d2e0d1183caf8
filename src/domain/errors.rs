use thiserror::Error;

/// Errors raised by the Store. These map 1:1 onto the HTTP error
/// taxonomy at the interface edge.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unknown symbol: {0}")]
    UnknownSymbol(String),

    #[error("unknown team: {0}")]
    UnknownTeam(String),

    #[error("team already exists: {0}")]
    TeamAlreadyExists(String),

    #[error("insufficient cash: need {need}, available {available}")]
    InsufficientCash {
        need: rust_decimal::Decimal,
        available: rust_decimal::Decimal,
    },

    #[error("insufficient holdings: need {need}, available {available}")]
    InsufficientHoldings { need: i64, available: i64 },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Errors raised by the Trade Executor, layered on top of StoreError.
#[derive(Debug, Error)]
pub enum TradeError {
    #[error("round is not open for trading")]
    RoundClosed,

    #[error("quantity must not be zero")]
    ZeroQuantity,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("trade could not be serialized within the request deadline")]
    Timeout,
}

/// Errors raised by the Round Controller.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RoundError {
    #[error("no round is running or paused")]
    InvalidTransition,
}
