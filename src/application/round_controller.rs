use crate::domain::errors::RoundError;
use crate::domain::round::{RoundState, RoundStatus};
use chrono::{DateTime, Utc};
use std::time::Duration;
use tokio::sync::RwLock;

/// Owns the singleton round state. Every transition takes a lock; the
/// pure `is_trading_open` predicate is exposed read-only to the
/// Simulator and Executor.
pub struct RoundController {
    state: RwLock<RoundState>,
    duration: Duration,
}

/// Snapshot returned to callers after a transition or on `GET /round`.
#[derive(Debug, Clone)]
pub struct RoundSnapshot {
    pub status: RoundStatus,
    pub deadline: Option<DateTime<Utc>>,
    pub remaining: Option<Duration>,
}

impl RoundController {
    pub fn new(duration: Duration) -> Self {
        Self {
            state: RwLock::new(RoundState::default()),
            duration,
        }
    }

    /// Time left in the round as of `now`: the paused remainder while
    /// PAUSED, time-to-deadline while RUNNING, `None` otherwise.
    fn remaining_at(state: &RoundState, now: DateTime<Utc>) -> Option<Duration> {
        match state.status {
            RoundStatus::Paused => state.remaining_on_pause,
            RoundStatus::Running => state.deadline.map(|d| (d - now).to_std().unwrap_or(Duration::ZERO)),
            RoundStatus::Idle | RoundStatus::Ended => None,
        }
    }

    pub async fn snapshot(&self) -> RoundSnapshot {
        let state = self.tick().await;
        let now = Utc::now();
        RoundSnapshot {
            status: state.status,
            deadline: state.deadline,
            remaining: Self::remaining_at(&state, now),
        }
    }

    pub async fn is_trading_open(&self, now: DateTime<Utc>) -> bool {
        let state = self.tick().await;
        state.is_trading_open(now)
    }

    /// Advance RUNNING -> ENDED if the deadline has passed, then return the
    /// (possibly updated) state. Called on every read so `is_trading_open`
    /// never lies about an expired round.
    async fn tick(&self) -> RoundState {
        let now = Utc::now();
        let needs_end = {
            let state = self.state.read().await;
            state.status == RoundStatus::Running && state.deadline.is_some_and(|d| now >= d)
        };
        if needs_end {
            let mut state = self.state.write().await;
            if state.status == RoundStatus::Running && state.deadline.is_some_and(|d| now >= d) {
                state.status = RoundStatus::Ended;
                state.deadline = None;
            }
        }
        self.state.read().await.clone()
    }

    pub async fn start(&self) -> RoundSnapshot {
        self.tick().await;
        let mut state = self.state.write().await;
        let now = Utc::now();
        match state.status {
            RoundStatus::Idle | RoundStatus::Ended => {
                state.status = RoundStatus::Running;
                state.deadline = Some(now + self.duration);
                state.remaining_on_pause = None;
            }
            RoundStatus::Running | RoundStatus::Paused => {}
        }
        RoundSnapshot {
            status: state.status,
            deadline: state.deadline,
            remaining: Self::remaining_at(&state, now),
        }
    }

    pub async fn pause(&self) -> Result<RoundSnapshot, RoundError> {
        self.tick().await;
        let mut state = self.state.write().await;
        let now = Utc::now();
        match state.status {
            RoundStatus::Running => {
                let remaining = state
                    .deadline
                    .map(|d| (d - now).to_std().unwrap_or(Duration::ZERO));
                state.status = RoundStatus::Paused;
                state.remaining_on_pause = remaining;
                state.deadline = None;
                Ok(RoundSnapshot {
                    status: state.status,
                    deadline: None,
                    remaining: state.remaining_on_pause,
                })
            }
            RoundStatus::Paused => Ok(RoundSnapshot {
                status: state.status,
                deadline: state.deadline,
                remaining: Self::remaining_at(&state, now),
            }),
            RoundStatus::Idle | RoundStatus::Ended => Err(RoundError::InvalidTransition),
        }
    }

    pub async fn resume(&self) -> Result<RoundSnapshot, RoundError> {
        self.tick().await;
        let mut state = self.state.write().await;
        let now = Utc::now();
        match state.status {
            RoundStatus::Paused => {
                let remaining = state.remaining_on_pause.unwrap_or(self.duration);
                state.status = RoundStatus::Running;
                state.deadline = Some(now + remaining);
                state.remaining_on_pause = None;
                Ok(RoundSnapshot {
                    status: state.status,
                    deadline: state.deadline,
                    remaining: Self::remaining_at(&state, now),
                })
            }
            RoundStatus::Running => Ok(RoundSnapshot {
                status: state.status,
                deadline: state.deadline,
                remaining: Self::remaining_at(&state, now),
            }),
            RoundStatus::Idle | RoundStatus::Ended => Err(RoundError::InvalidTransition),
        }
    }

    pub async fn reset(&self) -> RoundSnapshot {
        let mut state = self.state.write().await;
        *state = RoundState::default();
        RoundSnapshot {
            status: state.status,
            deadline: None,
            remaining: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;

    #[tokio::test]
    async fn start_from_idle_opens_trading() {
        let controller = RoundController::new(Duration::from_secs(1800));
        controller.start().await;
        assert!(controller.is_trading_open(Utc::now()).await);
    }

    #[tokio::test]
    async fn pause_then_resume_preserves_remaining_duration() {
        let controller = RoundController::new(Duration::from_secs(1800));
        controller.start().await;
        let paused = controller.pause().await.unwrap();
        assert_eq!(paused.status, RoundStatus::Paused);
        let remaining = paused.remaining.unwrap();

        let resumed = controller.resume().await.unwrap();
        let new_deadline = resumed.deadline.unwrap();
        let expected = Utc::now() + ChronoDuration::from_std(remaining).unwrap();
        assert!((new_deadline - expected).num_seconds().abs() <= 1);
    }

    #[tokio::test]
    async fn pause_from_idle_is_rejected() {
        let controller = RoundController::new(Duration::from_secs(1800));
        assert!(controller.pause().await.is_err());
    }

    #[tokio::test]
    async fn reset_returns_to_idle() {
        let controller = RoundController::new(Duration::from_secs(1800));
        controller.start().await;
        let snapshot = controller.reset().await;
        assert_eq!(snapshot.status, RoundStatus::Idle);
        assert!(!controller.is_trading_open(Utc::now()).await);
    }
}
