use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;

/// The round lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RoundStatus {
    Idle,
    Running,
    Paused,
    Ended,
}

/// Singleton round state, owned exclusively by the Round Controller.
#[derive(Debug, Clone)]
pub struct RoundState {
    pub status: RoundStatus,
    pub deadline: Option<DateTime<Utc>>,
    pub remaining_on_pause: Option<Duration>,
}

impl Default for RoundState {
    fn default() -> Self {
        Self {
            status: RoundStatus::Idle,
            deadline: None,
            remaining_on_pause: None,
        }
    }
}

impl RoundState {
    /// True only when RUNNING and the deadline has not yet passed. Does
    /// not mutate state — a separate tick advances RUNNING -> ENDED when
    /// the deadline elapses.
    pub fn is_trading_open(&self, now: DateTime<Utc>) -> bool {
        self.status == RoundStatus::Running && self.deadline.is_some_and(|d| now < d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;

    #[test]
    fn idle_is_never_open() {
        let state = RoundState::default();
        assert!(!state.is_trading_open(Utc::now()));
    }

    #[test]
    fn running_before_deadline_is_open() {
        let now = Utc::now();
        let state = RoundState {
            status: RoundStatus::Running,
            deadline: Some(now + ChronoDuration::seconds(10)),
            remaining_on_pause: None,
        };
        assert!(state.is_trading_open(now));
    }

    #[test]
    fn running_past_deadline_is_closed() {
        let now = Utc::now();
        let state = RoundState {
            status: RoundStatus::Running,
            deadline: Some(now - ChronoDuration::seconds(1)),
            remaining_on_pause: None,
        };
        assert!(!state.is_trading_open(now));
    }
}
