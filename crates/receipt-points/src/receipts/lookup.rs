use std::time::Duration;

use crate::config::ScoringConfig;

use super::domain::ScoreState;
use super::repository::ReceiptEntry;

/// Bounded polling schedule for reading a score that may still be computing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Number of times the score is checked, including the first check.
    pub attempts: u32,
    pub interval: Duration,
    /// Upper bound on the whole wait, whatever `attempts` allows.
    pub deadline: Duration,
}

impl PollPolicy {
    pub fn new(attempts: u32, interval: Duration, deadline: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            interval,
            deadline,
        }
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::from(&ScoringConfig::default())
    }
}

impl From<&ScoringConfig> for PollPolicy {
    fn from(config: &ScoringConfig) -> Self {
        Self::new(
            config.poll_attempts,
            config.poll_interval,
            config.poll_deadline,
        )
    }
}

/// Re-reads `entry` until its score settles, the attempts run out, or `deadline` passes.
///
/// Returns the last observed state, which is still `Pending` when the wait gave up.
pub(crate) async fn await_settled(
    entry: &ReceiptEntry,
    policy: &PollPolicy,
    deadline: Duration,
) -> ScoreState {
    let poll = async {
        let mut state = entry.score_state();
        for _ in 1..policy.attempts {
            if state.is_settled() {
                break;
            }
            tokio::time::sleep(policy.interval).await;
            state = entry.score_state();
        }
        state
    };

    match tokio::time::timeout(deadline, poll).await {
        Ok(state) => state,
        Err(_) => entry.score_state(),
    }
}
