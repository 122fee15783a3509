use backon::ConstantBuilder;
use reqwest::StatusCode;
use std::time::Duration;

use crate::error::LeonardoError;

/// GraphQL error code the backend returns for an invalid or expired bearer token.
pub const INVALID_JWT_CODE: &str = "invalid-jwt";

/// What the retry loop should do after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryAction {
    /// Retry at once; does not advance the backoff schedule.
    Immediate,
    /// Wait for the next backoff delay, then retry.
    Backoff,
    /// Force a fresh session, wait for the next backoff delay, then retry.
    Reauthenticate,
    /// Give up and surface the error unchanged.
    Fail,
}

impl RetryAction {
    pub fn for_error(err: &LeonardoError) -> Self {
        match err {
            LeonardoError::Transport { timeout: true, .. } => RetryAction::Immediate,
            LeonardoError::UpstreamStatus { status, .. } => Self::for_status(*status),
            LeonardoError::Api { code, .. } if code == INVALID_JWT_CODE => {
                RetryAction::Reauthenticate
            }
            LeonardoError::Api { .. } => RetryAction::Backoff,
            _ => RetryAction::Fail,
        }
    }

    fn for_status(status: StatusCode) -> Self {
        match status {
            StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
            | StatusCode::TOO_MANY_REQUESTS => RetryAction::Backoff,
            _ => RetryAction::Fail,
        }
    }
}

/// Attempt cap and backoff table of the retry loop.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: usize,
    backoff: Vec<Duration>,
}

impl RetryPolicy {
    pub fn new(max_attempts: usize, backoff: Vec<Duration>) -> Self {
        let backoff = if backoff.is_empty() {
            default_backoff()
        } else {
            backoff
        };
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    /// Attempt budget as a backon schedule: one zero-delay slot per retry. The
    /// real wait is chosen per failure from the backoff table.
    pub fn attempt_budget(&self) -> ConstantBuilder {
        ConstantBuilder::default()
            .with_delay(Duration::ZERO)
            .with_max_times(self.max_attempts - 1)
    }

    /// Delay before the `round`-th backoff retry (1-based); clamps to the last entry.
    pub fn backoff_delay(&self, round: usize) -> Duration {
        let idx = round.saturating_sub(1).min(self.backoff.len() - 1);
        self.backoff[idx]
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, default_backoff())
    }
}

fn default_backoff() -> Vec<Duration> {
    vec![
        Duration::from_secs(30),
        Duration::from_secs(60),
        Duration::from_secs(120),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(code: u16) -> LeonardoError {
        LeonardoError::upstream_status(StatusCode::from_u16(code).expect("valid code"), b"")
    }

    fn api(code: &str) -> LeonardoError {
        LeonardoError::Api {
            code: code.to_string(),
            message: "boom".to_string(),
        }
    }

    fn transport(timeout: bool) -> LeonardoError {
        LeonardoError::Transport {
            timeout,
            source: Box::new(std::io::Error::other("net")),
        }
    }

    #[test]
    fn classifies_every_failure_kind() {
        assert_eq!(RetryAction::for_error(&transport(true)), RetryAction::Immediate);
        assert_eq!(RetryAction::for_error(&transport(false)), RetryAction::Fail);

        for code in [429, 502, 503, 504] {
            assert_eq!(
                RetryAction::for_error(&status(code)),
                RetryAction::Backoff,
                "status {code}"
            );
        }
        for code in [400, 401, 403, 404, 500] {
            assert_eq!(
                RetryAction::for_error(&status(code)),
                RetryAction::Fail,
                "status {code}"
            );
        }

        assert_eq!(
            RetryAction::for_error(&api(INVALID_JWT_CODE)),
            RetryAction::Reauthenticate
        );
        assert_eq!(
            RetryAction::for_error(&api("validation-failed")),
            RetryAction::Backoff
        );

        assert_eq!(
            RetryAction::for_error(&LeonardoError::MissingField("x")),
            RetryAction::Fail
        );
        assert_eq!(
            RetryAction::for_error(&LeonardoError::Cancelled),
            RetryAction::Fail
        );
    }

    #[test]
    fn backoff_schedule_clamps_to_last_entry() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff_delay(1), Duration::from_secs(30));
        assert_eq!(policy.backoff_delay(2), Duration::from_secs(60));
        assert_eq!(policy.backoff_delay(3), Duration::from_secs(120));
        assert_eq!(policy.backoff_delay(9), Duration::from_secs(120));
    }

    #[test]
    fn attempt_budget_allows_one_slot_per_retry() {
        use backon::BackoffBuilder;

        let slots: Vec<_> = RetryPolicy::default().attempt_budget().build().collect();
        assert_eq!(slots, vec![Duration::ZERO, Duration::ZERO]);

        let single = RetryPolicy::new(1, Vec::new()).attempt_budget().build().count();
        assert_eq!(single, 0);
    }

    #[test]
    fn empty_table_and_zero_attempts_fall_back() {
        use backon::BackoffBuilder;

        let policy = RetryPolicy::new(0, Vec::new());
        assert_eq!(policy.attempt_budget().build().count(), 0);
        assert_eq!(policy.backoff_delay(1), Duration::from_secs(30));
    }
}
