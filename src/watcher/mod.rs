pub mod browser;
pub mod extract;
pub mod orchestrator;
pub mod rate_limit;
pub mod readiness;
pub mod retry;
pub mod routes;
pub mod server;

#[cfg(test)]
pub(crate) mod test_support;

use crate::constants;
use self::readiness::WaitParams;
use std::time::Duration;

/// Every timing knob of a refresh in one place, so tests can shrink them
/// and the defaults stay in `constants`.
#[derive(Debug, Clone)]
pub struct RefreshTuning {
    pub min_gap: Duration,
    pub remote_cooldown: Duration,
    pub readiness: WaitParams,
    pub settle_delay: Duration,
    pub container_wait: WaitParams,
    pub capture_retry_attempts: u32,
    pub capture_retry_step: Duration,
    pub not_ready_retry_attempts: u32,
    pub not_ready_retry_step: Duration,
}

impl Default for RefreshTuning {
    fn default() -> Self {
        Self {
            min_gap: constants::MIN_REFRESH_GAP,
            remote_cooldown: constants::REMOTE_RATE_LIMIT_COOLDOWN,
            readiness: WaitParams {
                timeout: constants::READINESS_TIMEOUT,
                interval: constants::READINESS_POLL,
            },
            settle_delay: constants::SETTLE_DELAY,
            container_wait: WaitParams {
                timeout: constants::CONTAINER_WAIT_TIMEOUT,
                interval: constants::CONTAINER_POLL,
            },
            capture_retry_attempts: constants::CAPTURE_RETRY_ATTEMPTS,
            capture_retry_step: constants::CAPTURE_RETRY_STEP,
            not_ready_retry_attempts: constants::NOT_READY_RETRY_ATTEMPTS,
            not_ready_retry_step: constants::NOT_READY_RETRY_STEP,
        }
    }
}

#[cfg(test)]
impl RefreshTuning {
    /// Same budgets, millisecond-scale waits.
    pub(crate) fn for_tests() -> Self {
        Self {
            min_gap: Duration::from_millis(2500),
            remote_cooldown: Duration::from_millis(65_000),
            readiness: WaitParams {
                timeout: Duration::from_millis(400),
                interval: Duration::from_millis(50),
            },
            settle_delay: Duration::from_millis(10),
            container_wait: WaitParams {
                timeout: Duration::from_millis(400),
                interval: Duration::from_millis(50),
            },
            ..Self::default()
        }
    }
}
