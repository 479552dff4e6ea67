//! Two bounded retry layers around extraction: transient capture failures
//! (frame loss while the page reloads itself) and "not ready yet" results.

use crate::error::AppResult;
use crate::models::DashboardSnapshot;
use crate::watcher::browser::{TabDriver, TabHandle};
use crate::watcher::extract::{extract_once, ExtractError, PageModel};
use crate::watcher::RefreshTuning;
use tokio::time::sleep;
use tracing::debug;

/// Failure signatures that mean the frame/tab vanished mid-capture and the
/// capture is worth repeating as-is.
const TRANSIENT_CAPTURE_SIGNATURES: &[&str] = &[
    "frame was removed",
    "no such frame",
    "frame with the given id",
    "tab closed",
    "target closed",
    "session closed",
    "page closed",
    "cannot access",
    "not attached",
];

pub fn is_transient_capture_error(message: &str) -> bool {
    let lower = message.to_lowercase();
    TRANSIENT_CAPTURE_SIGNATURES.iter().any(|s| lower.contains(s))
}

async fn extract_with_capture_retry(
    driver: &dyn TabDriver,
    tab: &TabHandle,
    model: &dyn PageModel,
    tuning: &RefreshTuning,
) -> AppResult<Result<DashboardSnapshot, ExtractError>> {
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        match extract_once(driver, tab, model, tuning.container_wait).await {
            Ok(result) => return Ok(result),
            Err(e) => {
                let message = e.to_string();
                if attempt < tuning.capture_retry_attempts && is_transient_capture_error(&message) {
                    debug!(attempt, "Transient capture failure, retrying: {}", message);
                    sleep(tuning.capture_retry_step * attempt).await;
                } else {
                    return Err(e);
                }
            }
        }
    }
}

/// Full retry-driven extraction. Capture failures that do not match the
/// transient set, or that outlive the attempt budget, propagate as errors;
/// "not ready" results are returned as-is once their budget is spent.
pub async fn extract_with_retry(
    driver: &dyn TabDriver,
    tab: &TabHandle,
    model: &dyn PageModel,
    tuning: &RefreshTuning,
) -> AppResult<Result<DashboardSnapshot, ExtractError>> {
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        let result = extract_with_capture_retry(driver, tab, model, tuning).await?;
        match &result {
            Err(e) if e.is_not_ready() && attempt < tuning.not_ready_retry_attempts => {
                debug!(attempt, "Extraction not ready ({}), retrying", e);
                sleep(tuning.not_ready_retry_step * attempt).await;
            }
            _ => return Ok(result),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::watcher::extract::ConsoleV1;
    use crate::watcher::test_support::{ready_page_html, MockDriver};

    fn fast_tuning() -> RefreshTuning {
        RefreshTuning::for_tests()
    }

    #[test]
    fn test_transient_signature_matching() {
        assert!(is_transient_capture_error("Frame was removed during call"));
        assert!(is_transient_capture_error("No such frame: 12"));
        assert!(is_transient_capture_error("tab closed or handle unknown"));
        assert!(!is_transient_capture_error("connection refused"));
        assert!(!is_transient_capture_error("invalid parameters"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_failures_retried_until_success() {
        let driver = MockDriver::new();
        driver.push_capture_failure("no such frame");
        driver.push_capture_failure("frame was removed");
        driver.push_page("https://right.codes/console", "Console", &ready_page_html());
        let result = extract_with_retry(&driver, &TabHandle(1), &ConsoleV1, &fast_tuning())
            .await
            .unwrap();
        assert!(result.is_ok());
        assert_eq!(driver.capture_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_transient_failure_raises_immediately() {
        let driver = MockDriver::new();
        driver.push_capture_failure("connection refused");
        driver.push_page("https://right.codes/console", "Console", &ready_page_html());
        let err = extract_with_retry(&driver, &TabHandle(1), &ConsoleV1, &fast_tuning())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("connection refused"));
        assert_eq!(driver.capture_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_budget_exhaustion_reraises_last_error() {
        let driver = MockDriver::new();
        for _ in 0..8 {
            driver.push_capture_failure("target closed");
        }
        let tuning = fast_tuning();
        let err = extract_with_retry(&driver, &TabHandle(1), &ConsoleV1, &tuning)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("target closed"));
        assert_eq!(driver.capture_count(), tuning.capture_retry_attempts);
    }

    #[tokio::test(start_paused = true)]
    async fn test_not_ready_retried_then_returned_unthrown() {
        let driver = MockDriver::new();
        // main container present but no data, on every capture
        driver.push_page(
            "https://right.codes/console",
            "Console",
            "<html><body><main><div>loading</div></main></body></html>",
        );
        let tuning = fast_tuning();
        let result = extract_with_retry(&driver, &TabHandle(1), &ConsoleV1, &tuning)
            .await
            .unwrap();
        assert_eq!(result, Err(ExtractError::DashboardDataNotReady));
        assert_eq!(driver.capture_count(), tuning.not_ready_retry_attempts);
    }

    #[tokio::test(start_paused = true)]
    async fn test_auth_required_not_retried() {
        let driver = MockDriver::new();
        driver.push_page("https://right.codes/login", "Login", "<html></html>");
        let result = extract_with_retry(&driver, &TabHandle(1), &ConsoleV1, &fast_tuning())
            .await
            .unwrap();
        assert_eq!(result, Err(ExtractError::AuthRequired));
        assert_eq!(driver.capture_count(), 1);
    }
}
