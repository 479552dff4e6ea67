//! Bounded wait for a provisioned tab to land on the dashboard URL.

use crate::constants::is_dashboard_url;
use crate::error::{AppError, AppResult};
use crate::watcher::browser::{TabDriver, TabHandle};
use std::time::Duration;
use tokio::time::{sleep, Instant};

/// Explicit timeout/interval pair for polling waits.
#[derive(Debug, Clone, Copy)]
pub struct WaitParams {
    pub timeout: Duration,
    pub interval: Duration,
}

/// Poll the tab's URL until it matches the dashboard, or time out.
pub async fn wait_for_dashboard_url(
    driver: &dyn TabDriver,
    tab: &TabHandle,
    params: WaitParams,
) -> AppResult<String> {
    let deadline = Instant::now() + params.timeout;
    loop {
        let url = driver.current_url(tab).await?;
        if is_dashboard_url(&url) {
            return Ok(url);
        }
        if Instant::now() >= deadline {
            return Err(AppError::Timeout(format!(
                "dashboard navigation (last url: {})",
                if url.is_empty() { "<none>" } else { &url }
            )));
        }
        sleep(params.interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::watcher::test_support::MockDriver;

    fn fast_wait() -> WaitParams {
        WaitParams {
            timeout: Duration::from_millis(500),
            interval: Duration::from_millis(50),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_resolves_once_url_matches() {
        let driver = MockDriver::new();
        driver.push_urls(&["about:blank", "about:blank", "https://right.codes/console"]);
        let tab = TabHandle(1);
        let url = wait_for_dashboard_url(&driver, &tab, fast_wait())
            .await
            .unwrap();
        assert_eq!(url, "https://right.codes/console");
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out_when_url_never_matches() {
        let driver = MockDriver::new();
        driver.push_urls(&["about:blank"]);
        let tab = TabHandle(1);
        let err = wait_for_dashboard_url(&driver, &tab, fast_wait())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Timed out"));
    }
}
