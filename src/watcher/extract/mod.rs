//! DOM extraction: capture the tab's rendered HTML and turn it into a
//! structured snapshot, re-capturing while the main container has not
//! appeared yet.

pub mod console_v1;
pub mod page_model;
pub mod text;

pub use console_v1::ConsoleV1;
pub use page_model::{ExtractError, PageModel, PageProbe};

use crate::error::AppResult;
use crate::models::DashboardSnapshot;
use crate::watcher::browser::{TabDriver, TabHandle};
use crate::watcher::readiness::WaitParams;
use tokio::time::{sleep, Instant};
use tracing::debug;

/// One extraction pass: capture and classify the page, re-capturing on a
/// fixed interval until the content container shows up or the wait runs
/// out. Auth and rate-limit signatures short-circuit immediately; they are
/// re-checked on the final capture before falling back to `main_not_found`.
pub async fn extract_once(
    driver: &dyn TabDriver,
    tab: &TabHandle,
    model: &dyn PageModel,
    container_wait: WaitParams,
) -> AppResult<Result<DashboardSnapshot, ExtractError>> {
    let deadline = Instant::now() + container_wait.timeout;
    loop {
        let page = driver.capture_html(tab).await?;
        match model.probe(&page.url, &page.html) {
            PageProbe::LoginPage => return Ok(Err(ExtractError::AuthRequired)),
            PageProbe::RateLimited => return Ok(Err(ExtractError::TooManyRequests)),
            PageProbe::Ready => return Ok(model.parse(&page.url, &page.title, &page.html)),
            PageProbe::MainMissing => {
                if Instant::now() >= deadline {
                    debug!("Content container never appeared");
                    return Ok(Err(ExtractError::MainNotFound));
                }
                sleep(container_wait.interval).await;
            }
        }
    }
}
