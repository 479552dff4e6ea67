//! Message-passing seam between the orchestrator and the browser. The
//! orchestrator only ever sees opaque tab handles and captured page state;
//! everything CDP-shaped lives behind this trait.

pub mod chrome;

use crate::error::AppResult;
use async_trait::async_trait;

pub use chrome::ChromeDriver;

/// Opaque handle to one browser tab managed by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TabHandle(pub u64);

/// A point-in-time capture of a tab's rendered state.
#[derive(Debug, Clone)]
pub struct CapturedPage {
    pub url: String,
    pub title: String,
    pub html: String,
}

#[async_trait]
pub trait TabDriver: Send + Sync {
    /// Look for a tab that is already on the dashboard.
    async fn find_dashboard_tab(&self) -> AppResult<Option<TabHandle>>;

    /// Open a new background tab navigated to `url`. `None` means the
    /// browser accepted the request but produced no usable tab.
    async fn open_background_tab(&self, url: &str) -> AppResult<Option<TabHandle>>;

    /// The tab's current navigation URL (empty until the first commit).
    async fn current_url(&self, tab: &TabHandle) -> AppResult<String>;

    /// Capture URL, title and rendered HTML in one round trip.
    async fn capture_html(&self, tab: &TabHandle) -> AppResult<CapturedPage>;

    /// Block heavy subresources on this tab. Safe to call repeatedly.
    async fn install_light_mode(&self, tab: &TabHandle) -> AppResult<()>;

    /// Undo `install_light_mode`. Safe to call even if it was never installed.
    async fn remove_light_mode(&self, tab: &TabHandle) -> AppResult<()>;

    async fn close_tab(&self, tab: &TabHandle) -> AppResult<()>;
}
