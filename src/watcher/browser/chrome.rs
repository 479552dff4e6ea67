//! chromiumoxide-backed tab driver. Connects to a running Chromium over
//! CDP or launches its own headless instance.

use super::{CapturedPage, TabDriver, TabHandle};
use crate::constants::{is_dashboard_url, LIGHT_MODE_BLOCKED_URLS};
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::{
    EnableParams as NetworkEnableParams, SetBlockedUrLsParams,
};
use chromiumoxide::cdp::browser_protocol::target::CreateTargetParams;
use chromiumoxide::Page;
use futures::StreamExt;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

pub struct ChromeDriver {
    browser: Browser,
    pages: Mutex<HashMap<u64, Page>>,
    next_id: AtomicU64,
}

impl ChromeDriver {
    /// Launch a headless Chromium owned by this process.
    pub async fn launch() -> AppResult<Self> {
        let config = BrowserConfig::builder()
            .build()
            .map_err(AppError::Browser)?;
        let (browser, mut handler) = Browser::launch(config).await?;
        tokio::spawn(async move { while handler.next().await.is_some() {} });
        Ok(Self::wrap(browser))
    }

    /// Attach to an already-running browser via its websocket endpoint.
    pub async fn connect(ws_url: &str) -> AppResult<Self> {
        let (browser, mut handler) = Browser::connect(ws_url).await?;
        tokio::spawn(async move { while handler.next().await.is_some() {} });
        Ok(Self::wrap(browser))
    }

    fn wrap(browser: Browser) -> Self {
        Self {
            browser,
            pages: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Hands back the existing handle when the target is already tracked,
    /// so repeated reuse of one dashboard tab does not grow the map.
    fn register(&self, page: Page) -> TabHandle {
        let mut pages = self.pages.lock();
        if let Some(id) = pages
            .iter()
            .find(|(_, p)| p.target_id() == page.target_id())
            .map(|(id, _)| *id)
        {
            return TabHandle(id);
        }
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        pages.insert(id, page);
        TabHandle(id)
    }

    fn page(&self, tab: &TabHandle) -> AppResult<Page> {
        self.pages
            .lock()
            .get(&tab.0)
            .cloned()
            .ok_or_else(|| AppError::Browser("tab closed or handle unknown".to_string()))
    }
}

#[async_trait]
impl TabDriver for ChromeDriver {
    async fn find_dashboard_tab(&self) -> AppResult<Option<TabHandle>> {
        for page in self.browser.pages().await? {
            let url = page.url().await?.unwrap_or_default();
            if is_dashboard_url(&url) {
                debug!(url = %url, "Reusing existing dashboard tab");
                return Ok(Some(self.register(page)));
            }
        }
        Ok(None)
    }

    async fn open_background_tab(&self, url: &str) -> AppResult<Option<TabHandle>> {
        let params = CreateTargetParams::builder()
            .url(url)
            .background(true)
            .build()
            .map_err(AppError::Browser)?;
        match self.browser.new_page(params).await {
            Ok(page) => Ok(Some(self.register(page))),
            Err(e) => {
                warn!("Background tab creation failed: {}", e);
                Ok(None)
            }
        }
    }

    async fn current_url(&self, tab: &TabHandle) -> AppResult<String> {
        let page = self.page(tab)?;
        Ok(page.url().await?.unwrap_or_default())
    }

    async fn capture_html(&self, tab: &TabHandle) -> AppResult<CapturedPage> {
        let page = self.page(tab)?;
        let url = page.url().await?.unwrap_or_default();
        let title = page.get_title().await?.unwrap_or_default();
        let html = page.content().await?;
        Ok(CapturedPage { url, title, html })
    }

    async fn install_light_mode(&self, tab: &TabHandle) -> AppResult<()> {
        let page = self.page(tab)?;
        page.execute(NetworkEnableParams::default()).await?;
        let urls: Vec<String> = LIGHT_MODE_BLOCKED_URLS
            .iter()
            .map(|s| s.to_string())
            .collect();
        page.execute(SetBlockedUrLsParams::new(urls)).await?;
        debug!("Light mode installed on tab {}", tab.0);
        Ok(())
    }

    async fn remove_light_mode(&self, tab: &TabHandle) -> AppResult<()> {
        let page = self.page(tab)?;
        page.execute(SetBlockedUrLsParams::new(Vec::<String>::new()))
            .await?;
        Ok(())
    }

    async fn close_tab(&self, tab: &TabHandle) -> AppResult<()> {
        let page = self.pages.lock().remove(&tab.0);
        match page {
            Some(page) => {
                page.close().await?;
                Ok(())
            }
            None => Ok(()),
        }
    }
}
