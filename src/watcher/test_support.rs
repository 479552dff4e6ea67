//! Scriptable tab driver for orchestrator, retry and readiness tests.

use crate::constants::DASHBOARD_URL;
use crate::error::{AppError, AppResult};
use crate::watcher::browser::{CapturedPage, TabDriver, TabHandle};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::time::Duration;

/// A minimal populated dashboard page.
pub(crate) fn ready_page_html() -> String {
    r#"<html><head><title>Console</title></head><body><main>
      <div class="balance-panel">余额 $12.50</div>
      <div class="subscription-card">
        <h3 class="card-title">Pro Plan</h3>
        <div class="info-row"><span class="info-label">剩余额度</span><span class="info-value">$3.20 / $10.00</span></div>
      </div>
      <div class="total-card"><div class="total-label">本月消费</div><div class="total-value">$4.20</div></div>
    </main></body></html>"#
        .to_string()
}

enum CaptureStep {
    Page(CapturedPage),
    Fail(String),
    Panic,
}

pub(crate) struct MockDriver {
    existing_tab: Mutex<Option<TabHandle>>,
    open_succeeds: AtomicBool,
    urls: Mutex<Vec<String>>,
    url_idx: AtomicUsize,
    captures: Mutex<Vec<CaptureStep>>,
    capture_idx: AtomicUsize,
    capture_delay: Mutex<Duration>,

    finds: AtomicU32,
    opens: AtomicU32,
    captures_made: AtomicU32,
    light_installs: AtomicU32,
    light_removals: AtomicU32,
    closes: AtomicU32,
}

impl MockDriver {
    pub(crate) fn new() -> Self {
        Self {
            existing_tab: Mutex::new(None),
            open_succeeds: AtomicBool::new(true),
            urls: Mutex::new(Vec::new()),
            url_idx: AtomicUsize::new(0),
            captures: Mutex::new(Vec::new()),
            capture_idx: AtomicUsize::new(0),
            capture_delay: Mutex::new(Duration::ZERO),
            finds: AtomicU32::new(0),
            opens: AtomicU32::new(0),
            captures_made: AtomicU32::new(0),
            light_installs: AtomicU32::new(0),
            light_removals: AtomicU32::new(0),
            closes: AtomicU32::new(0),
        }
    }

    pub(crate) fn with_existing_tab(self) -> Self {
        *self.existing_tab.lock() = Some(TabHandle(7));
        self
    }

    pub(crate) fn fail_tab_creation(self) -> Self {
        self.open_succeeds.store(false, Ordering::SeqCst);
        self
    }

    /// Script the URL sequence; the last entry repeats forever.
    pub(crate) fn push_urls(&self, urls: &[&str]) {
        self.urls.lock().extend(urls.iter().map(|u| u.to_string()));
    }

    /// Script one captured page; the last scripted step repeats forever.
    pub(crate) fn push_page(&self, url: &str, title: &str, html: &str) {
        self.captures.lock().push(CaptureStep::Page(CapturedPage {
            url: url.to_string(),
            title: title.to_string(),
            html: html.to_string(),
        }));
    }

    pub(crate) fn push_capture_failure(&self, message: &str) {
        self.captures
            .lock()
            .push(CaptureStep::Fail(message.to_string()));
    }

    pub(crate) fn push_capture_panic(&self) {
        self.captures.lock().push(CaptureStep::Panic);
    }

    pub(crate) fn set_capture_delay(&self, delay: Duration) {
        *self.capture_delay.lock() = delay;
    }

    pub(crate) fn find_count(&self) -> u32 {
        self.finds.load(Ordering::SeqCst)
    }

    pub(crate) fn open_count(&self) -> u32 {
        self.opens.load(Ordering::SeqCst)
    }

    pub(crate) fn capture_count(&self) -> u32 {
        self.captures_made.load(Ordering::SeqCst)
    }

    pub(crate) fn light_install_count(&self) -> u32 {
        self.light_installs.load(Ordering::SeqCst)
    }

    pub(crate) fn light_removal_count(&self) -> u32 {
        self.light_removals.load(Ordering::SeqCst)
    }

    pub(crate) fn close_count(&self) -> u32 {
        self.closes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TabDriver for MockDriver {
    async fn find_dashboard_tab(&self) -> AppResult<Option<TabHandle>> {
        self.finds.fetch_add(1, Ordering::SeqCst);
        Ok(*self.existing_tab.lock())
    }

    async fn open_background_tab(&self, _url: &str) -> AppResult<Option<TabHandle>> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        if self.open_succeeds.load(Ordering::SeqCst) {
            Ok(Some(TabHandle(99)))
        } else {
            Ok(None)
        }
    }

    async fn current_url(&self, _tab: &TabHandle) -> AppResult<String> {
        let urls = self.urls.lock();
        if urls.is_empty() {
            return Ok(DASHBOARD_URL.to_string());
        }
        let idx = self.url_idx.fetch_add(1, Ordering::SeqCst);
        Ok(urls[idx.min(urls.len() - 1)].clone())
    }

    async fn capture_html(&self, _tab: &TabHandle) -> AppResult<CapturedPage> {
        let delay = *self.capture_delay.lock();
        if delay > Duration::ZERO {
            tokio::time::sleep(delay).await;
        }
        self.captures_made.fetch_add(1, Ordering::SeqCst);
        let captures = self.captures.lock();
        if captures.is_empty() {
            return Ok(CapturedPage {
                url: DASHBOARD_URL.to_string(),
                title: "Console".to_string(),
                html: ready_page_html(),
            });
        }
        let idx = self.capture_idx.fetch_add(1, Ordering::SeqCst);
        match &captures[idx.min(captures.len() - 1)] {
            CaptureStep::Page(page) => Ok(page.clone()),
            CaptureStep::Fail(message) => Err(AppError::Browser(message.clone())),
            CaptureStep::Panic => panic!("scripted capture panic"),
        }
    }

    async fn install_light_mode(&self, _tab: &TabHandle) -> AppResult<()> {
        self.light_installs.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn remove_light_mode(&self, _tab: &TabHandle) -> AppResult<()> {
        self.light_removals.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn close_tab(&self, _tab: &TabHandle) -> AppResult<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
