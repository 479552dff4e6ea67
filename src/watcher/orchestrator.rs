//! The refresh orchestrator: one rate-limited, deduplicated operation that
//! drives a tab to the dashboard, extracts a snapshot and persists the
//! outcome. No failure escapes this boundary; every path writes exactly
//! one last-error record or clears it.

use crate::constants::DASHBOARD_URL;
use crate::models::{ErrorCode, LastError, RefreshOutcome};
use crate::modules::permissions::PermissionGate;
use crate::modules::storage::Store;
use crate::watcher::browser::{TabDriver, TabHandle};
use crate::watcher::extract::{ExtractError, PageModel};
use crate::watcher::rate_limit::RateGate;
use crate::watcher::readiness::wait_for_dashboard_url;
use crate::watcher::retry::extract_with_retry;
use crate::watcher::RefreshTuning;
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

type SharedRefresh = Shared<BoxFuture<'static, RefreshOutcome>>;

pub struct RefreshOrchestrator {
    driver: Arc<dyn TabDriver>,
    model: Arc<dyn PageModel>,
    store: Arc<Store>,
    gate: PermissionGate,
    rate: RateGate,
    tuning: RefreshTuning,
    in_flight: Mutex<Option<SharedRefresh>>,
}

impl RefreshOrchestrator {
    pub fn new(
        driver: Arc<dyn TabDriver>,
        model: Arc<dyn PageModel>,
        store: Arc<Store>,
        gate: PermissionGate,
        tuning: RefreshTuning,
    ) -> Arc<Self> {
        Arc::new(Self {
            driver,
            model,
            store,
            gate,
            rate: RateGate::new(),
            tuning,
            in_flight: Mutex::new(None),
        })
    }

    /// Milliseconds until the next attempt is admitted, for callers that
    /// want to self-throttle.
    pub fn next_allowed_in_ms(&self) -> Option<u64> {
        self.rate.remaining().map(|d| d.as_millis() as u64)
    }

    /// Deduplicated entry point: while one refresh is in flight, every
    /// caller joins it and observes the identical outcome.
    pub async fn refresh(self: &Arc<Self>, reason: &str) -> RefreshOutcome {
        let fut = {
            let mut guard = self.in_flight.lock();
            match guard.as_ref() {
                Some(existing) => {
                    debug!(reason, "Refresh already in flight, joining");
                    existing.clone()
                }
                None => {
                    let this = Arc::clone(self);
                    let reason = reason.to_string();
                    // spawned so the operation runs to completion even if
                    // every caller goes away; the slot guard clears on any
                    // exit, panic included
                    let task = tokio::spawn(async move {
                        let _slot = InFlightSlot(Arc::clone(&this));
                        this.run_refresh(&reason).await
                    });
                    let fut = async move {
                        match task.await {
                            Ok(outcome) => outcome,
                            Err(e) => RefreshOutcome::failure(LastError::new(
                                "internal",
                                ErrorCode::RefreshException,
                                Some(Value::String(e.to_string())),
                            )),
                        }
                    }
                    .boxed()
                    .shared();
                    *guard = Some(fut.clone());
                    fut
                }
            }
        };
        fut.await
    }

    async fn run_refresh(&self, reason: &str) -> RefreshOutcome {
        let started = Instant::now();
        info!(reason, "Refresh started");

        if let Err(wait) = self.rate.try_begin(self.tuning.min_gap) {
            return self.fail(LastError::new(
                reason,
                ErrorCode::RateLimitedLocal,
                Some(json!({ "retry_in_ms": wait.as_millis() as u64 })),
            ));
        }

        if !self.gate.granted(DASHBOARD_URL) {
            return self.fail(LastError::new(
                reason,
                ErrorCode::MissingHostPermission,
                None,
            ));
        }

        let (tab, temporary) = match self.acquire_tab().await {
            Ok(Some(pair)) => pair,
            Ok(None) => {
                return self.fail(LastError::new(reason, ErrorCode::TabCreateFailed, None))
            }
            Err(e) => {
                return self.fail(LastError::new(
                    reason,
                    ErrorCode::RefreshException,
                    Some(Value::String(e.to_string())),
                ))
            }
        };

        if temporary {
            if let Err(e) = self.driver.install_light_mode(&tab).await {
                warn!("Light-mode install failed, continuing without it: {}", e);
            }
        }

        let outcome = self.run_core(reason, &tab).await;
        self.cleanup(&tab, temporary).await;

        info!(
            reason,
            ok = outcome.ok,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Refresh finished"
        );
        outcome
    }

    /// Readiness wait, settle delay and retry-driven extraction. Transport
    /// errors surface here as `refresh_exception`.
    async fn run_core(&self, reason: &str, tab: &TabHandle) -> RefreshOutcome {
        let result = async {
            wait_for_dashboard_url(self.driver.as_ref(), tab, self.tuning.readiness).await?;
            sleep(self.tuning.settle_delay).await;
            extract_with_retry(
                self.driver.as_ref(),
                tab,
                self.model.as_ref(),
                &self.tuning,
            )
            .await
        }
        .await;

        match result {
            Ok(Ok(snapshot)) => {
                if let Err(e) = self.store.record_success(&snapshot) {
                    return self.fail(LastError::new(
                        reason,
                        ErrorCode::RefreshException,
                        Some(Value::String(e.to_string())),
                    ));
                }
                RefreshOutcome::success(snapshot)
            }
            Ok(Err(extract_err)) => {
                if extract_err == ExtractError::TooManyRequests {
                    self.rate
                        .raise_to(Instant::now() + self.tuning.remote_cooldown);
                    warn!(
                        "Dashboard reported too many requests, cooling down for {:?}",
                        self.tuning.remote_cooldown
                    );
                }
                self.fail(LastError::new(
                    reason,
                    ErrorCode::ExtractFailed,
                    Some(extract_err.as_detail()),
                ))
            }
            Err(e) => self.fail(LastError::new(
                reason,
                ErrorCode::RefreshException,
                Some(Value::String(e.to_string())),
            )),
        }
    }

    async fn acquire_tab(&self) -> crate::error::AppResult<Option<(TabHandle, bool)>> {
        if let Some(tab) = self.driver.find_dashboard_tab().await? {
            return Ok(Some((tab, false)));
        }
        match self.driver.open_background_tab(DASHBOARD_URL).await {
            Ok(Some(tab)) => Ok(Some((tab, true))),
            Ok(None) => Ok(None),
            Err(e) => {
                warn!("Tab creation errored: {}", e);
                Ok(None)
            }
        }
    }

    /// Best-effort teardown; never outranks the primary result.
    async fn cleanup(&self, tab: &TabHandle, temporary: bool) {
        if !temporary {
            return;
        }
        if let Err(e) = self.driver.remove_light_mode(tab).await {
            debug!("Light-mode removal failed: {}", e);
        }
        if self.store.prefs().close_temp_tab {
            if let Err(e) = self.driver.close_tab(tab).await {
                debug!("Temp tab close failed: {}", e);
            }
        }
    }

    fn fail(&self, error: LastError) -> RefreshOutcome {
        if let Err(e) = self.store.record_error(&error) {
            warn!("Failed to persist last error: {}", e);
        }
        warn!(code = ?error.code, reason = %error.reason, "Refresh failed");
        RefreshOutcome::failure(error)
    }
}

/// Clears the in-flight slot when the refresh task settles, whether it
/// returned or panicked.
struct InFlightSlot(Arc<RefreshOrchestrator>);

impl Drop for InFlightSlot {
    fn drop(&mut self) {
        self.0.in_flight.lock().take();
    }
}
