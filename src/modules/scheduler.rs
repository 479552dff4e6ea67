//! Periodic refresh trigger. `sync` reconciles the running timer with the
//! stored preferences: clear it, then reinstall it only when auto refresh
//! is enabled with a sane interval.

use crate::modules::storage::Store;
use crate::watcher::orchestrator::RefreshOrchestrator;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

pub struct AlarmSync {
    store: Arc<Store>,
    orchestrator: Arc<RefreshOrchestrator>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl AlarmSync {
    pub fn new(store: Arc<Store>, orchestrator: Arc<RefreshOrchestrator>) -> Self {
        Self {
            store,
            orchestrator,
            task: Mutex::new(None),
        }
    }

    /// Invoked at startup and whenever scheduling preferences change.
    pub fn sync(&self) {
        let mut guard = self.task.lock();
        if let Some(task) = guard.take() {
            task.abort();
        }

        let prefs = self.store.prefs();
        if !prefs.schedule_enabled() {
            info!("Auto refresh disabled, periodic trigger cleared");
            return;
        }

        let period = Duration::from_secs_f64(prefs.refresh_minutes * 60.0);
        info!(minutes = prefs.refresh_minutes, "Periodic refresh installed");
        let orchestrator = Arc::clone(&self.orchestrator);
        *guard = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // the immediate first tick; scheduling starts one period out
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let outcome = orchestrator.refresh("alarm").await;
                debug!(ok = outcome.ok, "Alarm refresh completed");
            }
        }));
    }
}

impl Drop for AlarmSync {
    fn drop(&mut self) {
        if let Some(task) = self.task.lock().take() {
            task.abort();
        }
    }
}
