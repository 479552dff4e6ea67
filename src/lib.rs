pub mod constants;
pub mod error;
pub mod models;
pub mod modules;
pub mod watcher;

use crate::error::{AppError, AppResult};
use crate::modules::permissions::PermissionGate;
use crate::modules::scheduler::AlarmSync;
use crate::modules::storage::Store;
use crate::watcher::browser::{ChromeDriver, TabDriver};
use crate::watcher::extract::{ConsoleV1, PageModel};
use crate::watcher::orchestrator::RefreshOrchestrator;
use crate::watcher::routes::AppState;
use crate::watcher::RefreshTuning;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

fn resolve_data_dir() -> AppResult<PathBuf> {
    if let Ok(dir) = std::env::var("RIGHTWATCH_DATA_DIR") {
        if !dir.trim().is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    dirs::data_dir()
        .map(|d| d.join("rightwatch"))
        .ok_or_else(|| AppError::Config("no data directory available".to_string()))
}

fn resolve_bind() -> (String, u16) {
    let host = std::env::var("RIGHTWATCH_HOST")
        .ok()
        .filter(|h| !h.trim().is_empty())
        .unwrap_or_else(|| constants::DEFAULT_HOST.to_string());
    let port = std::env::var("RIGHTWATCH_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(constants::DEFAULT_PORT);
    (host, port)
}

async fn build_driver() -> AppResult<Arc<dyn TabDriver>> {
    match std::env::var("RIGHTWATCH_CDP_URL") {
        Ok(ws) if !ws.trim().is_empty() => {
            info!("Attaching to existing browser at {}", ws);
            Ok(Arc::new(ChromeDriver::connect(ws.trim()).await?))
        }
        _ => {
            info!("Launching headless browser");
            Ok(Arc::new(ChromeDriver::launch().await?))
        }
    }
}

pub async fn run() -> AppResult<()> {
    let data_dir = resolve_data_dir()?;
    modules::logger::init_logger(&data_dir);
    info!("Data directory: {}", data_dir.display());

    let store = Arc::new(Store::new(data_dir)?);
    let driver = build_driver().await?;
    let model: Arc<dyn PageModel> = Arc::new(ConsoleV1);
    let orchestrator = RefreshOrchestrator::new(
        driver,
        model,
        Arc::clone(&store),
        PermissionGate::default(),
        RefreshTuning::default(),
    );
    let alarm = Arc::new(AlarmSync::new(Arc::clone(&store), Arc::clone(&orchestrator)));
    alarm.sync();

    let (host, port) = resolve_bind();
    let state = AppState {
        orchestrator,
        store,
        alarm,
    };
    watcher::server::serve(state, &host, port).await
}
