use crate::error::AppResult;
use crate::watcher::routes::{build_router, AppState};
use tracing::info;

pub async fn serve(state: AppState, host: &str, port: u16) -> AppResult<()> {
    let router = build_router(state);
    let listener = tokio::net::TcpListener::bind((host, port)).await?;
    info!("Command surface listening on http://{}:{}", host, port);
    axum::serve(listener, router).await?;
    Ok(())
}
