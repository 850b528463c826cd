use std::sync::Arc;

use axum::{Router, routing::get};
use log::info;
use scraper_app::workflow::trigger::TriggerScrapeUseCase;

mod scrape;

#[derive(Clone)]
pub struct AppState {
    pub trigger: Arc<dyn TriggerScrapeUseCase + Send + Sync + 'static>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(scrape::home))
        .route("/trigger-scrape", get(scrape::trigger_scrape))
        .route("/status", get(scrape::status))
        .with_state(state)
}

pub async fn run(
    trigger: Arc<dyn TriggerScrapeUseCase + Send + Sync + 'static>,
    port: u16,
    shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;

    info!("API server listening on port {}", port);
    axum::serve(listener, router(AppState { trigger }))
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("HTTP API shut down gracefully");
    Ok(())
}
