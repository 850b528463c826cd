use std::{path::Path, time::Duration};

#[derive(Debug, Clone, thiserror::Error)]
pub enum BrowserError {
    #[error("failed to launch browser: {0}")]
    Launch(String),
    #[error("timed out waiting for {0}")]
    Timeout(String),
    #[error("browser command failed: {0}")]
    Command(String),
}

#[async_trait::async_trait]
pub trait BrowserLauncher {
    async fn launch(&self) -> Result<Box<dyn BrowserSession + Send + Sync>, BrowserError>;
}

/// A live page driven by a headless browser.
#[async_trait::async_trait]
pub trait BrowserSession {
    async fn navigate(&self, url: &str) -> Result<(), BrowserError>;
    async fn scroll_by_viewport(&self) -> Result<(), BrowserError>;
    async fn scroll_to_bottom(&self) -> Result<(), BrowserError>;
    async fn scroll_height(&self) -> Result<i64, BrowserError>;
    /// Cell texts of every populated table body row. Fails with
    /// [`BrowserError::Timeout`] if no row shows up within `timeout`.
    async fn table_rows(&self, timeout: Duration) -> Result<Vec<Vec<String>>, BrowserError>;
    async fn save_screenshot(&self, path: &Path) -> Result<(), BrowserError>;
    async fn close(&self) -> Result<(), BrowserError>;
}
