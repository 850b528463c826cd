use std::path::PathBuf;

use crate::{
    domain::{
        scroll::{HeightCheck, ScrollPolicy, ScrollTracker, StopReason},
        stock::{StockCollector, StockRecord},
    },
    ports::browser::{BrowserError, BrowserSession},
};

#[derive(Debug, Clone, thiserror::Error)]
pub enum ScrapeError {
    #[error("no stock data could be extracted")]
    NoData,
    #[error(transparent)]
    Browser(#[from] BrowserError),
}

/// Walks the lazily loaded stock table by scrolling until the page stops
/// growing or stops yielding new names.
pub struct ScrapeStocksWorkflow {
    policy: ScrollPolicy,
    screenshot_dir: PathBuf,
}

impl ScrapeStocksWorkflow {
    pub fn new(policy: ScrollPolicy, screenshot_dir: PathBuf) -> Self {
        Self {
            policy,
            screenshot_dir,
        }
    }

    pub async fn scrape(
        &self,
        session: &(dyn BrowserSession + Send + Sync),
        url: &str,
    ) -> Result<Vec<StockRecord>, ScrapeError> {
        log::info!("Navigating to {}", url);
        session.navigate(url).await?;
        tokio::time::sleep(self.policy.initial_wait).await;

        let mut tracker = ScrollTracker::new(self.policy.clone());
        let mut collector = StockCollector::new();
        let mut attempt = 0usize;

        let reason = loop {
            if !tracker.should_continue() {
                break StopReason::StalledTooLong;
            }
            attempt += 1;
            log::info!("Scroll attempt {}", attempt);

            for _ in 0..self.policy.passes_per_attempt {
                session.scroll_by_viewport().await?;
                tokio::time::sleep(self.policy.pass_settle).await;
            }

            let rows = match session.table_rows(self.policy.row_wait).await {
                Ok(rows) => rows,
                Err(e) => {
                    log::error!("Error waiting for table rows: {}", e);
                    break StopReason::NoRows;
                }
            };
            if rows.is_empty() {
                log::error!("Could not find stock table rows");
                break StopReason::NoRows;
            }
            log::info!("Found {} stock rows", rows.len());

            let scraped_at = chrono::Local::now().naive_local();
            for cells in &rows {
                collector.collect_row(cells, scraped_at);
            }

            let count = collector.len();
            if let Some(reason) = tracker.record_rows(count) {
                log::info!("No new data found after multiple attempts, assuming end of list");
                break reason;
            }

            let height = session.scroll_height().await?;
            if tracker.record_height(height) == HeightCheck::ConfirmEnd {
                session.scroll_to_bottom().await?;
                tokio::time::sleep(self.policy.bottom_wait).await;
                if session.scroll_height().await? == height {
                    log::info!("Reached the end of the list");
                    break StopReason::EndOfList;
                }
            }

            if tracker.should_screenshot(count) {
                let path = self
                    .screenshot_dir
                    .join(format!("scroll_{}_stocks.png", count));
                if let Err(e) = session.save_screenshot(&path).await {
                    log::warn!("Failed to save screenshot {}: {}", path.display(), e);
                }
            }

            tracker.finish_attempt(height);
            log::info!("Total stocks collected so far: {}", count);
            tokio::time::sleep(self.policy.attempt_pause).await;
        };

        log::debug!("Scrolling stopped: {:?}", reason);
        if collector.is_empty() {
            log::error!("No stock data could be extracted");
            return Err(ScrapeError::NoData);
        }
        log::info!("Successfully extracted {} stocks", collector.len());
        Ok(collector.into_records())
    }
}
