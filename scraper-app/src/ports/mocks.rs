use std::{
    collections::VecDeque,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
    time::Duration,
};

use crate::{
    domain::{report::ReportEmail, stock::StockRecord},
    ports::{
        browser::{BrowserError, BrowserLauncher, BrowserSession},
        email::{EmailPort, SendEmailError},
        report::{ReportStoreError, StockReportRepository},
    },
};

/// Scripted browser: every `table_rows` call pops the next snapshot and every
/// `scroll_height` call pops the next height, repeating the last one once the
/// script runs out.
#[derive(Clone, Default)]
pub struct MockBrowser {
    pub state: Arc<Mutex<MockBrowserState>>,
}

#[derive(Default)]
pub struct MockBrowserState {
    pub row_snapshots: VecDeque<Result<Vec<Vec<String>>, BrowserError>>,
    pub heights: VecDeque<i64>,
    last_rows: Option<Vec<Vec<String>>>,
    last_height: i64,
    pub fail_launch: bool,
    pub fail_screenshot: bool,
    pub launches: usize,
    pub closes: usize,
    pub navigated: Vec<String>,
    pub viewport_scrolls: usize,
    pub bottom_scrolls: usize,
    pub screenshots: Vec<PathBuf>,
}

#[allow(unused)]
impl MockBrowser {
    pub fn new(
        row_snapshots: Vec<Result<Vec<Vec<String>>, BrowserError>>,
        heights: Vec<i64>,
    ) -> Self {
        let browser = Self::default();
        {
            let mut state = browser.state.lock().unwrap();
            state.row_snapshots = row_snapshots.into();
            state.heights = heights.into();
        }
        browser
    }

    pub fn failing_launch() -> Self {
        let browser = Self::default();
        browser.state.lock().unwrap().fail_launch = true;
        browser
    }

    pub fn launches(&self) -> usize {
        self.state.lock().unwrap().launches
    }

    pub fn closes(&self) -> usize {
        self.state.lock().unwrap().closes
    }

    pub fn screenshots(&self) -> Vec<PathBuf> {
        self.state.lock().unwrap().screenshots.clone()
    }

    pub fn bottom_scrolls(&self) -> usize {
        self.state.lock().unwrap().bottom_scrolls
    }
}

#[async_trait::async_trait]
impl BrowserLauncher for MockBrowser {
    async fn launch(&self) -> Result<Box<dyn BrowserSession + Send + Sync>, BrowserError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_launch {
            return Err(BrowserError::Launch("chromedriver unreachable".to_string()));
        }
        state.launches += 1;
        Ok(Box::new(self.clone()))
    }
}

#[async_trait::async_trait]
impl BrowserSession for MockBrowser {
    async fn navigate(&self, url: &str) -> Result<(), BrowserError> {
        self.state.lock().unwrap().navigated.push(url.to_string());
        Ok(())
    }

    async fn scroll_by_viewport(&self) -> Result<(), BrowserError> {
        self.state.lock().unwrap().viewport_scrolls += 1;
        Ok(())
    }

    async fn scroll_to_bottom(&self) -> Result<(), BrowserError> {
        self.state.lock().unwrap().bottom_scrolls += 1;
        Ok(())
    }

    async fn scroll_height(&self) -> Result<i64, BrowserError> {
        let mut state = self.state.lock().unwrap();
        if let Some(height) = state.heights.pop_front() {
            state.last_height = height;
        }
        Ok(state.last_height)
    }

    async fn table_rows(&self, _timeout: Duration) -> Result<Vec<Vec<String>>, BrowserError> {
        let mut state = self.state.lock().unwrap();
        match state.row_snapshots.pop_front() {
            Some(Ok(rows)) => {
                state.last_rows = Some(rows.clone());
                Ok(rows)
            }
            Some(Err(e)) => Err(e),
            None => state
                .last_rows
                .clone()
                .ok_or_else(|| BrowserError::Timeout("table rows".to_string())),
        }
    }

    async fn save_screenshot(&self, path: &Path) -> Result<(), BrowserError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_screenshot {
            return Err(BrowserError::Command("screenshot failed".to_string()));
        }
        state.screenshots.push(path.to_path_buf());
        Ok(())
    }

    async fn close(&self) -> Result<(), BrowserError> {
        self.state.lock().unwrap().closes += 1;
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct MockEmailPort {
    pub sent: Arc<Mutex<Vec<(String, ReportEmail)>>>,
    pub fail: bool,
}

#[allow(unused)]
impl MockEmailPort {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn get_sent(&self) -> Vec<(String, ReportEmail)> {
        self.sent.lock().unwrap().clone()
    }
}

impl EmailPort for MockEmailPort {
    fn send_report(&self, to: &str, report: &ReportEmail) -> Result<(), SendEmailError> {
        if self.fail {
            return Err(SendEmailError::SendEmailError("535 authentication failed".to_string()));
        }
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), report.clone()));
        Ok(())
    }
}

/// In-memory report store that mimics the header-once append behaviour.
#[derive(Clone, Default)]
pub struct MockReportRepository {
    pub rows: Arc<Mutex<Option<Vec<StockRecord>>>>,
    pub fail_append: bool,
}

#[allow(unused)]
impl MockReportRepository {
    pub fn failing() -> Self {
        Self {
            fail_append: true,
            ..Self::default()
        }
    }

    pub fn stored(&self) -> Vec<StockRecord> {
        self.rows.lock().unwrap().clone().unwrap_or_default()
    }
}

impl StockReportRepository for MockReportRepository {
    fn append(&self, records: &[StockRecord]) -> Result<(), ReportStoreError> {
        if self.fail_append {
            return Err(ReportStoreError::StorageError("disk full".to_string()));
        }
        self.rows
            .lock()
            .unwrap()
            .get_or_insert_with(Vec::new)
            .extend_from_slice(records);
        Ok(())
    }

    fn load(&self) -> Result<Vec<u8>, ReportStoreError> {
        let rows = self.rows.lock().unwrap();
        let Some(rows) = rows.as_ref() else {
            return Err(ReportStoreError::Missing(self.file_name()));
        };
        let mut out = crate::domain::report::CSV_HEADERS.join(",");
        out.push('\n');
        for r in rows {
            out.push_str(&format!(
                "{},{},{},{},{},{},{}\n",
                r.timestamp(),
                r.name,
                r.symbol,
                r.price,
                r.change_percent,
                r.volume,
                r.value
            ));
        }
        Ok(out.into_bytes())
    }

    fn file_name(&self) -> String {
        "dhan_stocks.csv".to_string()
    }
}
