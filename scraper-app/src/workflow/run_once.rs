use std::sync::Arc;

use crate::{
    domain::{RunId, report::ReportEmail},
    ports::{
        browser::BrowserLauncher,
        email::EmailPort,
        report::StockReportRepository,
    },
    workflow::scrape::ScrapeStocksWorkflow,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    Completed { stocks: usize },
    LaunchFailed(String),
    ScrapeFailed(String),
    SaveFailed(String),
    EmailFailed(String),
    Aborted(String),
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Completed { .. })
    }
}

impl std::fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunOutcome::Completed { stocks } => write!(f, "completed with {} stocks", stocks),
            RunOutcome::LaunchFailed(e) => write!(f, "browser launch failed: {}", e),
            RunOutcome::ScrapeFailed(e) => write!(f, "scrape failed: {}", e),
            RunOutcome::SaveFailed(e) => write!(f, "saving report failed: {}", e),
            RunOutcome::EmailFailed(e) => write!(f, "sending report failed: {}", e),
            RunOutcome::Aborted(e) => write!(f, "run aborted: {}", e),
        }
    }
}

#[async_trait::async_trait]
pub trait RunOnceUseCase {
    async fn run_once(&self, run_id: RunId) -> RunOutcome;
}

pub struct RunOnceUseCaseImpl<
    B: BrowserLauncher,
    R: StockReportRepository,
    E: EmailPort,
> {
    browser_launcher: Arc<B>,
    report_repository: Arc<R>,
    email_port: Arc<E>,
    scrape_workflow: ScrapeStocksWorkflow,
    url: String,
    recipient: String,
}

impl<B: BrowserLauncher, R: StockReportRepository, E: EmailPort> RunOnceUseCaseImpl<B, R, E> {
    pub fn new(
        browser_launcher: Arc<B>,
        report_repository: Arc<R>,
        email_port: Arc<E>,
        scrape_workflow: ScrapeStocksWorkflow,
        url: String,
        recipient: String,
    ) -> Self {
        Self {
            browser_launcher,
            report_repository,
            email_port,
            scrape_workflow,
            url,
            recipient,
        }
    }
}

impl<
    B: BrowserLauncher + Send + Sync + 'static,
    R: StockReportRepository + Send + Sync + 'static,
    E: EmailPort + Send + Sync + 'static,
> RunOnceUseCaseImpl<B, R, E>
{
    async fn save(&self, records: Vec<crate::domain::stock::StockRecord>) -> Result<(), String> {
        let repository = self.report_repository.clone();
        tokio::task::spawn_blocking(move || repository.append(&records))
            .await
            .map_err(|e| e.to_string())?
            .map_err(|e| e.to_string())
    }

    async fn email_report(&self) -> Result<(), String> {
        let repository = self.report_repository.clone();
        let email_port = self.email_port.clone();
        let recipient = self.recipient.clone();
        tokio::task::spawn_blocking(move || {
            let attachment = repository.load().map_err(|e| e.to_string())?;
            let report = ReportEmail::for_date(
                chrono::Local::now().date_naive(),
                &repository.file_name(),
                attachment,
            );
            email_port
                .send_report(&recipient, &report)
                .map_err(|e| e.to_string())
        })
        .await
        .map_err(|e| e.to_string())?
    }
}

#[async_trait::async_trait]
impl<
    B: BrowserLauncher + Send + Sync + 'static,
    R: StockReportRepository + Send + Sync + 'static,
    E: EmailPort + Send + Sync + 'static,
> RunOnceUseCase for RunOnceUseCaseImpl<B, R, E>
{
    async fn run_once(&self, run_id: RunId) -> RunOutcome {
        log::info!("Starting scrape run {}", run_id);
        log::info!("Setting up browser session...");
        let session = match self.browser_launcher.launch().await {
            Ok(session) => session,
            Err(e) => {
                log::error!("Failed to set up browser session: {}", e);
                return RunOutcome::LaunchFailed(e.to_string());
            }
        };
        log::info!("Browser session setup successful");

        let scraped = self.scrape_workflow.scrape(&*session, &self.url).await;

        match session.close().await {
            Ok(()) => log::info!("Browser session cleaned up"),
            Err(e) => log::error!("Error cleaning up browser session: {}", e),
        }

        let records = match scraped {
            Ok(records) => records,
            Err(e) => {
                log::error!("No stock data was scraped: {}", e);
                return RunOutcome::ScrapeFailed(e.to_string());
            }
        };
        let stocks = records.len();

        if let Err(e) = self.save(records).await {
            log::error!("Failed to save stock data: {}", e);
            return RunOutcome::SaveFailed(e);
        }
        log::info!(
            "Saved {} stocks to {}",
            stocks,
            self.report_repository.file_name()
        );

        if let Err(e) = self.email_report().await {
            log::error!("Failed to send email: {}", e);
            return RunOutcome::EmailFailed(e);
        }
        log::info!("CSV file sent successfully to {}", self.recipient);
        log::info!("Run {} completed successfully", run_id);

        RunOutcome::Completed { stocks }
    }
}
