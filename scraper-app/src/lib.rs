use std::{path::PathBuf, sync::Arc};

use tokio::task::JoinHandle;

use crate::{
    domain::{schedule::DailySchedule, scroll::ScrollPolicy},
    ports::{browser::BrowserLauncher, email::EmailPort, report::StockReportRepository},
    processes::daily_runner::DailyScrapeJob,
    workflow::{
        run_once::{RunOnceUseCase, RunOnceUseCaseImpl},
        scrape::ScrapeStocksWorkflow,
        trigger::{TriggerScrapeUseCase, TriggerScrapeUseCaseImpl},
    },
};

pub mod domain;
pub mod ports;
pub mod processes;
pub mod workflow;

pub struct Application {
    pub jobs: Option<JoinHandle<()>>,

    pub run_once_use_case: Arc<dyn RunOnceUseCase + Send + Sync + 'static>,
    pub trigger_scrape_use_case: Arc<dyn TriggerScrapeUseCase + Send + Sync + 'static>,
}

pub struct ScraperSettings {
    pub url: String,
    pub recipient: String,
    pub screenshot_dir: PathBuf,
    pub scroll_policy: ScrollPolicy,
    /// When set, a background job triggers a run every day at this time.
    pub daily_schedule: Option<DailySchedule>,
}

pub fn build_application<
    B: BrowserLauncher + Send + Sync + 'static,
    R: StockReportRepository + Send + Sync + 'static,
    E: EmailPort + Send + Sync + 'static,
>(
    browser_launcher: Arc<B>,
    report_repository: Arc<R>,
    email_port: Arc<E>,
    settings: ScraperSettings,
) -> Application {
    let scrape_workflow = ScrapeStocksWorkflow::new(settings.scroll_policy, settings.screenshot_dir);
    let run_once_use_case = Arc::new(RunOnceUseCaseImpl::new(
        browser_launcher,
        report_repository,
        email_port,
        scrape_workflow,
        settings.url,
        settings.recipient,
    ));
    let trigger_scrape_use_case = Arc::new(TriggerScrapeUseCaseImpl::new(run_once_use_case.clone()));

    let jobs = settings.daily_schedule.map(|schedule| {
        let job = DailyScrapeJob::new(schedule, trigger_scrape_use_case.clone());
        tokio::spawn(async move {
            job.run().await;
        })
    });

    Application {
        jobs,
        run_once_use_case,
        trigger_scrape_use_case,
    }
}
