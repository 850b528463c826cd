use std::{process::ExitCode, sync::Arc, time::Duration};

use log::info;
use scraper_app::{
    Application, ScraperSettings, build_application,
    domain::{RunId, scroll::ScrollPolicy},
};
use scraper_browser_fantoccini::{ChromeSettings, FantocciniBrowserLauncher};
use scraper_email_lettre::{EmailSetupError, LettreEmailAdapter, SmtpSettings};
use scraper_report_csv::CsvReportRepository;

use crate::{
    config::{AppConfig, ConfigError},
    logs::LogInitError,
};

mod config;
mod logs;

const USAGE: &str = "Usage: dhan-scraper [run-once|serve]";

#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("logger error: {0}")]
    Logger(#[from] LogInitError),
    #[error("email setup error: {0}")]
    Email(#[from] EmailSetupError),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    RunOnce,
    Serve,
}

impl Mode {
    fn from_args(args: &[String]) -> Option<Self> {
        match args.get(1).map(|s| s.as_str()) {
            None | Some("run-once") => Some(Mode::RunOnce),
            Some("serve") => Some(Mode::Serve),
            Some(_) => None,
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received. Preparing graceful exit...");
}

fn build(config: &AppConfig, mode: Mode) -> Result<Application, StartupError> {
    let scroll_policy = ScrollPolicy::default();

    let browser_launcher = Arc::new(FantocciniBrowserLauncher::new(ChromeSettings {
        webdriver_url: config.webdriver_url.clone(),
        chrome_binary: config.chrome_binary.clone(),
        implicit_wait: scroll_policy.implicit_wait,
        row_settle: Duration::from_millis(500),
    }));
    let report_repository = Arc::new(CsvReportRepository::new(config.csv_file.clone()));
    let email_adapter = Arc::new(LettreEmailAdapter::new(SmtpSettings {
        host: config.smtp_host.clone(),
        port: config.smtp_port,
        username: config.sender_email.clone(),
        password: config.email_password.clone(),
    })?);

    let daily_schedule = match mode {
        Mode::Serve => config.daily_schedule,
        Mode::RunOnce => None,
    };

    Ok(build_application(
        browser_launcher,
        report_repository,
        email_adapter,
        ScraperSettings {
            url: config.scraper_url.clone(),
            recipient: config.recipient_email.clone(),
            screenshot_dir: config.screenshot_dir.clone(),
            scroll_policy,
            daily_schedule,
        },
    ))
}

async fn start(mode: Mode) -> Result<ExitCode, StartupError> {
    let config = AppConfig::from_env()?;
    logs::init_logger(&config.log_file, &config.log_archive_pattern)?;
    let app = build(&config, mode)?;

    match mode {
        Mode::RunOnce => {
            let outcome = app.run_once_use_case.run_once(RunId::new()).await;
            if outcome.is_success() {
                info!("Process completed successfully: {}", outcome);
                Ok(ExitCode::SUCCESS)
            } else {
                log::error!("Process failed: {}", outcome);
                Ok(ExitCode::FAILURE)
            }
        }
        Mode::Serve => {
            info!("Starting Dhan scraper service");
            if let Some(schedule) = config.daily_schedule {
                info!("Daily scrape scheduled at {} UTC", schedule.at().format("%H:%M"));
            }
            if let Err(e) = scraper_http_api::run(
                app.trigger_scrape_use_case.clone(),
                config.http_port,
                shutdown_signal(),
            )
            .await
            {
                log::error!("HTTP API failed: {}", e);
                return Ok(ExitCode::FAILURE);
            }
            if let Some(jobs) = app.jobs {
                jobs.abort();
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let args: Vec<String> = std::env::args().collect();
    let Some(mode) = Mode::from_args(&args) else {
        eprintln!("{}", USAGE);
        return ExitCode::from(2);
    };

    match start(mode).await {
        Ok(code) => code,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
