use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use crate::{
    domain::RunId,
    workflow::run_once::{RunOnceUseCase, RunOutcome},
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TriggerOutcome {
    Started(RunId),
    AlreadyRunning(RunId),
}

#[derive(Clone, Debug, Default)]
pub struct JobStatus {
    pub running: bool,
    pub run_id: Option<RunId>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub last_outcome: Option<RunOutcome>,
}

pub trait TriggerScrapeUseCase {
    fn trigger(&self) -> TriggerOutcome;
    fn status(&self) -> JobStatus;
}

/// Starts scrape runs on background tasks, one at a time.
pub struct TriggerScrapeUseCaseImpl<R: RunOnceUseCase + Send + Sync + 'static> {
    run_once: Arc<R>,
    status: Arc<Mutex<JobStatus>>,
}

impl<R: RunOnceUseCase + Send + Sync + 'static> TriggerScrapeUseCaseImpl<R> {
    pub fn new(run_once: Arc<R>) -> Self {
        Self {
            run_once,
            status: Arc::new(Mutex::new(JobStatus::default())),
        }
    }

    fn finish(status: &Mutex<JobStatus>, run_id: RunId, outcome: RunOutcome) {
        let Ok(mut status) = status.lock() else {
            log::error!("Job status lock poisoned, dropping outcome of run {}", run_id);
            return;
        };
        status.running = false;
        status.finished_at = Some(Utc::now());
        status.last_outcome = Some(outcome);
    }
}

impl<R: RunOnceUseCase + Send + Sync + 'static> TriggerScrapeUseCase
    for TriggerScrapeUseCaseImpl<R>
{
    fn trigger(&self) -> TriggerOutcome {
        let run_id = {
            let mut status = match self.status.lock() {
                Ok(status) => status,
                Err(poisoned) => poisoned.into_inner(),
            };
            if status.running {
                if let Some(current) = status.run_id {
                    log::warn!("Scrape run {} still in progress, ignoring trigger", current);
                    return TriggerOutcome::AlreadyRunning(current);
                }
            }
            let run_id = RunId::new();
            status.running = true;
            status.run_id = Some(run_id);
            status.started_at = Some(Utc::now());
            status.finished_at = None;
            run_id
        };

        let run_once = self.run_once.clone();
        let status = self.status.clone();
        tokio::spawn(async move {
            let run = tokio::spawn(async move { run_once.run_once(run_id).await });
            let outcome = match run.await {
                Ok(outcome) => outcome,
                Err(e) => RunOutcome::Aborted(e.to_string()),
            };
            if !outcome.is_success() {
                log::error!("Scrape run {} did not complete: {}", run_id, outcome);
            }
            Self::finish(&status, run_id, outcome);
        });

        TriggerOutcome::Started(run_id)
    }

    fn status(&self) -> JobStatus {
        match self.status.lock() {
            Ok(status) => status.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}
