use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::{
    domain::schedule::DailySchedule,
    workflow::trigger::{TriggerOutcome, TriggerScrapeUseCase},
};

pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

pub struct DailyScrapeJob<T: TriggerScrapeUseCase> {
    schedule: DailySchedule,
    trigger: Arc<T>,
    clock: Clock,
}

impl<T: TriggerScrapeUseCase + Send + Sync + 'static> DailyScrapeJob<T> {
    pub fn new(schedule: DailySchedule, trigger: Arc<T>) -> Self {
        Self::with_clock(schedule, trigger, Arc::new(Utc::now))
    }

    pub fn with_clock(schedule: DailySchedule, trigger: Arc<T>, clock: Clock) -> Self {
        Self {
            schedule,
            trigger,
            clock,
        }
    }

    pub async fn run(&self) {
        loop {
            let now = (self.clock)();
            let delay = self.schedule.delay_until_next(now);
            log::info!(
                "Next scheduled scrape at {} UTC (in {}s)",
                self.schedule.next_run_after(now).format("%Y-%m-%d %H:%M"),
                delay.as_secs()
            );
            tokio::time::sleep(delay).await;
            match self.trigger.trigger() {
                TriggerOutcome::Started(run_id) => {
                    log::info!("Scheduled scrape run {} started", run_id)
                }
                TriggerOutcome::AlreadyRunning(run_id) => {
                    log::warn!("Skipping scheduled scrape, run {} still in progress", run_id)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Mutex, time::Duration};

    use chrono::{NaiveTime, TimeZone};

    use crate::{domain::RunId, workflow::trigger::JobStatus};

    use super::*;

    /// Wall clock that follows tokio's paused clock from a fixed start.
    fn paused_clock(start: DateTime<Utc>) -> Clock {
        let origin = tokio::time::Instant::now();
        Arc::new(move || start + chrono::Duration::from_std(origin.elapsed()).unwrap())
    }

    struct RecordingTrigger {
        clock: Clock,
        fired_at: Mutex<Vec<DateTime<Utc>>>,
    }

    impl TriggerScrapeUseCase for RecordingTrigger {
        fn trigger(&self) -> TriggerOutcome {
            let mut fired_at = self.fired_at.lock().unwrap();
            fired_at.push((self.clock)());
            if fired_at.len() == 1 {
                TriggerOutcome::Started(RunId::new())
            } else {
                TriggerOutcome::AlreadyRunning(RunId::new())
            }
        }

        fn status(&self) -> JobStatus {
            JobStatus::default()
        }
    }

    async fn fire_times(schedule: DailySchedule, start: DateTime<Utc>, days: u64) -> Vec<String> {
        let clock = paused_clock(start);
        let trigger = Arc::new(RecordingTrigger {
            clock: clock.clone(),
            fired_at: Mutex::new(Vec::new()),
        });
        let job = DailyScrapeJob::with_clock(schedule, trigger.clone(), clock);

        let handle = tokio::spawn(async move { job.run().await });
        tokio::time::sleep(Duration::from_secs(days * 24 * 60 * 60)).await;
        handle.abort();

        let fired_at = trigger.fired_at.lock().unwrap();
        fired_at
            .iter()
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_job_triggers_daily_at_scheduled_time() {
        let start = Utc.with_ymd_and_hms(2024, 5, 10, 1, 30, 0).unwrap();

        let fired = fire_times(DailySchedule::default(), start, 3).await;

        assert_eq!(
            fired,
            vec!["2024-05-10 03:00", "2024-05-11 03:00", "2024-05-12 03:00"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_job_started_after_scheduled_time_waits_for_tomorrow() {
        let schedule = DailySchedule::new(NaiveTime::from_hms_opt(18, 45, 0).unwrap());
        let start = Utc.with_ymd_and_hms(2024, 2, 28, 20, 0, 0).unwrap();

        let fired = fire_times(schedule, start, 2).await;

        assert_eq!(fired, vec!["2024-02-29 18:45", "2024-03-01 18:45"]);
    }
}
