use std::time::Duration;

use chrono::{DateTime, Days, NaiveTime, Utc};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DailySchedule {
    at: NaiveTime,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid daily schedule time '{0}', expected HH:MM")]
pub struct InvalidSchedule(pub String);

impl DailySchedule {
    pub fn new(at: NaiveTime) -> Self {
        Self { at }
    }

    /// Parses `HH:MM` (UTC). `off` disables the schedule.
    pub fn parse(raw: &str) -> Result<Option<Self>, InvalidSchedule> {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("off") {
            return Ok(None);
        }
        NaiveTime::parse_from_str(raw, "%H:%M")
            .map(|at| Some(Self { at }))
            .map_err(|_| InvalidSchedule(raw.to_string()))
    }

    pub fn at(&self) -> NaiveTime {
        self.at
    }

    /// The first scheduled instant strictly after `now`.
    pub fn next_run_after(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let today = now.date_naive().and_time(self.at).and_utc();
        if today > now {
            return today;
        }
        match now.date_naive().checked_add_days(Days::new(1)) {
            Some(tomorrow) => tomorrow.and_time(self.at).and_utc(),
            None => today,
        }
    }

    pub fn delay_until_next(&self, now: DateTime<Utc>) -> Duration {
        (self.next_run_after(now) - now)
            .to_std()
            .unwrap_or(Duration::ZERO)
    }
}

impl Default for DailySchedule {
    fn default() -> Self {
        Self {
            at: NaiveTime::from_hms_opt(3, 0, 0).unwrap_or(NaiveTime::MIN),
        }
    }
}
