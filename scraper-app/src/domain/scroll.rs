use std::time::Duration;

/// Timing and termination constants of the infinite-scroll listing.
#[derive(Clone, Debug)]
pub struct ScrollPolicy {
    pub initial_wait: Duration,
    pub passes_per_attempt: usize,
    pub pass_settle: Duration,
    pub row_wait: Duration,
    pub max_stalled_attempts: usize,
    pub no_new_data_limit: usize,
    pub confirm_end_after: usize,
    pub bottom_wait: Duration,
    pub attempt_pause: Duration,
    pub screenshot_every: usize,
    pub implicit_wait: Duration,
}

impl Default for ScrollPolicy {
    fn default() -> Self {
        Self {
            initial_wait: Duration::from_secs(10),
            passes_per_attempt: 3,
            pass_settle: Duration::from_secs(8),
            row_wait: Duration::from_secs(20),
            max_stalled_attempts: 50,
            no_new_data_limit: 5,
            confirm_end_after: 3,
            bottom_wait: Duration::from_secs(3),
            attempt_pause: Duration::from_secs(2),
            screenshot_every: 50,
            implicit_wait: Duration::from_secs(10),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    NoNewData,
    EndOfList,
    NoRows,
    StalledTooLong,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeightCheck {
    Grew,
    Stalled,
    /// The height has not moved for long enough that the caller should
    /// jump to the bottom once and compare again.
    ConfirmEnd,
}

pub struct ScrollTracker {
    policy: ScrollPolicy,
    last_height: i64,
    stalled_attempts: usize,
    no_new_data: usize,
    previous_count: usize,
}

impl ScrollTracker {
    pub fn new(policy: ScrollPolicy) -> Self {
        Self {
            policy,
            last_height: 0,
            stalled_attempts: 0,
            no_new_data: 0,
            previous_count: 0,
        }
    }

    pub fn policy(&self) -> &ScrollPolicy {
        &self.policy
    }

    pub fn should_continue(&self) -> bool {
        self.stalled_attempts < self.policy.max_stalled_attempts
    }

    pub fn record_rows(&mut self, count: usize) -> Option<StopReason> {
        let stop = if count == self.previous_count {
            self.no_new_data += 1;
            self.no_new_data >= self.policy.no_new_data_limit
        } else {
            self.no_new_data = 0;
            false
        };
        self.previous_count = count;
        stop.then_some(StopReason::NoNewData)
    }

    pub fn record_height(&mut self, height: i64) -> HeightCheck {
        if height == self.last_height {
            self.stalled_attempts += 1;
            if self.stalled_attempts >= self.policy.confirm_end_after {
                HeightCheck::ConfirmEnd
            } else {
                HeightCheck::Stalled
            }
        } else {
            self.stalled_attempts = 0;
            HeightCheck::Grew
        }
    }

    pub fn should_screenshot(&self, count: usize) -> bool {
        self.policy.screenshot_every > 0 && count % self.policy.screenshot_every == 0
    }

    pub fn finish_attempt(&mut self, height: i64) {
        self.last_height = height;
    }
}
