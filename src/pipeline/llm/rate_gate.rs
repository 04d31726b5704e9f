//! Per-minute pacing and a daily ceiling for model calls.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use chrono::{DateTime, Local, NaiveDate};
use serde::Serialize;

use super::LlmError;

/// Time source for the gate. Tests drive a `ManualClock` instead of sleeping.
pub trait Clock {
    fn now(&self) -> DateTime<Local>;
    fn sleep(&self, duration: Duration);
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Shared manual clock: clones observe the same time, `sleep` advances it.
#[derive(Clone)]
pub struct ManualClock {
    now: Rc<Cell<DateTime<Local>>>,
    slept: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::at(Local::now())
    }

    pub fn at(start: DateTime<Local>) -> Self {
        Self {
            now: Rc::new(Cell::new(start)),
            slept: Rc::new(Cell::new(Duration::ZERO)),
        }
    }

    pub fn advance(&self, duration: Duration) {
        let delta = chrono::Duration::from_std(duration).unwrap_or(chrono::Duration::zero());
        self.now.set(self.now.get() + delta);
    }

    /// Total time spent in `sleep` calls.
    pub fn total_slept(&self) -> Duration {
        self.slept.get()
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Local> {
        self.now.get()
    }

    fn sleep(&self, duration: Duration) {
        self.slept.set(self.slept.get() + duration);
        self.advance(duration);
    }
}

/// Issued for every admitted call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateTicket {
    /// 1-based count of calls made today, including this one.
    pub call_number: u32,
    pub daily_limit: u32,
    pub waited_ms: u64,
    pub remaining_today: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct GateStatus {
    pub calls_today: u32,
    pub daily_limit: u32,
    pub remaining_today: u32,
    pub requests_per_minute: u32,
    pub min_interval_secs: f64,
    pub day: NaiveDate,
    pub last_call: Option<DateTime<Local>>,
}

pub struct RateGate {
    requests_per_minute: u32,
    requests_per_day: u32,
    min_interval: Duration,
    day: NaiveDate,
    history: Vec<DateTime<Local>>,
    clock: Box<dyn Clock>,
}

impl RateGate {
    pub fn new(requests_per_minute: u32, requests_per_day: u32) -> Self {
        Self::with_clock(requests_per_minute, requests_per_day, Box::new(SystemClock))
    }

    pub fn with_clock(
        requests_per_minute: u32,
        requests_per_day: u32,
        clock: Box<dyn Clock>,
    ) -> Self {
        let requests_per_minute = requests_per_minute.max(1);
        let day = clock.now().date_naive();
        Self {
            requests_per_minute,
            requests_per_day,
            min_interval: Duration::from_secs(60) / requests_per_minute,
            day,
            history: Vec::new(),
            clock,
        }
    }

    fn calls_today(&self) -> u32 {
        u32::try_from(self.history.len()).unwrap_or(u32::MAX)
    }

    fn roll_day(&mut self, now: DateTime<Local>) {
        let today = now.date_naive();
        if today != self.day {
            tracing::info!(
                previous = %self.day,
                calls = self.history.len(),
                "Daily request quota reset"
            );
            self.day = today;
            self.history.clear();
        }
    }

    /// Wait out the minimum interval, then admit one call.
    ///
    /// Fails immediately once the daily ceiling is reached.
    pub fn acquire(&mut self) -> Result<GateTicket, LlmError> {
        let now = self.clock.now();
        self.roll_day(now);

        let used = self.calls_today();
        if used >= self.requests_per_day {
            tracing::warn!(limit = self.requests_per_day, used, "Daily request quota exhausted");
            return Err(LlmError::QuotaExceeded {
                limit: self.requests_per_day,
                used,
            });
        }

        let mut waited = Duration::ZERO;
        if let Some(last) = self.history.last() {
            let elapsed = (now - *last).to_std().unwrap_or(Duration::ZERO);
            if elapsed < self.min_interval {
                waited = self.min_interval - elapsed;
                tracing::debug!(wait_ms = waited.as_millis() as u64, "Pacing model call");
                self.clock.sleep(waited);
            }
        }

        let admitted_at = self.clock.now();
        self.roll_day(admitted_at);
        self.history.push(admitted_at);

        let call_number = self.calls_today();
        Ok(GateTicket {
            call_number,
            daily_limit: self.requests_per_day,
            waited_ms: waited.as_millis() as u64,
            remaining_today: self.requests_per_day.saturating_sub(call_number),
        })
    }

    pub fn status(&self) -> GateStatus {
        let calls_today = self.calls_today();
        GateStatus {
            calls_today,
            daily_limit: self.requests_per_day,
            remaining_today: self.requests_per_day.saturating_sub(calls_today),
            requests_per_minute: self.requests_per_minute,
            min_interval_secs: self.min_interval.as_secs_f64(),
            day: self.day,
            last_call: self.history.last().copied(),
        }
    }

    /// Calls admitted today.
    pub fn calls_made(&self) -> u32 {
        self.calls_today()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn noon() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 3, 14, 12, 0, 0).single().unwrap()
    }

    #[test]
    fn first_call_does_not_wait() {
        let clock = ManualClock::at(noon());
        let mut gate = RateGate::with_clock(5, 20, Box::new(clock.clone()));
        let ticket = gate.acquire().unwrap();
        assert_eq!(ticket.call_number, 1);
        assert_eq!(ticket.waited_ms, 0);
        assert_eq!(ticket.remaining_today, 19);
        assert_eq!(clock.total_slept(), Duration::ZERO);
    }

    #[test]
    fn back_to_back_calls_are_spaced() {
        let clock = ManualClock::at(noon());
        let mut gate = RateGate::with_clock(5, 20, Box::new(clock.clone()));
        gate.acquire().unwrap();
        clock.advance(Duration::from_secs(4));
        let ticket = gate.acquire().unwrap();
        // 5 rpm => 12 s minimum interval, 4 s already elapsed
        assert_eq!(ticket.waited_ms, 8_000);
        assert_eq!(clock.total_slept(), Duration::from_secs(8));
    }

    #[test]
    fn no_wait_after_interval_elapsed() {
        let clock = ManualClock::at(noon());
        let mut gate = RateGate::with_clock(5, 20, Box::new(clock.clone()));
        gate.acquire().unwrap();
        clock.advance(Duration::from_secs(30));
        assert_eq!(gate.acquire().unwrap().waited_ms, 0);
    }

    #[test]
    fn daily_ceiling_fails_fast() {
        let clock = ManualClock::at(noon());
        let mut gate = RateGate::with_clock(60, 3, Box::new(clock.clone()));
        for _ in 0..3 {
            gate.acquire().unwrap();
        }
        let slept_before = clock.total_slept();
        let err = gate.acquire().unwrap_err();
        assert!(matches!(err, LlmError::QuotaExceeded { limit: 3, used: 3 }));
        assert_eq!(clock.total_slept(), slept_before);
    }

    #[test]
    fn quota_resets_at_midnight() {
        let clock = ManualClock::at(noon());
        let mut gate = RateGate::with_clock(60, 1, Box::new(clock.clone()));
        gate.acquire().unwrap();
        assert!(gate.acquire().is_err());

        clock.advance(Duration::from_secs(13 * 3600));
        let ticket = gate.acquire().unwrap();
        assert_eq!(ticket.call_number, 1);
        assert_eq!(gate.status().day, noon().date_naive().succ_opt().unwrap());
    }

    #[test]
    fn status_reports_usage() {
        let clock = ManualClock::at(noon());
        let mut gate = RateGate::with_clock(5, 20, Box::new(clock.clone()));
        gate.acquire().unwrap();
        let status = gate.status();
        assert_eq!(status.calls_today, 1);
        assert_eq!(status.remaining_today, 19);
        assert_eq!(status.min_interval_secs, 12.0);
        assert_eq!(status.last_call, Some(noon()));
        assert_eq!(gate.calls_made(), 1);
    }

    #[test]
    fn zero_rpm_clamped() {
        let gate = RateGate::with_clock(0, 20, Box::new(ManualClock::at(noon())));
        assert_eq!(gate.status().requests_per_minute, 1);
        assert_eq!(gate.status().min_interval_secs, 60.0);
    }
}
