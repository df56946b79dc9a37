use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// A timer mid-run.
///
/// Only running timers exist as values; a task without one is stopped, with
/// its elapsed time fully represented by `Task::actual_hours`. That makes
/// this the single authority for live elapsed time: the baseline accumulated
/// before the current run plus wall-clock time since `started_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunningTimer {
    /// Wall-clock instant of the most recent start.
    pub started_at: OffsetDateTime,
    /// Whole seconds accumulated across earlier runs.
    pub baseline_seconds: u64,
}

impl RunningTimer {
    /// Live elapsed seconds at `now`.
    ///
    /// `started_at` is an absolute instant, so this keeps accruing correctly
    /// across a process restart.
    pub fn elapsed_seconds(&self, now: OffsetDateTime) -> u64 {
        let current_run = (now - self.started_at).whole_seconds().max(0) as u64;
        self.baseline_seconds + current_run
    }
}

/// Wire shape of one entry in the persisted `runningTimers` snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerSnapshot {
    #[serde(with = "time::serde::rfc3339")]
    pub start_time: OffsetDateTime,
    /// Accumulated whole seconds before `start_time`.
    pub elapsed: u64,
    pub is_running: bool,
}

impl From<RunningTimer> for TimerSnapshot {
    fn from(timer: RunningTimer) -> Self {
        Self {
            start_time: timer.started_at,
            elapsed: timer.baseline_seconds,
            is_running: true,
        }
    }
}

impl TimerSnapshot {
    /// Restore the in-memory form; `None` for entries that are not actually
    /// running (nothing to recover for those).
    pub fn into_running(self) -> Option<RunningTimer> {
        self.is_running.then_some(RunningTimer {
            started_at: self.start_time,
            baseline_seconds: self.elapsed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn elapsed_adds_baseline_and_current_run() {
        let timer = RunningTimer {
            started_at: datetime!(2025-06-01 12:00:00 UTC),
            baseline_seconds: 120,
        };
        assert_eq!(
            timer.elapsed_seconds(datetime!(2025-06-01 12:00:45 UTC)),
            165
        );
    }

    #[test]
    fn elapsed_never_goes_backwards_on_clock_skew() {
        let timer = RunningTimer {
            started_at: datetime!(2025-06-01 12:00:00 UTC),
            baseline_seconds: 30,
        };
        assert_eq!(
            timer.elapsed_seconds(datetime!(2025-06-01 11:59:00 UTC)),
            30
        );
    }

    #[test]
    fn snapshot_round_trip() {
        let timer = RunningTimer {
            started_at: datetime!(2025-06-01 12:00:00 UTC),
            baseline_seconds: 900,
        };
        let snapshot = TimerSnapshot::from(timer);
        assert!(snapshot.is_running);
        assert_eq!(snapshot.into_running(), Some(timer));
    }
}
