//! Fixed-interval schedule for periodic sync cycles.
//!
//! The first cycle runs immediately. A failing cycle does not change the
//! cadence; there is no backoff.

use std::ops::ControlFlow;
use std::time::{Duration, Instant};

pub const DEFAULT_SYNC_INTERVAL: Duration = Duration::from_secs(10);
pub const MIN_SYNC_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncSchedule {
    interval: Duration,
}

impl Default for SyncSchedule {
    fn default() -> Self {
        Self::new(DEFAULT_SYNC_INTERVAL)
    }
}

impl SyncSchedule {
    /// Creates a schedule; intervals below one second are raised to it.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(MIN_SYNC_INTERVAL),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// When the cycle after one started at `last_started` is due.
    pub fn next_due(&self, last_started: Instant) -> Instant {
        last_started + self.interval
    }

    /// Runs `tick` on the schedule, blocking the calling thread.
    ///
    /// Stops after `max_cycles` ticks (if set) or when `tick` breaks.
    /// `Some(0)` runs nothing. Returns the number of ticks run.
    pub fn run_blocking<F>(&self, max_cycles: Option<u64>, tick: F) -> u64
    where
        F: FnMut(u64) -> ControlFlow<()>,
    {
        self.run_with_sleeper(max_cycles, std::thread::sleep, tick)
    }

    fn run_with_sleeper<S, F>(&self, max_cycles: Option<u64>, mut sleep: S, mut tick: F) -> u64
    where
        S: FnMut(Duration),
        F: FnMut(u64) -> ControlFlow<()>,
    {
        let mut cycle = 0_u64;
        if max_cycles == Some(0) {
            return cycle;
        }
        loop {
            let started_at = Instant::now();
            cycle += 1;
            if tick(cycle).is_break() {
                return cycle;
            }
            if max_cycles.is_some_and(|max| cycle >= max) {
                return cycle;
            }
            let remaining = self.next_due(started_at).saturating_duration_since(Instant::now());
            if !remaining.is_zero() {
                sleep(remaining);
            }
        }
    }
}
