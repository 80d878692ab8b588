//! Wall-clock countdown for a single phase.
//!
//! The clock has no internal threads -- the caller invokes [`SessionClock::tick_at`]
//! periodically, nominally once per second. Remaining time is always recomputed
//! from the stored deadline, never decremented per callback, so delayed or
//! skipped ticks (tab throttling, host suspension) cannot accumulate drift.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Result of a clock tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockTick {
    pub remaining_secs: u64,
    /// True on the tick that reaches zero. The clock disarms itself on that
    /// tick, so completion is reported exactly once.
    pub completed: bool,
}

/// Deadline-based countdown.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionClock {
    /// Deadline for the running phase. `None` while disarmed.
    end_at: Option<DateTime<Utc>>,
}

impl SessionClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the clock: deadline = `now + remaining_secs`.
    ///
    /// Replaces any existing deadline, so at most one countdown is armed at a
    /// time regardless of how often the caller starts. Durations beyond the
    /// representable range saturate to the maximum timestamp instead of
    /// panicking.
    pub fn start_at(&mut self, remaining_secs: u64, now: DateTime<Utc>) -> DateTime<Utc> {
        let end = i64::try_from(remaining_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|d| now.checked_add_signed(d))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        self.end_at = Some(end);
        end
    }

    /// Re-arm with a previously persisted deadline.
    pub fn rearm(&mut self, end_at: DateTime<Utc>) {
        self.end_at = Some(end_at);
    }

    /// Seconds left until `end_at`, rounded up, floored at zero.
    ///
    /// This is the only source of truth while a phase is running.
    pub fn remaining_at(end_at: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
        let ms = (end_at - now).num_milliseconds();
        if ms <= 0 {
            0
        } else {
            (ms as u64).div_ceil(1000)
        }
    }

    /// Current remaining seconds, if armed.
    pub fn read_at(&self, now: DateTime<Utc>) -> Option<u64> {
        self.end_at.map(|end| Self::remaining_at(end, now))
    }

    pub fn end_at(&self) -> Option<DateTime<Utc>> {
        self.end_at
    }

    pub fn is_armed(&self) -> bool {
        self.end_at.is_some()
    }

    /// Disarm. Idempotent.
    pub fn stop(&mut self) {
        self.end_at = None;
    }

    /// Recompute remaining time from the deadline.
    ///
    /// On reaching zero the clock disarms itself and reports `completed: true`;
    /// any further ticks return `None`, so a completion can never be signalled
    /// twice even if the host keeps delivering callbacks.
    pub fn tick_at(&mut self, now: DateTime<Utc>) -> Option<ClockTick> {
        let end = self.end_at?;
        let remaining = Self::remaining_at(end, now);
        if remaining == 0 {
            self.end_at = None;
            return Some(ClockTick {
                remaining_secs: 0,
                completed: true,
            });
        }
        Some(ClockTick {
            remaining_secs: remaining,
            completed: false,
        })
    }
}
