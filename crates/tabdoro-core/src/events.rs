use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{Phase, RunState};

/// Every state change in the session machine produces an Event.
/// The host polls for events; notification and UI sinks consume them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    SessionStarted {
        phase: Phase,
        remaining_secs: u64,
        /// Absolute deadline for the running phase.
        end_at: DateTime<Utc>,
        at: DateTime<Utc>,
    },
    SessionPaused {
        phase: Phase,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    SessionReset {
        at: DateTime<Utc>,
    },
    /// Emitted at most once per second while running.
    Tick {
        phase: Phase,
        run_state: RunState,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    /// A phase ran down to zero. Fired exactly once per completion, including
    /// retroactive completions detected on rehydrate.
    PhaseCompleted {
        previous_phase: Phase,
        next_phase: Phase,
        completed_work_sessions: u64,
        at: DateTime<Utc>,
    },
    /// First touch of the session on a new calendar day.
    DayRollover {
        previous_date: NaiveDate,
        date: NaiveDate,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        phase: Phase,
        phase_label: String,
        run_state: RunState,
        remaining_secs: u64,
        total_secs: u64,
        /// `mm:ss` rendering of the remaining time.
        display: String,
        /// 0.0 .. 1.0 progress within the current phase.
        progress: f64,
        completed_work_sessions: u64,
        end_at: Option<DateTime<Utc>>,
        at: DateTime<Utc>,
    },
}
