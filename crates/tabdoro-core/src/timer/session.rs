//! Pomodoro session state machine.
//!
//! ## State Transitions
//!
//! ```text
//! Stopped -> Running -> Paused -> Running -> ... -> (phase completes) -> Stopped
//! ```
//!
//! crossed with `phase: Work -> ShortBreak | LongBreak -> Work`.
//!
//! The machine is wall-clock based and caller-driven: no internal threads, the
//! host calls `tick()` about once per second while running. While `Running`
//! the armed deadline is authoritative for remaining time; while `Paused` or
//! `Stopped` the stored `remaining_secs` is. Exactly one of the two holds at a
//! time, gated by `run_state`.
//!
//! The whole machine serializes to JSON, so a host reload rebuilds it via
//! [`PomodoroSession::rehydrate`], which counts time that elapsed while the
//! host was unloaded and retroactively completes an expired phase.

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::clock::SessionClock;
use super::config::SessionConfig;
use crate::events::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Work,
    ShortBreak,
    LongBreak,
}

impl Phase {
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Work => "Work",
            Phase::ShortBreak => "Short Break",
            Phase::LongBreak => "Long Break",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Work => "work",
            Phase::ShortBreak => "short_break",
            Phase::LongBreak => "long_break",
        }
    }

    pub fn is_break(&self) -> bool {
        !matches!(self, Phase::Work)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    Stopped,
    Running,
    Paused,
}

/// Render seconds as `mm:ss`.
pub fn format_clock(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// The work/break session state machine.
///
/// All mutable timer state lives inside the instance; independent sessions do
/// not share anything, so tests can run as many as they like side by side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PomodoroSession {
    config: SessionConfig,
    phase: Phase,
    run_state: RunState,
    /// Authoritative only while Paused/Stopped. While Running it is a display
    /// cache refreshed on each tick; the clock deadline is authoritative and
    /// is what rehydration trusts.
    remaining_secs: u64,
    /// Incremented once per completed Work phase, zeroed at day rollover.
    completed_work_sessions: u64,
    /// Local calendar date of the last time the session was touched.
    last_active_date: NaiveDate,
    #[serde(default)]
    clock: SessionClock,
}

impl PomodoroSession {
    pub fn new(config: SessionConfig) -> Self {
        Self::new_on(config, Local::now().date_naive())
    }

    pub fn new_on(config: SessionConfig, today: NaiveDate) -> Self {
        let config = config.sanitized();
        let remaining_secs = config.work_secs();
        Self {
            config,
            phase: Phase::Work,
            run_state: RunState::Stopped,
            remaining_secs,
            completed_work_sessions: 0,
            last_active_date: today,
            clock: SessionClock::new(),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    pub fn completed_work_sessions(&self) -> u64 {
        self.completed_work_sessions
    }

    pub fn last_active_date(&self) -> NaiveDate {
        self.last_active_date
    }

    pub fn end_at(&self) -> Option<DateTime<Utc>> {
        self.clock.end_at()
    }

    /// Configured duration of the current phase, in seconds.
    pub fn phase_duration_secs(&self) -> u64 {
        self.config.phase_secs(self.phase)
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs_at(Utc::now())
    }

    /// Remaining seconds, derived from the deadline while Running.
    pub fn remaining_secs_at(&self, now: DateTime<Utc>) -> u64 {
        match self.run_state {
            RunState::Running => self.clock.read_at(now).unwrap_or(self.remaining_secs),
            RunState::Paused | RunState::Stopped => self.remaining_secs,
        }
    }

    /// 0.0 .. 1.0 progress within the current phase.
    pub fn progress_at(&self, now: DateTime<Utc>) -> f64 {
        let total = self.phase_duration_secs();
        if total == 0 {
            return 0.0;
        }
        1.0 - (self.remaining_secs_at(now) as f64 / total as f64)
    }

    pub fn snapshot(&self) -> Event {
        self.snapshot_at(Utc::now())
    }

    /// Build a full state snapshot event.
    pub fn snapshot_at(&self, now: DateTime<Utc>) -> Event {
        let remaining_secs = self.remaining_secs_at(now);
        Event::StateSnapshot {
            phase: self.phase,
            phase_label: self.phase.label().to_string(),
            run_state: self.run_state,
            remaining_secs,
            total_secs: self.phase_duration_secs(),
            display: format_clock(remaining_secs),
            progress: self.progress_at(now),
            completed_work_sessions: self.completed_work_sessions,
            end_at: self.clock.end_at(),
            at: now,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) -> Option<Event> {
        self.start_at(Utc::now())
    }

    /// Begin or resume the countdown. No-op while already Running.
    ///
    /// The day-rollover check runs before every start, so counters never leak
    /// across midnight even when the start comes from an auto-start.
    pub fn start_at(&mut self, now: DateTime<Utc>) -> Option<Event> {
        self.roll_over_if_new_day(local_date_of(now));
        match self.run_state {
            RunState::Running => None,
            RunState::Stopped | RunState::Paused => {
                let end_at = self.clock.start_at(self.remaining_secs, now);
                self.run_state = RunState::Running;
                Some(Event::SessionStarted {
                    phase: self.phase,
                    remaining_secs: self.remaining_secs,
                    end_at,
                    at: now,
                })
            }
        }
    }

    pub fn pause(&mut self) -> Option<Event> {
        self.pause_at(Utc::now())
    }

    /// Freeze the countdown. No-op unless Running.
    ///
    /// The clock is stopped synchronously, so no stale tick can fire after
    /// this returns.
    pub fn pause_at(&mut self, now: DateTime<Utc>) -> Option<Event> {
        if self.run_state != RunState::Running {
            return None;
        }
        if let Some(remaining) = self.clock.read_at(now) {
            self.remaining_secs = remaining;
        }
        self.clock.stop();
        self.run_state = RunState::Paused;
        Some(Event::SessionPaused {
            phase: self.phase,
            remaining_secs: self.remaining_secs,
            at: now,
        })
    }

    pub fn reset(&mut self) -> Option<Event> {
        self.reset_at(Utc::now())
    }

    /// Back to a fresh Stopped work phase. Valid from any state.
    /// Does not touch `completed_work_sessions`.
    pub fn reset_at(&mut self, now: DateTime<Utc>) -> Option<Event> {
        self.clock.stop();
        self.phase = Phase::Work;
        self.run_state = RunState::Stopped;
        self.remaining_secs = self.config.work_secs();
        Some(Event::SessionReset { at: now })
    }

    pub fn tick(&mut self) -> Option<Event> {
        self.tick_at(Utc::now())
    }

    /// Call periodically while Running. Returns a `Tick` event, or
    /// `PhaseCompleted` when the deadline is reached.
    ///
    /// Ticks do not persist anything: transient remaining time is rebuilt from
    /// the deadline on reload, so writing it every second would only amplify
    /// storage traffic.
    pub fn tick_at(&mut self, now: DateTime<Utc>) -> Option<Event> {
        if self.run_state != RunState::Running {
            return None;
        }
        let tick = self.clock.tick_at(now)?;
        self.remaining_secs = tick.remaining_secs;
        if tick.completed {
            return Some(self.complete_phase_at(now));
        }
        Some(Event::Tick {
            phase: self.phase,
            run_state: self.run_state,
            remaining_secs: tick.remaining_secs,
            at: now,
        })
    }

    pub fn check_day_rollover(&mut self) -> Option<Event> {
        self.check_day_rollover_on(Local::now().date_naive(), Utc::now())
    }

    /// Zero the work-session counter the first time the session is touched on
    /// a new calendar day, independent of phase and run state.
    pub fn check_day_rollover_on(&mut self, today: NaiveDate, now: DateTime<Utc>) -> Option<Event> {
        let previous_date = self.last_active_date;
        if !self.roll_over_if_new_day(today) {
            return None;
        }
        Some(Event::DayRollover {
            previous_date,
            date: today,
            at: now,
        })
    }

    pub fn rehydrate(persisted: Self, config: SessionConfig) -> (Self, Option<Event>) {
        Self::rehydrate_at(persisted, config, Utc::now())
    }

    /// Rebuild a session from its persisted snapshot.
    ///
    /// Applies, in order: the current config (the stored copy may be stale
    /// relative to the settings file), the day-rollover check, and retroactive
    /// completion of a phase whose deadline passed while the host was
    /// unloaded. The retroactive completion runs at most once per call; the
    /// returned event is that `PhaseCompleted`, if it fired.
    pub fn rehydrate_at(
        mut persisted: Self,
        config: SessionConfig,
        now: DateTime<Utc>,
    ) -> (Self, Option<Event>) {
        persisted.config = config.sanitized();
        persisted.roll_over_if_new_day(local_date_of(now));
        let event = match persisted.run_state {
            RunState::Running => match persisted.clock.end_at() {
                Some(end_at) => {
                    let remaining = SessionClock::remaining_at(end_at, now);
                    if remaining == 0 {
                        Some(persisted.complete_phase_at(now))
                    } else {
                        persisted.remaining_secs = remaining;
                        persisted.clock.rearm(end_at);
                        None
                    }
                }
                // Running without a deadline is a corrupt snapshot; freeze at
                // the stored remaining rather than guess elapsed time.
                None => {
                    persisted.run_state = RunState::Paused;
                    None
                }
            },
            RunState::Paused | RunState::Stopped => {
                persisted.clock.stop();
                None
            }
        };
        (persisted, event)
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Phase-completion transition. Runs exactly once per completed phase.
    fn complete_phase_at(&mut self, now: DateTime<Utc>) -> Event {
        let previous_phase = self.phase;
        let next_phase = match previous_phase {
            Phase::Work => {
                self.completed_work_sessions += 1;
                if self.completed_work_sessions % self.config.long_break_interval == 0 {
                    Phase::LongBreak
                } else {
                    Phase::ShortBreak
                }
            }
            Phase::ShortBreak | Phase::LongBreak => Phase::Work,
        };
        self.phase = next_phase;
        self.run_state = RunState::Stopped;
        self.clock.stop();
        self.remaining_secs = self.phase_duration_secs();
        let event = Event::PhaseCompleted {
            previous_phase,
            next_phase,
            completed_work_sessions: self.completed_work_sessions,
            at: now,
        };
        let auto_start = if next_phase.is_break() {
            self.config.auto_start_breaks
        } else {
            self.config.auto_start_next_work
        };
        if auto_start {
            self.start_at(now);
        }
        event
    }

    fn roll_over_if_new_day(&mut self, today: NaiveDate) -> bool {
        if today == self.last_active_date {
            return false;
        }
        self.last_active_date = today;
        self.completed_work_sessions = 0;
        true
    }
}

fn local_date_of(now: DateTime<Utc>) -> NaiveDate {
    now.with_timezone(&Local).date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    // Anchored at noon so simulated spans never cross local midnight and
    // trip the day rollover.
    fn at(secs: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 15, 12, 0, 0).unwrap() + Duration::seconds(secs)
    }

    fn session() -> PomodoroSession {
        PomodoroSession::new_on(SessionConfig::default(), local_date_of(at(0)))
    }

    /// Drive a Running session to phase completion, returning the event.
    fn run_to_completion(session: &mut PomodoroSession, from: DateTime<Utc>) -> Event {
        let remaining = session.remaining_secs_at(from);
        session
            .tick_at(from + Duration::seconds(remaining as i64))
            .expect("completion tick")
    }

    #[test]
    fn initial_state_is_stopped_work() {
        let s = session();
        assert_eq!(s.phase(), Phase::Work);
        assert_eq!(s.run_state(), RunState::Stopped);
        assert_eq!(s.remaining_secs_at(at(0)), 25 * 60);
        assert_eq!(s.completed_work_sessions(), 0);
    }

    #[test]
    fn start_arms_clock_and_runs() {
        let mut s = session();
        let event = s.start_at(at(0)).unwrap();
        assert_eq!(s.run_state(), RunState::Running);
        match event {
            Event::SessionStarted {
                remaining_secs,
                end_at,
                ..
            } => {
                assert_eq!(remaining_secs, 25 * 60);
                assert_eq!(end_at, at(25 * 60));
            }
            other => panic!("expected SessionStarted, got {other:?}"),
        }
    }

    #[test]
    fn second_start_is_a_noop_with_single_deadline() {
        let mut s = session();
        s.start_at(at(0)).unwrap();
        let first_end = s.end_at();
        assert!(s.start_at(at(1)).is_none());
        assert_eq!(s.end_at(), first_end);

        // 5 simulated seconds produce exactly 5 ticks, not 10.
        let mut ticks = 0;
        for i in 1..=5 {
            if s.tick_at(at(i)).is_some() {
                ticks += 1;
            }
        }
        assert_eq!(ticks, 5);
    }

    #[test]
    fn start_then_immediate_pause_preserves_remaining() {
        let mut s = session();
        let before = s.remaining_secs_at(at(0));
        s.start_at(at(0)).unwrap();
        let event = s.pause_at(at(0)).unwrap();
        match event {
            Event::SessionPaused { remaining_secs, .. } => assert_eq!(remaining_secs, before),
            other => panic!("expected SessionPaused, got {other:?}"),
        }
        assert_eq!(s.run_state(), RunState::Paused);
        assert!(s.end_at().is_none());
    }

    #[test]
    fn pause_while_stopped_is_a_noop() {
        let mut s = session();
        assert!(s.pause_at(at(0)).is_none());
        assert_eq!(s.run_state(), RunState::Stopped);
        assert_eq!(s.remaining_secs_at(at(0)), 25 * 60);
    }

    #[test]
    fn pause_stores_clock_derived_remaining() {
        let mut s = session();
        s.start_at(at(0)).unwrap();
        s.pause_at(at(60)).unwrap();
        assert_eq!(s.remaining_secs_at(at(999)), 25 * 60 - 60);
    }

    #[test]
    fn resume_after_pause_continues_from_stored_remaining() {
        let mut s = session();
        s.start_at(at(0)).unwrap();
        s.pause_at(at(100)).unwrap();
        let event = s.start_at(at(500)).unwrap();
        match event {
            Event::SessionStarted { end_at, .. } => {
                assert_eq!(end_at, at(500 + 25 * 60 - 100));
            }
            other => panic!("expected SessionStarted, got {other:?}"),
        }
    }

    #[test]
    fn reset_always_yields_fresh_work_phase() {
        for cfg in [
            SessionConfig::default(),
            SessionConfig {
                work_minutes: 1,
                ..SessionConfig::default()
            },
            SessionConfig {
                work_minutes: 90,
                long_break_interval: 2,
                ..SessionConfig::default()
            },
        ] {
            let mut s = PomodoroSession::new_on(cfg.clone(), local_date_of(at(0)));
            s.start_at(at(0));
            run_to_completion(&mut s, at(0));
            s.start_at(at(10_000));
            let count = s.completed_work_sessions();
            s.reset_at(at(10_001));
            assert_eq!(s.phase(), Phase::Work);
            assert_eq!(s.run_state(), RunState::Stopped);
            assert_eq!(s.remaining_secs_at(at(10_001)), cfg.work_minutes * 60);
            assert_eq!(s.completed_work_sessions(), count);
            assert!(s.end_at().is_none());
        }
    }

    #[test]
    fn tick_emits_remaining_and_does_not_complete_early() {
        let mut s = session();
        s.start_at(at(0)).unwrap();
        match s.tick_at(at(1)).unwrap() {
            Event::Tick { remaining_secs, .. } => assert_eq!(remaining_secs, 25 * 60 - 1),
            other => panic!("expected Tick, got {other:?}"),
        }
    }

    #[test]
    fn tick_while_not_running_is_inert() {
        let mut s = session();
        assert!(s.tick_at(at(1)).is_none());
        s.start_at(at(0)).unwrap();
        s.pause_at(at(1)).unwrap();
        assert!(s.tick_at(at(2)).is_none());
    }

    #[test]
    fn work_completion_moves_to_short_break() {
        let mut s = session();
        s.start_at(at(0)).unwrap();
        let event = run_to_completion(&mut s, at(0));
        match event {
            Event::PhaseCompleted {
                previous_phase,
                next_phase,
                completed_work_sessions,
                ..
            } => {
                assert_eq!(previous_phase, Phase::Work);
                assert_eq!(next_phase, Phase::ShortBreak);
                assert_eq!(completed_work_sessions, 1);
            }
            other => panic!("expected PhaseCompleted, got {other:?}"),
        }
        assert_eq!(s.run_state(), RunState::Stopped);
        assert_eq!(s.remaining_secs_at(at(9_999)), 5 * 60);
    }

    #[test]
    fn break_completion_returns_to_work() {
        let mut s = session();
        s.start_at(at(0)).unwrap();
        run_to_completion(&mut s, at(0));
        s.start_at(at(2_000)).unwrap();
        let event = run_to_completion(&mut s, at(2_000));
        match event {
            Event::PhaseCompleted {
                previous_phase,
                next_phase,
                completed_work_sessions,
                ..
            } => {
                assert_eq!(previous_phase, Phase::ShortBreak);
                assert_eq!(next_phase, Phase::Work);
                // Breaks never bump the counter.
                assert_eq!(completed_work_sessions, 1);
            }
            other => panic!("expected PhaseCompleted, got {other:?}"),
        }
        assert_eq!(s.remaining_secs_at(at(9_999)), 25 * 60);
    }

    #[test]
    fn fourth_work_completion_earns_long_break() {
        // One-minute phases keep the simulated span well clear of midnight.
        let cfg = SessionConfig {
            work_minutes: 1,
            short_break_minutes: 1,
            long_break_minutes: 1,
            ..SessionConfig::default()
        };
        let mut s = PomodoroSession::new_on(cfg, local_date_of(at(0)));
        let mut now = at(0);
        let mut breaks = Vec::new();
        for _ in 0..4 {
            s.start_at(now).unwrap();
            let remaining = s.remaining_secs_at(now);
            now += Duration::seconds(remaining as i64);
            let event = s.tick_at(now).unwrap();
            let Event::PhaseCompleted { next_phase, .. } = event else {
                panic!("expected PhaseCompleted");
            };
            breaks.push(next_phase);
            // Complete the break too.
            s.start_at(now).unwrap();
            let remaining = s.remaining_secs_at(now);
            now += Duration::seconds(remaining as i64);
            s.tick_at(now).unwrap();
        }
        assert_eq!(
            breaks,
            vec![
                Phase::ShortBreak,
                Phase::ShortBreak,
                Phase::ShortBreak,
                Phase::LongBreak
            ]
        );
        assert_eq!(s.completed_work_sessions(), 4);
    }

    #[test]
    fn auto_start_breaks_runs_the_break_immediately() {
        let cfg = SessionConfig {
            auto_start_breaks: true,
            ..SessionConfig::default()
        };
        let mut s = PomodoroSession::new_on(cfg, local_date_of(at(0)));
        s.start_at(at(0)).unwrap();
        let event = run_to_completion(&mut s, at(0));
        assert!(matches!(event, Event::PhaseCompleted { .. }));
        assert_eq!(s.phase(), Phase::ShortBreak);
        assert_eq!(s.run_state(), RunState::Running);
        assert!(s.end_at().is_some());
    }

    #[test]
    fn auto_start_next_work_runs_after_break() {
        let cfg = SessionConfig {
            auto_start_breaks: true,
            auto_start_next_work: true,
            ..SessionConfig::default()
        };
        let mut s = PomodoroSession::new_on(cfg, local_date_of(at(0)));
        s.start_at(at(0)).unwrap();
        run_to_completion(&mut s, at(0));
        // Break is auto-running; complete it.
        let event = run_to_completion(&mut s, at(25 * 60));
        assert!(matches!(
            event,
            Event::PhaseCompleted {
                next_phase: Phase::Work,
                ..
            }
        ));
        assert_eq!(s.run_state(), RunState::Running);
    }

    #[test]
    fn completion_without_auto_start_stays_stopped() {
        let mut s = session();
        s.start_at(at(0)).unwrap();
        run_to_completion(&mut s, at(0));
        assert_eq!(s.run_state(), RunState::Stopped);
        assert!(s.end_at().is_none());
    }

    #[test]
    fn day_rollover_resets_counter_in_any_state() {
        let mut s = session();
        s.start_at(at(0)).unwrap();
        run_to_completion(&mut s, at(0));
        assert_eq!(s.completed_work_sessions(), 1);

        // Mid-break, paused: rollover still applies.
        s.start_at(at(2_000)).unwrap();
        s.pause_at(at(2_010)).unwrap();
        let tomorrow = s.last_active_date() + Duration::days(1);
        let event = s.check_day_rollover_on(tomorrow, at(2_020)).unwrap();
        assert!(matches!(event, Event::DayRollover { .. }));
        assert_eq!(s.completed_work_sessions(), 0);
        assert_eq!(s.last_active_date(), tomorrow);
        // Phase/run state untouched.
        assert_eq!(s.phase(), Phase::ShortBreak);
        assert_eq!(s.run_state(), RunState::Paused);
    }

    #[test]
    fn same_day_rollover_check_is_inert() {
        let mut s = session();
        let today = s.last_active_date();
        assert!(s.check_day_rollover_on(today, at(0)).is_none());
    }

    #[test]
    fn rehydrate_running_with_future_deadline_keeps_running() {
        let mut s = session();
        s.start_at(at(0)).unwrap();
        let json = serde_json::to_string(&s).unwrap();
        let persisted: PomodoroSession = serde_json::from_str(&json).unwrap();

        let (restored, event) =
            PomodoroSession::rehydrate_at(persisted, SessionConfig::default(), at(600));
        assert!(event.is_none());
        assert_eq!(restored.run_state(), RunState::Running);
        // Ten minutes passed while unloaded.
        assert_eq!(restored.remaining_secs_at(at(600)), 25 * 60 - 600);
    }

    #[test]
    fn rehydrate_with_expired_deadline_completes_exactly_once() {
        let mut s = session();
        s.start_at(at(0)).unwrap();
        let persisted: PomodoroSession =
            serde_json::from_str(&serde_json::to_string(&s).unwrap()).unwrap();

        let (restored, event) =
            PomodoroSession::rehydrate_at(persisted, SessionConfig::default(), at(30_000));
        match event {
            Some(Event::PhaseCompleted {
                previous_phase,
                next_phase,
                completed_work_sessions,
                ..
            }) => {
                assert_eq!(previous_phase, Phase::Work);
                assert_eq!(next_phase, Phase::ShortBreak);
                assert_eq!(completed_work_sessions, 1);
            }
            other => panic!("expected PhaseCompleted, got {other:?}"),
        }
        assert_eq!(restored.phase(), Phase::ShortBreak);
        assert_eq!(restored.run_state(), RunState::Stopped);

        // A second rehydrate of the advanced state does not complete again.
        let again: PomodoroSession =
            serde_json::from_str(&serde_json::to_string(&restored).unwrap()).unwrap();
        let (_, event) = PomodoroSession::rehydrate_at(again, SessionConfig::default(), at(40_000));
        assert!(event.is_none());
    }

    #[test]
    fn rehydrate_paused_keeps_stored_remaining() {
        let mut s = session();
        s.start_at(at(0)).unwrap();
        s.pause_at(at(120)).unwrap();
        let persisted: PomodoroSession =
            serde_json::from_str(&serde_json::to_string(&s).unwrap()).unwrap();

        let (restored, event) =
            PomodoroSession::rehydrate_at(persisted, SessionConfig::default(), at(90_000));
        assert!(event.is_none());
        assert_eq!(restored.run_state(), RunState::Paused);
        assert_eq!(restored.remaining_secs_at(at(90_000)), 25 * 60 - 120);
    }

    #[test]
    fn rehydrate_applies_fresh_config() {
        let s = session();
        let persisted: PomodoroSession =
            serde_json::from_str(&serde_json::to_string(&s).unwrap()).unwrap();
        let fresh = SessionConfig {
            work_minutes: 0, // clamped to 1
            ..SessionConfig::default()
        };
        let (restored, _) = PomodoroSession::rehydrate_at(persisted, fresh, at(10));
        assert_eq!(restored.config().work_minutes, 1);
    }

    #[test]
    fn invalid_config_is_clamped_at_construction() {
        let s = PomodoroSession::new_on(
            SessionConfig {
                work_minutes: 0,
                long_break_interval: 0,
                ..SessionConfig::default()
            },
            local_date_of(at(0)),
        );
        assert_eq!(s.remaining_secs_at(at(0)), 60);
        assert_eq!(s.config().long_break_interval, 1);
    }

    #[test]
    fn snapshot_reports_derived_remaining_and_display() {
        let mut s = session();
        s.start_at(at(0)).unwrap();
        match s.snapshot_at(at(61)) {
            Event::StateSnapshot {
                remaining_secs,
                total_secs,
                display,
                progress,
                phase_label,
                run_state,
                ..
            } => {
                assert_eq!(remaining_secs, 25 * 60 - 61);
                assert_eq!(total_secs, 25 * 60);
                assert_eq!(display, "23:59");
                assert_eq!(phase_label, "Work");
                assert!((progress - 61.0 / 1500.0).abs() < 1e-9);
                assert_eq!(run_state, RunState::Running);
            }
            other => panic!("expected StateSnapshot, got {other:?}"),
        }
    }

    #[test]
    fn huge_configured_duration_starts_without_panic() {
        let cfg = SessionConfig {
            work_minutes: u64::MAX / 60,
            ..SessionConfig::default()
        };
        let mut s = PomodoroSession::new_on(cfg, local_date_of(at(0)));
        let event = s.start_at(at(0)).unwrap();
        assert!(matches!(event, Event::SessionStarted { .. }));
        assert_eq!(s.run_state(), RunState::Running);
        // Deadline saturated; the countdown is still live and far from zero.
        assert!(s.remaining_secs_at(at(1)) > 0);
        assert!(s.tick_at(at(2)).is_some());
    }

    #[test]
    fn format_clock_pads_minutes_and_seconds() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(59), "00:59");
        assert_eq!(format_clock(60), "01:00");
        assert_eq!(format_clock(25 * 60), "25:00");
        assert_eq!(format_clock(3600 + 5), "60:05");
    }
}
