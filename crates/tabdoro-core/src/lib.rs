//! # Tabdoro Core Library
//!
//! Core business logic for Tabdoro, a Pomodoro timer that survives host
//! reloads. The library is host-agnostic: a CLI binary, a dashboard page, or
//! any other front end drives the same state machine and persists it through
//! the same storage layer.
//!
//! ## Architecture
//!
//! - **Session machine**: a wall-clock-based state machine that requires the
//!   caller to periodically invoke `tick()` for progress updates. Remaining
//!   time while running is always derived from an absolute deadline, never
//!   from a decremented counter, so delayed ticks and host suspensions cannot
//!   accumulate drift.
//! - **Storage**: SQLite-backed key-value state and phase history, TOML-based
//!   configuration. The session itself only depends on the [`KvStore`] trait.
//! - **Events**: every state change produces an [`Event`]; notification and UI
//!   layers consume them, the core never blocks on either.
//!
//! ## Key Components
//!
//! - [`PomodoroSession`]: the work/break state machine
//! - [`SessionClock`]: deadline-based countdown
//! - [`Database`]: phase history and statistics persistence
//! - [`Config`]: application configuration management

pub mod error;
pub mod events;
pub mod storage;
pub mod timer;

pub use error::{ConfigError, CoreError, StoreError};
pub use events::Event;
pub use storage::{Config, Database, KvStore, MemoryStore, Stats};
pub use timer::{Phase, PomodoroSession, RunState, SessionClock, SessionConfig};
