mod clock;
mod config;
mod session;

pub use clock::{ClockTick, SessionClock};
pub use config::SessionConfig;
pub use session::{format_clock, Phase, PomodoroSession, RunState};
