use serde::{Deserialize, Serialize};

use super::session::Phase;

/// User-settable Pomodoro timing configuration.
///
/// Persisted in the `[session]` section of the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_work_minutes")]
    pub work_minutes: u64,
    #[serde(default = "default_short_break_minutes")]
    pub short_break_minutes: u64,
    #[serde(default = "default_long_break_minutes")]
    pub long_break_minutes: u64,
    /// Number of completed work phases before a long break replaces a short one.
    #[serde(default = "default_long_break_interval")]
    pub long_break_interval: u64,
    #[serde(default)]
    pub auto_start_breaks: bool,
    #[serde(default)]
    pub auto_start_next_work: bool,
}

// Default functions
fn default_work_minutes() -> u64 {
    25
}
fn default_short_break_minutes() -> u64 {
    5
}
fn default_long_break_minutes() -> u64 {
    15
}
fn default_long_break_interval() -> u64 {
    4
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            work_minutes: default_work_minutes(),
            short_break_minutes: default_short_break_minutes(),
            long_break_minutes: default_long_break_minutes(),
            long_break_interval: default_long_break_interval(),
            auto_start_breaks: false,
            auto_start_next_work: false,
        }
    }
}

impl SessionConfig {
    /// Clamp out-of-range values instead of rejecting them: zero-minute phases
    /// and a zero interval become 1.
    pub fn sanitized(mut self) -> Self {
        self.work_minutes = self.work_minutes.max(1);
        self.short_break_minutes = self.short_break_minutes.max(1);
        self.long_break_minutes = self.long_break_minutes.max(1);
        self.long_break_interval = self.long_break_interval.max(1);
        self
    }

    /// Work phase duration in seconds.
    ///
    /// Uses saturating arithmetic to prevent overflow with large values.
    pub fn work_secs(&self) -> u64 {
        self.work_minutes.saturating_mul(60)
    }

    pub fn short_break_secs(&self) -> u64 {
        self.short_break_minutes.saturating_mul(60)
    }

    pub fn long_break_secs(&self) -> u64 {
        self.long_break_minutes.saturating_mul(60)
    }

    /// Configured duration for a given phase, in seconds.
    pub fn phase_secs(&self, phase: Phase) -> u64 {
        match phase {
            Phase::Work => self.work_secs(),
            Phase::ShortBreak => self.short_break_secs(),
            Phase::LongBreak => self.long_break_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values() {
        let cfg = SessionConfig::default();
        assert_eq!(cfg.work_minutes, 25);
        assert_eq!(cfg.short_break_minutes, 5);
        assert_eq!(cfg.long_break_minutes, 15);
        assert_eq!(cfg.long_break_interval, 4);
        assert!(!cfg.auto_start_breaks);
        assert!(!cfg.auto_start_next_work);
    }

    #[test]
    fn sanitized_clamps_zeros_to_one() {
        let cfg = SessionConfig {
            work_minutes: 0,
            short_break_minutes: 0,
            long_break_minutes: 0,
            long_break_interval: 0,
            ..SessionConfig::default()
        }
        .sanitized();
        assert_eq!(cfg.work_minutes, 1);
        assert_eq!(cfg.short_break_minutes, 1);
        assert_eq!(cfg.long_break_minutes, 1);
        assert_eq!(cfg.long_break_interval, 1);
    }

    #[test]
    fn sanitized_keeps_valid_values() {
        let cfg = SessionConfig::default().sanitized();
        assert_eq!(cfg, SessionConfig::default());
    }

    #[test]
    fn phase_secs_matches_phase() {
        let cfg = SessionConfig::default();
        assert_eq!(cfg.phase_secs(Phase::Work), 25 * 60);
        assert_eq!(cfg.phase_secs(Phase::ShortBreak), 5 * 60);
        assert_eq!(cfg.phase_secs(Phase::LongBreak), 15 * 60);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let cfg: SessionConfig = toml::from_str("work_minutes = 50").unwrap();
        assert_eq!(cfg.work_minutes, 50);
        assert_eq!(cfg.short_break_minutes, 5);
        assert_eq!(cfg.long_break_interval, 4);
    }
}
