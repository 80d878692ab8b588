use chrono::Duration;
use clap::Subcommand;
use tabdoro_core::storage::{load_session, save_session, Database};
use tabdoro_core::{Config, Event, PomodoroSession};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start or resume the current phase
    Start,
    /// Pause the running countdown
    Pause,
    /// Stop and reset to a fresh work phase
    Reset,
    /// Tick the clock and print the current state as JSON
    Status,
}

/// Record a retroactive or live phase completion to the history table.
/// History is best-effort; a failed insert never blocks the timer.
fn record_completion(db: &Database, event: &Event, session: &PomodoroSession) {
    if let Event::PhaseCompleted {
        previous_phase, at, ..
    } = event
    {
        let duration_secs = session.config().phase_secs(*previous_phase);
        // Oversized configured durations fall back to the completion time
        // instead of overflowing the timestamp arithmetic.
        let started_at = i64::try_from(duration_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|d| at.checked_sub_signed(d))
            .unwrap_or(*at);
        if let Err(e) = db.record_phase(*previous_phase, duration_secs, started_at, *at) {
            eprintln!("failed to record completed phase: {e}");
        }
    }
}

fn print_event(event: &Event) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(event)?);
    Ok(())
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let config = Config::load_or_default();
    let (mut session, completed) = load_session(&db, config.session());

    // A phase may have completed while no command was running.
    if let Some(event) = &completed {
        record_completion(&db, event, &session);
        print_event(event)?;
    }

    match action {
        TimerAction::Start => {
            match session.start() {
                Some(event) => print_event(&event)?,
                None => print_event(&session.snapshot())?, // already running
            }
        }
        TimerAction::Pause => match session.pause() {
            Some(event) => print_event(&event)?,
            None => print_event(&session.snapshot())?,
        },
        TimerAction::Reset => {
            if let Some(event) = session.reset() {
                print_event(&event)?;
            }
        }
        TimerAction::Status => {
            if let Some(event @ Event::PhaseCompleted { .. }) = session.tick() {
                record_completion(&db, &event, &session);
                print_event(&event)?;
            }
            print_event(&session.snapshot())?;
        }
    }

    save_session(&db, &session)?;
    Ok(())
}
