//! Session persistence over an abstract key-value store.
//!
//! The session machine never talks to a concrete backend; it is saved and
//! loaded through [`KvStore`], which extension-synced storage, SQLite, or an
//! in-memory map can all implement. Persistence is fire-and-forget: the
//! in-memory session is the immediate source of truth and storage is an
//! eventually-consistent backup, so a failed write costs at most the state
//! since the last successful one.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use crate::error::{CoreError, StoreError};
use crate::events::Event;
use crate::timer::{PomodoroSession, SessionConfig};

/// Key under which the serialized session lives.
pub const SESSION_KEY: &str = "pomodoro_session";

/// Abstract key-value store.
pub trait KvStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// HashMap-backed store for tests and ephemeral hosts.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Load the persisted session and rehydrate it against `config`.
///
/// Read failures and corrupt payloads are logged and replaced by a fresh
/// default session -- never fatal. The second element is the retroactive
/// `PhaseCompleted` event, if rehydration found an expired deadline.
pub fn load_session<S: KvStore + ?Sized>(
    store: &S,
    config: SessionConfig,
) -> (PomodoroSession, Option<Event>) {
    let persisted = match store.get(SESSION_KEY) {
        Ok(Some(json)) => match serde_json::from_str::<PomodoroSession>(&json) {
            Ok(session) => Some(session),
            Err(e) => {
                tracing::warn!("discarding corrupt session state: {e}");
                None
            }
        },
        Ok(None) => None,
        Err(e) => {
            tracing::warn!("session state read failed, using defaults: {e}");
            None
        }
    };
    match persisted {
        Some(session) => PomodoroSession::rehydrate(session, config),
        None => (PomodoroSession::new(config), None),
    }
}

/// Serialize the session and write it under [`SESSION_KEY`].
///
/// # Errors
/// Returns an error if serialization or the store write fails. Callers log
/// and continue; the next mutation will attempt to persist again.
pub fn save_session<S: KvStore + ?Sized>(
    store: &S,
    session: &PomodoroSession,
) -> Result<(), CoreError> {
    let json = serde_json::to_string(session)?;
    store.set(SESSION_KEY, &json)?;
    Ok(())
}
