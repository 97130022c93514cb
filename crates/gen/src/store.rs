//! Persistence boundary for session state.
//!
//! The core treats storage as a synchronous load/save pair and does not
//! care about the medium; the CLI ships a JSON-file implementation, the
//! web embedding maps it onto its own storage.

use anomtrain_core::section::SessionState;
use chrono::{DateTime, Duration, Local};
use serde::{Deserialize, Serialize};

/// A persisted session: the state plus a timestamped envelope.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct StoredSession {
    /// Free-form provenance note.
    pub info: String,
    pub start: DateTime<Local>,
    /// Time of the last mutation.
    pub end: DateTime<Local>,
    pub state: SessionState,
}

impl StoredSession {
    /// Fresh envelope around `state`, stamped now.
    #[must_use]
    pub fn new(info: impl Into<String>, state: SessionState) -> Self {
        let now = Local::now();
        Self {
            info: info.into(),
            start: now,
            end: now,
            state,
        }
    }

    /// Replace the state and move the end timestamp.
    pub fn update(&mut self, state: SessionState) {
        self.state = state;
        self.end = Local::now();
    }

    #[must_use]
    pub fn get_duration(&self) -> Duration {
        self.end - self.start
    }
}

/// Synchronous load/save of a session.
pub trait SessionStore {
    type Error;

    /// The previously saved session, if any.
    ///
    /// # Errors
    ///
    /// Implementation-defined; a missing session is `Ok(None)`, not an
    /// error.
    fn load(&self) -> Result<Option<StoredSession>, Self::Error>;

    /// Persist the session. Called after every state mutation.
    ///
    /// # Errors
    ///
    /// Implementation-defined.
    fn save(&mut self, session: &StoredSession) -> Result<(), Self::Error>;
}
