//! In-memory session store.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::debug;

use super::{DEFAULT_SESSION_TIMEOUT_SECS, Session, SessionStore};

struct SessionEntry {
    session: Session,
    expires_at: Instant,
}

impl SessionEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// A process-local session store guarded by a single mutex.
///
/// # Example
///
/// ```
/// use workforce_scope_engine::session::{InMemorySessionStore, SessionStore};
///
/// let store = InMemorySessionStore::default();
/// let session = store.create("9876543210", "prod");
/// store.authenticate(&session.session_id, Some(42), "Asha").unwrap();
///
/// let live = store.get(&session.session_id).unwrap();
/// assert!(live.is_authenticated);
/// assert_eq!(store.active_count(), 1);
/// ```
pub struct InMemorySessionStore {
    sessions: Mutex<HashMap<String, SessionEntry>>,
    timeout: Duration,
}

impl InMemorySessionStore {
    /// Creates a store whose sessions expire after `timeout` of inactivity.
    pub fn new(timeout: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            timeout,
        }
    }

    /// Returns the idle timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, SessionEntry>> {
        self.sessions.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn touch(&self, entry: &mut SessionEntry, now: Instant) {
        entry.session.last_activity = Utc::now();
        entry.expires_at = now + self.timeout;
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_SESSION_TIMEOUT_SECS))
    }
}

impl SessionStore for InMemorySessionStore {
    fn create(&self, phone: &str, environment: &str) -> Session {
        let session = Session::new(phone, environment);
        let entry = SessionEntry {
            session: session.clone(),
            expires_at: Instant::now() + self.timeout,
        };
        self.lock().insert(session.session_id.clone(), entry);
        debug!(session_id = %session.session_id, "Created session");
        session
    }

    fn get(&self, session_id: &str) -> Option<Session> {
        let now = Instant::now();
        let mut sessions = self.lock();
        if sessions.get(session_id)?.is_expired(now) {
            sessions.remove(session_id);
            debug!(session_id, "Dropped expired session");
            return None;
        }
        let entry = sessions.get_mut(session_id)?;
        self.touch(entry, now);
        Some(entry.session.clone())
    }

    fn authenticate(
        &self,
        session_id: &str,
        user_id: Option<i64>,
        user_name: &str,
    ) -> Option<Session> {
        let now = Instant::now();
        let mut sessions = self.lock();
        let entry = sessions.get_mut(session_id).filter(|e| !e.is_expired(now))?;
        entry.session.user_id = user_id;
        entry.session.user_name = user_name.to_string();
        entry.session.is_authenticated = true;
        self.touch(entry, now);
        Some(entry.session.clone())
    }

    fn delete(&self, session_id: &str) -> bool {
        self.lock().remove(session_id).is_some()
    }

    fn cleanup_expired(&self) -> usize {
        let now = Instant::now();
        let mut sessions = self.lock();
        let before = sessions.len();
        sessions.retain(|_, entry| !entry.is_expired(now));
        before - sessions.len()
    }

    fn active_count(&self) -> usize {
        let now = Instant::now();
        self.lock().values().filter(|e| !e.is_expired(now)).count()
    }
}
