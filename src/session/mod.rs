//! Session registry.
//!
//! Sessions carry the credentials of a logged-in caller between tool calls.
//! The registry is an injected [`SessionStore`]; [`InMemorySessionStore`] is
//! the process-local implementation.

mod memory;

pub use memory::InMemorySessionStore;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::identity::Credentials;

/// Default idle timeout in seconds.
pub const DEFAULT_SESSION_TIMEOUT_SECS: u64 = 3600;

/// A caller session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Opaque session id (`sess_` followed by 16 hex digits).
    pub session_id: String,
    /// The login phone number.
    pub phone: String,
    /// The user id, set once authenticated.
    pub user_id: Option<i64>,
    /// The display name.
    pub user_name: String,
    /// Target environment label, e.g. "prod" or "staging".
    pub environment: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Time of the last read or update.
    pub last_activity: DateTime<Utc>,
    /// Whether the login flow completed.
    pub is_authenticated: bool,
}

impl Session {
    /// Creates an unauthenticated session with a fresh id.
    pub fn new(phone: impl Into<String>, environment: impl Into<String>) -> Self {
        let now = Utc::now();
        let hex = Uuid::new_v4().simple().to_string();
        Self {
            session_id: format!("sess_{}", &hex[..16]),
            phone: phone.into(),
            user_id: None,
            user_name: String::new(),
            environment: environment.into(),
            created_at: now,
            last_activity: now,
            is_authenticated: false,
        }
    }

    /// Returns the credentials of an authenticated session.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotAuthenticated`] until the login flow has
    /// completed.
    pub fn credentials(&self) -> EngineResult<Credentials> {
        if !self.is_authenticated {
            return Err(EngineError::NotAuthenticated);
        }
        Ok(Credentials {
            user_id: self.user_id,
            user_name: self.user_name.clone(),
            phone: self.phone.clone(),
        })
    }
}

/// Masks all but the last four characters of a phone number.
///
/// # Example
///
/// ```
/// use workforce_scope_engine::session::mask_phone;
///
/// assert_eq!(mask_phone("9876543210"), "******3210");
/// assert_eq!(mask_phone("123"), "123");
/// ```
pub fn mask_phone(phone: &str) -> String {
    let count = phone.chars().count();
    phone
        .chars()
        .enumerate()
        .map(|(i, c)| if i + 4 < count { '*' } else { c })
        .collect()
}

/// A key-value store of sessions with per-entry expiry.
///
/// Reads extend a session's lifetime; expired sessions are never returned.
pub trait SessionStore: Send + Sync {
    /// Creates and stores a new unauthenticated session.
    fn create(&self, phone: &str, environment: &str) -> Session;

    /// Returns a live session and refreshes its activity time.
    fn get(&self, session_id: &str) -> Option<Session>;

    /// Marks a session authenticated for a user.
    fn authenticate(&self, session_id: &str, user_id: Option<i64>, user_name: &str)
    -> Option<Session>;

    /// Removes a session. Returns true when it existed.
    fn delete(&self, session_id: &str) -> bool;

    /// Removes every expired session and returns how many were dropped.
    fn cleanup_expired(&self) -> usize;

    /// Counts live sessions.
    fn active_count(&self) -> usize;
}

/// Resolves a session id to the credentials it carries.
///
/// # Errors
///
/// Returns [`EngineError::NotAuthenticated`] when the session is missing,
/// expired or not yet authenticated.
pub fn credentials_for(store: &dyn SessionStore, session_id: &str) -> EngineResult<Credentials> {
    store
        .get(session_id)
        .ok_or(EngineError::NotAuthenticated)?
        .credentials()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_shape() {
        let session = Session::new("", "prod");
        assert!(session.session_id.starts_with("sess_"));
        assert_eq!(session.session_id.len(), 21);
        assert!(session.session_id[5..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_unauthenticated_session_has_no_credentials() {
        let session = Session::new("9876543210", "prod");
        assert!(matches!(
            session.credentials(),
            Err(EngineError::NotAuthenticated)
        ));
    }

    #[test]
    fn test_phone_masking_keeps_last_four() {
        assert_eq!(mask_phone("123"), "123");
        assert_eq!(mask_phone("+91 99999-00000"), "***********0000");
    }
}
