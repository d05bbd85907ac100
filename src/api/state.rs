//! Application state for the tool API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use crate::config::ConfigLoader;
use crate::identity::MembershipSource;
use crate::session::SessionStore;

/// Shared application state.
///
/// Holds the loaded configuration, the session registry and the membership
/// source behind `Arc`s so handlers can clone it cheaply.
#[derive(Clone)]
pub struct AppState {
    config: Arc<ConfigLoader>,
    sessions: Arc<dyn SessionStore>,
    memberships: Arc<dyn MembershipSource>,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(
        config: ConfigLoader,
        sessions: Arc<dyn SessionStore>,
        memberships: Arc<dyn MembershipSource>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            sessions,
            memberships,
        }
    }

    /// Returns a reference to the configuration loader.
    pub fn config(&self) -> &ConfigLoader {
        &self.config
    }

    /// Returns the session registry.
    pub fn sessions(&self) -> &dyn SessionStore {
        self.sessions.as_ref()
    }

    /// Returns the membership source.
    pub fn memberships(&self) -> &dyn MembershipSource {
        self.memberships.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_is_clone() {
        // Required for axum state
        fn assert_clone<T: Clone + Send + Sync + 'static>() {}
        assert_clone::<AppState>();
    }
}
