//! Error types for the Workforce Scope Engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate.
//! Authorization outcomes are kept as distinct variants so callers can never
//! confuse "no access" with "no data".

use thiserror::Error;

/// The main error type for the Workforce Scope Engine.
///
/// # Example
///
/// ```
/// use workforce_scope_engine::error::EngineError;
///
/// let error = EngineError::ConfigNotFound {
///     path: "/missing/engine.yaml".to_string(),
/// };
/// assert_eq!(error.to_string(), "Configuration file not found: /missing/engine.yaml");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// No branch policy is configured for the given branch.
    #[error("Branch policy not found: {branch_id}")]
    BranchNotFound {
        /// The branch id that was looked up.
        branch_id: i64,
    },

    /// No session, or the session is expired or not yet authenticated.
    #[error("Not authenticated. Please login first.")]
    NotAuthenticated,

    /// The principal holds no membership, so there is no primary company.
    #[error("No company association found for principal {principal_id}")]
    NoCompanyAssociation {
        /// The principal that has no memberships.
        principal_id: i64,
    },

    /// The membership source failed; distinct from having no memberships.
    #[error("Failed to fetch memberships for principal {principal_id}: {message}")]
    MembershipFetchFailed {
        /// The principal whose memberships were requested.
        principal_id: i64,
        /// The underlying failure.
        message: String,
    },

    /// The target row lies outside the principal's access predicate.
    #[error("Access denied to employee record {employee_id}")]
    AccessDenied {
        /// The employee record that was requested.
        employee_id: i64,
    },

    /// The branch belongs to a company the principal holds no membership in.
    #[error("Access denied to branch {branch_id}")]
    BranchAccessDenied {
        /// The branch that was requested.
        branch_id: i64,
    },

    /// The table alias handed to the query scoper does not occur in the query.
    #[error("Table alias '{alias}' does not appear in the query")]
    QueryAliasMismatch {
        /// The alias that could not be found.
        alias: String,
    },

    /// The query is not a read-only statement.
    #[error("Query rejected: {reason}")]
    ForbiddenQuery {
        /// Why the query was rejected.
        reason: String,
    },

    /// A year/month pair did not describe a real calendar month.
    #[error("Invalid period {year}-{month:02}")]
    InvalidPeriod {
        /// The requested year.
        year: i32,
        /// The requested month.
        month: u32,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_not_found_displays_path() {
        let error = EngineError::ConfigNotFound {
            path: "/missing/engine.yaml".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Configuration file not found: /missing/engine.yaml"
        );
    }

    #[test]
    fn test_config_parse_error_displays_path_and_message() {
        let error = EngineError::ConfigParseError {
            path: "/config/bad.yaml".to_string(),
            message: "invalid YAML syntax".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Failed to parse configuration file '/config/bad.yaml': invalid YAML syntax"
        );
    }

    #[test]
    fn test_no_company_association_is_distinct_from_fetch_failure() {
        let empty = EngineError::NoCompanyAssociation { principal_id: 7 };
        let failed = EngineError::MembershipFetchFailed {
            principal_id: 7,
            message: "timeout".to_string(),
        };
        assert_ne!(empty.to_string(), failed.to_string());
        assert_eq!(
            failed.to_string(),
            "Failed to fetch memberships for principal 7: timeout"
        );
    }

    #[test]
    fn test_alias_mismatch_displays_alias() {
        let error = EngineError::QueryAliasMismatch {
            alias: "ce".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Table alias 'ce' does not appear in the query"
        );
    }

    #[test]
    fn test_branch_access_denied_names_branch() {
        let error = EngineError::BranchAccessDenied { branch_id: 20 };
        assert_eq!(error.to_string(), "Access denied to branch 20");
    }

    #[test]
    fn test_invalid_period_pads_month() {
        let error = EngineError::InvalidPeriod {
            year: 2026,
            month: 13,
        };
        assert_eq!(error.to_string(), "Invalid period 2026-13");
    }

    #[test]
    fn test_errors_implement_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<EngineError>();
    }

    #[test]
    fn test_error_propagation_with_question_mark() {
        fn returns_not_authenticated() -> EngineResult<()> {
            Err(EngineError::NotAuthenticated)
        }

        fn propagates_error() -> EngineResult<()> {
            returns_not_authenticated()?;
            Ok(())
        }

        assert!(matches!(
            propagates_error(),
            Err(EngineError::NotAuthenticated)
        ));
    }
}
