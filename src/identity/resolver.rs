//! Principal resolution.
//!
//! Turns authenticated credentials into a [`Principal`] carrying its ordered
//! memberships. A principal is rebuilt on every request.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{EngineError, EngineResult};
use crate::models::{CompanyMembership, Principal};

use super::source::MembershipSource;

/// The outcome of a membership lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MembershipResolution {
    /// At least one membership, highest activity first.
    Resolved(Vec<CompanyMembership>),
    /// The lookup succeeded and the principal holds no membership.
    NoMemberships,
    /// The lookup failed. Callers must fail closed.
    FetchFailed(String),
}

/// The identity attached to an authenticated session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// The user id; absent for a super admin without a user record.
    pub user_id: Option<i64>,
    /// The display name.
    pub user_name: String,
    /// The login phone number.
    pub phone: String,
}

/// Normalizes a phone number for comparison.
///
/// Spaces, dashes and `+` are removed and the last ten characters kept.
///
/// # Example
///
/// ```
/// use workforce_scope_engine::identity::normalize_phone;
///
/// assert_eq!(normalize_phone("+91 98765-43210"), "9876543210");
/// assert_eq!(normalize_phone("12345"), "12345");
/// ```
pub fn normalize_phone(phone: &str) -> String {
    let digits: Vec<char> = phone
        .trim()
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '+'))
        .collect();
    let start = digits.len().saturating_sub(10);
    digits[start..].iter().collect()
}

/// Returns true when the phone matches the configured super-admin phone.
///
/// An empty phone or an unset super-admin phone never matches.
pub fn is_super_admin(phone: &str, super_admin_phone: Option<&str>) -> bool {
    match super_admin_phone.map(str::trim).filter(|p| !p.is_empty()) {
        Some(configured) if !phone.trim().is_empty() => {
            normalize_phone(phone) == normalize_phone(configured)
        }
        _ => false,
    }
}

/// Looks up the memberships of a principal.
pub fn resolve_memberships(
    source: &dyn MembershipSource,
    principal_id: i64,
) -> MembershipResolution {
    match source.fetch_memberships(principal_id) {
        Ok(rows) if rows.is_empty() => MembershipResolution::NoMemberships,
        Ok(rows) => {
            let mut memberships: Vec<CompanyMembership> =
                rows.into_iter().map(|r| r.into_membership()).collect();
            memberships.sort_by(|a, b| b.activity_count.cmp(&a.activity_count));
            MembershipResolution::Resolved(memberships)
        }
        Err(e) => {
            warn!(principal_id, error = %e, "Membership lookup failed");
            MembershipResolution::FetchFailed(e.0)
        }
    }
}

/// Builds the principal for a set of credentials.
///
/// # Errors
///
/// - [`EngineError::NotAuthenticated`] when there is no user id and the
///   phone is not the super admin's.
/// - [`EngineError::MembershipFetchFailed`] when the membership lookup fails
///   for a non-super principal. No predicate can be built from a failed
///   lookup.
///
/// # Example
///
/// ```
/// use workforce_scope_engine::identity::{Credentials, StaticMembershipSource, resolve_principal};
///
/// let credentials = Credentials {
///     user_id: None,
///     user_name: String::new(),
///     phone: "+91 99999 00000".to_string(),
/// };
/// let source = StaticMembershipSource::new();
///
/// let principal = resolve_principal(&credentials, Some("9999900000"), &source).unwrap();
/// assert!(principal.is_super);
/// assert_eq!(principal.name, "Super Admin");
/// assert!(principal.memberships().is_empty());
/// ```
pub fn resolve_principal(
    credentials: &Credentials,
    super_admin_phone: Option<&str>,
    source: &dyn MembershipSource,
) -> EngineResult<Principal> {
    let is_super = is_super_admin(&credentials.phone, super_admin_phone);

    let Some(user_id) = credentials.user_id else {
        if is_super {
            let name = if credentials.user_name.is_empty() {
                "Super Admin"
            } else {
                credentials.user_name.as_str()
            };
            return Ok(Principal::new(0, name, &credentials.phone, true, Vec::new()));
        }
        return Err(EngineError::NotAuthenticated);
    };

    let memberships = match resolve_memberships(source, user_id) {
        MembershipResolution::Resolved(memberships) => memberships,
        MembershipResolution::NoMemberships => Vec::new(),
        MembershipResolution::FetchFailed(message) => {
            if !is_super {
                return Err(EngineError::MembershipFetchFailed {
                    principal_id: user_id,
                    message,
                });
            }
            Vec::new()
        }
    };

    debug!(
        principal_id = user_id,
        is_super,
        memberships = memberships.len(),
        "Resolved principal"
    );

    Ok(Principal::new(
        user_id,
        credentials.user_name.as_str(),
        credentials.phone.as_str(),
        is_super,
        memberships,
    ))
}
