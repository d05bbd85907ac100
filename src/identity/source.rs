//! Membership row providers.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::models::{CompanyMembership, RoleTier};

/// Failure reported by a membership source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Membership source error: {0}")]
pub struct SourceError(pub String);

/// One membership row as returned by the backing store.
///
/// Rows are heterogeneous: the activity count may arrive as a number or a
/// numeric string, and names, branch and role may be missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MembershipRow {
    /// The employee record id.
    pub company_employee_id: i64,
    /// The company id.
    pub company_id: i64,
    /// The company name.
    #[serde(default)]
    pub company_name: Option<String>,
    /// The branch id.
    #[serde(default)]
    pub company_branch_id: Option<i64>,
    /// The branch name.
    #[serde(default)]
    pub branch_name: Option<String>,
    /// The raw role id (1, 2 or 3).
    #[serde(default)]
    pub role_id: Option<i64>,
    /// The job designation.
    #[serde(default)]
    pub designation: Option<String>,
    /// Number of attendance records for the employee record.
    #[serde(default)]
    pub attendance_count: Value,
}

impl MembershipRow {
    /// Converts the row into a typed membership.
    ///
    /// # Example
    ///
    /// ```
    /// use workforce_scope_engine::identity::MembershipRow;
    /// use workforce_scope_engine::models::RoleTier;
    /// use serde_json::json;
    ///
    /// let row: MembershipRow = serde_json::from_value(json!({
    ///     "company_employee_id": 88,
    ///     "company_id": 3,
    ///     "role_id": 2,
    ///     "attendance_count": "17"
    /// }))
    /// .unwrap();
    ///
    /// let membership = row.into_membership();
    /// assert_eq!(membership.role, RoleTier::BranchManager);
    /// assert_eq!(membership.activity_count, 17);
    /// assert_eq!(membership.company_name, "Unknown");
    /// assert_eq!(membership.branch_id, 0);
    /// ```
    pub fn into_membership(self) -> CompanyMembership {
        CompanyMembership {
            employee_record_id: self.company_employee_id,
            company_id: self.company_id,
            company_name: self.company_name.unwrap_or_else(|| "Unknown".to_string()),
            branch_id: self.company_branch_id.unwrap_or(0),
            branch_name: self.branch_name.unwrap_or_else(|| "Unknown".to_string()),
            role: RoleTier::from_role_id(self.role_id),
            designation: self.designation.unwrap_or_default(),
            activity_count: parse_count(&self.attendance_count),
        }
    }
}

fn parse_count(value: &Value) -> u64 {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f > 0.0).map(|f| f as u64))
            .unwrap_or(0),
        Value::String(s) => s.trim().parse::<u64>().unwrap_or(0),
        _ => 0,
    }
}

/// Supplies the membership rows of a principal.
///
/// Implementations report backend failures as errors rather than as an
/// empty list, so callers can tell "no memberships" from "lookup failed".
pub trait MembershipSource: Send + Sync {
    /// Fetches every membership row held by the principal.
    fn fetch_memberships(&self, principal_id: i64) -> Result<Vec<MembershipRow>, SourceError>;
}

/// An in-memory membership source.
///
/// # Example
///
/// ```
/// use workforce_scope_engine::identity::{MembershipSource, StaticMembershipSource};
///
/// let source = StaticMembershipSource::new().with_failure(9, "connection reset");
/// assert!(source.fetch_memberships(1).unwrap().is_empty());
/// assert!(source.fetch_memberships(9).is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticMembershipSource {
    rows: HashMap<i64, Result<Vec<MembershipRow>, SourceError>>,
}

impl StaticMembershipSource {
    /// Creates an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the rows of a principal.
    pub fn with_rows(mut self, principal_id: i64, rows: Vec<MembershipRow>) -> Self {
        self.rows.insert(principal_id, Ok(rows));
        self
    }

    /// Makes every lookup for the principal fail.
    pub fn with_failure(mut self, principal_id: i64, message: impl Into<String>) -> Self {
        self.rows
            .insert(principal_id, Err(SourceError(message.into())));
        self
    }
}

impl MembershipSource for StaticMembershipSource {
    fn fetch_memberships(&self, principal_id: i64) -> Result<Vec<MembershipRow>, SourceError> {
        self.rows
            .get(&principal_id)
            .cloned()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(attendance_count: Value) -> MembershipRow {
        MembershipRow {
            company_employee_id: 1,
            company_id: 1,
            company_name: Some("Acme".to_string()),
            company_branch_id: Some(4),
            branch_name: Some("North".to_string()),
            role_id: Some(1),
            designation: Some("HR Lead".to_string()),
            attendance_count,
        }
    }

    #[test]
    fn test_activity_count_shapes() {
        assert_eq!(row(json!(12)).into_membership().activity_count, 12);
        assert_eq!(row(json!("12")).into_membership().activity_count, 12);
        assert_eq!(row(json!(null)).into_membership().activity_count, 0);
        assert_eq!(row(json!(-3)).into_membership().activity_count, 0);
        assert_eq!(row(json!("many")).into_membership().activity_count, 0);
    }

    #[test]
    fn test_missing_role_is_employee() {
        let mut r = row(json!(0));
        r.role_id = None;
        assert_eq!(r.into_membership().role, RoleTier::Employee);
    }

    #[test]
    fn test_full_row_converts() {
        let membership = row(json!(5)).into_membership();
        assert_eq!(membership.company_name, "Acme");
        assert_eq!(membership.branch_id, 4);
        assert_eq!(membership.branch_name, "North");
        assert_eq!(membership.role, RoleTier::Admin);
        assert_eq!(membership.designation, "HR Lead");
    }

    #[test]
    fn test_static_source_failure_is_error() {
        let source = StaticMembershipSource::new().with_failure(2, "timeout");
        assert_eq!(
            source.fetch_memberships(2),
            Err(SourceError("timeout".to_string()))
        );
    }
}
