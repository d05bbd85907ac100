//! Request types for the tool endpoints.
//!
//! Every request names the session it acts for. Attendance facts travel in
//! the request body in their raw provider shape and are normalized by the
//! engine.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::{AttendanceFacts, EmployeeProfile, SalaryStructure};

/// Request body for `/tools/whoami`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhoAmIRequest {
    /// The caller's session.
    pub session_id: String,
}

/// Request body for `/tools/employee_details`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeDetailsRequest {
    /// The caller's session.
    pub session_id: String,
    /// The employee the record belongs to.
    pub employee: EmployeeProfile,
    /// The provider's employee record.
    #[serde(default)]
    pub record: Map<String, Value>,
}

/// Request body for `/tools/attendance`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceRequest {
    /// The caller's session.
    pub session_id: String,
    /// The employee whose month is classified.
    pub employee: EmployeeProfile,
    /// The calendar year.
    pub year: i32,
    /// The calendar month (1-12).
    pub month: u32,
    /// Raw holidays, leaves, punches and working-day settings.
    #[serde(default)]
    pub facts: AttendanceFacts,
    /// Evaluation instant; defaults to the server's local time.
    #[serde(default)]
    pub now: Option<NaiveDateTime>,
}

/// Request body for `/tools/salary_deductions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalaryDeductionsRequest {
    /// The caller's session.
    pub session_id: String,
    /// The employee whose pay is derived.
    pub employee: EmployeeProfile,
    /// The calendar year.
    pub year: i32,
    /// The calendar month (1-12).
    pub month: u32,
    /// Raw holidays, leaves, punches and working-day settings.
    #[serde(default)]
    pub facts: AttendanceFacts,
    /// The employee's salary structure.
    pub salary: SalaryStructure,
    /// Payout account details, returned masked to callers other than the
    /// employee.
    #[serde(default)]
    pub bank_details: Option<Value>,
    /// Evaluation instant; defaults to the server's local time.
    #[serde(default)]
    pub now: Option<NaiveDateTime>,
}

/// Request body for `/tools/scope_query`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScopeQueryRequest {
    /// The caller's session.
    pub session_id: String,
    /// A read-only SQL statement.
    pub query: String,
    /// The alias of the table the scope columns belong to.
    pub table_alias: String,
}

/// Request body for `/tools/probation_status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbationStatusRequest {
    /// The caller's session.
    pub session_id: String,
    /// The employee whose probation is checked.
    pub employee: EmployeeProfile,
    /// Overrides the branch probation period.
    #[serde(default)]
    pub probation_months: Option<u32>,
    /// Reference day; defaults to the server's local date.
    #[serde(default)]
    pub today: Option<NaiveDate>,
}

/// Request body for `/tools/branch_policy`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchPolicyRequest {
    /// The caller's session.
    pub session_id: String,
    /// The branch to report; defaults to the caller's primary branch.
    #[serde(default)]
    pub branch_id: Option<i64>,
}
