//! Attendance input models.
//!
//! Facts arrive from external providers in two shapes: the raw shape (dates
//! and flags as whatever JSON the provider produced) and the normalized shape
//! the classifier works on. Conversion between the two happens in
//! [`crate::attendance::dates`] and nowhere else.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::scoping::RowScope;

/// The employee whose attendance is being derived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeProfile {
    /// The employee record id.
    pub employee_id: i64,
    /// The owning company.
    pub company_id: i64,
    /// The branch the employee belongs to.
    pub branch_id: i64,
    /// The employee's display name.
    #[serde(default)]
    pub name: String,
    /// The date of joining, if known.
    #[serde(
        default,
        deserialize_with = "crate::attendance::dates::deserialize_optional_date"
    )]
    pub date_of_joining: Option<NaiveDate>,
}

impl EmployeeProfile {
    /// Returns the (company, branch, employee) triple used for scoping.
    pub fn row_scope(&self) -> RowScope {
        RowScope {
            company_id: self.company_id,
            branch_id: self.branch_id,
            employee_id: self.employee_id,
        }
    }
}

/// A holiday row as supplied by the calendar provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawHoliday {
    /// The branch the holiday applies to; `None` means every branch.
    #[serde(default)]
    pub branch_id: Option<i64>,
    /// The holiday date in any supported representation.
    #[serde(default)]
    pub date: Value,
    /// The holiday name.
    #[serde(default)]
    pub name: Option<String>,
}

/// A leave row as supplied by the leave provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawLeave {
    /// The employee the leave belongs to; `None` means the target employee.
    #[serde(default)]
    pub employee_id: Option<i64>,
    /// Inclusive first day of leave.
    #[serde(default)]
    pub start_date: Value,
    /// Inclusive last day of leave.
    #[serde(default)]
    pub end_date: Value,
    /// The leave type label (e.g. "casual", "sick").
    #[serde(default)]
    pub leave_type: Option<String>,
    /// The approval status; only "approved" leaves are considered.
    #[serde(default = "default_leave_status")]
    pub status: String,
}

fn default_leave_status() -> String {
    "approved".to_string()
}

/// A punch row as supplied by the attendance provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPunch {
    /// The employee the punch belongs to; `None` means the target employee.
    #[serde(default)]
    pub employee_id: Option<i64>,
    /// The attendance date; falls back to the check-in date when absent.
    #[serde(default)]
    pub date: Value,
    /// The check-in instant.
    #[serde(default)]
    pub check_in: Value,
    /// The check-out instant, null while the session is open.
    #[serde(default)]
    pub check_out: Value,
    /// Minutes recorded for this punch.
    #[serde(default)]
    pub total_minutes: Value,
    /// Late flag (bool, 0/1 or "0"/"1").
    #[serde(default)]
    pub is_late: Value,
    /// Half-day flag (bool, 0/1 or "0"/"1").
    #[serde(default)]
    pub is_half_day: Value,
}

/// Every external fact the classifier needs for one employee and month.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttendanceFacts {
    /// Branch holiday calendar.
    #[serde(default)]
    pub holidays: Vec<RawHoliday>,
    /// Leave intervals.
    #[serde(default)]
    pub leaves: Vec<RawLeave>,
    /// Punch records.
    #[serde(default)]
    pub punches: Vec<RawPunch>,
    /// Branch-level working-day configuration.
    #[serde(default)]
    pub branch_working_days: Value,
    /// Employee-level working-day override.
    #[serde(default)]
    pub employee_working_days: Value,
}

/// A normalized holiday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holiday {
    /// The branch the holiday applies to; `None` means every branch.
    pub branch_id: Option<i64>,
    /// The holiday date.
    pub date: NaiveDate,
    /// The holiday name.
    pub name: Option<String>,
}

/// A normalized, approved leave interval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveInterval {
    /// The employee the leave belongs to.
    pub employee_id: Option<i64>,
    /// Inclusive start date.
    pub start: NaiveDate,
    /// Inclusive end date.
    pub end: NaiveDate,
    /// The leave type label.
    pub leave_type: Option<String>,
}

impl LeaveInterval {
    /// Returns true when the date falls inside the interval (inclusive).
    pub fn covers(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// A normalized punch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PunchRecord {
    /// The employee the punch belongs to.
    pub employee_id: Option<i64>,
    /// The attendance date.
    pub date: NaiveDate,
    /// The check-in instant.
    pub check_in: NaiveDateTime,
    /// The check-out instant, if the session was closed.
    pub check_out: Option<NaiveDateTime>,
    /// Recorded minutes.
    pub total_minutes: i64,
    /// Whether the punch was flagged late.
    pub is_late: bool,
    /// Whether the punch was flagged as a half day.
    pub is_half_day: bool,
}
