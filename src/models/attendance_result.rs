//! Attendance classification result models.
//!
//! This module contains the [`MonthlyAttendance`] type and its associated
//! structures: one [`ClassifiedDay`] per calendar day and an
//! [`AttendanceSummary`] with the aggregate counts.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The canonical status of a single calendar day.
///
/// Statuses are mutually exclusive and are computed fresh on every call.
///
/// # Example
///
/// ```
/// use workforce_scope_engine::models::DayStatus;
///
/// assert!(DayStatus::Leave.counts_as_working_day());
/// assert!(!DayStatus::Holiday.counts_as_working_day());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayStatus {
    /// The day precedes the employee's date of joining.
    BeforeDoj,
    /// The day is in the branch holiday calendar.
    Holiday,
    /// The weekday is not a configured working day.
    WeekOff,
    /// The day is covered by an approved leave.
    Leave,
    /// At least one punch exists for the day.
    Present,
    /// None of the above.
    Absent,
}

impl DayStatus {
    /// Returns true for days that count toward expected attendance.
    pub fn counts_as_working_day(self) -> bool {
        matches!(self, DayStatus::Leave | DayStatus::Present | DayStatus::Absent)
    }
}

impl std::fmt::Display for DayStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            DayStatus::BeforeDoj => "before_doj",
            DayStatus::Holiday => "holiday",
            DayStatus::WeekOff => "week_off",
            DayStatus::Leave => "leave",
            DayStatus::Present => "present",
            DayStatus::Absent => "absent",
        };
        write!(f, "{}", label)
    }
}

/// The classification of a single day with its supporting details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedDay {
    /// The calendar date.
    pub date: NaiveDate,
    /// The weekday name (e.g. "Monday").
    pub weekday: String,
    /// The derived status.
    pub status: DayStatus,
    /// Minutes worked, including any live session on today.
    pub minutes_worked: i64,
    /// Number of punches recorded on the day.
    pub punch_count: usize,
    /// Any punch on the day was flagged late.
    pub is_late: bool,
    /// Any punch on the day was flagged as a half day.
    pub is_half_day: bool,
    /// The day is today and the latest punch has no check-out.
    pub in_progress: bool,
    /// The leave type when the status is `leave`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leave_type: Option<String>,
    /// The holiday name when the status is `holiday`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub holiday_name: Option<String>,
}

/// Aggregate counts over the classified range.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceSummary {
    /// Days in {leave, present, absent}.
    pub working_days: u32,
    /// Present days.
    pub present_days: u32,
    /// Absent days.
    pub absent_days: u32,
    /// Present days with any late punch.
    pub late_days: u32,
    /// Present days with any half-day punch.
    pub half_days: u32,
    /// Leave days.
    pub leave_days: u32,
    /// Holiday days.
    pub holidays: u32,
    /// Week-off days.
    pub week_offs: u32,
    /// Days before the date of joining.
    pub before_joining_days: u32,
    /// Total minutes worked across present days.
    pub total_minutes_worked: i64,
    /// `present_days / working_days * 100`, clamped to 100, one decimal.
    pub attendance_percentage: Decimal,
}

/// The classified attendance of one employee for one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyAttendance {
    /// The employee record id.
    pub employee_id: i64,
    /// The calendar year.
    pub year: i32,
    /// The calendar month (1-12).
    pub month: u32,
    /// Number of days in the calendar month.
    pub days_in_month: u32,
    /// Full-month days that are neither holidays nor week-offs.
    pub scheduled_working_days: u32,
    /// Last classified date; `None` when the month lies in the future.
    pub classified_through: Option<NaiveDate>,
    /// One entry per classified day, in date order.
    pub days: Vec<ClassifiedDay>,
    /// Aggregate counts.
    pub summary: AttendanceSummary,
    /// Raw records dropped because a date could not be parsed.
    pub skipped_records: u32,
}

impl MonthlyAttendance {
    /// Returns the classification for a given day of the month.
    pub fn day(&self, day_of_month: u32) -> Option<&ClassifiedDay> {
        self.days
            .iter()
            .find(|d| chrono::Datelike::day(&d.date) == day_of_month)
    }
}
