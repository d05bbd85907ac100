//! Probation end-date arithmetic.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::attendance::days_in_month;

/// Probation state of an employee on a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbationStatus {
    /// The date of joining plus the probation period.
    pub end_date: NaiveDate,
    /// The end date lies strictly before today.
    pub is_overdue: bool,
    /// `end_date - today` in days; negative once overdue.
    pub days_remaining: i64,
}

/// Adds calendar months to a date, clamping the day to the target month.
///
/// # Example
///
/// ```
/// use workforce_scope_engine::payroll::add_months;
/// use chrono::NaiveDate;
///
/// let jan_31 = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
/// assert_eq!(add_months(jan_31, 1), NaiveDate::from_ymd_opt(2024, 2, 29));
/// assert_eq!(add_months(jan_31, 13), NaiveDate::from_ymd_opt(2025, 2, 28));
/// ```
pub fn add_months(date: NaiveDate, months: u32) -> Option<NaiveDate> {
    let total = date.year() as i64 * 12 + date.month0() as i64 + months as i64;
    let year = i32::try_from(total.div_euclid(12)).ok()?;
    let month = total.rem_euclid(12) as u32 + 1;
    let day = date.day().min(days_in_month(year, month)?);
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Computes the probation status for a date of joining.
///
/// Returns `None` when the probation period is zero months, or when the end
/// date would overflow the calendar.
///
/// # Example
///
/// ```
/// use workforce_scope_engine::payroll::probation_status;
/// use chrono::NaiveDate;
///
/// let doj = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
/// let today = NaiveDate::from_ymd_opt(2026, 7, 20).unwrap();
///
/// let status = probation_status(doj, 6, today).unwrap();
/// assert_eq!(status.end_date, NaiveDate::from_ymd_opt(2026, 7, 15).unwrap());
/// assert!(status.is_overdue);
/// assert_eq!(status.days_remaining, -5);
///
/// assert!(probation_status(doj, 0, today).is_none());
/// ```
pub fn probation_status(
    date_of_joining: NaiveDate,
    months: u32,
    today: NaiveDate,
) -> Option<ProbationStatus> {
    if months == 0 {
        return None;
    }
    let end_date = add_months(date_of_joining, months)?;
    Some(ProbationStatus {
        end_date,
        is_overdue: end_date < today,
        days_remaining: (end_date - today).num_days(),
    })
}
