//! Attendance day classification.
//!
//! Reconstructs one canonical [`DayStatus`] per calendar day from holidays,
//! leave intervals, punches, the working-day configuration and the date of
//! joining. The decision order is fixed by business precedence:
//!
//! 1. `before_doj`
//! 2. `holiday`
//! 3. `week_off`
//! 4. `leave`
//! 5. `present`
//! 6. `absent`

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, NaiveDate, NaiveDateTime, Weekday};
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::models::{
    AttendanceFacts, AttendanceSummary, ClassifiedDay, DayStatus, EmployeeProfile, LeaveInterval,
    MonthlyAttendance, PunchRecord,
};

use super::dates::{NormalizedFacts, normalize_facts};
use super::working_days::WorkingDayConfig;

/// Returns the number of days in a calendar month, or `None` for an invalid
/// month.
///
/// # Example
///
/// ```
/// use workforce_scope_engine::attendance::days_in_month;
///
/// assert_eq!(days_in_month(2024, 2), Some(29));
/// assert_eq!(days_in_month(2026, 2), Some(28));
/// assert_eq!(days_in_month(2026, 13), None);
/// ```
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    u32::try_from((next - first).num_days()).ok()
}

/// Computes `present / working * 100`, clamped to 100 and rounded to one
/// decimal place. Zero working days yields zero.
///
/// # Example
///
/// ```
/// use workforce_scope_engine::attendance::attendance_percentage;
/// use rust_decimal::Decimal;
///
/// assert_eq!(attendance_percentage(0, 0), Decimal::ZERO);
/// assert_eq!(attendance_percentage(22, 22), Decimal::ONE_HUNDRED);
/// assert_eq!(attendance_percentage(25, 22), Decimal::ONE_HUNDRED);
/// assert_eq!(attendance_percentage(2, 3), Decimal::new(667, 1));
/// ```
pub fn attendance_percentage(present_days: u32, working_days: u32) -> Decimal {
    if working_days == 0 {
        return Decimal::ZERO;
    }
    let ratio = Decimal::from(present_days) * Decimal::ONE_HUNDRED / Decimal::from(working_days);
    ratio
        .min(Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
}

/// Classifies every day of a month for one employee.
///
/// Days run from the 1st through the last day of the month or, when the month
/// is the month of `now`, through today. A month entirely after `now` yields
/// no days. `now` is also the instant used to extend an open session on
/// today; that extension exists only in the returned value.
///
/// # Errors
///
/// Returns [`EngineError::InvalidPeriod`] when `month` is not 1-12 or the
/// year is out of range. Unreadable facts never fail the call; they are
/// counted in `skipped_records`.
///
/// # Example
///
/// ```
/// use workforce_scope_engine::attendance::classify_month;
/// use workforce_scope_engine::models::{AttendanceFacts, DayStatus, EmployeeProfile};
/// use chrono::NaiveDate;
///
/// let employee = EmployeeProfile {
///     employee_id: 7,
///     company_id: 1,
///     branch_id: 10,
///     name: "Meera".to_string(),
///     date_of_joining: None,
/// };
/// let now = NaiveDate::from_ymd_opt(2026, 4, 15).unwrap().and_hms_opt(12, 0, 0).unwrap();
///
/// let result = classify_month(&employee, 2026, 3, &AttendanceFacts::default(), now).unwrap();
/// assert_eq!(result.days.len(), 31);
/// // 2026-03-01 is a Sunday
/// assert_eq!(result.days[0].status, DayStatus::WeekOff);
/// assert_eq!(result.days[1].status, DayStatus::Absent);
/// ```
pub fn classify_month(
    employee: &EmployeeProfile,
    year: i32,
    month: u32,
    facts: &AttendanceFacts,
    now: NaiveDateTime,
) -> EngineResult<MonthlyAttendance> {
    let invalid = || EngineError::InvalidPeriod { year, month };
    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
    let month_len = days_in_month(year, month).ok_or_else(invalid)?;
    let last = first.with_day(month_len).ok_or_else(invalid)?;

    let today = now.date();
    let classified_through = if first > today {
        None
    } else {
        Some(last.min(today))
    };

    let normalized = normalize_facts(facts);
    let context = DayContext::new(employee, facts, &normalized);

    let mut days = Vec::new();
    if let Some(end) = classified_through {
        let mut date = first;
        while date <= end {
            days.push(context.classify(date, now));
            date = match date.succ_opt() {
                Some(next) => next,
                None => break,
            };
        }
    }

    let scheduled_working_days = first
        .iter_days()
        .take(month_len as usize)
        .filter(|d| {
            !context.holidays.contains_key(d) && context.working.is_working_day(d.weekday())
        })
        .count() as u32;

    let summary = summarize(&days);
    debug!(
        employee_id = employee.employee_id,
        year,
        month,
        classified_days = days.len(),
        working_days = summary.working_days,
        skipped = normalized.skipped,
        "Classified attendance month"
    );

    Ok(MonthlyAttendance {
        employee_id: employee.employee_id,
        year,
        month,
        days_in_month: month_len,
        scheduled_working_days,
        classified_through,
        days,
        summary,
        skipped_records: normalized.skipped,
    })
}

/// Aggregates classified days into a summary.
pub fn summarize(days: &[ClassifiedDay]) -> AttendanceSummary {
    let mut summary = AttendanceSummary::default();
    for day in days {
        match day.status {
            DayStatus::BeforeDoj => summary.before_joining_days += 1,
            DayStatus::Holiday => summary.holidays += 1,
            DayStatus::WeekOff => summary.week_offs += 1,
            DayStatus::Leave => summary.leave_days += 1,
            DayStatus::Present => {
                summary.present_days += 1;
                summary.total_minutes_worked = summary
                    .total_minutes_worked
                    .saturating_add(day.minutes_worked);
                if day.is_late {
                    summary.late_days += 1;
                }
                if day.is_half_day {
                    summary.half_days += 1;
                }
            }
            DayStatus::Absent => summary.absent_days += 1,
        }
        if day.status.counts_as_working_day() {
            summary.working_days += 1;
        }
    }
    summary.attendance_percentage =
        attendance_percentage(summary.present_days, summary.working_days);
    summary
}

/// Per-employee lookup tables built once per month.
struct DayContext<'a> {
    date_of_joining: Option<NaiveDate>,
    working: WorkingDayConfig,
    holidays: HashMap<NaiveDate, Option<String>>,
    leaves: Vec<&'a LeaveInterval>,
    punches: BTreeMap<NaiveDate, Vec<&'a PunchRecord>>,
}

impl<'a> DayContext<'a> {
    fn new(
        employee: &EmployeeProfile,
        facts: &AttendanceFacts,
        normalized: &'a NormalizedFacts,
    ) -> Self {
        let belongs = |id: Option<i64>| id.is_none_or(|id| id == employee.employee_id);

        let mut punches: BTreeMap<NaiveDate, Vec<&PunchRecord>> = BTreeMap::new();
        for punch in normalized.punches.iter().filter(|p| belongs(p.employee_id)) {
            punches.entry(punch.date).or_default().push(punch);
        }

        // Holidays without a branch apply company-wide.
        let holidays = normalized
            .holidays
            .iter()
            .filter(|h| h.branch_id.is_none_or(|b| b == employee.branch_id))
            .map(|h| (h.date, h.name.clone()))
            .collect();

        Self {
            date_of_joining: employee.date_of_joining,
            working: WorkingDayConfig::effective(
                &facts.employee_working_days,
                &facts.branch_working_days,
            ),
            holidays,
            leaves: normalized
                .leaves
                .iter()
                .filter(|l| belongs(l.employee_id))
                .collect(),
            punches,
        }
    }

    fn classify(&self, date: NaiveDate, now: NaiveDateTime) -> ClassifiedDay {
        let mut day = ClassifiedDay {
            date,
            weekday: weekday_name(date.weekday()).to_string(),
            status: DayStatus::Absent,
            minutes_worked: 0,
            punch_count: 0,
            is_late: false,
            is_half_day: false,
            in_progress: false,
            leave_type: None,
            holiday_name: None,
        };

        if self.date_of_joining.is_some_and(|doj| date < doj) {
            day.status = DayStatus::BeforeDoj;
            return day;
        }

        if let Some(name) = self.holidays.get(&date) {
            day.status = DayStatus::Holiday;
            day.holiday_name = name.clone();
            return day;
        }

        if !self.working.is_working_day(date.weekday()) {
            day.status = DayStatus::WeekOff;
            return day;
        }

        if let Some(leave) = self.leaves.iter().find(|l| l.covers(date)) {
            day.status = DayStatus::Leave;
            day.leave_type = leave.leave_type.clone();
            return day;
        }

        if let Some(punches) = self.punches.get(&date).filter(|p| !p.is_empty()) {
            day.status = DayStatus::Present;
            day.punch_count = punches.len();
            day.minutes_worked = punches
                .iter()
                .fold(0i64, |total, p| total.saturating_add(p.total_minutes));
            day.is_late = punches.iter().any(|p| p.is_late);
            day.is_half_day = punches.iter().any(|p| p.is_half_day);

            if date == now.date() {
                let latest = punches.iter().max_by_key(|p| p.check_in);
                if let Some(open) = latest.filter(|p| p.check_out.is_none()) {
                    let elapsed = (now - open.check_in).num_minutes().max(0);
                    day.minutes_worked = day.minutes_worked.saturating_add(elapsed);
                    day.in_progress = true;
                }
            }
        }

        day
    }
}

fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}
