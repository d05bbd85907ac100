//! Date normalization boundary.
//!
//! Providers hand over dates as ISO strings with or without a time part,
//! with or without an offset, or as epoch timestamps. Everything is converted
//! into [`NaiveDate`] / [`NaiveDateTime`] here, once, before any
//! classification logic runs. Records whose dates cannot be read are dropped
//! and logged; they never abort a derivation.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::warn;

use crate::models::{
    AttendanceFacts, Holiday, LeaveInterval, PunchRecord, RawHoliday, RawLeave, RawPunch,
};

/// Epoch values at or above this magnitude are read as milliseconds.
const EPOCH_MILLIS_THRESHOLD: i64 = 100_000_000_000;

/// Upper bound on the minutes a single punch can contribute.
pub const MAX_PUNCH_MINUTES: i64 = 24 * 60;

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Normalizes any supported representation into a date.
///
/// # Example
///
/// ```
/// use workforce_scope_engine::attendance::normalize_date;
/// use chrono::NaiveDate;
/// use serde_json::json;
///
/// let expected = NaiveDate::from_ymd_opt(2026, 3, 2);
/// assert_eq!(normalize_date(&json!("2026-03-02")), expected);
/// assert_eq!(normalize_date(&json!("2026-03-02T18:30:00")), expected);
/// assert_eq!(normalize_date(&json!("2026-03-02 09:15:00.250")), expected);
/// assert_eq!(normalize_date(&json!("not a date")), None);
/// assert_eq!(normalize_date(&json!(null)), None);
/// ```
pub fn normalize_date(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .or_else(|| parse_datetime_str(s).map(|dt| dt.date()))
        }
        Value::Number(_) => normalize_datetime(value).map(|dt| dt.date()),
        _ => None,
    }
}

/// Normalizes any supported representation into a date-time.
///
/// Offsets are dropped after conversion so the recorded wall-clock time is
/// kept. Bare dates resolve to midnight.
pub fn normalize_datetime(value: &Value) -> Option<NaiveDateTime> {
    match value {
        Value::String(s) => parse_datetime_str(s.trim()),
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .and_then(from_epoch),
        _ => None,
    }
}

fn parse_datetime_str(s: &str) -> Option<NaiveDateTime> {
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }
    // Short digit runs are years or ids, not timestamps.
    if s.len() < 9 {
        return None;
    }
    s.parse::<i64>().ok().and_then(from_epoch)
}

fn from_epoch(raw: i64) -> Option<NaiveDateTime> {
    let dt = if raw.abs() >= EPOCH_MILLIS_THRESHOLD {
        DateTime::from_timestamp_millis(raw)
    } else {
        DateTime::from_timestamp(raw, 0)
    };
    dt.map(|dt| dt.naive_utc())
}

/// Reads a boolean flag stored as a bool, a number, or a string.
pub fn normalize_flag(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "y"
        ),
        _ => false,
    }
}

/// Reads a minute count stored as a number or a numeric string.
///
/// Values clamp into `0..=MAX_PUNCH_MINUTES`.
pub fn normalize_minutes(value: &Value) -> Option<i64> {
    let minutes = match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|f| f.round() as i64))
        }
        _ => None,
    }?;
    Some(minutes.clamp(0, MAX_PUNCH_MINUTES))
}

/// Serde adapter for optional dates in any supported representation.
///
/// Unreadable values deserialize to `None` instead of failing the request.
pub fn deserialize_optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(value) => {
            let date = normalize_date(&value);
            if date.is_none() {
                warn!(value = %value, "Ignoring unparseable date");
            }
            date
        }
    })
}

/// Normalizes a holiday row.
pub fn normalize_holiday(raw: &RawHoliday) -> Option<Holiday> {
    let date = normalize_date(&raw.date)?;
    Some(Holiday {
        branch_id: raw.branch_id,
        date,
        name: raw.name.clone(),
    })
}

/// Normalizes a leave row. Intervals ending before they start are rejected.
pub fn normalize_leave(raw: &RawLeave) -> Option<LeaveInterval> {
    let start = normalize_date(&raw.start_date)?;
    let end = normalize_date(&raw.end_date)?;
    if end < start {
        return None;
    }
    Some(LeaveInterval {
        employee_id: raw.employee_id,
        start,
        end,
        leave_type: raw.leave_type.clone(),
    })
}

/// Normalizes a punch row.
///
/// The check-in is mandatory. The attendance date falls back to the check-in
/// date, and missing minutes are derived from a closed session.
pub fn normalize_punch(raw: &RawPunch) -> Option<PunchRecord> {
    let check_in = normalize_datetime(&raw.check_in)?;
    let date = normalize_date(&raw.date).unwrap_or_else(|| check_in.date());
    let check_out = normalize_datetime(&raw.check_out);
    let total_minutes = normalize_minutes(&raw.total_minutes).unwrap_or_else(|| {
        check_out
            .map(|out| (out - check_in).num_minutes().clamp(0, MAX_PUNCH_MINUTES))
            .unwrap_or(0)
    });
    Some(PunchRecord {
        employee_id: raw.employee_id,
        date,
        check_in,
        check_out,
        total_minutes,
        is_late: normalize_flag(&raw.is_late),
        is_half_day: normalize_flag(&raw.is_half_day),
    })
}

/// Facts after normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedFacts {
    /// Readable holidays.
    pub holidays: Vec<Holiday>,
    /// Readable, approved leave intervals.
    pub leaves: Vec<LeaveInterval>,
    /// Readable punches.
    pub punches: Vec<PunchRecord>,
    /// Number of records dropped because they could not be read.
    pub skipped: u32,
}

/// Normalizes every raw fact, dropping unreadable records.
///
/// Leaves whose status is not "approved" are filtered out but are not
/// counted as skipped: they are valid, just not applicable.
pub fn normalize_facts(facts: &AttendanceFacts) -> NormalizedFacts {
    let mut normalized = NormalizedFacts::default();

    for raw in &facts.holidays {
        match normalize_holiday(raw) {
            Some(holiday) => normalized.holidays.push(holiday),
            None => {
                warn!(date = %raw.date, "Skipping holiday with unparseable date");
                normalized.skipped += 1;
            }
        }
    }

    for raw in &facts.leaves {
        if !raw.status.trim().eq_ignore_ascii_case("approved") {
            continue;
        }
        match normalize_leave(raw) {
            Some(leave) => normalized.leaves.push(leave),
            None => {
                warn!(
                    start = %raw.start_date,
                    end = %raw.end_date,
                    "Skipping leave with unparseable or inverted dates"
                );
                normalized.skipped += 1;
            }
        }
    }

    for raw in &facts.punches {
        match normalize_punch(raw) {
            Some(punch) => normalized.punches.push(punch),
            None => {
                warn!(check_in = %raw.check_in, "Skipping punch with unparseable check-in");
                normalized.skipped += 1;
            }
        }
    }

    normalized
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn datetime(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn test_rfc3339_keeps_wall_clock() {
        assert_eq!(
            normalize_datetime(&json!("2026-03-02T09:30:00+05:30")),
            Some(datetime("2026-03-02 09:30:00"))
        );
        assert_eq!(
            normalize_datetime(&json!("2026-03-02T09:30:00Z")),
            Some(datetime("2026-03-02 09:30:00"))
        );
    }

    #[test]
    fn test_epoch_millis_and_seconds() {
        // 2026-03-02 09:30:00 UTC
        assert_eq!(
            normalize_datetime(&json!(1772443800000_i64)),
            Some(datetime("2026-03-02 09:30:00"))
        );
        assert_eq!(
            normalize_datetime(&json!(1772443800_i64)),
            Some(datetime("2026-03-02 09:30:00"))
        );
        assert_eq!(
            normalize_datetime(&json!("1772443800000")),
            Some(datetime("2026-03-02 09:30:00"))
        );
    }

    #[test]
    fn test_bare_date_is_midnight() {
        assert_eq!(
            normalize_datetime(&json!("2026-03-02")),
            Some(datetime("2026-03-02 00:00:00"))
        );
    }

    #[test]
    fn test_unsupported_shapes() {
        assert_eq!(normalize_date(&json!({"date": "2026-03-02"})), None);
        assert_eq!(normalize_date(&json!(true)), None);
        assert_eq!(normalize_date(&json!("")), None);
        assert_eq!(normalize_date(&json!("2026-02-30")), None);
    }

    #[test]
    fn test_flags() {
        assert!(normalize_flag(&json!(1)));
        assert!(normalize_flag(&json!(true)));
        assert!(normalize_flag(&json!("1")));
        assert!(!normalize_flag(&json!(0)));
        assert!(!normalize_flag(&json!("0")));
        assert!(!normalize_flag(&json!(null)));
    }

    #[test]
    fn test_minutes() {
        assert_eq!(normalize_minutes(&json!(480)), Some(480));
        assert_eq!(normalize_minutes(&json!("240")), Some(240));
        assert_eq!(normalize_minutes(&json!(59.6)), Some(60));
        assert_eq!(normalize_minutes(&json!(-5)), Some(0));
        assert_eq!(normalize_minutes(&json!(null)), None);
    }

    #[test]
    fn test_minutes_clamp_to_one_day() {
        assert_eq!(normalize_minutes(&json!(9.0e18)), Some(MAX_PUNCH_MINUTES));
        assert_eq!(normalize_minutes(&json!(i64::MAX)), Some(MAX_PUNCH_MINUTES));
        assert_eq!(normalize_minutes(&json!("1e300")), Some(MAX_PUNCH_MINUTES));
        assert_eq!(normalize_minutes(&json!(f64::MIN)), Some(0));
    }

    #[test]
    fn test_punch_derives_minutes_and_date() {
        let raw = RawPunch {
            employee_id: Some(5),
            date: Value::Null,
            check_in: json!("2026-03-02T09:00:00"),
            check_out: json!("2026-03-02T17:30:00"),
            total_minutes: Value::Null,
            is_late: json!(1),
            is_half_day: json!(0),
        };
        let punch = normalize_punch(&raw).unwrap();
        assert_eq!(punch.date, date(2026, 3, 2));
        assert_eq!(punch.total_minutes, 510);
        assert!(punch.is_late);
        assert!(!punch.is_half_day);
    }

    #[test]
    fn test_open_punch_has_no_minutes() {
        let raw = RawPunch {
            employee_id: None,
            date: json!("2026-03-02"),
            check_in: json!("2026-03-02T09:00:00"),
            check_out: Value::Null,
            total_minutes: Value::Null,
            is_late: Value::Null,
            is_half_day: Value::Null,
        };
        let punch = normalize_punch(&raw).unwrap();
        assert!(punch.check_out.is_none());
        assert_eq!(punch.total_minutes, 0);
    }

    #[test]
    fn test_inverted_leave_rejected() {
        let raw = RawLeave {
            employee_id: None,
            start_date: json!("2026-03-05"),
            end_date: json!("2026-03-02"),
            leave_type: None,
            status: "approved".to_string(),
        };
        assert!(normalize_leave(&raw).is_none());
    }

    #[test]
    fn test_normalize_facts_counts_skipped_and_filters_pending() {
        let facts = AttendanceFacts {
            holidays: vec![
                RawHoliday {
                    branch_id: None,
                    date: json!("2026-03-10"),
                    name: Some("Festival".to_string()),
                },
                RawHoliday {
                    branch_id: None,
                    date: json!("tenth of march"),
                    name: None,
                },
            ],
            leaves: vec![RawLeave {
                employee_id: None,
                start_date: json!("2026-03-02"),
                end_date: json!("2026-03-03"),
                leave_type: Some("casual".to_string()),
                status: "pending".to_string(),
            }],
            punches: vec![RawPunch {
                employee_id: None,
                date: Value::Null,
                check_in: json!("garbage"),
                check_out: Value::Null,
                total_minutes: Value::Null,
                is_late: Value::Null,
                is_half_day: Value::Null,
            }],
            ..Default::default()
        };

        let normalized = normalize_facts(&facts);
        assert_eq!(normalized.holidays.len(), 1);
        assert!(normalized.leaves.is_empty());
        assert!(normalized.punches.is_empty());
        assert_eq!(normalized.skipped, 2);
    }
}
