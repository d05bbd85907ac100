//! Working-day configuration.
//!
//! Weekdays are numbered 0 = Monday through 6 = Sunday. Configuration comes
//! from branches and from per-employee overrides in several textual shapes;
//! anything that cannot be read falls back to Monday through Friday.

use chrono::Weekday;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// The set of weekdays that count as working days.
///
/// # Example
///
/// ```
/// use workforce_scope_engine::attendance::WorkingDayConfig;
/// use chrono::Weekday;
/// use serde_json::json;
///
/// let config = WorkingDayConfig::resolve(&json!("Mon,Tue,Wed,Thu,Fri,Sat"));
/// assert!(config.is_working_day(Weekday::Sat));
/// assert!(!config.is_working_day(Weekday::Sun));
///
/// let fallback = WorkingDayConfig::resolve(&json!("whenever"));
/// assert_eq!(fallback, WorkingDayConfig::default());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Vec<u8>")]
pub struct WorkingDayConfig {
    days: [bool; 7],
}

impl Default for WorkingDayConfig {
    fn default() -> Self {
        Self {
            days: [true, true, true, true, true, false, false],
        }
    }
}

impl WorkingDayConfig {
    /// Builds a configuration from weekday numbers.
    ///
    /// Returns `None` when the list is empty or holds a number outside 0-6.
    pub fn from_days<I: IntoIterator<Item = u8>>(days: I) -> Option<Self> {
        let mut set = [false; 7];
        let mut any = false;
        for day in days {
            *set.get_mut(usize::from(day))? = true;
            any = true;
        }
        any.then_some(Self { days: set })
    }

    /// Parses a configuration value.
    ///
    /// Accepted shapes: a JSON array of numbers or names, a JSON array
    /// encoded as a string, or a comma/space/pipe separated list of numbers
    /// or names. Returns `None` for null, empty or unreadable input.
    pub fn parse(value: &Value) -> Option<Self> {
        match value {
            Value::Array(items) => {
                let days: Option<Vec<u8>> = items.iter().map(parse_token_value).collect();
                Self::from_days(days?)
            }
            Value::Number(_) => Self::from_days([parse_token_value(value)?]),
            Value::String(s) => {
                let s = s.trim();
                if s.starts_with('[') {
                    let inner: Value = serde_json::from_str(s).ok()?;
                    return Self::parse(&inner);
                }
                let days: Option<Vec<u8>> = s
                    .split(|c: char| c == ',' || c == '|' || c.is_whitespace())
                    .filter(|token| !token.is_empty())
                    .map(parse_token)
                    .collect();
                Self::from_days(days?)
            }
            _ => None,
        }
    }

    /// Parses a configuration value, falling back to Monday-Friday.
    pub fn resolve(value: &Value) -> Self {
        match Self::parse(value) {
            Some(config) => config,
            None => {
                if !value.is_null() {
                    warn!(value = %value, "Unreadable working-day configuration, using Mon-Fri");
                }
                Self::default()
            }
        }
    }

    /// Picks the employee override when readable, else the branch setting,
    /// else Monday-Friday.
    pub fn effective(employee_override: &Value, branch: &Value) -> Self {
        Self::parse(employee_override).unwrap_or_else(|| Self::resolve(branch))
    }

    /// Returns true when the weekday is a working day.
    pub fn is_working_day(&self, weekday: Weekday) -> bool {
        self.days[weekday.num_days_from_monday() as usize]
    }

    /// Returns the configured weekday numbers in ascending order.
    pub fn days(&self) -> Vec<u8> {
        (0u8..7).filter(|d| self.days[usize::from(*d)]).collect()
    }
}

impl From<Value> for WorkingDayConfig {
    fn from(value: Value) -> Self {
        Self::resolve(&value)
    }
}

impl From<WorkingDayConfig> for Vec<u8> {
    fn from(config: WorkingDayConfig) -> Self {
        config.days()
    }
}

fn parse_token_value(value: &Value) -> Option<u8> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|d| u8::try_from(d).ok()),
        Value::String(s) => parse_token(s.trim()),
        _ => None,
    }
}

fn parse_token(token: &str) -> Option<u8> {
    if let Ok(n) = token.parse::<u8>() {
        return Some(n);
    }
    let day = match token.to_ascii_lowercase().as_str() {
        "mon" | "monday" => 0,
        "tue" | "tues" | "tuesday" => 1,
        "wed" | "wednesday" => 2,
        "thu" | "thur" | "thurs" | "thursday" => 3,
        "fri" | "friday" => 4,
        "sat" | "saturday" => 5,
        "sun" | "sunday" => 6,
        _ => return None,
    };
    Some(day)
}
