//! Attendance derivation.
//!
//! This module turns raw holiday, leave and punch facts into one canonical
//! status per calendar day, plus monthly aggregates.

mod classifier;
pub mod dates;
mod working_days;

pub use classifier::{attendance_percentage, classify_month, days_in_month, summarize};
pub use dates::{NormalizedFacts, normalize_date, normalize_datetime, normalize_facts};
pub use working_days::WorkingDayConfig;
