//! Configuration types for the engine and branch policies.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::attendance::WorkingDayConfig;
use crate::models::SalaryConfiguration;
use crate::scoping::ScopeColumns;
use crate::session::DEFAULT_SESSION_TIMEOUT_SECS;

fn default_session_timeout() -> u64 {
    DEFAULT_SESSION_TIMEOUT_SECS
}

/// Engine-wide settings from `engine.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Deployment name, shown in logs.
    pub name: String,
    /// Phone number whose owner bypasses all scoping.
    #[serde(default)]
    pub super_admin_phone: Option<String>,
    /// Idle session timeout in seconds.
    #[serde(default = "default_session_timeout")]
    pub session_timeout_secs: u64,
    /// Column names used when scoping query text.
    #[serde(default)]
    pub scope_columns: ScopeColumns,
}

/// Check-in thresholds in minutes after the shift start.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckInRules {
    /// Minutes tolerated before a check-in counts as late.
    pub grace_period_minutes: f64,
    /// Minutes of lateness before a check-in counts as a half day.
    pub late_period_minutes: f64,
    /// Minutes of half-day window before a check-in counts as absent.
    pub half_period_minutes: f64,
    /// Absolute absent cutoff. Values up to 2 are hours, larger values are
    /// minutes; 0 derives the cutoff from the other periods.
    pub full_day_absent: f64,
}

impl CheckInRules {
    /// Minutes after which a check-in is late.
    pub fn late_after_minutes(&self) -> f64 {
        self.grace_period_minutes
    }

    /// Minutes after which a check-in is a half day.
    pub fn half_day_after_minutes(&self) -> f64 {
        self.grace_period_minutes + self.late_period_minutes
    }

    /// Minutes after which a check-in counts as absent.
    ///
    /// # Example
    ///
    /// ```
    /// use workforce_scope_engine::config::CheckInRules;
    ///
    /// let rules = CheckInRules {
    ///     grace_period_minutes: 15.0,
    ///     late_period_minutes: 45.0,
    ///     half_period_minutes: 120.0,
    ///     full_day_absent: 0.0,
    /// };
    /// assert_eq!(rules.absent_after_minutes(), 180.0);
    ///
    /// let hours = CheckInRules { full_day_absent: 2.0, ..rules };
    /// assert_eq!(hours.absent_after_minutes(), 120.0);
    /// ```
    pub fn absent_after_minutes(&self) -> f64 {
        let fda = self.full_day_absent;
        if fda > 0.0 && fda <= 2.0 {
            fda * 60.0
        } else if fda > self.half_day_after_minutes() {
            fda
        } else {
            self.half_day_after_minutes() + self.half_period_minutes
        }
    }
}

/// Attendance and salary policy of one branch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchPolicy {
    /// The branch id.
    pub branch_id: i64,
    /// The owning company.
    pub company_id: i64,
    /// The branch display name.
    pub name: String,
    /// Weekdays that count as working days.
    #[serde(default)]
    pub working_days: WorkingDayConfig,
    /// Salary calculation settings.
    #[serde(default)]
    pub salary: SalaryConfiguration,
    /// Probation length in months; 0 means no probation.
    #[serde(default)]
    pub probation_months: u32,
    /// Check-in thresholds.
    #[serde(default)]
    pub check_in: CheckInRules,
    /// Minutes tolerated before a check-out counts as early.
    #[serde(default)]
    pub check_out_grace_minutes: f64,
}

/// Complete engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    settings: EngineSettings,
    branches: HashMap<i64, BranchPolicy>,
}

impl EngineConfig {
    /// Creates a configuration from its parts.
    pub fn new(settings: EngineSettings, branches: Vec<BranchPolicy>) -> Self {
        let branches = branches.into_iter().map(|b| (b.branch_id, b)).collect();
        Self { settings, branches }
    }

    /// Returns the engine settings.
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Returns all branch policies keyed by branch id.
    pub fn branches(&self) -> &HashMap<i64, BranchPolicy> {
        &self.branches
    }
}
