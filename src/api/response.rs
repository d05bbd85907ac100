//! Response types for the tool endpoints.
//!
//! This module defines the success payloads, the error body and the mapping
//! from [`EngineError`] to HTTP status codes.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::BranchPolicy;
use crate::error::EngineError;
use crate::models::{AttendanceSummary, CompanyMembership, DailyRateBasis, DeductionBreakdown};
use crate::payroll::ProbationStatus;
use crate::scoping::AccessPredicate;

/// Response body of `/tools/whoami`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhoAmIResponse {
    /// The user id (0 for a super admin without a user record).
    pub user_id: i64,
    /// The display name.
    pub user_name: String,
    /// The phone with all but the last four digits masked.
    pub phone: String,
    /// Whether the caller bypasses scoping.
    pub is_super_admin: bool,
    /// The membership with the most activity.
    pub primary: Option<CompanyMembership>,
    /// Every membership, highest activity first.
    pub memberships: Vec<CompanyMembership>,
}

/// Salary totals before attendance deductions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalaryTotals {
    /// Sum of all earning components.
    pub gross: Decimal,
    /// Sum of statutory deductions.
    pub statutory_deductions: Decimal,
    /// Gross minus statutory deductions.
    pub net: Decimal,
}

/// Response body of `/tools/salary_deductions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalaryDeductionsResponse {
    /// The employee record id.
    pub employee_id: i64,
    /// The calendar year.
    pub year: i32,
    /// The calendar month.
    pub month: u32,
    /// Attendance counts the deductions are based on.
    pub attendance: AttendanceSummary,
    /// Salary totals from the structure.
    pub salary: SalaryTotals,
    /// The attendance deductions.
    pub deductions: DeductionBreakdown,
    /// Payout account details, masked unless the caller may see them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_details: Option<Value>,
}

/// Response body of `/tools/employee_details`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeDetailsResponse {
    /// The employee record id.
    pub employee_id: i64,
    /// The employee's name.
    pub name: String,
    /// Whether sensitive fields were returned unmasked.
    pub sensitive_fields_visible: bool,
    /// The record with sensitive fields masked where required.
    pub record: Value,
}

/// Response body of `/tools/scope_query`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScopeQueryResponse {
    /// The query with the access predicate applied.
    pub scoped_query: String,
    /// The predicate that was applied.
    pub predicate: AccessPredicate,
}

/// Response body of `/tools/probation_status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbationStatusResponse {
    /// The employee record id.
    pub employee_id: i64,
    /// The date of joining, if known.
    pub date_of_joining: Option<NaiveDate>,
    /// The probation period that was applied.
    pub probation_months: u32,
    /// `None` when there is no probation period or no joining date.
    pub status: Option<ProbationStatus>,
}

/// Derived check-in thresholds, in minutes after shift start.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckInThresholds {
    /// Minutes tolerated before a check-in is late.
    pub grace_period_minutes: f64,
    /// Check-ins after this are late.
    pub late_after_minutes: f64,
    /// Check-ins after this are half days.
    pub half_day_after_minutes: f64,
    /// Check-ins after this are absent.
    pub absent_after_minutes: f64,
}

/// Response body of `/tools/branch_policy`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchPolicyResponse {
    /// The branch id.
    pub branch_id: i64,
    /// The owning company.
    pub company_id: i64,
    /// The branch display name.
    pub name: String,
    /// Working weekdays, 0 = Monday.
    pub working_days: Vec<u8>,
    /// Check-in thresholds.
    pub check_in: CheckInThresholds,
    /// Minutes tolerated before a check-out is early.
    pub check_out_grace_minutes: f64,
    /// Daily rate divisor.
    pub daily_rate_basis: DailyRateBasis,
    /// Late days tolerated per deducted day; 0 disables the rule.
    pub allowed_late_before_penalty: u32,
    /// Probation length in months.
    pub probation_months: u32,
}

impl From<&BranchPolicy> for BranchPolicyResponse {
    fn from(policy: &BranchPolicy) -> Self {
        let rules = policy.check_in;
        Self {
            branch_id: policy.branch_id,
            company_id: policy.company_id,
            name: policy.name.clone(),
            working_days: policy.working_days.days(),
            check_in: CheckInThresholds {
                grace_period_minutes: rules.grace_period_minutes,
                late_after_minutes: rules.late_after_minutes(),
                half_day_after_minutes: rules.half_day_after_minutes(),
                absent_after_minutes: rules.absent_after_minutes(),
            },
            check_out_grace_minutes: policy.check_out_grace_minutes,
            daily_rate_basis: policy.salary.daily_rate_basis,
            allowed_late_before_penalty: policy.salary.allowed_late_before_penalty,
            probation_months: policy.probation_months,
        }
    }
}

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        let message = error.to_string();
        match error {
            EngineError::ConfigNotFound { .. } | EngineError::ConfigParseError { .. } => {
                ApiErrorResponse {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    error: ApiError::with_details("CONFIG_ERROR", "Configuration error", message),
                }
            }
            EngineError::BranchNotFound { .. } => ApiErrorResponse {
                status: StatusCode::NOT_FOUND,
                error: ApiError::with_details(
                    "BRANCH_NOT_FOUND",
                    message,
                    "No attendance or salary policy is configured for this branch",
                ),
            },
            EngineError::NotAuthenticated => ApiErrorResponse {
                status: StatusCode::UNAUTHORIZED,
                error: ApiError::new("NOT_AUTHENTICATED", message),
            },
            EngineError::NoCompanyAssociation { .. } => ApiErrorResponse {
                status: StatusCode::FORBIDDEN,
                error: ApiError::with_details(
                    "NO_COMPANY_ASSOCIATION",
                    message,
                    "The account is not linked to any company",
                ),
            },
            EngineError::MembershipFetchFailed { .. } => ApiErrorResponse {
                status: StatusCode::BAD_GATEWAY,
                error: ApiError::new("MEMBERSHIP_FETCH_FAILED", message),
            },
            EngineError::AccessDenied { .. } => ApiErrorResponse {
                status: StatusCode::FORBIDDEN,
                error: ApiError::new("ACCESS_DENIED", message),
            },
            EngineError::BranchAccessDenied { .. } => ApiErrorResponse {
                status: StatusCode::FORBIDDEN,
                error: ApiError::new("ACCESS_DENIED", message),
            },
            EngineError::QueryAliasMismatch { .. } => ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error: ApiError::with_details(
                    "QUERY_ALIAS_MISMATCH",
                    message,
                    "The table alias must qualify the scoped table in the query",
                ),
            },
            EngineError::ForbiddenQuery { .. } => ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error: ApiError::new("FORBIDDEN_QUERY", message),
            },
            EngineError::InvalidPeriod { .. } => ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error: ApiError::validation_error(message),
            },
        }
    }
}
