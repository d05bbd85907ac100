//! HTTP request handlers for the tool endpoints.
//!
//! Every handler resolves the caller from its session, builds the access
//! predicate and only then touches the requested record.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use chrono::{Local, NaiveDateTime};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::attendance::classify_month;
use crate::error::{EngineError, EngineResult};
use crate::identity::{Credentials, resolve_principal};
use crate::models::{AttendanceFacts, EmployeeProfile, MonthlyAttendance, Principal};
use crate::payroll::{compute_deductions, deduction_input_for_month, probation_status};
use crate::scoping::{
    AccessPredicate, build_predicate, can_view_employee, can_view_sensitive_fields,
    ensure_visible, mask_sensitive_fields, scope_query, validate_read_only,
};
use crate::session::{credentials_for, mask_phone};

use super::request::{
    AttendanceRequest, BranchPolicyRequest, EmployeeDetailsRequest, ProbationStatusRequest,
    SalaryDeductionsRequest, ScopeQueryRequest, WhoAmIRequest,
};
use super::response::{
    ApiError, ApiErrorResponse, BranchPolicyResponse, EmployeeDetailsResponse,
    ProbationStatusResponse, SalaryDeductionsResponse, SalaryTotals, ScopeQueryResponse,
    WhoAmIResponse,
};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/tools/whoami", post(whoami_handler))
        .route("/tools/employee_details", post(employee_details_handler))
        .route("/tools/attendance", post(attendance_handler))
        .route("/tools/salary_deductions", post(salary_deductions_handler))
        .route("/tools/scope_query", post(scope_query_handler))
        .route("/tools/probation_status", post(probation_status_handler))
        .route("/tools/branch_policy", post(branch_policy_handler))
        .with_state(state)
}

/// An authenticated caller.
struct Caller {
    credentials: Credentials,
    principal: Principal,
    predicate: AccessPredicate,
}

/// Resolves the caller of a session.
///
/// Fails with [`EngineError::NotAuthenticated`] for unknown, expired or
/// unauthenticated sessions.
fn authorize(state: &AppState, session_id: &str) -> EngineResult<Caller> {
    let credentials = credentials_for(state.sessions(), session_id)?;
    let principal = resolve_principal(
        &credentials,
        state.config().super_admin_phone(),
        state.memberships(),
    )?;
    let predicate = build_predicate(&principal);

    Ok(Caller {
        credentials,
        principal,
        predicate,
    })
}

/// Authorizes the caller against an employee record.
///
/// The company and branch checked are the ones in `employee` as supplied by
/// the request; the engine performs no lookup of its own. Callers must pass
/// a profile read from the system of record, not one taken from end-user
/// input.
fn authorize_employee(
    state: &AppState,
    session_id: &str,
    employee: &EmployeeProfile,
) -> EngineResult<Caller> {
    let caller = authorize(state, session_id)?;
    if !can_view_employee(&caller.principal, employee.employee_id) {
        return Err(EngineError::AccessDenied {
            employee_id: employee.employee_id,
        });
    }
    ensure_visible(&caller.predicate, &employee.row_scope())?;
    Ok(caller)
}

/// Classifies a month, filling in the branch working days from the
/// configured policy when the facts carry none.
fn classify_for_employee(
    state: &AppState,
    employee: &EmployeeProfile,
    year: i32,
    month: u32,
    mut facts: AttendanceFacts,
    now: Option<NaiveDateTime>,
) -> EngineResult<MonthlyAttendance> {
    if facts.branch_working_days.is_null() {
        if let Ok(policy) = state.config().get_branch(employee.branch_id) {
            facts.branch_working_days = serde_json::json!(policy.working_days.days());
        }
    }
    let now = now.unwrap_or_else(|| Local::now().naive_local());
    classify_month(employee, year, month, &facts, now)
}

fn whoami(state: &AppState, request: WhoAmIRequest) -> EngineResult<WhoAmIResponse> {
    let caller = authorize(state, &request.session_id)?;
    let principal = caller.principal;
    if !principal.is_super {
        principal.require_primary()?;
    }

    Ok(WhoAmIResponse {
        user_id: principal.id,
        user_name: principal.name.clone(),
        phone: mask_phone(&caller.credentials.phone),
        is_super_admin: principal.is_super,
        primary: principal.primary().cloned(),
        memberships: principal.memberships().to_vec(),
    })
}

fn employee_details(
    state: &AppState,
    request: EmployeeDetailsRequest,
) -> EngineResult<EmployeeDetailsResponse> {
    let caller = authorize_employee(state, &request.session_id, &request.employee)?;
    let employee_id = request.employee.employee_id;
    let mut record = serde_json::Value::Object(request.record);
    mask_sensitive_fields(&caller.principal, employee_id, &mut record);

    Ok(EmployeeDetailsResponse {
        employee_id,
        name: request.employee.name,
        sensitive_fields_visible: can_view_sensitive_fields(&caller.principal, employee_id),
        record,
    })
}

fn attendance(state: &AppState, request: AttendanceRequest) -> EngineResult<MonthlyAttendance> {
    authorize_employee(state, &request.session_id, &request.employee)?;
    classify_for_employee(
        state,
        &request.employee,
        request.year,
        request.month,
        request.facts,
        request.now,
    )
}

fn salary_deductions(
    state: &AppState,
    request: SalaryDeductionsRequest,
) -> EngineResult<SalaryDeductionsResponse> {
    let caller = authorize_employee(state, &request.session_id, &request.employee)?;
    let policy = state.config().get_branch(request.employee.branch_id)?;
    let attendance = classify_for_employee(
        state,
        &request.employee,
        request.year,
        request.month,
        request.facts,
        request.now,
    )?;

    let input = deduction_input_for_month(&attendance, &request.salary, &policy.salary);
    let deductions = compute_deductions(&input);
    let bank_details = request.bank_details.map(|mut details| {
        mask_sensitive_fields(&caller.principal, request.employee.employee_id, &mut details);
        details
    });

    Ok(SalaryDeductionsResponse {
        employee_id: request.employee.employee_id,
        year: attendance.year,
        month: attendance.month,
        attendance: attendance.summary,
        salary: SalaryTotals {
            gross: request.salary.gross(),
            statutory_deductions: request.salary.statutory_total(),
            net: request.salary.net(),
        },
        deductions,
        bank_details,
    })
}

fn scope(state: &AppState, request: ScopeQueryRequest) -> EngineResult<ScopeQueryResponse> {
    let caller = authorize(state, &request.session_id)?;
    validate_read_only(&request.query)?;
    let scoped_query = scope_query(
        &request.query,
        &caller.predicate,
        &request.table_alias,
        &state.config().settings().scope_columns,
    )?;

    Ok(ScopeQueryResponse {
        scoped_query,
        predicate: caller.predicate,
    })
}

fn probation(
    state: &AppState,
    request: ProbationStatusRequest,
) -> EngineResult<ProbationStatusResponse> {
    authorize_employee(state, &request.session_id, &request.employee)?;
    let probation_months = match request.probation_months {
        Some(months) => months,
        None => state.config().get_branch(request.employee.branch_id)?.probation_months,
    };
    let today = request.today.unwrap_or_else(|| Local::now().date_naive());
    let status = request
        .employee
        .date_of_joining
        .and_then(|doj| probation_status(doj, probation_months, today));

    Ok(ProbationStatusResponse {
        employee_id: request.employee.employee_id,
        date_of_joining: request.employee.date_of_joining,
        probation_months,
        status,
    })
}

fn branch_policy(
    state: &AppState,
    request: BranchPolicyRequest,
) -> EngineResult<BranchPolicyResponse> {
    let caller = authorize(state, &request.session_id)?;
    let principal = &caller.principal;
    let branch_id = match request.branch_id {
        Some(id) => id,
        None => principal.require_primary()?.branch_id,
    };
    let policy = state.config().get_branch(branch_id)?;
    if !principal.is_super && principal.membership_for_company(policy.company_id).is_none() {
        return Err(EngineError::BranchAccessDenied { branch_id });
    }
    Ok(policy.into())
}

/// Maps a body extraction failure to a 400 response.
fn rejection_response(correlation_id: Uuid, rejection: JsonRejection) -> Response {
    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            // The body text carries serde's message
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    (
        StatusCode::BAD_REQUEST,
        [(header::CONTENT_TYPE, "application/json")],
        Json(error),
    )
        .into_response()
}

/// Turns a tool outcome into a JSON response and logs it.
fn tool_response<T: Serialize>(
    correlation_id: Uuid,
    tool: &'static str,
    start_time: Instant,
    result: EngineResult<T>,
) -> Response {
    match result {
        Ok(body) => {
            info!(
                correlation_id = %correlation_id,
                tool,
                duration_us = start_time.elapsed().as_micros(),
                "Tool call completed successfully"
            );
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "application/json")],
                Json(body),
            )
                .into_response()
        }
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                tool,
                error = %err,
                "Tool call failed"
            );
            let api_error: ApiErrorResponse = err.into();
            (
                api_error.status,
                [(header::CONTENT_TYPE, "application/json")],
                Json(api_error.error),
            )
                .into_response()
        }
    }
}

/// Handler for POST /tools/whoami.
async fn whoami_handler(
    State(state): State<AppState>,
    payload: Result<Json<WhoAmIRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, tool = "whoami", "Processing tool request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };
    let start_time = Instant::now();
    tool_response(correlation_id, "whoami", start_time, whoami(&state, request))
}

/// Handler for POST /tools/employee_details.
///
/// Returns an employee record with sensitive fields masked unless the caller
/// is a super admin or the record's owner.
async fn employee_details_handler(
    State(state): State<AppState>,
    payload: Result<Json<EmployeeDetailsRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(
        correlation_id = %correlation_id,
        tool = "employee_details",
        "Processing tool request"
    );

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };
    let start_time = Instant::now();
    tool_response(
        correlation_id,
        "employee_details",
        start_time,
        employee_details(&state, request),
    )
}

/// Handler for POST /tools/attendance.
///
/// Returns the classified month of one employee.
async fn attendance_handler(
    State(state): State<AppState>,
    payload: Result<Json<AttendanceRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, tool = "attendance", "Processing tool request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };
    let start_time = Instant::now();
    tool_response(
        correlation_id,
        "attendance",
        start_time,
        attendance(&state, request),
    )
}

/// Handler for POST /tools/salary_deductions.
///
/// Classifies the month and derives the attendance deductions using the
/// branch's salary configuration.
async fn salary_deductions_handler(
    State(state): State<AppState>,
    payload: Result<Json<SalaryDeductionsRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(
        correlation_id = %correlation_id,
        tool = "salary_deductions",
        "Processing tool request"
    );

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };
    let start_time = Instant::now();
    tool_response(
        correlation_id,
        "salary_deductions",
        start_time,
        salary_deductions(&state, request),
    )
}

/// Handler for POST /tools/scope_query.
async fn scope_query_handler(
    State(state): State<AppState>,
    payload: Result<Json<ScopeQueryRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, tool = "scope_query", "Processing tool request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };
    let start_time = Instant::now();
    tool_response(
        correlation_id,
        "scope_query",
        start_time,
        scope(&state, request),
    )
}

/// Handler for POST /tools/probation_status.
async fn probation_status_handler(
    State(state): State<AppState>,
    payload: Result<Json<ProbationStatusRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(
        correlation_id = %correlation_id,
        tool = "probation_status",
        "Processing tool request"
    );

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };
    let start_time = Instant::now();
    tool_response(
        correlation_id,
        "probation_status",
        start_time,
        probation(&state, request),
    )
}

/// Handler for POST /tools/branch_policy.
///
/// Reports the attendance and salary policy of a branch in the caller's
/// companies.
async fn branch_policy_handler(
    State(state): State<AppState>,
    payload: Result<Json<BranchPolicyRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, tool = "branch_policy", "Processing tool request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };
    let start_time = Instant::now();
    tool_response(
        correlation_id,
        "branch_policy",
        start_time,
        branch_policy(&state, request),
    )
}
