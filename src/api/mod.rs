//! HTTP API module for the Workforce Scope Engine.
//!
//! Exposes the engine's operations as JSON tool endpoints. Each request
//! carries a session id; the caller's access predicate is resolved before
//! any record is read or derived.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{
    AttendanceRequest, BranchPolicyRequest, EmployeeDetailsRequest, ProbationStatusRequest,
    SalaryDeductionsRequest, ScopeQueryRequest, WhoAmIRequest,
};
pub use response::{
    ApiError, ApiErrorResponse, BranchPolicyResponse, CheckInThresholds, EmployeeDetailsResponse,
    ProbationStatusResponse, SalaryDeductionsResponse, SalaryTotals, ScopeQueryResponse,
    WhoAmIResponse,
};
pub use state::AppState;
