//! Core data models for the Workforce Scope Engine.
//!
//! This module contains the domain models shared by the resolver, the
//! scoping engine, the attendance classifier and the payroll calculator.

mod attendance;
mod attendance_result;
mod principal;
mod salary;

pub use attendance::{
    AttendanceFacts, EmployeeProfile, Holiday, LeaveInterval, PunchRecord, RawHoliday, RawLeave,
    RawPunch,
};
pub use attendance_result::{AttendanceSummary, ClassifiedDay, DayStatus, MonthlyAttendance};
pub use principal::{CompanyMembership, Principal, RoleTier};
pub use salary::{
    DailyRateBasis, DeductionBreakdown, DeductionComponent, DeductionLine, EarningComponent,
    SalaryConfiguration, SalaryStructure,
};
