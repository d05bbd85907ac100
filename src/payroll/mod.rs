//! Payroll derivation.
//!
//! Salary deductions computed from classified attendance, and probation
//! date arithmetic.

mod deduction;
mod probation;

pub use deduction::{
    DeductionInput, compute_deductions, deduction_input_for_month, late_penalty_days, round_money,
};
pub use probation::{ProbationStatus, add_months, probation_status};
