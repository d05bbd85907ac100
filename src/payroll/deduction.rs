//! Salary deduction calculation.
//!
//! This module converts classified attendance counts and a branch salary
//! configuration into absent, half-day and late deductions. Each component
//! carries a human-readable formula so the figure can be explained to the
//! employee it was computed for.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{
    DailyRateBasis, DeductionBreakdown, DeductionComponent, DeductionLine, MonthlyAttendance,
    SalaryConfiguration, SalaryStructure,
};

/// Everything the calculator needs for one pay period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionInput {
    /// Gross pay for the period.
    pub gross: Decimal,
    /// Calendar days in the period.
    pub period_days: u32,
    /// Scheduled working days in the period.
    pub working_days: u32,
    /// Days classified absent.
    pub absent_days: u32,
    /// Present days flagged as half days.
    pub half_days: u32,
    /// Present days flagged late.
    pub late_days: u32,
    /// Late days tolerated before one day is deducted; 0 disables the rule.
    pub allowed_late_before_penalty: u32,
    /// Divisor used for the daily rate.
    pub basis: DailyRateBasis,
    /// Absent days that fall before the date of joining and must not be
    /// deducted.
    #[serde(default)]
    pub pre_joining_days: u32,
}

/// Rounds a monetary amount to two decimal places, midpoint away from zero.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Number of whole days deducted for late arrivals.
///
/// Every full block of `threshold` late days costs one day. A threshold of
/// zero disables the rule.
///
/// # Example
///
/// ```
/// use workforce_scope_engine::payroll::late_penalty_days;
///
/// assert_eq!(late_penalty_days(2, 3), 0);
/// assert_eq!(late_penalty_days(5, 3), 1);
/// assert_eq!(late_penalty_days(6, 3), 2);
/// assert_eq!(late_penalty_days(40, 0), 0);
/// ```
pub fn late_penalty_days(late_days: u32, threshold: u32) -> u32 {
    if threshold == 0 {
        return 0;
    }
    late_days / threshold
}

/// Computes the deduction breakdown for a pay period.
///
/// # Arguments
///
/// * `input` - Gross pay, period and working days, and the classified counts
///
/// # Returns
///
/// A [`DeductionBreakdown`] where:
/// - the daily rate is `gross / period_days` for calendar-day bases and
///   `gross / working_days` for working-day bases, or zero when the divisor
///   is zero
/// - absent days are reduced by `pre_joining_days` before pricing
/// - half days cost half the daily rate each
/// - late arrivals cost one day per full block of the allowed threshold
/// - `net_pay` is gross minus the total, never below zero
///
/// # Example
///
/// ```
/// use workforce_scope_engine::models::DailyRateBasis;
/// use workforce_scope_engine::payroll::{DeductionInput, compute_deductions};
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let breakdown = compute_deductions(&DeductionInput {
///     gross: Decimal::from_str("31000").unwrap(),
///     period_days: 31,
///     working_days: 22,
///     absent_days: 2,
///     half_days: 1,
///     late_days: 4,
///     allowed_late_before_penalty: 3,
///     basis: DailyRateBasis::CalendarDays,
///     pre_joining_days: 0,
/// });
///
/// assert_eq!(breakdown.daily_rate, Decimal::from_str("1000.00").unwrap());
/// assert_eq!(breakdown.absent.amount, Decimal::from_str("2000.00").unwrap());
/// assert_eq!(breakdown.half_day.amount, Decimal::from_str("500.00").unwrap());
/// assert_eq!(breakdown.late.amount, Decimal::from_str("1000.00").unwrap());
/// assert_eq!(breakdown.total_deduction, Decimal::from_str("3500.00").unwrap());
/// assert_eq!(breakdown.net_pay, Decimal::from_str("27500.00").unwrap());
/// ```
pub fn compute_deductions(input: &DeductionInput) -> DeductionBreakdown {
    let gross = round_money(input.gross);
    let (divisor, divisor_label) = match input.basis {
        DailyRateBasis::CalendarDays => (input.period_days, "calendar days"),
        DailyRateBasis::WorkingDays => (input.working_days, "working days"),
    };

    let daily_rate = if divisor == 0 {
        Decimal::ZERO
    } else {
        input.gross / Decimal::from(divisor)
    };
    let reported_rate = round_money(daily_rate);
    let daily_rate_formula = if divisor == 0 {
        format!("{:.2} / 0 {} = 0 (no days to divide by)", gross, divisor_label)
    } else {
        format!(
            "{:.2} / {} {} = {:.2}",
            gross, divisor, divisor_label, reported_rate
        )
    };

    let pre_joining_days_excluded = input.pre_joining_days.min(input.absent_days);
    let absent_days = input.absent_days - pre_joining_days_excluded;
    let absent_amount = round_money(Decimal::from(absent_days) * daily_rate);
    let absent_formula = if pre_joining_days_excluded > 0 {
        format!(
            "({} absent - {} before joining) = {} days x {:.2} = {:.2}",
            input.absent_days, pre_joining_days_excluded, absent_days, reported_rate, absent_amount
        )
    } else {
        format!(
            "{} absent days x {:.2} = {:.2}",
            absent_days, reported_rate, absent_amount
        )
    };

    let half_day_units = Decimal::from(input.half_days) * Decimal::new(5, 1);
    let half_day_amount = round_money(half_day_units * daily_rate);
    let half_day_formula = format!(
        "{} half days x 0.5 x {:.2} = {:.2}",
        input.half_days, reported_rate, half_day_amount
    );

    let threshold = input.allowed_late_before_penalty;
    let late_days_charged = late_penalty_days(input.late_days, threshold);
    let late_amount = round_money(Decimal::from(late_days_charged) * daily_rate);
    let late_formula = if threshold == 0 {
        format!("{} late days, no late threshold configured = 0", input.late_days)
    } else {
        format!(
            "floor({} late / {}) = {} days x {:.2} = {:.2}",
            input.late_days, threshold, late_days_charged, reported_rate, late_amount
        )
    };

    let total_deduction = absent_amount + half_day_amount + late_amount;
    let net_pay = (gross - total_deduction).max(Decimal::ZERO);

    debug!(
        basis = %input.basis,
        daily_rate = %reported_rate,
        absent_days,
        half_days = input.half_days,
        late_days_charged,
        total = %total_deduction,
        "Computed deductions"
    );

    DeductionBreakdown {
        gross_for_period: gross,
        basis: input.basis,
        daily_rate: reported_rate,
        daily_rate_formula,
        absent: DeductionLine {
            component: DeductionComponent::Absent,
            days: Decimal::from(absent_days),
            amount: absent_amount,
            formula: absent_formula,
        },
        half_day: DeductionLine {
            component: DeductionComponent::HalfDay,
            days: half_day_units,
            amount: half_day_amount,
            formula: half_day_formula,
        },
        late: DeductionLine {
            component: DeductionComponent::Late,
            days: Decimal::from(late_days_charged),
            amount: late_amount,
            formula: late_formula,
        },
        effective_absent_from_late: late_days_charged,
        pre_joining_days_excluded,
        total_deduction,
        net_pay,
    }
}

/// Builds the calculator input for a classified month.
///
/// Days before the date of joining are already classified `before_doj`
/// rather than `absent`, so no pre-joining adjustment is passed on. The
/// working-day divisor covers the whole month, not just the classified
/// range.
pub fn deduction_input_for_month(
    attendance: &MonthlyAttendance,
    salary: &SalaryStructure,
    config: &SalaryConfiguration,
) -> DeductionInput {
    DeductionInput {
        gross: salary.gross_for(&config.gross_components),
        period_days: attendance.days_in_month,
        working_days: attendance.scheduled_working_days,
        absent_days: attendance.summary.absent_days,
        half_days: attendance.summary.half_days,
        late_days: attendance.summary.late_days,
        allowed_late_before_penalty: config.allowed_late_before_penalty,
        basis: config.daily_rate_basis,
        pre_joining_days: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attendance::classify_month;
    use crate::models::{AttendanceFacts, DayStatus, EmployeeProfile, EarningComponent, RawPunch};
    use chrono::NaiveDate;
    use proptest::prelude::*;
    use serde_json::json;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn input(gross: &str, basis: DailyRateBasis) -> DeductionInput {
        DeductionInput {
            gross: dec(gross),
            period_days: 30,
            working_days: 22,
            absent_days: 0,
            half_days: 0,
            late_days: 0,
            allowed_late_before_penalty: 0,
            basis,
            pre_joining_days: 0,
        }
    }

    #[test]
    fn test_calendar_basis_daily_rate() {
        let result = compute_deductions(&input("30000", DailyRateBasis::CalendarDays));
        assert_eq!(result.daily_rate, dec("1000.00"));
        assert_eq!(
            result.daily_rate_formula,
            "30000.00 / 30 calendar days = 1000.00"
        );
    }

    #[test]
    fn test_working_basis_daily_rate_rounds_half_up() {
        let result = compute_deductions(&input("22011", DailyRateBasis::WorkingDays));
        // 22011 / 22 = 1000.5
        assert_eq!(result.daily_rate, dec("1000.50"));
    }

    #[test]
    fn test_zero_divisor_yields_zero_rate() {
        let mut zero = input("30000", DailyRateBasis::WorkingDays);
        zero.working_days = 0;
        zero.absent_days = 3;
        let result = compute_deductions(&zero);
        assert_eq!(result.daily_rate, Decimal::ZERO);
        assert_eq!(result.total_deduction, Decimal::ZERO);
        assert_eq!(result.net_pay, dec("30000"));
        assert!(result.daily_rate_formula.contains("no days to divide by"));
    }

    #[test]
    fn test_late_threshold_boundaries() {
        let mut late = input("30000", DailyRateBasis::CalendarDays);
        late.allowed_late_before_penalty = 3;
        for (late_days, expected) in [(0, 0), (2, 0), (3, 1), (5, 1), (6, 2)] {
            late.late_days = late_days;
            let result = compute_deductions(&late);
            assert_eq!(result.effective_absent_from_late, expected, "late_days={}", late_days);
            assert_eq!(result.late.amount, Decimal::from(expected) * dec("1000"));
        }
    }

    #[test]
    fn test_zero_threshold_disables_late_rule() {
        let mut late = input("30000", DailyRateBasis::CalendarDays);
        late.late_days = 12;
        let result = compute_deductions(&late);
        assert_eq!(result.late.amount, Decimal::ZERO);
        assert!(result.late.formula.contains("no late threshold"));
    }

    #[test]
    fn test_pre_joining_days_are_not_deducted() {
        let mut partial = input("30000", DailyRateBasis::CalendarDays);
        partial.absent_days = 12;
        partial.pre_joining_days = 9;
        let result = compute_deductions(&partial);
        assert_eq!(result.pre_joining_days_excluded, 9);
        assert_eq!(result.absent.days, dec("3"));
        assert_eq!(result.absent.amount, dec("3000.00"));
    }

    #[test]
    fn test_pre_joining_subtraction_saturates() {
        let mut partial = input("30000", DailyRateBasis::CalendarDays);
        partial.absent_days = 2;
        partial.pre_joining_days = 9;
        let result = compute_deductions(&partial);
        assert_eq!(result.pre_joining_days_excluded, 2);
        assert_eq!(result.absent.amount, Decimal::ZERO);
    }

    #[test]
    fn test_net_pay_never_negative() {
        let mut heavy = input("3000", DailyRateBasis::WorkingDays);
        heavy.working_days = 2;
        heavy.absent_days = 5;
        let result = compute_deductions(&heavy);
        assert_eq!(result.total_deduction, dec("7500.00"));
        assert_eq!(result.net_pay, Decimal::ZERO);
    }

    #[test]
    fn test_month_bridge_for_employee_joining_on_day_ten() {
        // April 2026 has 30 days and starts on a Wednesday.
        let employee = EmployeeProfile {
            employee_id: 12,
            company_id: 1,
            branch_id: 2,
            name: "New Joiner".to_string(),
            date_of_joining: NaiveDate::from_ymd_opt(2026, 4, 10),
        };
        let punch = |day: u32| RawPunch {
            employee_id: Some(12),
            date: json!(format!("2026-04-{:02}", day)),
            check_in: json!(format!("2026-04-{:02}T09:00:00", day)),
            check_out: json!(format!("2026-04-{:02}T17:00:00", day)),
            total_minutes: json!(480),
            is_late: json!(false),
            is_half_day: json!(false),
        };
        // Weekdays on or after the 10th: 10, 13-17, 20-24, 27-30 = 15.
        // Two of them are left without a punch.
        let punched: Vec<RawPunch> = [10, 13, 14, 15, 16, 17, 20, 21, 22, 23, 24, 27, 28]
            .into_iter()
            .map(punch)
            .collect();
        let facts = AttendanceFacts {
            punches: punched,
            ..Default::default()
        };
        let now = NaiveDate::from_ymd_opt(2026, 5, 5)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();

        let attendance = classify_month(&employee, 2026, 4, &facts, now).unwrap();
        for day in 1..=9 {
            assert_eq!(attendance.day(day).unwrap().status, DayStatus::BeforeDoj);
        }
        assert_eq!(attendance.summary.absent_days, 2);
        assert_eq!(attendance.day(29).unwrap().status, DayStatus::Absent);
        assert_eq!(attendance.day(30).unwrap().status, DayStatus::Absent);

        let salary = SalaryStructure {
            basic_salary: dec("24000"),
            special_allowance: dec("6000"),
            ..Default::default()
        };
        let config = SalaryConfiguration {
            daily_rate_basis: DailyRateBasis::CalendarDays,
            allowed_late_before_penalty: 3,
            gross_components: vec![
                EarningComponent::BasicSalary,
                EarningComponent::SpecialAllowance,
            ],
        };
        let input = deduction_input_for_month(&attendance, &salary, &config);
        let breakdown = compute_deductions(&input);
        assert_eq!(breakdown.absent.amount, dec("2000.00"));
        assert_eq!(breakdown.net_pay, dec("28000.00"));
    }

    proptest! {
        #[test]
        fn prop_late_penalty_matches_floor(late in 0u32..200, threshold in 1u32..20) {
            let days = late_penalty_days(late, threshold);
            prop_assert!(days * threshold <= late);
            prop_assert!(late < (days + 1) * threshold);
        }

        #[test]
        fn prop_total_is_sum_of_components(
            gross in 0u32..500_000,
            absent in 0u32..31,
            half in 0u32..31,
            late in 0u32..31,
            threshold in 0u32..6,
        ) {
            let result = compute_deductions(&DeductionInput {
                gross: Decimal::from(gross),
                period_days: 31,
                working_days: 23,
                absent_days: absent,
                half_days: half,
                late_days: late,
                allowed_late_before_penalty: threshold,
                basis: DailyRateBasis::CalendarDays,
                pre_joining_days: 0,
            });
            prop_assert_eq!(
                result.total_deduction,
                result.absent.amount + result.half_day.amount + result.late.amount
            );
            prop_assert!(result.net_pay >= Decimal::ZERO);
        }
    }
}
