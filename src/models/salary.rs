//! Salary configuration and deduction result models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How the daily rate is derived from the period gross.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DailyRateBasis {
    /// Gross divided by the number of calendar days in the period.
    #[serde(alias = "month_total_day")]
    CalendarDays,
    /// Gross divided by the number of working days in the period.
    WorkingDays,
}

impl std::fmt::Display for DailyRateBasis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DailyRateBasis::CalendarDays => write!(f, "calendar_days"),
            DailyRateBasis::WorkingDays => write!(f, "working_days"),
        }
    }
}

/// A named earning component of a salary structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EarningComponent {
    /// Basic salary.
    BasicSalary,
    /// House rent allowance.
    HouseRentAllowance,
    /// Dearness allowance.
    DearnessAllowance,
    /// Travel allowance.
    TravelAllowance,
    /// Conveyance allowance.
    ConveyanceAllowance,
    /// Medical allowance.
    MedicalAllowance,
    /// Special allowance.
    SpecialAllowance,
    /// Bonus allowance.
    BonusAllowance,
}

impl EarningComponent {
    /// Every earning component, in payslip order.
    pub const ALL: [EarningComponent; 8] = [
        EarningComponent::BasicSalary,
        EarningComponent::HouseRentAllowance,
        EarningComponent::DearnessAllowance,
        EarningComponent::TravelAllowance,
        EarningComponent::ConveyanceAllowance,
        EarningComponent::MedicalAllowance,
        EarningComponent::SpecialAllowance,
        EarningComponent::BonusAllowance,
    ];
}

fn all_earning_components() -> Vec<EarningComponent> {
    EarningComponent::ALL.to_vec()
}

/// Per-branch salary configuration. Read-only to the calculator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryConfiguration {
    /// Daily-rate basis.
    pub daily_rate_basis: DailyRateBasis,
    /// Late days allowed before one day's pay is deducted.
    #[serde(default)]
    pub allowed_late_before_penalty: u32,
    /// Earning components that make up the gross used for the daily rate.
    #[serde(default = "all_earning_components")]
    pub gross_components: Vec<EarningComponent>,
}

impl Default for SalaryConfiguration {
    fn default() -> Self {
        Self {
            daily_rate_basis: DailyRateBasis::CalendarDays,
            allowed_late_before_penalty: 0,
            gross_components: all_earning_components(),
        }
    }
}

/// An employee's current monthly salary structure.
///
/// # Example
///
/// ```
/// use workforce_scope_engine::models::SalaryStructure;
/// use rust_decimal::Decimal;
///
/// let salary = SalaryStructure {
///     basic_salary: Decimal::new(20000, 0),
///     house_rent_allowance: Decimal::new(8000, 0),
///     provident_fund: Decimal::new(1800, 0),
///     ..Default::default()
/// };
/// assert_eq!(salary.gross(), Decimal::new(28000, 0));
/// assert_eq!(salary.net(), Decimal::new(26200, 0));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SalaryStructure {
    /// Basic salary.
    pub basic_salary: Decimal,
    /// House rent allowance.
    pub house_rent_allowance: Decimal,
    /// Dearness allowance.
    pub dearness_allowance: Decimal,
    /// Travel allowance.
    pub travel_allowance: Decimal,
    /// Conveyance allowance.
    pub conveyance_allowance: Decimal,
    /// Medical allowance.
    pub medical_allowance: Decimal,
    /// Special allowance.
    pub special_allowance: Decimal,
    /// Bonus allowance.
    pub bonus_allowance: Decimal,
    /// Provident fund contribution.
    pub provident_fund: Decimal,
    /// Employee state insurance.
    pub esi: Decimal,
    /// Professional tax.
    pub professional_tax: Decimal,
    /// Tax deducted at source.
    pub tds: Decimal,
    /// National pension system contribution.
    pub national_pension_system: Decimal,
}

impl SalaryStructure {
    /// Returns the amount of a single earning component.
    pub fn earning(&self, component: EarningComponent) -> Decimal {
        match component {
            EarningComponent::BasicSalary => self.basic_salary,
            EarningComponent::HouseRentAllowance => self.house_rent_allowance,
            EarningComponent::DearnessAllowance => self.dearness_allowance,
            EarningComponent::TravelAllowance => self.travel_allowance,
            EarningComponent::ConveyanceAllowance => self.conveyance_allowance,
            EarningComponent::MedicalAllowance => self.medical_allowance,
            EarningComponent::SpecialAllowance => self.special_allowance,
            EarningComponent::BonusAllowance => self.bonus_allowance,
        }
    }

    /// Sum of every earning component.
    pub fn gross(&self) -> Decimal {
        self.gross_for(&EarningComponent::ALL)
    }

    /// Sum of the selected earning components. Duplicates count once.
    pub fn gross_for(&self, components: &[EarningComponent]) -> Decimal {
        EarningComponent::ALL
            .iter()
            .filter(|c| components.contains(c))
            .map(|c| self.earning(*c))
            .sum()
    }

    /// Sum of the statutory deductions.
    pub fn statutory_total(&self) -> Decimal {
        self.provident_fund
            + self.esi
            + self.professional_tax
            + self.tds
            + self.national_pension_system
    }

    /// Gross earnings less statutory deductions.
    pub fn net(&self) -> Decimal {
        self.gross() - self.statutory_total()
    }
}

/// The attendance-driven deduction components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeductionComponent {
    /// Full days absent.
    Absent,
    /// Half days.
    HalfDay,
    /// Late arrivals converted into whole days.
    Late,
}

/// One deduction component with the formula that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionLine {
    /// The component.
    pub component: DeductionComponent,
    /// The number of day-equivalents charged.
    pub days: Decimal,
    /// The amount deducted.
    pub amount: Decimal,
    /// Human-readable formula for auditing.
    pub formula: String,
}

/// The full deduction breakdown for a pay period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionBreakdown {
    /// The gross used for the period.
    pub gross_for_period: Decimal,
    /// The daily-rate basis that was applied.
    pub basis: DailyRateBasis,
    /// The daily rate (zero when the divisor is zero).
    pub daily_rate: Decimal,
    /// Formula for the daily rate.
    pub daily_rate_formula: String,
    /// Absent days deduction.
    pub absent: DeductionLine,
    /// Half-day deduction.
    pub half_day: DeductionLine,
    /// Late-arrival deduction.
    pub late: DeductionLine,
    /// Whole days charged because of late arrivals.
    pub effective_absent_from_late: u32,
    /// Pre-joining days removed from the absent count.
    pub pre_joining_days_excluded: u32,
    /// Sum of the three components.
    pub total_deduction: Decimal,
    /// Gross less the total deduction, never negative.
    pub net_pay: Decimal,
}
