//! Principal and company membership models.
//!
//! A [`Principal`] is an authenticated user together with every
//! [`CompanyMembership`] it holds. Memberships are always kept ordered by
//! activity count, highest first, so the primary company is simply the first
//! entry.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// The three-tier role model.
///
/// The wire representation used by the membership rows is a numeric role id:
/// 1 = company admin, 2 = branch manager, 3 = employee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleTier {
    /// Company-wide visibility.
    Admin,
    /// Visibility limited to a single branch of a company.
    BranchManager,
    /// Visibility limited to the employee's own record.
    Employee,
}

impl RoleTier {
    /// Maps a raw role id onto a tier.
    ///
    /// Unknown or missing ids fall back to [`RoleTier::Employee`], the least
    /// privileged tier.
    ///
    /// # Example
    ///
    /// ```
    /// use workforce_scope_engine::models::RoleTier;
    ///
    /// assert_eq!(RoleTier::from_role_id(Some(1)), RoleTier::Admin);
    /// assert_eq!(RoleTier::from_role_id(Some(2)), RoleTier::BranchManager);
    /// assert_eq!(RoleTier::from_role_id(None), RoleTier::Employee);
    /// assert_eq!(RoleTier::from_role_id(Some(42)), RoleTier::Employee);
    /// ```
    pub fn from_role_id(role_id: Option<i64>) -> Self {
        match role_id {
            Some(1) => RoleTier::Admin,
            Some(2) => RoleTier::BranchManager,
            _ => RoleTier::Employee,
        }
    }

    /// Returns the numeric role id for this tier.
    pub fn role_id(self) -> i64 {
        match self {
            RoleTier::Admin => 1,
            RoleTier::BranchManager => 2,
            RoleTier::Employee => 3,
        }
    }

    /// Returns true for the admin and branch manager tiers.
    pub fn is_manager(self) -> bool {
        !matches!(self, RoleTier::Employee)
    }
}

impl std::fmt::Display for RoleTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoleTier::Admin => write!(f, "Admin"),
            RoleTier::BranchManager => write!(f, "Branch Manager"),
            RoleTier::Employee => write!(f, "Employee"),
        }
    }
}

/// One (company, branch, role) association of a principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyMembership {
    /// The employee record id inside the company.
    pub employee_record_id: i64,
    /// The company id.
    pub company_id: i64,
    /// The company display name.
    pub company_name: String,
    /// The branch id (0 when the record has no branch).
    pub branch_id: i64,
    /// The branch display name.
    pub branch_name: String,
    /// The role tier held in this company.
    pub role: RoleTier,
    /// The job designation.
    pub designation: String,
    /// Number of attendance records; drives primary selection.
    pub activity_count: u64,
}

/// An authenticated user and its memberships.
///
/// Built fresh for every request and never cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    /// The stable user id.
    pub id: i64,
    /// The display name.
    pub name: String,
    /// The phone number used at login.
    pub phone: String,
    /// Super principals bypass all scoping.
    pub is_super: bool,
    memberships: Vec<CompanyMembership>,
}

impl Principal {
    /// Creates a principal, ordering memberships by activity count.
    ///
    /// The sort is stable, so memberships with equal activity keep the order
    /// in which they were supplied.
    ///
    /// # Example
    ///
    /// ```
    /// use workforce_scope_engine::models::{CompanyMembership, Principal, RoleTier};
    ///
    /// let membership = |company_id: i64, activity_count: u64| CompanyMembership {
    ///     employee_record_id: company_id * 10,
    ///     company_id,
    ///     company_name: format!("Company {}", company_id),
    ///     branch_id: 1,
    ///     branch_name: "Main".to_string(),
    ///     role: RoleTier::Employee,
    ///     designation: String::new(),
    ///     activity_count,
    /// };
    ///
    /// let principal = Principal::new(
    ///     1,
    ///     "Asha",
    ///     "9876543210",
    ///     false,
    ///     vec![membership(1, 4), membership(2, 30)],
    /// );
    /// assert_eq!(principal.primary().unwrap().company_id, 2);
    /// ```
    pub fn new(
        id: i64,
        name: impl Into<String>,
        phone: impl Into<String>,
        is_super: bool,
        mut memberships: Vec<CompanyMembership>,
    ) -> Self {
        memberships.sort_by(|a, b| b.activity_count.cmp(&a.activity_count));
        Self {
            id,
            name: name.into(),
            phone: phone.into(),
            is_super,
            memberships,
        }
    }

    /// Returns all memberships, highest activity first.
    pub fn memberships(&self) -> &[CompanyMembership] {
        &self.memberships
    }

    /// Returns the primary membership, if any.
    pub fn primary(&self) -> Option<&CompanyMembership> {
        self.memberships.first()
    }

    /// Returns the primary membership or [`EngineError::NoCompanyAssociation`].
    pub fn require_primary(&self) -> EngineResult<&CompanyMembership> {
        self.primary()
            .ok_or(EngineError::NoCompanyAssociation {
                principal_id: self.id,
            })
    }

    /// Finds the membership held in a company.
    pub fn membership_for_company(&self, company_id: i64) -> Option<&CompanyMembership> {
        self.memberships.iter().find(|m| m.company_id == company_id)
    }

    /// Finds a membership by case-insensitive partial company name.
    pub fn membership_by_company_name(&self, company_name: &str) -> Option<&CompanyMembership> {
        let needle = company_name.to_lowercase();
        self.memberships
            .iter()
            .find(|m| m.company_name.to_lowercase().contains(&needle))
    }

    /// Returns every employee record id held by this principal.
    pub fn employee_record_ids(&self) -> Vec<i64> {
        self.memberships
            .iter()
            .map(|m| m.employee_record_id)
            .collect()
    }

    /// Returns true when the employee record belongs to this principal.
    pub fn owns_record(&self, employee_record_id: i64) -> bool {
        self.memberships
            .iter()
            .any(|m| m.employee_record_id == employee_record_id)
    }

    /// Returns true when any membership carries a manager tier.
    pub fn has_manager_role(&self) -> bool {
        self.memberships.iter().any(|m| m.role.is_manager())
    }
}
