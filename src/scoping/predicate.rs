//! Row-visibility predicates.
//!
//! An [`AccessPredicate`] is built from a principal's memberships and can be
//! evaluated directly against structured rows or rendered as a SQL fragment
//! for textual row sources.

use serde::{Deserialize, Serialize};

use crate::models::{Principal, RoleTier};

/// The (company, branch, employee) triple a row is scoped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RowScope {
    /// The owning company.
    pub company_id: i64,
    /// The owning branch.
    pub branch_id: i64,
    /// The employee record.
    pub employee_id: i64,
}

/// Column names used when rendering a predicate as SQL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeColumns {
    /// Company column.
    #[serde(default = "default_company_column")]
    pub company: String,
    /// Branch column.
    #[serde(default = "default_branch_column")]
    pub branch: String,
    /// Employee column.
    #[serde(default = "default_employee_column")]
    pub employee: String,
}

fn default_company_column() -> String {
    "company_id".to_string()
}

fn default_branch_column() -> String {
    "company_branch_id".to_string()
}

fn default_employee_column() -> String {
    "company_employee_id".to_string()
}

impl Default for ScopeColumns {
    fn default() -> Self {
        Self {
            company: default_company_column(),
            branch: default_branch_column(),
            employee: default_employee_column(),
        }
    }
}

/// One disjunct of an access predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum ScopeClause {
    /// Every row of a company.
    Company {
        /// The company id.
        company_id: i64,
    },
    /// Every row of one branch of a company.
    Branch {
        /// The company id.
        company_id: i64,
        /// The branch id.
        branch_id: i64,
    },
    /// Only the rows of one employee record.
    Employee {
        /// The employee record id.
        employee_id: i64,
    },
}

impl ScopeClause {
    /// Returns true when the row satisfies this clause.
    pub fn matches(&self, row: &RowScope) -> bool {
        match *self {
            ScopeClause::Company { company_id } => row.company_id == company_id,
            ScopeClause::Branch {
                company_id,
                branch_id,
            } => row.company_id == company_id && row.branch_id == branch_id,
            ScopeClause::Employee { employee_id } => row.employee_id == employee_id,
        }
    }

    fn to_sql(self, alias: &str, columns: &ScopeColumns) -> String {
        let col = |name: &str| qualify(alias, name);
        match self {
            ScopeClause::Company { company_id } => {
                format!("{} = {}", col(&columns.company), company_id)
            }
            ScopeClause::Branch {
                company_id,
                branch_id,
            } => format!(
                "({} = {} AND {} = {})",
                col(&columns.company),
                company_id,
                col(&columns.branch),
                branch_id
            ),
            ScopeClause::Employee { employee_id } => {
                format!("{} = {}", col(&columns.employee), employee_id)
            }
        }
    }
}

fn qualify(alias: &str, column: &str) -> String {
    if alias.is_empty() {
        column.to_string()
    } else {
        format!("{}.{}", alias, column)
    }
}

/// A boolean function over a row's scope.
///
/// # Example
///
/// ```
/// use workforce_scope_engine::scoping::{AccessPredicate, RowScope, ScopeClause, ScopeColumns};
///
/// let predicate = AccessPredicate::AnyOf(vec![
///     ScopeClause::Company { company_id: 1 },
///     ScopeClause::Employee { employee_id: 99 },
/// ]);
/// let row = RowScope { company_id: 2, branch_id: 5, employee_id: 99 };
/// assert!(predicate.matches(&row));
/// assert_eq!(
///     predicate.to_sql("p", &ScopeColumns::default()),
///     "(p.company_id = 1 OR p.company_employee_id = 99)"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "clauses", rename_all = "snake_case")]
pub enum AccessPredicate {
    /// Every row is visible.
    Always,
    /// No row is visible.
    Never,
    /// A row is visible when any clause matches.
    AnyOf(Vec<ScopeClause>),
}

impl AccessPredicate {
    /// Returns true when the row is visible.
    pub fn matches(&self, row: &RowScope) -> bool {
        match self {
            AccessPredicate::Always => true,
            AccessPredicate::Never => false,
            AccessPredicate::AnyOf(clauses) => clauses.iter().any(|c| c.matches(row)),
        }
    }

    /// Keeps only the visible rows of a structured row source.
    pub fn filter_rows<'a, T, F>(
        &'a self,
        rows: &'a [T],
        scope_of: F,
    ) -> impl Iterator<Item = &'a T>
    where
        F: Fn(&T) -> RowScope + 'a,
    {
        rows.iter().filter(move |row| self.matches(&scope_of(row)))
    }

    /// Returns true for the always-true predicate.
    pub fn is_unrestricted(&self) -> bool {
        matches!(self, AccessPredicate::Always)
    }

    /// Renders the predicate as a SQL boolean expression.
    ///
    /// A single clause renders bare, several clauses as `(a OR b ...)`.
    pub fn to_sql(&self, alias: &str, columns: &ScopeColumns) -> String {
        match self {
            AccessPredicate::Always => "1=1".to_string(),
            AccessPredicate::Never => "1=0".to_string(),
            AccessPredicate::AnyOf(clauses) => match clauses.as_slice() {
                [] => "1=0".to_string(),
                [single] => single.to_sql(alias, columns),
                many => {
                    let parts: Vec<String> =
                        many.iter().map(|c| c.to_sql(alias, columns)).collect();
                    format!("({})", parts.join(" OR "))
                }
            },
        }
    }
}

/// Builds the access predicate for a principal.
///
/// Super principals see everything. Otherwise each membership contributes
/// one clause by tier, and a principal with no membership sees nothing.
///
/// # Example
///
/// ```
/// use workforce_scope_engine::models::Principal;
/// use workforce_scope_engine::scoping::{AccessPredicate, build_predicate};
///
/// let nobody = Principal::new(5, "Nobody", "", false, Vec::new());
/// assert_eq!(build_predicate(&nobody), AccessPredicate::Never);
/// ```
pub fn build_predicate(principal: &Principal) -> AccessPredicate {
    if principal.is_super {
        return AccessPredicate::Always;
    }

    let mut clauses: Vec<ScopeClause> = Vec::new();
    for membership in principal.memberships() {
        let clause = match membership.role {
            RoleTier::Admin => ScopeClause::Company {
                company_id: membership.company_id,
            },
            RoleTier::BranchManager => ScopeClause::Branch {
                company_id: membership.company_id,
                branch_id: membership.branch_id,
            },
            RoleTier::Employee => ScopeClause::Employee {
                employee_id: membership.employee_record_id,
            },
        };
        if !clauses.contains(&clause) {
            clauses.push(clause);
        }
    }

    if clauses.is_empty() {
        AccessPredicate::Never
    } else {
        AccessPredicate::AnyOf(clauses)
    }
}
