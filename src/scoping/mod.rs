//! Authorization scoping.
//!
//! Converts a principal's memberships into an [`AccessPredicate`] and applies
//! it either to structured rows or to query text.

mod predicate;
mod query;
mod visibility;

pub use predicate::{AccessPredicate, RowScope, ScopeClause, ScopeColumns, build_predicate};
pub use query::{conjoin_clause, scope_query, validate_read_only};
pub use visibility::{
    HIDDEN_VALUE, SENSITIVE_FIELDS, can_view_employee, can_view_sensitive_fields, ensure_visible,
    mask_sensitive_fields,
};
