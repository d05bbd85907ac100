//! Per-record visibility checks and sensitive-field masking.

use serde_json::Value;

use crate::error::{EngineError, EngineResult};
use crate::models::Principal;

use super::predicate::{AccessPredicate, RowScope};

/// Fields hidden from anyone but the record owner and super principals.
pub const SENSITIVE_FIELDS: [&str; 7] = [
    "pan_number",
    "aadhar_card_number",
    "uan_number",
    "bank_account_number",
    "bank_ifsc_code",
    "personal_email",
    "emergency_contact_number",
];

/// Replacement value for masked fields.
pub const HIDDEN_VALUE: &str = "***HIDDEN***";

/// Coarse check used before a record's scope is known.
///
/// Super principals, the record owner and any manager may look further; the
/// row predicate still decides which rows a manager actually sees.
pub fn can_view_employee(principal: &Principal, employee_record_id: i64) -> bool {
    principal.is_super || principal.owns_record(employee_record_id) || principal.has_manager_role()
}

/// Returns true when the principal may see sensitive fields of the record.
pub fn can_view_sensitive_fields(principal: &Principal, employee_record_id: i64) -> bool {
    principal.is_super || principal.owns_record(employee_record_id)
}

/// Fails with [`EngineError::AccessDenied`] unless the row is visible.
pub fn ensure_visible(predicate: &AccessPredicate, row: &RowScope) -> EngineResult<()> {
    if predicate.matches(row) {
        Ok(())
    } else {
        Err(EngineError::AccessDenied {
            employee_id: row.employee_id,
        })
    }
}

/// Masks sensitive fields of a JSON object unless the principal may see them.
///
/// # Example
///
/// ```
/// use workforce_scope_engine::models::Principal;
/// use workforce_scope_engine::scoping::mask_sensitive_fields;
/// use serde_json::json;
///
/// let manager = Principal::new(2, "Kiran", "", false, Vec::new());
/// let mut record = json!({ "name": "Dev", "pan_number": "ABCDE1234F" });
/// mask_sensitive_fields(&manager, 77, &mut record);
/// assert_eq!(record["pan_number"], "***HIDDEN***");
/// assert_eq!(record["name"], "Dev");
/// ```
pub fn mask_sensitive_fields(principal: &Principal, employee_record_id: i64, record: &mut Value) {
    if can_view_sensitive_fields(principal, employee_record_id) {
        return;
    }
    if let Value::Object(fields) = record {
        for name in SENSITIVE_FIELDS {
            if let Some(value) = fields.get_mut(name) {
                *value = Value::String(HIDDEN_VALUE.to_string());
            }
        }
    }
}
