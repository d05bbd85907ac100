//! Identity and role resolution.
//!
//! Maps authenticated credentials to a [`crate::models::Principal`] with its
//! company memberships ordered by activity.

mod resolver;
mod source;

pub use resolver::{
    Credentials, MembershipResolution, is_super_admin, normalize_phone, resolve_memberships,
    resolve_principal,
};
pub use source::{MembershipRow, MembershipSource, SourceError, StaticMembershipSource};
