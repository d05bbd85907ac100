//! Workforce Scope Engine
//!
//! This crate resolves who a caller is, limits what employee data they may
//! see according to their company memberships and roles, and derives
//! attendance and payroll figures from raw punch, leave and holiday records.
//!
//! The main entry points are [`identity::resolve_principal`],
//! [`scoping::build_predicate`], [`attendance::classify_month`] and
//! [`payroll::compute_deductions`]. The [`api`] module exposes them as JSON
//! tool endpoints.

#![warn(missing_docs)]

pub mod api;
pub mod attendance;
pub mod config;
pub mod error;
pub mod identity;
pub mod models;
pub mod payroll;
pub mod scoping;
pub mod session;
