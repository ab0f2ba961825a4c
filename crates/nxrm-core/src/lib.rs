//! nxrm Core - Shared types for the nxrm provider
//!
//! This crate contains the host-runtime facing building blocks:
//!
//! - **Values**: three-valued attributes (known, null, unknown)
//! - **Schemas**: attribute trees with validators, defaults and plan modifiers
//! - **Planning**: configuration validation and planned-state computation
//! - **Diagnostics**: errors and warnings reported back to the host runtime
//! - **Version gates**: server version parsing and per-feature minimums

pub mod diagnostics;
pub mod error;
pub mod plan;
pub mod schema;
pub mod time;
pub mod value;
pub mod version;

pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use error::{CoreError, Result};
pub use plan::{values_equal, PlannedChange};
pub use schema::{
    attrs, block, Attribute, AttributeType, Attributes, PlanModifier, Schema, Validator,
};
pub use time::{format_rfc850, last_updated_now, RFC850};
pub use value::{clear_unknowns, contains_unknown, is_unknown, unknown, Attr, UNKNOWN_VALUE};
pub use version::{
    check_field_gates, require_version, Edition, FieldGate, GatePolicy, ServerVersion,
};
