//! Validation engine subsystem
//!
//! # Design principles
//!
//! - One pass, all errors: validation never stops at the first failing
//!   field
//! - Deterministic error order: depth-first, field-declaration order
//! - Validation faults are data, not panics
//! - A valid payload is re-expressed as a typed value

mod engine;
mod outcome;
mod value;

pub use engine::{ValidationEngine, ROOT_PATH};
pub use outcome::{FieldError, ValidationOutcome};
pub use value::{coerce_scalar, json_type_name, TypedValue};
