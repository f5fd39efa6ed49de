//! Form definition model for the validation engine
//!
//! # Design principles
//!
//! - Definitions are declarative JSON documents, compiled into a
//!   strongly-typed tree at load time
//! - Unknown field types and validator names are load-time faults
//! - Loaded definitions are immutable and shared across validations
//! - Role matching is two-sided: who submits x whose record is affected

mod document;
mod errors;
mod types;

pub use document::{ConditionDocument, FieldDocument, FormDocument, ValidatorDocument};
pub use errors::{SchemaError, SchemaErrorCode, SchemaResult, Severity};
pub use types::{
    ConditionRef, FieldKind, FieldNode, FormDefinition, RoleSet, ScalarType, ValidatorRef,
};
