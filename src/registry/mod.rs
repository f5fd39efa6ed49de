//! Validator registry subsystem
//!
//! # Design principles
//!
//! - Validators are named, parameterized predicates resolved from a registry
//! - Pure validators depend only on the value and param
//! - Context-dependent validators reach storage through an injected
//!   collaborator; the registry itself is storage-free
//! - Unknown names are definition-time faults, never silent passes

pub mod builtin;
mod context;
mod lookup;
mod registry;

pub use builtin::{DIVE, OMITEMPTY, REQUIRED};
pub use context::ValidationContext;
pub use lookup::{
    iso_country_exists, LookupError, LookupProvider, LookupResult, ISO_COUNTRY_CODES,
};
pub use registry::{CheckResult, FieldValue, RegistryError, ValidatorFn, ValidatorRegistry};
