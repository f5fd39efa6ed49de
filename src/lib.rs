//! formgate - role-scoped dynamic form definition and validation engine
//!
//! Given an actor's roles and the roles of the record being mutated,
//! formgate selects the applicable form definition, validates an arbitrary
//! nested JSON payload against it, and reports structured, field-addressed
//! errors.

pub mod conditions;
pub mod engine;
pub mod observability;
pub mod registry;
pub mod schema;
pub mod service;
pub mod store;
