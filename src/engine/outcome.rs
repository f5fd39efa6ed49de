//! Validation outcomes
//!
//! The primary output of a form engine is rejected input: validation faults
//! are data, never panics. Every violated constraint in a payload produces
//! one [`FieldError`], addressed by a dot/bracket path that is unique even
//! inside arrays (`physicalAddresses[1].zipCode`).

use std::fmt;

use serde::Serialize;

use super::value::{json_type_name, TypedValue};

/// One rejected field constraint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Dot/bracket-addressed path of the offending node
    pub path: String,
    /// Name of the validator that rejected the value
    pub validator: String,
    /// User-facing reason
    pub message: String,
}

impl FieldError {
    pub fn new(
        path: impl Into<String>,
        validator: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            validator: validator.into(),
            message: message.into(),
        }
    }

    /// A shape mismatch between the declared type and the raw value
    pub fn invalid_type(path: impl Into<String>, expected: &str, actual: &serde_json::Value) -> Self {
        Self::new(
            path,
            "type",
            format!("invalid type: expected {}, got {}", expected, json_type_name(actual)),
        )
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} ({})", self.path, self.message, self.validator)
    }
}

/// The result of validating one payload against one definition
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationOutcome {
    /// The payload satisfied every constraint; carries the typed value
    Valid(TypedValue),
    /// One error per violated constraint, in discovery order
    /// (depth-first, field-declaration order)
    Invalid(Vec<FieldError>),
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationOutcome::Valid(_))
    }

    /// Returns the collected errors; empty for a valid outcome
    pub fn errors(&self) -> &[FieldError] {
        match self {
            ValidationOutcome::Valid(_) => &[],
            ValidationOutcome::Invalid(errors) => errors,
        }
    }

    /// Returns the typed value for a valid outcome
    pub fn value(&self) -> Option<&TypedValue> {
        match self {
            ValidationOutcome::Valid(value) => Some(value),
            ValidationOutcome::Invalid(_) => None,
        }
    }

    /// Consumes the outcome, returning the typed value if valid
    pub fn into_value(self) -> Option<TypedValue> {
        match self {
            ValidationOutcome::Valid(value) => Some(value),
            ValidationOutcome::Invalid(_) => None,
        }
    }
}
