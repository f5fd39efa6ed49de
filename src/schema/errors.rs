//! Schema error types for form definitions
//!
//! Error codes:
//! - FORM_DUPLICATE_DEFINITION (FATAL)
//! - FORM_UNKNOWN_VALIDATOR (FATAL)
//! - FORM_UNKNOWN_CONDITION (FATAL)
//! - FORM_MALFORMED_DOCUMENT (FATAL)
//! - FORM_NO_APPLICABLE (REJECT)
//!
//! FATAL codes are configuration faults: they are raised while loading the
//! form store and must prevent the engine from starting on an inconsistent
//! definition set. REJECT codes are per-request outcomes.

use std::fmt;

/// Severity levels for schema errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Client request rejected
    Reject,
    /// Definition set is unusable, the load must fail
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Schema-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaErrorCode {
    /// Two stored definitions can match the same role combination
    FormDuplicateDefinition,
    /// A definition references a validator name the registry does not know
    FormUnknownValidator,
    /// A definition references a condition name the registry does not know
    FormUnknownCondition,
    /// A schema document or role list cannot be parsed
    FormMalformedDocument,
    /// No stored definition matches the requested role combination
    FormNoApplicable,
}

impl SchemaErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            SchemaErrorCode::FormDuplicateDefinition => "FORM_DUPLICATE_DEFINITION",
            SchemaErrorCode::FormUnknownValidator => "FORM_UNKNOWN_VALIDATOR",
            SchemaErrorCode::FormUnknownCondition => "FORM_UNKNOWN_CONDITION",
            SchemaErrorCode::FormMalformedDocument => "FORM_MALFORMED_DOCUMENT",
            SchemaErrorCode::FormNoApplicable => "FORM_NO_APPLICABLE",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            SchemaErrorCode::FormNoApplicable => Severity::Reject,
            _ => Severity::Fatal,
        }
    }
}

impl fmt::Display for SchemaErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Schema error type with full context
#[derive(Debug)]
pub struct SchemaError {
    /// Error code
    code: SchemaErrorCode,
    /// Human-readable message
    message: String,
    /// Form type if applicable
    form_type: Option<String>,
}

impl SchemaError {
    /// Create a duplicate definition error
    pub fn duplicate_definition(form_type: impl Into<String>, detail: impl Into<String>) -> Self {
        let form_type = form_type.into();
        Self {
            code: SchemaErrorCode::FormDuplicateDefinition,
            message: format!(
                "conflicting definitions for form type '{}': {}",
                form_type,
                detail.into()
            ),
            form_type: Some(form_type),
        }
    }

    /// Create an unknown validator error
    pub fn unknown_validator(name: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            code: SchemaErrorCode::FormUnknownValidator,
            message: format!(
                "unknown validator '{}' referenced by field '{}'",
                name.into(),
                field.into()
            ),
            form_type: None,
        }
    }

    /// Create an unknown condition error
    pub fn unknown_condition(name: impl Into<String>) -> Self {
        Self {
            code: SchemaErrorCode::FormUnknownCondition,
            message: format!("unknown condition '{}'", name.into()),
            form_type: None,
        }
    }

    /// Create an error for a malformed schema document or role list
    pub fn malformed_document(context: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            code: SchemaErrorCode::FormMalformedDocument,
            message: format!("malformed form definition ({}): {}", context.into(), reason.into()),
            form_type: None,
        }
    }

    /// Create a no applicable form error
    pub fn no_applicable(form_type: impl Into<String>) -> Self {
        let form_type = form_type.into();
        Self {
            code: SchemaErrorCode::FormNoApplicable,
            message: format!(
                "no form definition applies to form type '{}' for this role combination",
                form_type
            ),
            form_type: Some(form_type),
        }
    }

    /// Attach the form type this error belongs to
    pub fn with_form_type(mut self, form_type: impl Into<String>) -> Self {
        self.form_type = Some(form_type.into());
        self
    }

    /// Returns the error code
    pub fn code(&self) -> SchemaErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the form type if applicable
    pub fn form_type(&self) -> Option<&str> {
        self.form_type.as_deref()
    }

    /// Returns whether this is a configuration fault
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code.severity(), self.code.code(), self.message)
    }
}

impl std::error::Error for SchemaError {}

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            SchemaErrorCode::FormDuplicateDefinition.code(),
            "FORM_DUPLICATE_DEFINITION"
        );
        assert_eq!(SchemaErrorCode::FormUnknownValidator.code(), "FORM_UNKNOWN_VALIDATOR");
        assert_eq!(SchemaErrorCode::FormUnknownCondition.code(), "FORM_UNKNOWN_CONDITION");
        assert_eq!(SchemaErrorCode::FormMalformedDocument.code(), "FORM_MALFORMED_DOCUMENT");
        assert_eq!(SchemaErrorCode::FormNoApplicable.code(), "FORM_NO_APPLICABLE");
    }

    #[test]
    fn test_severity_levels() {
        assert_eq!(SchemaErrorCode::FormNoApplicable.severity(), Severity::Reject);
        assert_eq!(SchemaErrorCode::FormDuplicateDefinition.severity(), Severity::Fatal);
        assert_eq!(SchemaErrorCode::FormUnknownValidator.severity(), Severity::Fatal);
    }

    #[test]
    fn test_no_applicable_is_not_fatal() {
        let err = SchemaError::no_applicable("update");
        assert!(!err.is_fatal());
        assert_eq!(err.form_type(), Some("update"));
    }

    #[test]
    fn test_display_includes_code_and_severity() {
        let err = SchemaError::unknown_validator("frobnicate", "email");
        let display = format!("{}", err);
        assert!(display.contains("FATAL"));
        assert!(display.contains("FORM_UNKNOWN_VALIDATOR"));
        assert!(display.contains("frobnicate"));
    }
}
