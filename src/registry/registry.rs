//! Validator registry
//!
//! Maps validator names to predicate implementations. The registry is built
//! once at startup; form documents referencing unknown names are rejected
//! while the store loads, so resolution cannot fail for a well-loaded
//! definition set.

use std::collections::HashMap;

use serde_json::Value;
use thiserror::Error;

use super::builtin;
use super::context::ValidationContext;

/// Result of one validator invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckResult {
    /// The value satisfies the validator
    Pass,
    /// The value is rejected, with a user-facing reason
    Fail(String),
}

impl CheckResult {
    /// Create a failure with the given reason
    pub fn fail(reason: impl Into<String>) -> Self {
        CheckResult::Fail(reason.into())
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, CheckResult::Pass)
    }
}

/// The raw value a validator sees for one field.
///
/// Wraps "absent" explicitly: only `required` and `omitempty` distinguish
/// an absent field from a present empty one, but every validator can ask.
#[derive(Debug, Clone, Copy)]
pub struct FieldValue<'a> {
    value: Option<&'a Value>,
}

impl<'a> FieldValue<'a> {
    pub fn new(value: Option<&'a Value>) -> Self {
        Self { value }
    }

    /// The absent field value
    pub fn absent() -> Self {
        Self { value: None }
    }

    /// Returns the raw JSON value if the field is present
    pub fn raw(&self) -> Option<&'a Value> {
        self.value
    }

    /// Returns whether the field is missing from the payload entirely
    pub fn is_absent(&self) -> bool {
        self.value.is_none()
    }

    /// Returns whether the field is absent or carries an empty/zero value:
    /// null, `""`, `0`, `false`, `[]` or `{}`.
    pub fn is_empty(&self) -> bool {
        match self.value {
            None | Some(Value::Null) => true,
            Some(Value::String(s)) => s.is_empty(),
            Some(Value::Number(n)) => n.as_f64() == Some(0.0),
            Some(Value::Bool(b)) => !b,
            Some(Value::Array(a)) => a.is_empty(),
            Some(Value::Object(o)) => o.is_empty(),
        }
    }

    /// Returns the value as a string slice if it is a JSON string
    pub fn as_str(&self) -> Option<&'a str> {
        self.value.and_then(Value::as_str)
    }

    /// Returns the value as an integer if it is an integral JSON number
    pub fn as_i64(&self) -> Option<i64> {
        self.value.and_then(Value::as_i64)
    }

    /// Returns the value as a float if it is a JSON number
    pub fn as_f64(&self) -> Option<f64> {
        self.value.and_then(Value::as_f64)
    }

    /// Returns the value as a boolean if it is a JSON boolean
    pub fn as_bool(&self) -> Option<bool> {
        self.value.and_then(Value::as_bool)
    }

    /// Returns the element count if the value is a JSON array
    pub fn array_len(&self) -> Option<usize> {
        self.value.and_then(Value::as_array).map(Vec::len)
    }
}

/// A validator predicate: `(field value, param, context) -> pass/fail`
pub type ValidatorFn =
    Box<dyn Fn(&FieldValue<'_>, &str, &ValidationContext) -> CheckResult + Send + Sync>;

/// Errors raised while extending the registry
#[derive(Debug, Clone, Error)]
pub enum RegistryError {
    /// A validator with this name is already registered
    #[error("cannot register validator `{0}`: name already exists")]
    Duplicate(String),
}

/// Registry of named validators
pub struct ValidatorRegistry {
    validators: HashMap<String, ValidatorFn>,
}

impl ValidatorRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            validators: HashMap::new(),
        }
    }

    /// Create a registry with the full builtin validator set
    pub fn builtins() -> Self {
        let mut registry = Self::new();
        builtin::install(&mut registry);
        registry
    }

    /// Register a validator under a new name
    pub fn register(
        &mut self,
        name: impl Into<String>,
        validator: ValidatorFn,
    ) -> Result<(), RegistryError> {
        let name = name.into();
        if self.validators.contains_key(&name) {
            return Err(RegistryError::Duplicate(name));
        }
        self.validators.insert(name, validator);
        Ok(())
    }

    /// Inserts a builtin; names are distinct constants, so this cannot clash
    pub(super) fn install(&mut self, name: &str, validator: ValidatorFn) {
        self.validators.insert(name.to_string(), validator);
    }

    /// Resolve a validator by name
    pub fn resolve(&self, name: &str) -> Option<&ValidatorFn> {
        self.validators.get(name)
    }

    /// Returns whether the name is registered
    pub fn contains(&self, name: &str) -> bool {
        self.validators.contains_key(name)
    }

    /// Returns all registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.validators.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Returns the number of registered validators
    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }
}

impl Default for ValidatorRegistry {
    fn default() -> Self {
        Self::builtins()
    }
}

impl std::fmt::Debug for ValidatorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidatorRegistry")
            .field("validators", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builtins_registered() {
        let registry = ValidatorRegistry::builtins();
        for name in [
            "required",
            "omitempty",
            "dive",
            "max",
            "min",
            "oneof",
            "email",
            "phonenumber",
            "usernameChars",
            "specialCharacterRequired",
            "numberRequired",
            "uppercaseLetterRequired",
            "lowercaseLetterRequired",
            "gdpr",
            "dayBeforeNow",
            "uniqueEmail",
            "uniqueUsername",
            "uniquePhoneNumber",
            "existCountry",
        ] {
            assert!(registry.contains(name), "missing builtin: {}", name);
        }
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut registry = ValidatorRegistry::builtins();
        let result = registry.register("required", Box::new(|_, _, _| CheckResult::Pass));
        assert!(matches!(result, Err(RegistryError::Duplicate(name)) if name == "required"));
    }

    #[test]
    fn test_custom_registration() {
        let mut registry = ValidatorRegistry::new();
        registry
            .register(
                "alwaysFails",
                Box::new(|_, _, _| CheckResult::fail("nope")),
            )
            .unwrap();
        assert!(registry.contains("alwaysFails"));
        assert!(!registry.contains("required"));
    }

    #[test]
    fn test_field_value_emptiness() {
        let null = json!(null);
        let empty_string = json!("");
        let zero = json!(0);
        let falsy = json!(false);
        let empty_array = json!([]);
        let value = json!("hello");

        assert!(FieldValue::absent().is_empty());
        assert!(FieldValue::absent().is_absent());
        assert!(FieldValue::new(Some(&null)).is_empty());
        assert!(FieldValue::new(Some(&empty_string)).is_empty());
        assert!(FieldValue::new(Some(&zero)).is_empty());
        assert!(FieldValue::new(Some(&falsy)).is_empty());
        assert!(FieldValue::new(Some(&empty_array)).is_empty());
        assert!(!FieldValue::new(Some(&value)).is_empty());
        assert!(!FieldValue::new(Some(&value)).is_absent());
    }
}
