//! Validation engine
//!
//! Walks a raw payload against a form definition, depth-first in declared
//! field order, and collects every violated constraint in one pass.
//!
//! Evaluation rules per field:
//! - `omitempty` short-circuits the whole chain to success on an
//!   absent/empty value, wherever it was declared in the chain
//! - an absent field with no `required` declared is implicitly optional
//! - a shape mismatch against the declared type stops the field with a
//!   single `invalid type` error
//! - the first failing validator stops that field's chain; sibling fields
//!   keep validating
//! - `dive` recurses into object children or per-element into arrays, but
//!   only once the field's own chain has passed
//!
//! Fields are evaluated sequentially in declared order, so the canonical
//! error order (depth-first, declaration order) is the execution order.

use serde_json::{Map, Value};

use crate::registry::{
    CheckResult, FieldValue, ValidationContext, ValidatorRegistry, DIVE, OMITEMPTY, REQUIRED,
};
use crate::schema::{FieldKind, FieldNode, FormDefinition, SchemaError, SchemaResult};

use super::outcome::{FieldError, ValidationOutcome};
use super::value::{coerce_scalar, TypedValue};

use std::collections::BTreeMap;

/// Path of the payload root in structural error messages
pub const ROOT_PATH: &str = "$root";

/// Validation engine over one validator registry.
///
/// The engine is stateless: one instance serves any number of concurrent
/// validations against any definitions.
pub struct ValidationEngine<'a> {
    registry: &'a ValidatorRegistry,
}

impl<'a> ValidationEngine<'a> {
    pub fn new(registry: &'a ValidatorRegistry) -> Self {
        Self { registry }
    }

    /// Validates a payload against a definition.
    ///
    /// Validation faults are data (`ValidationOutcome::Invalid`); the only
    /// error this returns is the configuration fault of a validator name
    /// that cannot be resolved at request time.
    pub fn validate(
        &self,
        definition: &FormDefinition,
        payload: &Value,
        ctx: &ValidationContext,
    ) -> SchemaResult<ValidationOutcome> {
        let object = match payload.as_object() {
            Some(object) => object,
            None => {
                return Ok(ValidationOutcome::Invalid(vec![FieldError::invalid_type(
                    ROOT_PATH, "object", payload,
                )]))
            }
        };

        let mut errors = Vec::new();
        let typed = self.walk_object(&definition.fields, object, "", ctx, &mut errors)?;

        if errors.is_empty() {
            Ok(ValidationOutcome::Valid(TypedValue::Object(typed)))
        } else {
            Ok(ValidationOutcome::Invalid(errors))
        }
    }

    /// Validates the fields of one object level, in declared order
    fn walk_object(
        &self,
        fields: &[FieldNode],
        object: &Map<String, Value>,
        prefix: &str,
        ctx: &ValidationContext,
        errors: &mut Vec<FieldError>,
    ) -> SchemaResult<BTreeMap<String, TypedValue>> {
        let mut typed = BTreeMap::new();

        for field in fields {
            let path = make_path(prefix, &field.name);
            let value = FieldValue::new(object.get(&field.name));
            if let Some(typed_value) = self.walk_field(field, value, &path, ctx, errors)? {
                typed.insert(field.name.clone(), typed_value);
            }
        }

        Ok(typed)
    }

    /// Validates one field; returns its typed value when it contributes one
    fn walk_field(
        &self,
        field: &FieldNode,
        value: FieldValue<'_>,
        path: &str,
        ctx: &ValidationContext,
        errors: &mut Vec<FieldError>,
    ) -> SchemaResult<Option<TypedValue>> {
        // omitempty governs short-circuiting regardless of declared position.
        if field.has_validator(OMITEMPTY) && value.is_empty() {
            return Ok(self.empty_passthrough(field, value));
        }

        let raw = match value.raw() {
            Some(raw) => raw,
            None => {
                if field.has_validator(REQUIRED) {
                    errors.push(FieldError::new(path, REQUIRED, "is required"));
                }
                return Ok(None);
            }
        };

        // Shape check before the chain: validators never see a value whose
        // shape contradicts the declared type.
        match &field.kind {
            FieldKind::Scalar(scalar) => {
                if coerce_scalar(*scalar, raw).is_none() {
                    errors.push(FieldError::invalid_type(path, scalar.wire_name(), raw));
                    return Ok(None);
                }
            }
            FieldKind::Object { .. } => {
                if !raw.is_object() && !raw.is_null() {
                    errors.push(FieldError::invalid_type(path, "object", raw));
                    return Ok(None);
                }
            }
            FieldKind::Array { .. } => {
                if !raw.is_array() && !raw.is_null() {
                    errors.push(FieldError::invalid_type(path, "array", raw));
                    return Ok(None);
                }
            }
        }

        for validator_ref in &field.validators {
            // omitempty was handled above; dive is a recursion marker.
            if validator_ref.name == OMITEMPTY || validator_ref.name == DIVE {
                continue;
            }

            let validator = self
                .registry
                .resolve(&validator_ref.name)
                .ok_or_else(|| SchemaError::unknown_validator(&validator_ref.name, path))?;

            match validator(&value, &validator_ref.param, ctx) {
                CheckResult::Pass => {}
                CheckResult::Fail(reason) => {
                    errors.push(FieldError::new(path, &validator_ref.name, reason));
                    return Ok(None);
                }
            }
        }

        match &field.kind {
            FieldKind::Scalar(scalar) => Ok(coerce_scalar(*scalar, raw)),
            FieldKind::Object { children } => {
                if !field.has_validator(DIVE) {
                    return Ok(Some(TypedValue::Raw(raw.clone())));
                }
                match raw.as_object() {
                    Some(object) => {
                        let typed = self.walk_object(children, object, path, ctx, errors)?;
                        Ok(Some(TypedValue::Object(typed)))
                    }
                    // null survived the shape check; nothing to dive into
                    None => Ok(None),
                }
            }
            FieldKind::Array { children } => {
                if !field.has_validator(DIVE) {
                    return Ok(Some(TypedValue::Raw(raw.clone())));
                }
                let elements = match raw.as_array() {
                    Some(elements) => elements,
                    None => return Ok(None),
                };
                let mut typed_items = Vec::with_capacity(elements.len());
                for (index, element) in elements.iter().enumerate() {
                    let element_path = format!("{}[{}]", path, index);
                    match element.as_object() {
                        Some(object) => {
                            let typed =
                                self.walk_object(children, object, &element_path, ctx, errors)?;
                            typed_items.push(TypedValue::Object(typed));
                        }
                        None => {
                            errors.push(FieldError::invalid_type(&element_path, "object", element));
                        }
                    }
                }
                Ok(Some(TypedValue::Array(typed_items)))
            }
        }
    }

    /// Typed contribution of a field short-circuited by `omitempty`
    fn empty_passthrough(&self, field: &FieldNode, value: FieldValue<'_>) -> Option<TypedValue> {
        let raw = value.raw()?;
        match &field.kind {
            FieldKind::Scalar(scalar) => coerce_scalar(*scalar, raw),
            FieldKind::Object { .. } | FieldKind::Array { .. } => {
                if raw.is_null() {
                    None
                } else {
                    Some(TypedValue::Raw(raw.clone()))
                }
            }
        }
    }
}

/// Creates a field path from prefix and field name
fn make_path(prefix: &str, field: &str) -> String {
    if prefix.is_empty() {
        field.to_string()
    } else {
        format!("{}.{}", prefix, field)
    }
}
