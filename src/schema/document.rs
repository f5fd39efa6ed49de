//! Wire-format schema documents
//!
//! The external shape of a form definition is a JSON object with a `fields`
//! array; each field carries `name`, `type`, optional `validators` and,
//! for `object`/`array` types, a `children` array of the same shape:
//!
//! ```json
//! {
//!   "fields": [
//!     {"name": "firstName", "type": "string",
//!      "validators": [{"name": "required"}, {"name": "max", "param": "255"}]},
//!     {"name": "physicalAddresses", "type": "array",
//!      "validators": [{"name": "omitempty"}, {"name": "dive"}],
//!      "children": [{"name": "zipCode", "type": "string",
//!                    "validators": [{"name": "required"}]}]}
//!   ],
//!   "conditions": [{"name": "useDefaultClass"}]
//! }
//! ```
//!
//! Documents are converted into the strongly-typed [`FieldNode`] tree
//! eagerly: unknown `type` values, unknown validator names, duplicate
//! sibling names and structural mistakes are all load-time faults, never
//! per-request errors.

use serde::Deserialize;
use serde_json::Value;

use crate::registry::ValidatorRegistry;

use super::errors::{SchemaError, SchemaResult};
use super::types::{ConditionRef, FieldKind, FieldNode, ScalarType, ValidatorRef};

const TYPE_STRING: &str = "string";
const TYPE_STRING_POINTER: &str = "stringPointer";
const TYPE_INT: &str = "int";
const TYPE_INT_POINTER: &str = "intPointer";
const TYPE_FLOAT: &str = "float";
const TYPE_BOOL: &str = "bool";
const TYPE_OBJECT: &str = "object";
const TYPE_ARRAY: &str = "array";

/// A complete wire-format document
#[derive(Debug, Clone, Deserialize)]
pub struct FormDocument {
    /// List of fields
    #[serde(default)]
    pub fields: Vec<FieldDocument>,
    /// Additional conditions applied after validation
    #[serde(default)]
    pub conditions: Vec<ConditionDocument>,
}

/// Field of a wire-format document
#[derive(Debug, Clone, Deserialize)]
pub struct FieldDocument {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(default)]
    pub validators: Vec<ValidatorDocument>,
    #[serde(default)]
    pub children: Vec<FieldDocument>,
}

/// Validator of a wire-format field
#[derive(Debug, Clone, Deserialize)]
pub struct ValidatorDocument {
    pub name: String,
    #[serde(default)]
    pub param: String,
}

/// Condition entry of a wire-format document
#[derive(Debug, Clone, Deserialize)]
pub struct ConditionDocument {
    pub name: String,
    #[serde(default)]
    pub params: Value,
}

impl FormDocument {
    /// Parses a raw JSON document
    pub fn parse(raw: &str) -> SchemaResult<Self> {
        serde_json::from_str(raw)
            .map_err(|e| SchemaError::malformed_document("document", e.to_string()))
    }

    /// Converts the document into a typed field tree plus condition refs,
    /// resolving every validator name against the registry.
    pub fn build(self, registry: &ValidatorRegistry) -> SchemaResult<(Vec<FieldNode>, Vec<ConditionRef>)> {
        if self.fields.is_empty() {
            return Err(SchemaError::malformed_document(
                "document",
                "does not contain fields",
            ));
        }

        let fields = build_fields(self.fields, registry)?;
        let conditions = self
            .conditions
            .into_iter()
            .map(|c| ConditionRef {
                name: c.name,
                params: c.params,
            })
            .collect();

        Ok((fields, conditions))
    }
}

/// Converts a list of sibling field documents into field nodes
fn build_fields(docs: Vec<FieldDocument>, registry: &ValidatorRegistry) -> SchemaResult<Vec<FieldNode>> {
    let mut nodes = Vec::with_capacity(docs.len());

    for doc in docs {
        let node = build_field(doc, registry)?;
        if nodes.iter().any(|n: &FieldNode| n.name == node.name) {
            return Err(SchemaError::malformed_document(
                format!("field '{}'", node.name),
                "duplicate field name among siblings",
            ));
        }
        nodes.push(node);
    }

    Ok(nodes)
}

fn build_field(doc: FieldDocument, registry: &ValidatorRegistry) -> SchemaResult<FieldNode> {
    if doc.name.is_empty() {
        return Err(SchemaError::malformed_document("field", "name is empty"));
    }

    let validators = build_validators(&doc.name, doc.validators, registry)?;

    let kind = match doc.field_type.as_str() {
        TYPE_OBJECT | TYPE_ARRAY => {
            if doc.children.is_empty() {
                return Err(SchemaError::malformed_document(
                    format!("field '{}'", doc.name),
                    "children are empty",
                ));
            }
            let children = build_fields(doc.children, registry)?;
            if doc.field_type == TYPE_OBJECT {
                FieldKind::Object { children }
            } else {
                FieldKind::Array { children }
            }
        }
        scalar => {
            if !doc.children.is_empty() {
                return Err(SchemaError::malformed_document(
                    format!("field '{}'", doc.name),
                    format!("scalar type '{}' cannot have children", scalar),
                ));
            }
            FieldKind::Scalar(scalar_type(scalar).ok_or_else(|| {
                SchemaError::malformed_document(
                    format!("field '{}'", doc.name),
                    format!("invalid field type: {}", scalar),
                )
            })?)
        }
    };

    Ok(FieldNode {
        name: doc.name,
        kind,
        validators,
    })
}

fn build_validators(
    field: &str,
    docs: Vec<ValidatorDocument>,
    registry: &ValidatorRegistry,
) -> SchemaResult<Vec<ValidatorRef>> {
    let mut refs = Vec::with_capacity(docs.len());
    for doc in docs {
        if !registry.contains(&doc.name) {
            return Err(SchemaError::unknown_validator(doc.name, field));
        }
        refs.push(ValidatorRef::new(doc.name, doc.param));
    }
    Ok(refs)
}

fn scalar_type(wire: &str) -> Option<ScalarType> {
    match wire {
        TYPE_STRING => Some(ScalarType::String),
        TYPE_STRING_POINTER => Some(ScalarType::OptionalString),
        TYPE_INT => Some(ScalarType::Int),
        TYPE_INT_POINTER => Some(ScalarType::OptionalInt),
        TYPE_FLOAT => Some(ScalarType::Float),
        TYPE_BOOL => Some(ScalarType::Bool),
        _ => None,
    }
}
