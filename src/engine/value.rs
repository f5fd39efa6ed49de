//! Typed result values
//!
//! A payload that passes validation is re-expressed as a [`TypedValue`]
//! tree: scalars are coerced per their declared type, validated containers
//! become typed objects/arrays, and containers declared without `dive` pass
//! through opaquely.
//!
//! Coercion rules:
//! - strings stay strings
//! - `int`/`intPointer` accept integral JSON numbers
//! - `bool` accepts JSON booleans and the canonical `"true"`/`"false"`
//!   tokens
//! - JSON null on a non-optional scalar coerces to the type's zero value
//!   (the original engine's unmarshal semantics); on an optional scalar it
//!   stays an explicit null, distinct from an absent field

use std::collections::BTreeMap;

use serde_json::{Map, Number, Value};

use crate::schema::ScalarType;

/// A validated, typed value
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    /// Explicit null on an optional scalar
    Null,
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    /// A validated object, keyed by field name
    Object(BTreeMap<String, TypedValue>),
    /// A validated sequence
    Array(Vec<TypedValue>),
    /// A container accepted opaquely (declared without `dive`)
    Raw(Value),
}

impl TypedValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            TypedValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            TypedValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            TypedValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Looks up a field on an object value
    pub fn get(&self, key: &str) -> Option<&TypedValue> {
        match self {
            TypedValue::Object(map) => map.get(key),
            _ => None,
        }
    }

    /// Sets a field on an object value; conditions use this to inject or
    /// overwrite defaults after validation. No-op on non-objects.
    pub fn set(&mut self, key: impl Into<String>, value: TypedValue) {
        if let TypedValue::Object(map) = self {
            map.insert(key.into(), value);
        }
    }

    /// Re-expresses the typed tree as plain JSON
    pub fn to_json(&self) -> Value {
        match self {
            TypedValue::Null => Value::Null,
            TypedValue::String(s) => Value::String(s.clone()),
            TypedValue::Int(i) => Value::Number(Number::from(*i)),
            TypedValue::Float(f) => Number::from_f64(*f).map(Value::Number).unwrap_or(Value::Null),
            TypedValue::Bool(b) => Value::Bool(*b),
            TypedValue::Object(map) => {
                let mut out = Map::new();
                for (key, value) in map {
                    out.insert(key.clone(), value.to_json());
                }
                Value::Object(out)
            }
            TypedValue::Array(items) => Value::Array(items.iter().map(TypedValue::to_json).collect()),
            TypedValue::Raw(value) => value.clone(),
        }
    }
}

impl From<TypedValue> for Value {
    fn from(value: TypedValue) -> Self {
        value.to_json()
    }
}

/// Coerces a raw JSON value into a typed scalar.
///
/// Returns `None` when the value's shape does not fit the declared type;
/// the engine reports that as an `invalid type` field error.
pub fn coerce_scalar(scalar: ScalarType, value: &Value) -> Option<TypedValue> {
    match scalar {
        ScalarType::String => match value {
            Value::String(s) => Some(TypedValue::String(s.clone())),
            Value::Null => Some(TypedValue::String(String::new())),
            _ => None,
        },
        ScalarType::OptionalString => match value {
            Value::String(s) => Some(TypedValue::String(s.clone())),
            Value::Null => Some(TypedValue::Null),
            _ => None,
        },
        ScalarType::Int => match value {
            Value::Null => Some(TypedValue::Int(0)),
            _ => integral(value).map(TypedValue::Int),
        },
        ScalarType::OptionalInt => match value {
            Value::Null => Some(TypedValue::Null),
            _ => integral(value).map(TypedValue::Int),
        },
        ScalarType::Float => match value {
            Value::Number(n) => n.as_f64().map(TypedValue::Float),
            Value::Null => Some(TypedValue::Float(0.0)),
            _ => None,
        },
        ScalarType::Bool => match value {
            Value::Bool(b) => Some(TypedValue::Bool(*b)),
            Value::String(s) if s == "true" => Some(TypedValue::Bool(true)),
            Value::String(s) if s == "false" => Some(TypedValue::Bool(false)),
            Value::Null => Some(TypedValue::Bool(false)),
            _ => None,
        },
    }
}

fn integral(value: &Value) -> Option<i64> {
    let n = match value {
        Value::Number(n) => n,
        _ => return None,
    };
    if let Some(i) = n.as_i64() {
        return Some(i);
    }
    // Integral floats such as 3.0 still count as int-shaped.
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 => {
            Some(f as i64)
        }
        _ => None,
    }
}

/// Returns the JSON type name for error messages
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                "int"
            } else {
                "float"
            }
        }
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_string_coercion() {
        assert_eq!(
            coerce_scalar(ScalarType::String, &json!("Ann")),
            Some(TypedValue::String("Ann".into()))
        );
        assert_eq!(coerce_scalar(ScalarType::String, &json!(42)), None);
        // Null collapses to the zero value on a non-optional scalar.
        assert_eq!(
            coerce_scalar(ScalarType::String, &json!(null)),
            Some(TypedValue::String(String::new()))
        );
    }

    #[test]
    fn test_optional_scalars_keep_explicit_null() {
        assert_eq!(
            coerce_scalar(ScalarType::OptionalString, &json!(null)),
            Some(TypedValue::Null)
        );
        assert_eq!(
            coerce_scalar(ScalarType::OptionalInt, &json!(null)),
            Some(TypedValue::Null)
        );
        assert_eq!(
            coerce_scalar(ScalarType::OptionalInt, &json!(7)),
            Some(TypedValue::Int(7))
        );
    }

    #[test]
    fn test_int_coercion() {
        assert_eq!(coerce_scalar(ScalarType::Int, &json!(42)), Some(TypedValue::Int(42)));
        assert_eq!(coerce_scalar(ScalarType::Int, &json!(3.0)), Some(TypedValue::Int(3)));
        assert_eq!(coerce_scalar(ScalarType::Int, &json!(3.5)), None);
        assert_eq!(coerce_scalar(ScalarType::Int, &json!("42")), None);
    }

    #[test]
    fn test_bool_coercion_tokens() {
        assert_eq!(coerce_scalar(ScalarType::Bool, &json!(true)), Some(TypedValue::Bool(true)));
        assert_eq!(
            coerce_scalar(ScalarType::Bool, &json!("true")),
            Some(TypedValue::Bool(true))
        );
        assert_eq!(
            coerce_scalar(ScalarType::Bool, &json!("false")),
            Some(TypedValue::Bool(false))
        );
        assert_eq!(coerce_scalar(ScalarType::Bool, &json!("yes")), None);
        assert_eq!(coerce_scalar(ScalarType::Bool, &json!(1)), None);
    }

    #[test]
    fn test_float_accepts_integers() {
        assert_eq!(
            coerce_scalar(ScalarType::Float, &json!(100)),
            Some(TypedValue::Float(100.0))
        );
        assert_eq!(
            coerce_scalar(ScalarType::Float, &json!(99.5)),
            Some(TypedValue::Float(99.5))
        );
    }

    #[test]
    fn test_to_json_round_trip() {
        let mut object = BTreeMap::new();
        object.insert("firstName".to_string(), TypedValue::String("Ann".into()));
        object.insert("classId".to_string(), TypedValue::Int(3));
        object.insert(
            "tags".to_string(),
            TypedValue::Array(vec![TypedValue::String("kyc".into())]),
        );
        let typed = TypedValue::Object(object);

        assert_eq!(
            typed.to_json(),
            json!({"firstName": "Ann", "classId": 3, "tags": ["kyc"]})
        );
    }

    #[test]
    fn test_set_on_object() {
        let mut typed = TypedValue::Object(BTreeMap::new());
        typed.set("classId", TypedValue::Int(1));
        assert_eq!(typed.get("classId"), Some(&TypedValue::Int(1)));

        // Setting on a scalar is a no-op.
        let mut scalar = TypedValue::Int(5);
        scalar.set("x", TypedValue::Null);
        assert_eq!(scalar, TypedValue::Int(5));
    }

    #[test]
    fn test_json_type_names() {
        assert_eq!(json_type_name(&json!(null)), "null");
        assert_eq!(json_type_name(&json!(1)), "int");
        assert_eq!(json_type_name(&json!(1.5)), "float");
        assert_eq!(json_type_name(&json!("x")), "string");
        assert_eq!(json_type_name(&json!([])), "array");
        assert_eq!(json_type_name(&json!({})), "object");
    }
}
