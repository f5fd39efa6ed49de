//! Form definition types
//!
//! A form definition is a tree of typed field nodes with validator chains,
//! selected by `(form type, initiator roles, owner roles)`:
//! - the initiator side describes who may submit the form,
//! - the owner side describes whose record may be the target.
//!
//! Definitions are built once at load time and shared read-only across
//! concurrent validations.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Supported scalar field types.
///
/// The pointer variants distinguish "field absent" from "field present with
/// the empty/zero value": an absent optional scalar carries no value at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarType {
    /// UTF-8 string
    String,
    /// 64-bit signed integer
    Int,
    /// Boolean
    Bool,
    /// 64-bit floating point
    Float,
    /// Optional UTF-8 string (wire name `stringPointer`)
    OptionalString,
    /// Optional 64-bit signed integer (wire name `intPointer`)
    OptionalInt,
}

impl ScalarType {
    /// Returns the wire-format type name
    pub fn wire_name(&self) -> &'static str {
        match self {
            ScalarType::String => "string",
            ScalarType::Int => "int",
            ScalarType::Bool => "bool",
            ScalarType::Float => "float",
            ScalarType::OptionalString => "stringPointer",
            ScalarType::OptionalInt => "intPointer",
        }
    }

    /// Returns whether the scalar admits an explicit null / absent value
    pub fn is_optional(&self) -> bool {
        matches!(self, ScalarType::OptionalString | ScalarType::OptionalInt)
    }
}

/// Reference to a named validator with an optional parameter.
///
/// The name is resolved against the validator registry when the definition
/// is loaded; unknown names never survive to request time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorRef {
    /// Registered validator name
    pub name: String,
    /// Optional parameter, e.g. `"255"` for `max` or `"Uid"` for uniqueness
    #[serde(default)]
    pub param: String,
}

impl ValidatorRef {
    pub fn new(name: impl Into<String>, param: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            param: param.into(),
        }
    }

    /// A validator reference without a parameter
    pub fn named(name: impl Into<String>) -> Self {
        Self::new(name, "")
    }
}

/// The shape of a field node
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    /// A scalar leaf value
    Scalar(ScalarType),
    /// A nested object with its own field schema
    Object { children: Vec<FieldNode> },
    /// A homogeneous sequence of objects sharing one field schema
    Array { children: Vec<FieldNode> },
}

/// One node of a form definition tree
#[derive(Debug, Clone, PartialEq)]
pub struct FieldNode {
    /// Field name, unique among siblings
    pub name: String,
    /// Scalar, object or array shape
    pub kind: FieldKind,
    /// Validator chain in declared order
    pub validators: Vec<ValidatorRef>,
}

impl FieldNode {
    /// Create a scalar field node
    pub fn scalar(
        name: impl Into<String>,
        scalar_type: ScalarType,
        validators: Vec<ValidatorRef>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Scalar(scalar_type),
            validators,
        }
    }

    /// Create an object field node
    pub fn object(
        name: impl Into<String>,
        children: Vec<FieldNode>,
        validators: Vec<ValidatorRef>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Object { children },
            validators,
        }
    }

    /// Create an array field node
    pub fn array(
        name: impl Into<String>,
        children: Vec<FieldNode>,
        validators: Vec<ValidatorRef>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Array { children },
            validators,
        }
    }

    /// Returns the child schema for object/array nodes
    pub fn children(&self) -> &[FieldNode] {
        match &self.kind {
            FieldKind::Object { children } | FieldKind::Array { children } => children,
            FieldKind::Scalar(_) => &[],
        }
    }

    /// Returns whether the chain declares a validator with the given name
    pub fn has_validator(&self, name: &str) -> bool {
        self.validators.iter().any(|v| v.name == name)
    }
}

/// An order-irrelevant set of role slugs.
///
/// An empty set on a definition's initiator side denotes the anonymous
/// initiator: it matches only actors that present no roles themselves.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleSet(BTreeSet<String>);

impl RoleSet {
    /// The empty role set (anonymous)
    pub fn empty() -> Self {
        Self(BTreeSet::new())
    }

    /// Build a role set from role slugs
    pub fn of<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(roles.into_iter().map(Into::into).collect())
    }

    /// A single-role set
    pub fn single(role: impl Into<String>) -> Self {
        Self::of([role.into()])
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, role: &str) -> bool {
        self.0.contains(role)
    }

    /// Returns whether the two sets share at least one role
    pub fn intersects(&self, other: &RoleSet) -> bool {
        self.0.iter().any(|r| other.0.contains(r.as_str()))
    }

    /// Matching rule for a definition's initiator side against an actor's
    /// role set: an empty definition side matches only the anonymous actor,
    /// otherwise one shared role is enough.
    pub fn matches_actor(&self, actor: &RoleSet) -> bool {
        if self.is_empty() {
            actor.is_empty()
        } else {
            self.intersects(actor)
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl std::fmt::Display for RoleSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.is_empty() {
            return write!(f, "<anonymous>");
        }
        let roles: Vec<&str> = self.0.iter().map(String::as_str).collect();
        write!(f, "{}", roles.join(","))
    }
}

/// Reference to a named post-validation condition carried by a definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionRef {
    /// Registered condition name
    pub name: String,
    /// Free-form parameters passed through to the condition
    #[serde(default)]
    pub params: Value,
}

/// A complete, loaded form definition.
///
/// Uniqueness invariant: for one form type, no two definitions may match the
/// same `(actor, owner)` role combination. The store enforces this at load
/// time; ambiguity is never resolved at request time.
#[derive(Debug, Clone, PartialEq)]
pub struct FormDefinition {
    /// Use-case identifier, e.g. `sign_up` or `update`
    pub form_type: String,
    /// Who may submit this form (empty = anonymous initiator)
    pub initiator_roles: RoleSet,
    /// Whose record may be the target (never empty)
    pub owner_roles: RoleSet,
    /// Top-level fields in declared order
    pub fields: Vec<FieldNode>,
    /// Post-validation conditions in declared order
    pub conditions: Vec<ConditionRef>,
}

impl FormDefinition {
    /// Returns whether this definition applies to a request
    pub fn matches(&self, actor_roles: &RoleSet, owner_roles: &RoleSet) -> bool {
        self.initiator_roles.matches_actor(actor_roles) && self.owner_roles.intersects(owner_roles)
    }

    /// Returns whether two definitions of the same form type could both
    /// match a single request (the definition-time conflict predicate)
    pub fn overlaps(&self, other: &FormDefinition) -> bool {
        if self.form_type != other.form_type {
            return false;
        }
        let initiators_overlap = if self.initiator_roles.is_empty() {
            other.initiator_roles.is_empty()
        } else {
            self.initiator_roles.intersects(&other.initiator_roles)
        };
        initiators_overlap && self.owner_roles.intersects(&other.owner_roles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definition(form_type: &str, initiators: &[&str], owners: &[&str]) -> FormDefinition {
        FormDefinition {
            form_type: form_type.into(),
            initiator_roles: RoleSet::of(initiators.iter().copied()),
            owner_roles: RoleSet::of(owners.iter().copied()),
            fields: vec![FieldNode::scalar(
                "firstName",
                ScalarType::String,
                vec![ValidatorRef::named("required")],
            )],
            conditions: Vec::new(),
        }
    }

    #[test]
    fn test_role_set_intersects() {
        let a = RoleSet::of(["root", "admin"]);
        let b = RoleSet::single("admin");
        let c = RoleSet::single("client");

        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
        assert!(!a.intersects(&c));
        assert!(!RoleSet::empty().intersects(&a));
    }

    #[test]
    fn test_empty_initiator_matches_only_anonymous() {
        let anonymous = RoleSet::empty();
        let client = RoleSet::single("client");

        assert!(anonymous.matches_actor(&RoleSet::empty()));
        assert!(!anonymous.matches_actor(&client));
        assert!(client.matches_actor(&client));
        assert!(!client.matches_actor(&RoleSet::empty()));
    }

    #[test]
    fn test_definition_matching() {
        let def = definition("update", &["root", "admin"], &["client"]);

        assert!(def.matches(&RoleSet::single("admin"), &RoleSet::single("client")));
        assert!(!def.matches(&RoleSet::single("client"), &RoleSet::single("client")));
        assert!(!def.matches(&RoleSet::single("admin"), &RoleSet::single("admin")));
    }

    #[test]
    fn test_overlap_requires_both_sides() {
        // Same initiators, disjoint owners: both can be stored.
        let a = definition("update", &["root", "admin"], &["admin"]);
        let b = definition("update", &["root"], &["root"]);
        assert!(!a.overlaps(&b));

        // Overlapping on both sides conflicts.
        let c = definition("update", &["admin"], &["client", "admin"]);
        let d = definition("update", &["root", "admin"], &["client"]);
        assert!(c.overlaps(&d));

        // Different form types never conflict.
        let e = definition("sign_up", &["admin"], &["client"]);
        assert!(!c.overlaps(&e));
    }

    #[test]
    fn test_anonymous_definitions_overlap_each_other() {
        let a = definition("sign_up", &[], &["client"]);
        let b = definition("sign_up", &[], &["client", "admin"]);
        let c = definition("sign_up", &[], &["admin"]);

        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn test_field_node_helpers() {
        let node = FieldNode::array(
            "physicalAddresses",
            vec![FieldNode::scalar(
                "zipCode",
                ScalarType::String,
                vec![ValidatorRef::named("required")],
            )],
            vec![ValidatorRef::named("omitempty"), ValidatorRef::named("dive")],
        );

        assert!(node.has_validator("dive"));
        assert!(!node.has_validator("required"));
        assert_eq!(node.children().len(), 1);

        let scalar = FieldNode::scalar("uid", ScalarType::String, Vec::new());
        assert!(scalar.children().is_empty());
    }

    #[test]
    fn test_scalar_type_wire_names() {
        assert_eq!(ScalarType::String.wire_name(), "string");
        assert_eq!(ScalarType::OptionalString.wire_name(), "stringPointer");
        assert_eq!(ScalarType::OptionalInt.wire_name(), "intPointer");
        assert!(ScalarType::OptionalInt.is_optional());
        assert!(!ScalarType::Int.is_optional());
    }
}
