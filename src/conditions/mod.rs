//! Post-validation form conditions
//!
//! A form document may carry a `conditions` list of named hooks applied to
//! the validated value after the engine accepts it, e.g. filling a default
//! classification for newly signed-up users. Conditions encode per-form
//! implementation logic that is not a field constraint; they never reject
//! user input.
//!
//! Condition names referenced by a form document are checked against this
//! registry while the store loads.

use std::collections::HashMap;

use serde_json::Value;
use thiserror::Error;

use crate::engine::TypedValue;

/// Result type for condition operations
pub type ConditionResult<T> = Result<T, ConditionError>;

/// Errors raised while registering or applying conditions
#[derive(Debug, Clone, Error)]
pub enum ConditionError {
    /// A condition with this key is already registered
    #[error("cannot register condition `{0}`: key already exists")]
    Duplicate(String),

    /// No condition is registered under this key
    #[error("cannot find condition `{0}`")]
    Unknown(String),

    /// The condition itself failed to apply
    #[error("condition `{key}` failed: {reason}")]
    Failed { key: String, reason: String },
}

impl ConditionError {
    /// Create a failure for the given condition key
    pub fn failed(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Failed {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

/// A named post-validation hook
pub trait FormCondition: Send + Sync {
    /// Returns the unique key identifying this condition
    fn key(&self) -> &'static str;

    /// Applies the condition to the validated value
    fn apply(&self, value: &mut TypedValue, params: &Value) -> ConditionResult<()>;
}

/// Registry of named conditions
#[derive(Default)]
pub struct ConditionRegistry {
    conditions: HashMap<&'static str, Box<dyn FormCondition>>,
}

impl ConditionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            conditions: HashMap::new(),
        }
    }

    /// Register a new condition
    pub fn register(&mut self, condition: Box<dyn FormCondition>) -> ConditionResult<()> {
        let key = condition.key();
        if self.conditions.contains_key(key) {
            return Err(ConditionError::Duplicate(key.to_string()));
        }
        self.conditions.insert(key, condition);
        Ok(())
    }

    /// Returns a registered condition by key
    pub fn resolve(&self, key: &str) -> ConditionResult<&dyn FormCondition> {
        self.conditions
            .get(key)
            .map(|condition| condition.as_ref())
            .ok_or_else(|| ConditionError::Unknown(key.to_string()))
    }

    /// Returns whether the key is registered
    pub fn contains(&self, key: &str) -> bool {
        self.conditions.contains_key(key)
    }

    /// Returns all registered keys, sorted
    pub fn keys(&self) -> Vec<&'static str> {
        let mut keys: Vec<&'static str> = self.conditions.keys().copied().collect();
        keys.sort_unstable();
        keys
    }
}

impl std::fmt::Debug for ConditionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConditionRegistry")
            .field("conditions", &self.keys())
            .finish()
    }
}
