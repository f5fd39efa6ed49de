//! Form service facade
//!
//! Ties the store, validator registry, engine and condition registry
//! together behind one call: resolve the applicable definition for the
//! role pair, validate the payload, apply the form's conditions to the
//! accepted value.
//!
//! Transport bindings call [`FormService::validate`] and translate the
//! outcome into their own response format; nothing here knows about HTTP.

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::conditions::{ConditionError, ConditionRegistry};
use crate::engine::{ValidationEngine, ValidationOutcome};
use crate::observability::{
    self, EVENT_FORM_NOT_FOUND, EVENT_PAYLOAD_ACCEPTED, EVENT_PAYLOAD_REJECTED,
};
use crate::registry::{ValidationContext, ValidatorRegistry};
use crate::schema::{RoleSet, SchemaError, SchemaErrorCode};
use crate::store::FormStore;

/// Errors surfaced by the service, distinct from validation faults:
/// resolution and configuration problems are never field errors.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Condition(#[from] ConditionError),
}

impl ServiceError {
    /// Returns whether this is the "no schema available for this role
    /// combination" outcome
    pub fn is_no_applicable_form(&self) -> bool {
        matches!(
            self,
            ServiceError::Schema(err) if err.code() == SchemaErrorCode::FormNoApplicable
        )
    }
}

/// The role-scoped validation entry point
pub struct FormService {
    store: Arc<FormStore>,
    validators: Arc<ValidatorRegistry>,
    conditions: Arc<ConditionRegistry>,
}

impl FormService {
    pub fn new(
        store: Arc<FormStore>,
        validators: Arc<ValidatorRegistry>,
        conditions: Arc<ConditionRegistry>,
    ) -> Self {
        Self {
            store,
            validators,
            conditions,
        }
    }

    /// Returns the underlying store (for reloads and introspection)
    pub fn store(&self) -> &FormStore {
        &self.store
    }

    /// Resolves and validates in one step.
    ///
    /// `actor_roles` are the submitting subject's roles, `owner_roles` the
    /// roles of the record being mutated. A rejected payload is an
    /// `Ok(ValidationOutcome::Invalid(..))`, not an error.
    pub fn validate(
        &self,
        form_type: &str,
        actor_roles: &RoleSet,
        owner_roles: &RoleSet,
        payload: &Value,
        ctx: &ValidationContext,
    ) -> Result<ValidationOutcome, ServiceError> {
        let definition = match self.store.lookup(form_type, actor_roles, owner_roles) {
            Ok(definition) => definition,
            Err(err) => {
                if err.code() == SchemaErrorCode::FormNoApplicable {
                    observability::warn(
                        EVENT_FORM_NOT_FOUND,
                        &[
                            ("form_type", form_type),
                            ("actor_roles", &actor_roles.to_string()),
                            ("owner_roles", &owner_roles.to_string()),
                        ],
                    );
                }
                return Err(err.into());
            }
        };

        let engine = ValidationEngine::new(&self.validators);
        let outcome = engine.validate(&definition, payload, ctx)?;

        match outcome {
            ValidationOutcome::Valid(mut value) => {
                for condition_ref in &definition.conditions {
                    let condition = self.conditions.resolve(&condition_ref.name)?;
                    condition.apply(&mut value, &condition_ref.params)?;
                }
                observability::info(
                    EVENT_PAYLOAD_ACCEPTED,
                    &[
                        ("form_type", form_type),
                        ("request_id", &ctx.request_id().to_string()),
                    ],
                );
                Ok(ValidationOutcome::Valid(value))
            }
            ValidationOutcome::Invalid(errors) => {
                observability::info(
                    EVENT_PAYLOAD_REJECTED,
                    &[
                        ("form_type", form_type),
                        ("request_id", &ctx.request_id().to_string()),
                        ("errors", &errors.len().to_string()),
                    ],
                );
                Ok(ValidationOutcome::Invalid(errors))
            }
        }
    }
}
