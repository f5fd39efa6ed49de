//! Validation context
//!
//! Context carried through one validation call. Contains the identity of
//! the record being mutated (for unique-excluding-self checks), the lookup
//! collaborator, and a request id for tracing.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::lookup::{LookupProvider, LookupResult};

/// Context carried through one validation call
#[derive(Clone)]
pub struct ValidationContext {
    /// Request ID for tracing
    request_id: Uuid,

    /// UID of the record being updated, if any.
    /// Uniqueness validators with a param (e.g. `"Uid"`) exclude this
    /// record from their conflict check.
    record_uid: Option<String>,

    /// Lookup collaborator for context-dependent validators
    lookup: Arc<dyn LookupProvider>,
}

impl ValidationContext {
    /// Create a context for a new record (nothing to exclude)
    pub fn new(lookup: Arc<dyn LookupProvider>) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            record_uid: None,
            lookup,
        }
    }

    /// Create a context for updating the record with the given UID
    pub fn for_record(lookup: Arc<dyn LookupProvider>, record_uid: impl Into<String>) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            record_uid: Some(record_uid.into()),
            lookup,
        }
    }

    /// Request ID for tracing
    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    /// UID of the record being updated, if any
    pub fn record_uid(&self) -> Option<&str> {
        self.record_uid.as_deref()
    }

    /// Returns whether a conflicting record exists
    pub fn lookup_exists(
        &self,
        entity: &str,
        field: &str,
        value: &str,
        exclude_uid: Option<&str>,
    ) -> LookupResult<bool> {
        self.lookup.lookup_exists(entity, field, value, exclude_uid)
    }

    /// Returns whether the ISO code is a known country
    pub fn country_exists(&self, iso_code: &str) -> LookupResult<bool> {
        self.lookup.country_exists(iso_code)
    }

    /// Current time as seen by this validation
    pub fn now(&self) -> DateTime<Utc> {
        self.lookup.now()
    }
}

impl std::fmt::Debug for ValidationContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidationContext")
            .field("request_id", &self.request_id)
            .field("record_uid", &self.record_uid)
            .finish()
    }
}
