//! Form store
//!
//! Loads form definition records into an immutable in-memory snapshot and
//! answers role-scoped lookups. The snapshot is replaced atomically on load
//! and reload: an in-flight validation keeps the definition it resolved,
//! and never observes a half-loaded set.
//!
//! Records carry the role lists as JSON-encoded arrays in text fields, the
//! shape of the original `forms` table (an empty initiator text denotes the
//! anonymous initiator).

use std::fs;
use std::path::Path;
use std::sync::{Arc, RwLock};

use serde::Deserialize;
use serde_json::Value;

use crate::conditions::ConditionRegistry;
use crate::observability::{self, EVENT_STORE_LOADED, EVENT_STORE_LOAD_FAILED};
use crate::registry::ValidatorRegistry;
use crate::schema::{FormDefinition, FormDocument, RoleSet, SchemaError, SchemaResult};

/// One stored form definition record, prior to compilation
#[derive(Debug, Clone)]
pub struct FormRecord {
    /// Use-case identifier, e.g. `sign_up` or `update`
    pub form_type: String,
    /// JSON-encoded role list; empty text = anonymous initiator
    pub initiator_role_names: String,
    /// JSON-encoded role list; must not be empty
    pub owner_role_names: String,
    /// The schema document
    pub document: String,
}

impl FormRecord {
    pub fn new(
        form_type: impl Into<String>,
        initiator_role_names: impl Into<String>,
        owner_role_names: impl Into<String>,
        document: impl Into<String>,
    ) -> Self {
        Self {
            form_type: form_type.into(),
            initiator_role_names: initiator_role_names.into(),
            owner_role_names: owner_role_names.into(),
            document: document.into(),
        }
    }

    /// Parses the initiator role list
    pub fn initiator_roles(&self) -> SchemaResult<RoleSet> {
        parse_role_list(&self.initiator_role_names, "initiator role names")
    }

    /// Parses the owner role list
    pub fn owner_roles(&self) -> SchemaResult<RoleSet> {
        parse_role_list(&self.owner_role_names, "owner role names")
    }
}

fn parse_role_list(raw: &str, which: &str) -> SchemaResult<RoleSet> {
    if raw.trim().is_empty() {
        return Ok(RoleSet::empty());
    }
    let roles: Vec<String> = serde_json::from_str(raw)
        .map_err(|e| SchemaError::malformed_document(which, e.to_string()))?;
    Ok(RoleSet::of(roles))
}

/// On-disk record shape for directory-based loading: one JSON file per
/// record, role lists as real arrays.
#[derive(Debug, Deserialize)]
struct RecordFile {
    #[serde(rename = "type")]
    form_type: String,
    #[serde(default)]
    initiator_role_names: Vec<String>,
    #[serde(default)]
    owner_role_names: Vec<String>,
    form: Value,
}

/// An immutable set of compiled definitions
#[derive(Debug, Default)]
struct Snapshot {
    definitions: Vec<Arc<FormDefinition>>,
}

/// Role-scoped form definition store
#[derive(Debug)]
pub struct FormStore {
    snapshot: RwLock<Arc<Snapshot>>,
}

impl FormStore {
    /// Creates an empty store; nothing resolves until a load succeeds
    pub fn new() -> Self {
        Self {
            snapshot: RwLock::new(Arc::new(Snapshot::default())),
        }
    }

    /// Compiles and installs a record set.
    ///
    /// The whole set is compiled before anything becomes visible; any
    /// configuration fault leaves the previous snapshot in place. Returns
    /// the number of installed definitions.
    pub fn load(
        &self,
        records: &[FormRecord],
        validators: &ValidatorRegistry,
        conditions: &ConditionRegistry,
    ) -> SchemaResult<usize> {
        let definitions = match compile(records, validators, conditions) {
            Ok(definitions) => definitions,
            Err(err) => {
                observability::fatal(EVENT_STORE_LOAD_FAILED, &[("reason", err.message())]);
                return Err(err);
            }
        };

        let count = definitions.len();
        *self.snapshot.write().unwrap() = Arc::new(Snapshot { definitions });
        observability::info(EVENT_STORE_LOADED, &[("definitions", &count.to_string())]);
        Ok(count)
    }

    /// Loads every `*.json` record file from a directory
    pub fn load_from_dir(
        &self,
        dir: &Path,
        validators: &ValidatorRegistry,
        conditions: &ConditionRegistry,
    ) -> SchemaResult<usize> {
        let entries = fs::read_dir(dir).map_err(|e| {
            SchemaError::malformed_document(dir.display().to_string(), e.to_string())
        })?;

        let mut records = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                SchemaError::malformed_document(dir.display().to_string(), e.to_string())
            })?;
            let path = entry.path();
            if path.extension().map_or(true, |ext| ext != "json") {
                continue;
            }
            records.push(read_record_file(&path)?);
        }

        // Directory iteration order is platform-defined; keep loads
        // deterministic.
        records.sort_by(|a, b| {
            (&a.form_type, &a.owner_role_names, &a.initiator_role_names).cmp(&(
                &b.form_type,
                &b.owner_role_names,
                &b.initiator_role_names,
            ))
        });

        self.load(&records, validators, conditions)
    }

    /// Resolves the single definition applicable to a request.
    ///
    /// Returns `FORM_NO_APPLICABLE` when nothing matches; ambiguity cannot
    /// occur because overlapping definitions are rejected at load time.
    pub fn lookup(
        &self,
        form_type: &str,
        actor_roles: &RoleSet,
        owner_roles: &RoleSet,
    ) -> SchemaResult<Arc<FormDefinition>> {
        let snapshot = self.snapshot.read().unwrap().clone();
        snapshot
            .definitions
            .iter()
            .find(|d| d.form_type == form_type && d.matches(actor_roles, owner_roles))
            .cloned()
            .ok_or_else(|| SchemaError::no_applicable(form_type))
    }

    /// Returns the number of loaded definitions
    pub fn definition_count(&self) -> usize {
        self.snapshot.read().unwrap().definitions.len()
    }
}

impl Default for FormStore {
    fn default() -> Self {
        Self::new()
    }
}

fn read_record_file(path: &Path) -> SchemaResult<FormRecord> {
    let content = fs::read_to_string(path)
        .map_err(|e| SchemaError::malformed_document(path.display().to_string(), e.to_string()))?;

    let file: RecordFile = serde_json::from_str(&content)
        .map_err(|e| SchemaError::malformed_document(path.display().to_string(), e.to_string()))?;

    let initiator_role_names = if file.initiator_role_names.is_empty() {
        String::new()
    } else {
        serde_json::to_string(&file.initiator_role_names)
            .map_err(|e| SchemaError::malformed_document(path.display().to_string(), e.to_string()))?
    };
    let owner_role_names = serde_json::to_string(&file.owner_role_names)
        .map_err(|e| SchemaError::malformed_document(path.display().to_string(), e.to_string()))?;
    let document = file.form.to_string();

    Ok(FormRecord {
        form_type: file.form_type,
        initiator_role_names,
        owner_role_names,
        document,
    })
}

/// Compiles records into definitions, rejecting conflicts
fn compile(
    records: &[FormRecord],
    validators: &ValidatorRegistry,
    conditions: &ConditionRegistry,
) -> SchemaResult<Vec<Arc<FormDefinition>>> {
    let mut definitions: Vec<Arc<FormDefinition>> = Vec::with_capacity(records.len());

    for record in records {
        if record.form_type.is_empty() {
            return Err(SchemaError::malformed_document("record", "form type is empty"));
        }

        let owner_roles = record.owner_roles()?;
        if owner_roles.is_empty() {
            return Err(SchemaError::malformed_document(
                format!("form type '{}'", record.form_type),
                "owner role names are empty",
            ));
        }
        let initiator_roles = record.initiator_roles()?;

        let document = FormDocument::parse(&record.document)
            .map_err(|e| e.with_form_type(&record.form_type))?;
        let (fields, condition_refs) = document
            .build(validators)
            .map_err(|e| e.with_form_type(&record.form_type))?;

        for condition in &condition_refs {
            if !conditions.contains(&condition.name) {
                return Err(SchemaError::unknown_condition(&condition.name)
                    .with_form_type(&record.form_type));
            }
        }

        let definition = FormDefinition {
            form_type: record.form_type.clone(),
            initiator_roles,
            owner_roles,
            fields,
            conditions: condition_refs,
        };

        if let Some(existing) = definitions.iter().find(|d| d.overlaps(&definition)) {
            return Err(SchemaError::duplicate_definition(
                &record.form_type,
                format!(
                    "initiators [{}] / owners [{}] overlap initiators [{}] / owners [{}]",
                    definition.initiator_roles,
                    definition.owner_roles,
                    existing.initiator_roles,
                    existing.owner_roles
                ),
            ));
        }

        definitions.push(Arc::new(definition));
    }

    Ok(definitions)
}
