//! End-to-end payload validation tests
//!
//! Drives the service facade with the client "update" form the platform
//! ships: scalar chains, a nested company object, address arrays with
//! `omitempty` + `dive`, uniqueness lookups excluding the record itself.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use serde_json::json;

use formgate::conditions::ConditionRegistry;
use formgate::engine::{TypedValue, ValidationOutcome};
use formgate::registry::{
    iso_country_exists, LookupError, LookupProvider, LookupResult, ValidationContext,
    ValidatorRegistry,
};
use formgate::schema::RoleSet;
use formgate::service::FormService;
use formgate::store::{FormRecord, FormStore};

/// The client self-service update form, as seeded by the platform
const CLIENT_UPDATE_FORM: &str = r#"{
    "fields": [
        {"name": "uid", "type": "string"},
        {"name": "firstName", "type": "string",
         "validators": [{"name": "required", "param": ""}, {"name": "max", "param": "255"}]},
        {"name": "lastName", "type": "string",
         "validators": [{"name": "required", "param": ""}, {"name": "max", "param": "255"}]},
        {"name": "phoneNumber", "type": "string",
         "validators": [{"name": "required"}, {"name": "uniquePhoneNumber", "param": "Uid"}]},
        {"name": "dateOfBirth", "type": "string",
         "validators": [{"name": "omitempty"}, {"name": "dayBeforeNow"}]},
        {"name": "documentPersonalId", "type": "string",
         "validators": [{"name": "omitempty"}, {"name": "max", "param": "255"}]},
        {"name": "companyDetails", "type": "object",
         "validators": [{"name": "omitempty"}, {"name": "dive"}],
         "children": [
            {"name": "id", "type": "int", "validators": [{"name": "omitempty"}]},
            {"name": "companyName", "type": "string",
             "validators": [{"name": "max", "param": "255"}]}
         ]},
        {"name": "physicalAddresses", "type": "array",
         "validators": [{"name": "omitempty"}, {"name": "max", "param": "2"}, {"name": "dive"}],
         "children": [
            {"name": "id", "type": "int", "validators": [{"name": "omitempty"}]},
            {"name": "countryIsoTwo", "type": "string",
             "validators": [{"name": "required"}, {"name": "existCountry"}]},
            {"name": "zipCode", "type": "string",
             "validators": [{"name": "required"}, {"name": "max", "param": "45"}]},
            {"name": "address", "type": "string",
             "validators": [{"name": "required"}, {"name": "max", "param": "255"}]},
            {"name": "city", "type": "string",
             "validators": [{"name": "required"}, {"name": "max", "param": "45"}]}
         ]}
    ]
}"#;

/// Lookup fake over a fixed set of existing user records
struct UserDirectory {
    /// `(field, value, owner uid)` rows
    rows: Vec<(&'static str, &'static str, &'static str)>,
    fail_with: Option<LookupError>,
}

impl UserDirectory {
    fn new() -> Self {
        Self {
            rows: vec![
                ("phone_number", "+15550001111", "u1"),
                ("phone_number", "+15559998888", "u2"),
                ("email", "taken@example.com", "u2"),
            ],
            fail_with: None,
        }
    }

    fn unreachable() -> Self {
        Self {
            rows: Vec::new(),
            fail_with: Some(LookupError::TimedOut),
        }
    }
}

impl LookupProvider for UserDirectory {
    fn lookup_exists(
        &self,
        _entity: &str,
        field: &str,
        value: &str,
        exclude_uid: Option<&str>,
    ) -> LookupResult<bool> {
        if let Some(err) = &self.fail_with {
            return Err(err.clone());
        }
        Ok(self
            .rows
            .iter()
            .any(|(f, v, uid)| *f == field && *v == value && Some(*uid) != exclude_uid))
    }

    fn country_exists(&self, iso_code: &str) -> LookupResult<bool> {
        if let Some(err) = &self.fail_with {
            return Err(err.clone());
        }
        Ok(iso_country_exists(iso_code))
    }

    fn now(&self) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2021, 2, 1, 9, 0, 0).unwrap()
    }
}

fn service() -> FormService {
    let validators = Arc::new(ValidatorRegistry::builtins());
    let conditions = Arc::new(ConditionRegistry::new());
    let store = Arc::new(FormStore::new());
    store
        .load(
            &[FormRecord::new(
                "update",
                r#"["client"]"#,
                r#"["client"]"#,
                CLIENT_UPDATE_FORM,
            )],
            &validators,
            &conditions,
        )
        .unwrap();
    FormService::new(store, validators, conditions)
}

fn validate_as_u1(payload: serde_json::Value) -> ValidationOutcome {
    let ctx = ValidationContext::for_record(Arc::new(UserDirectory::new()), "u1");
    service()
        .validate(
            "update",
            &RoleSet::single("client"),
            &RoleSet::single("client"),
            &payload,
            &ctx,
        )
        .unwrap()
}

#[test]
fn test_full_payload_accepted() {
    let outcome = validate_as_u1(json!({
        "uid": "u1",
        "firstName": "Ann",
        "lastName": "Lee",
        "phoneNumber": "+15550001111",
        "dateOfBirth": "1990-04-12",
        "companyDetails": {"id": 7, "companyName": "Lee Consulting"},
        "physicalAddresses": [
            {"id": 1, "countryIsoTwo": "US", "zipCode": "10001",
             "address": "1 Main St", "city": "New York"}
        ]
    }));

    assert!(outcome.is_valid(), "{:?}", outcome.errors());
    let value = outcome.into_value().unwrap();
    assert_eq!(value.get("firstName").and_then(TypedValue::as_str), Some("Ann"));

    let addresses = match value.get("physicalAddresses") {
        Some(TypedValue::Array(items)) => items,
        other => panic!("expected typed array, got {:?}", other),
    };
    assert_eq!(
        addresses[0].get("zipCode").and_then(TypedValue::as_str),
        Some("10001")
    );
    assert_eq!(addresses[0].get("id").and_then(TypedValue::as_i64), Some(1));
}

#[test]
fn test_own_phone_number_is_not_a_conflict() {
    // +15550001111 belongs to u1; updating u1 keeps it valid, while
    // another user's number is rejected.
    let ok = validate_as_u1(json!({
        "uid": "u1",
        "firstName": "Ann",
        "lastName": "Lee",
        "phoneNumber": "+15550001111"
    }));
    assert!(ok.is_valid());

    let conflict = validate_as_u1(json!({
        "uid": "u1",
        "firstName": "Ann",
        "lastName": "Lee",
        "phoneNumber": "+15559998888"
    }));
    let errors = conflict.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].path, "phoneNumber");
    assert_eq!(errors[0].validator, "uniquePhoneNumber");
    assert_eq!(errors[0].message, "Phone number already exists on the platform");
}

#[test]
fn test_error_completeness_one_error_per_violation() {
    // Four independent violations yield exactly four errors.
    let outcome = validate_as_u1(json!({
        "uid": "u1",
        "lastName": "x".repeat(300),
        "phoneNumber": "+15559998888",
        "dateOfBirth": "2031-01-01"
    }));

    let errors = outcome.errors();
    assert_eq!(errors.len(), 4);
    let paths: Vec<&str> = errors.iter().map(|e| e.path.as_str()).collect();
    assert_eq!(paths, vec!["firstName", "lastName", "phoneNumber", "dateOfBirth"]);
    let validators: Vec<&str> = errors.iter().map(|e| e.validator.as_str()).collect();
    assert_eq!(
        validators,
        vec!["required", "max", "uniquePhoneNumber", "dayBeforeNow"]
    );
}

#[test]
fn test_array_error_path_is_index_qualified() {
    let outcome = validate_as_u1(json!({
        "uid": "u1",
        "firstName": "Ann",
        "lastName": "Lee",
        "phoneNumber": "+15550001111",
        "physicalAddresses": [
            {"countryIsoTwo": "US", "zipCode": "10001",
             "address": "1 Main St", "city": "New York"},
            {"countryIsoTwo": "US",
             "address": "2 Side St", "city": "New York"}
        ]
    }));

    let errors = outcome.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].path, "physicalAddresses[1].zipCode");
    assert_eq!(errors[0].validator, "required");
}

#[test]
fn test_absent_addresses_skip_children_entirely() {
    let outcome = validate_as_u1(json!({
        "uid": "u1",
        "firstName": "Ann",
        "lastName": "Lee",
        "phoneNumber": "+15550001111"
    }));

    assert!(outcome.is_valid());
    assert!(outcome.value().unwrap().get("physicalAddresses").is_none());
}

#[test]
fn test_nested_object_dive() {
    let outcome = validate_as_u1(json!({
        "uid": "u1",
        "firstName": "Ann",
        "lastName": "Lee",
        "phoneNumber": "+15550001111",
        "companyDetails": {"id": "not-an-int", "companyName": "Lee Consulting"}
    }));

    let errors = outcome.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].path, "companyDetails.id");
    assert_eq!(errors[0].validator, "type");
}

#[test]
fn test_unknown_country_in_address() {
    let outcome = validate_as_u1(json!({
        "uid": "u1",
        "firstName": "Ann",
        "lastName": "Lee",
        "phoneNumber": "+15550001111",
        "physicalAddresses": [
            {"countryIsoTwo": "ZZ", "zipCode": "10001",
             "address": "1 Main St", "city": "New York"}
        ]
    }));

    let errors = outcome.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].path, "physicalAddresses[0].countryIsoTwo");
    assert_eq!(errors[0].validator, "existCountry");
}

#[test]
fn test_too_many_addresses_suppresses_element_validation() {
    let outcome = validate_as_u1(json!({
        "uid": "u1",
        "firstName": "Ann",
        "lastName": "Lee",
        "phoneNumber": "+15550001111",
        "physicalAddresses": [{}, {}, {}]
    }));

    let errors = outcome.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].path, "physicalAddresses");
    assert_eq!(errors[0].validator, "max");
}

#[test]
fn test_unreachable_lookup_degrades_to_field_error() {
    let validators = Arc::new(ValidatorRegistry::builtins());
    let conditions = Arc::new(ConditionRegistry::new());
    let store = Arc::new(FormStore::new());
    store
        .load(
            &[FormRecord::new(
                "update",
                r#"["client"]"#,
                r#"["client"]"#,
                CLIENT_UPDATE_FORM,
            )],
            &validators,
            &conditions,
        )
        .unwrap();
    let service = FormService::new(store, validators, conditions);

    let ctx = ValidationContext::for_record(Arc::new(UserDirectory::unreachable()), "u1");
    let outcome = service
        .validate(
            "update",
            &RoleSet::single("client"),
            &RoleSet::single("client"),
            &json!({
                "uid": "u1",
                "firstName": "Ann",
                "lastName": "Lee",
                "phoneNumber": "+15550001111"
            }),
            &ctx,
        )
        .unwrap();

    // Only the lookup-backed field degrades; everything else validated.
    let errors = outcome.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].path, "phoneNumber");
    assert_eq!(errors[0].message, "lookup timed out");
}

#[test]
fn test_validation_is_idempotent() {
    let payload = json!({
        "uid": "u1",
        "lastName": "Lee",
        "phoneNumber": "+15559998888"
    });

    let first = validate_as_u1(payload.clone());
    let second = validate_as_u1(payload);
    assert_eq!(first, second);
}
