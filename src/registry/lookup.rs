//! Lookup collaborator interface for context-dependent validators
//!
//! Uniqueness and referential validators need storage round trips, but the
//! engine itself stays storage-free: it only defines the call contract and
//! receives an implementation through the [`ValidationContext`].
//!
//! A failing or timed-out lookup is reported as a field-level failure for
//! that field alone; it never aborts the rest of the validation.
//!
//! [`ValidationContext`]: crate::registry::ValidationContext

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Result type for lookup operations
pub type LookupResult<T> = Result<T, LookupError>;

/// Errors raised by a lookup collaborator
#[derive(Debug, Clone, Error)]
pub enum LookupError {
    /// The lookup did not complete in time
    #[error("lookup timed out")]
    TimedOut,

    /// The backing dependency is unreachable or failed
    #[error("lookup failed: {0}")]
    Unavailable(String),
}

/// Side-channel lookups required by context-dependent validators.
///
/// `lookup_exists` answers "does any record of `entity` other than
/// `exclude_uid` already carry `value` in `field`" — the shape needed by
/// the unique-excluding-self pattern used when updating an existing record.
pub trait LookupProvider: Send + Sync {
    /// Returns whether a conflicting record exists
    fn lookup_exists(
        &self,
        entity: &str,
        field: &str,
        value: &str,
        exclude_uid: Option<&str>,
    ) -> LookupResult<bool>;

    /// Returns whether the ISO 3166-1 alpha-2 code is a known country
    fn country_exists(&self, iso_code: &str) -> LookupResult<bool>;

    /// Current time, injectable for deterministic tests
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// ISO 3166-1 alpha-2 country codes accepted by `existCountry`.
///
/// Kept here so lookup implementations without their own country data can
/// answer `country_exists` from a static table.
pub const ISO_COUNTRY_CODES: &[&str] = &[
    "AF", "AX", "AL", "DZ", "AS", "AD", "AO", "AI", "AQ", "AG", "AR", "AM", "AW", "AU", "AT",
    "AZ", "BS", "BH", "BD", "BB", "BY", "BE", "BZ", "BJ", "BM", "BT", "BO", "BQ", "BA", "BW",
    "BV", "BR", "IO", "BN", "BG", "BF", "BI", "CV", "KH", "CM", "CA", "KY", "CF", "TD", "CL",
    "CN", "CX", "CC", "CO", "KM", "CD", "CG", "CK", "CR", "CI", "HR", "CU", "CW", "CY", "CZ",
    "DK", "DJ", "DM", "DO", "EC", "EG", "SV", "GQ", "ER", "EE", "ET", "FK", "FO", "FJ", "FI",
    "FR", "GF", "PF", "TF", "GA", "GM", "GE", "DE", "GH", "GI", "GR", "GL", "GD", "GP", "GU",
    "GT", "GG", "GN", "GW", "GY", "HT", "HM", "VA", "HN", "HK", "HU", "IS", "IN", "ID", "IR",
    "IQ", "IE", "IM", "IL", "IT", "JM", "JP", "JE", "JO", "KZ", "KE", "KI", "KP", "KR", "KW",
    "KG", "LA", "LV", "LB", "LS", "LR", "LY", "LI", "LT", "LU", "MO", "MK", "MG", "MW", "MY",
    "MV", "ML", "MT", "MH", "MQ", "MR", "MU", "YT", "MX", "FM", "MD", "MC", "MN", "ME", "MS",
    "MA", "MZ", "MM", "NA", "NR", "NP", "NL", "NC", "NZ", "NI", "NE", "NG", "NU", "NF", "MP",
    "NO", "OM", "PK", "PW", "PS", "PA", "PG", "PY", "PE", "PH", "PN", "PL", "PT", "PR", "QA",
    "RE", "RO", "RU", "RW", "BL", "SH", "KN", "LC", "MF", "PM", "VC", "WS", "SM", "ST", "SA",
    "SN", "RS", "SC", "SL", "SG", "SX", "SK", "SI", "SB", "SO", "ZA", "GS", "SS", "ES", "LK",
    "SD", "SR", "SJ", "SZ", "SE", "CH", "SY", "TW", "TJ", "TZ", "TH", "TL", "TG", "TK", "TO",
    "TT", "TN", "TR", "TM", "TC", "TV", "UG", "UA", "AE", "GB", "UM", "US", "UY", "UZ", "VU",
    "VE", "VN", "VG", "VI", "WF", "EH", "YE", "ZM", "ZW",
];

/// Returns whether the code appears in the static ISO table
pub fn iso_country_exists(iso_code: &str) -> bool {
    ISO_COUNTRY_CODES.contains(&iso_code)
}
