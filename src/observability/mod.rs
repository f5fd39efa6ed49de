//! Observability for the form engine
//!
//! Structured, deterministic JSON logging. Request outcomes and store
//! lifecycle events are logged as one-line events; validation errors stay
//! request data.

pub mod logger;

pub use logger::{
    error, fatal, info, warn, LogLevel, EVENT_FORM_NOT_FOUND, EVENT_PAYLOAD_ACCEPTED,
    EVENT_PAYLOAD_REJECTED, EVENT_STORE_LOADED, EVENT_STORE_LOAD_FAILED,
};
