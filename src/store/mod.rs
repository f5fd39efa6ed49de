//! Form store subsystem
//!
//! # Design principles
//!
//! - Definitions are compiled eagerly; configuration faults fail the load
//! - Overlapping role pairs for one form type are rejected at load time,
//!   never resolved at request time
//! - Lookups read an immutable snapshot; load/reload swaps it atomically

mod store;

pub use store::{FormRecord, FormStore};
