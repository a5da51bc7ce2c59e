//! helpdesk-core: Shared equipment types and error handling for the helpdesk
//! asset inventory.
//!
//! This crate provides the foundational types used by the inventory store and
//! the network discovery engine:
//! - Equipment records and their type/status enumerations
//! - Device signatures gathered over SNMP
//! - The discovery update payload consumed by the store
//! - Common error types

pub mod error;
pub mod types;

pub use error::HelpdeskError;
pub use types::*;
