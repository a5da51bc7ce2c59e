//! helpdesk-inventory: the equipment store used by network discovery.
//!
//! Discovery talks to the inventory only through the [`EquipmentStore`]
//! trait. [`InventoryClient`] is the in-process implementation: the manual
//! entry path enforces IP/MAC/hostname uniqueness, while the discovery path
//! upserts by IP address and never rejects.

pub mod client;
pub mod mutations;
pub mod queries;
pub mod snapshot;
pub mod store;

pub use client::{InventoryClient, InventoryError};
pub use store::EquipmentStore;
