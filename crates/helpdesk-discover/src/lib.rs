//! helpdesk-discover: network asset discovery for the helpdesk inventory.
//!
//! Sweeps configured subnets for live hosts, reads their SNMP system group,
//! classifies them and upserts the results into an [`EquipmentStore`].
//!
//! [`EquipmentStore`]: helpdesk_inventory::EquipmentStore

pub mod classify;
pub mod config;
pub mod error;
pub mod identity;
pub mod nmap_xml;
pub mod orchestrator;
pub mod probe;
pub mod range;
pub mod reconcile;
pub mod scanner;
pub mod scheduler;
pub mod snmp;

pub use error::{DiscoverError, Result};
pub use orchestrator::{DiscoveryService, DiscoveryStatus, ScanReport};
pub use scheduler::ScanScheduler;
