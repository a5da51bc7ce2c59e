//! Shared inventory client and its error type.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use helpdesk_core::{Equipment, EquipmentId, HelpdeskError};
use tokio::sync::RwLock;

/// Errors from inventory operations.
#[derive(Debug, thiserror::Error)]
pub enum InventoryError {
    #[error("Equipment with {field} already exists: {value}")]
    Duplicate { field: &'static str, value: String },

    #[error("Equipment not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Invalid(#[from] HelpdeskError),

    #[error("Snapshot error: {0}")]
    Snapshot(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, InventoryError>;

/// In-memory equipment table with an IP index.
#[derive(Debug, Default)]
pub(crate) struct Inventory {
    pub(crate) records: BTreeMap<EquipmentId, Equipment>,
    pub(crate) by_ip: HashMap<String, EquipmentId>,
    pub(crate) next_id: u64,
}

impl Inventory {
    pub(crate) fn allocate_id(&mut self) -> EquipmentId {
        self.next_id += 1;
        EquipmentId(self.next_id)
    }

    pub(crate) fn insert(&mut self, equipment: Equipment) {
        self.by_ip
            .insert(equipment.ip_address.clone(), equipment.id);
        self.records.insert(equipment.id, equipment);
    }

    pub(crate) fn by_ip(&self, ip: &str) -> Option<&Equipment> {
        self.by_ip.get(ip).and_then(|id| self.records.get(id))
    }

    pub(crate) fn find<F>(&self, pred: F) -> Option<&Equipment>
    where
        F: Fn(&Equipment) -> bool,
    {
        self.records.values().find(|e| pred(e))
    }
}

/// Thread-safe inventory client.
///
/// Every operation takes the table lock once, so a single read-then-write
/// (such as a discovery upsert) is atomic. Clone is cheap (inner Arc).
#[derive(Clone, Default)]
pub struct InventoryClient {
    pub(crate) inner: Arc<RwLock<Inventory>>,
}

impl InventoryClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a client pre-populated with `records`, continuing id allocation
    /// after the highest existing id.
    pub fn with_records(records: Vec<Equipment>) -> Self {
        let mut inventory = Inventory::default();
        for record in records {
            inventory.next_id = inventory.next_id.max(record.id.0);
            inventory.insert(record);
        }
        Self {
            inner: Arc::new(RwLock::new(inventory)),
        }
    }
}
