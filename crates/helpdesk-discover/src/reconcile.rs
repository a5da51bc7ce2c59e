//! Upsert discovered devices into the equipment store.

use std::net::Ipv4Addr;
use std::sync::Arc;

use helpdesk_core::{Classification, DeviceSignature, DiscoveryUpdate, Equipment};
use helpdesk_inventory::EquipmentStore;

use crate::error::Result;

/// Everything the per-host pipeline learned about one address.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveredDevice {
    pub ip_address: Ipv4Addr,
    pub hostname: Option<String>,
    pub mac_address: Option<String>,
    pub signature: Option<DeviceSignature>,
    pub classification: Classification,
}

impl DiscoveredDevice {
    fn to_update(&self) -> Result<DiscoveryUpdate> {
        let c = &self.classification;
        Ok(DiscoveryUpdate {
            ip_address: self.ip_address.to_string(),
            mac_address: self.mac_address.clone(),
            hostname: self.hostname.clone(),
            equipment_type: c.equipment_type,
            manufacturer: c.manufacturer.clone(),
            model: c.model.clone(),
            os_name: c.os_name.clone(),
            os_version: c.os_version.clone(),
            specifications: self
                .signature
                .as_ref()
                .map(DeviceSignature::to_specifications)
                .transpose()?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct Reconciled {
    pub equipment: Equipment,
    pub created: bool,
}

#[derive(Clone)]
pub struct Reconciler {
    store: Arc<dyn EquipmentStore>,
}

impl Reconciler {
    pub fn new(store: Arc<dyn EquipmentStore>) -> Self {
        Self { store }
    }

    /// Create the record for this IP or refresh the existing one.
    ///
    /// The store marks it online and stamps `last_seen`. MAC and hostname
    /// conflicts with other records are not errors here.
    pub async fn reconcile(&self, device: &DiscoveredDevice) -> Result<Reconciled> {
        let update = device.to_update()?;
        let created = !self.store.exists_by_ip_address(&update.ip_address).await;
        let equipment = self.store.create_or_update_from_discovery(update).await;

        tracing::debug!(
            ip = %device.ip_address,
            id = %equipment.id,
            equipment_type = %equipment.equipment_type,
            created,
            "Reconciled discovered device"
        );

        Ok(Reconciled { equipment, created })
    }
}
