//! The store seam consumed by the discovery engine.

use async_trait::async_trait;
use helpdesk_core::{DiscoveryUpdate, Equipment};

use crate::client::InventoryClient;

/// Equipment persistence as seen by discovery.
///
/// Implementations own uniqueness rules for manual entry; discovery writes go
/// through [`EquipmentStore::create_or_update_from_discovery`], which upserts
/// by IP address and must not fail on MAC or hostname conflicts.
#[async_trait]
pub trait EquipmentStore: Send + Sync {
    async fn find_by_ip_address(&self, ip: &str) -> Option<Equipment>;
    async fn find_by_mac_address(&self, mac: &str) -> Option<Equipment>;
    async fn find_by_hostname(&self, hostname: &str) -> Option<Equipment>;

    async fn exists_by_ip_address(&self, ip: &str) -> bool {
        self.find_by_ip_address(ip).await.is_some()
    }

    async fn exists_by_mac_address(&self, mac: &str) -> bool {
        self.find_by_mac_address(mac).await.is_some()
    }

    async fn exists_by_hostname(&self, hostname: &str) -> bool {
        self.find_by_hostname(hostname).await.is_some()
    }

    async fn create_or_update_from_discovery(&self, update: DiscoveryUpdate) -> Equipment;
}

#[async_trait]
impl EquipmentStore for InventoryClient {
    async fn find_by_ip_address(&self, ip: &str) -> Option<Equipment> {
        InventoryClient::find_by_ip_address(self, ip).await
    }

    async fn find_by_mac_address(&self, mac: &str) -> Option<Equipment> {
        InventoryClient::find_by_mac_address(self, mac).await
    }

    async fn find_by_hostname(&self, hostname: &str) -> Option<Equipment> {
        InventoryClient::find_by_hostname(self, hostname).await
    }

    async fn create_or_update_from_discovery(&self, update: DiscoveryUpdate) -> Equipment {
        InventoryClient::create_or_update_from_discovery(self, update).await
    }
}
