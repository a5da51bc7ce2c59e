//! Read operations for the equipment inventory.

use helpdesk_core::{Equipment, EquipmentId, EquipmentStatus};

use crate::client::{InventoryClient, InventoryError, Result};

impl InventoryClient {
    // ── Single Record Lookups ────────────────────────────────────

    /// Get a record by its store id.
    pub async fn get(&self, id: EquipmentId) -> Result<Equipment> {
        let inv = self.inner.read().await;
        inv.records
            .get(&id)
            .cloned()
            .ok_or_else(|| InventoryError::NotFound(format!("id {id}")))
    }

    pub async fn find_by_ip_address(&self, ip: &str) -> Option<Equipment> {
        self.inner.read().await.by_ip(ip).cloned()
    }

    /// MAC comparison ignores case and the `:`/`-` separator style.
    pub async fn find_by_mac_address(&self, mac: &str) -> Option<Equipment> {
        let wanted = normalize_mac(mac);
        self.inner
            .read()
            .await
            .find(|e| e.mac_address.as_deref().map(normalize_mac).as_deref() == Some(wanted.as_str()))
            .cloned()
    }

    pub async fn find_by_hostname(&self, hostname: &str) -> Option<Equipment> {
        self.inner
            .read()
            .await
            .find(|e| {
                e.hostname
                    .as_deref()
                    .is_some_and(|h| h.eq_ignore_ascii_case(hostname))
            })
            .cloned()
    }

    pub async fn exists_by_ip_address(&self, ip: &str) -> bool {
        self.find_by_ip_address(ip).await.is_some()
    }

    pub async fn exists_by_mac_address(&self, mac: &str) -> bool {
        self.find_by_mac_address(mac).await.is_some()
    }

    pub async fn exists_by_hostname(&self, hostname: &str) -> bool {
        self.find_by_hostname(hostname).await.is_some()
    }

    // ── Listing ──────────────────────────────────────────────────

    /// All records ordered by id.
    pub async fn list(&self) -> Vec<Equipment> {
        self.inner.read().await.records.values().cloned().collect()
    }

    pub async fn count(&self) -> usize {
        self.inner.read().await.records.len()
    }

    pub async fn count_by_status(&self, status: EquipmentStatus) -> usize {
        self.inner
            .read()
            .await
            .records
            .values()
            .filter(|e| e.status == status)
            .count()
    }
}

pub(crate) fn normalize_mac(mac: &str) -> String {
    mac.to_ascii_lowercase().replace('-', ":")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_mac() {
        assert_eq!(normalize_mac("AA-BB-CC-DD-EE-FF"), "aa:bb:cc:dd:ee:ff");
        assert_eq!(normalize_mac("aa:bb:cc:dd:ee:ff"), "aa:bb:cc:dd:ee:ff");
    }
}
