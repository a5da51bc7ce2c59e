//! Write operations for the equipment inventory.
//!
//! Two write paths exist. The manual path (`create`, `update`) rejects
//! duplicate IP, MAC or hostname. The discovery path
//! (`create_or_update_from_discovery`) upserts by IP address and never
//! rejects: a MAC or hostname already held by another record is silently
//! taken over so automated sweeps cannot be blocked by stale manual data.

use chrono::{DateTime, TimeDelta, Utc};
use helpdesk_core::{DiscoveryUpdate, Equipment, EquipmentId, EquipmentStatus, NewEquipment};

use crate::client::{Inventory, InventoryClient, InventoryError, Result};
use crate::queries::normalize_mac;

impl InventoryClient {
    // ── Manual Entry ─────────────────────────────────────────────

    /// Register equipment by hand. Fails if the IP, MAC or hostname is taken.
    pub async fn create(&self, new: NewEquipment) -> Result<Equipment> {
        new.validate()?;

        let mut inv = self.inner.write().await;
        check_unique(
            &inv,
            None,
            &new.ip_address,
            new.mac_address.as_deref(),
            new.hostname.as_deref(),
        )?;

        let now = Utc::now();
        let equipment = Equipment {
            id: inv.allocate_id(),
            ip_address: new.ip_address,
            mac_address: new.mac_address,
            hostname: new.hostname,
            equipment_type: new.equipment_type,
            manufacturer: new.manufacturer,
            model: new.model,
            serial_number: new.serial_number,
            os_name: None,
            os_version: None,
            location: new.location,
            status: EquipmentStatus::Unknown,
            last_seen: Some(now),
            specifications: None,
            is_managed: new.is_managed,
            asset_tag: new.asset_tag,
            purchase_date: None,
            warranty_expiry: None,
            created_at: now,
            updated_at: now,
        };

        tracing::info!(id = %equipment.id, ip = %equipment.ip_address, "Equipment created");
        inv.insert(equipment.clone());
        Ok(equipment)
    }

    /// Replace a record by hand. Fails if another record holds the IP, MAC or
    /// hostname.
    pub async fn update(&self, mut equipment: Equipment) -> Result<Equipment> {
        let mut inv = self.inner.write().await;
        let previous_ip = match inv.records.get(&equipment.id) {
            Some(existing) => existing.ip_address.clone(),
            None => return Err(InventoryError::NotFound(format!("id {}", equipment.id))),
        };

        check_unique(
            &inv,
            Some(equipment.id),
            &equipment.ip_address,
            equipment.mac_address.as_deref(),
            equipment.hostname.as_deref(),
        )?;

        equipment.updated_at = Utc::now();
        if previous_ip != equipment.ip_address {
            inv.by_ip.remove(&previous_ip);
        }
        inv.insert(equipment.clone());
        Ok(equipment)
    }

    // ── Discovery ────────────────────────────────────────────────

    /// Upsert a discovered device keyed by IP address.
    ///
    /// An existing record keeps its id and asset-management fields; the
    /// discovery fields are overwritten, status becomes ONLINE and
    /// `last_seen` advances. `last_seen` never moves backwards, even if the
    /// wall clock does.
    pub async fn create_or_update_from_discovery(&self, update: DiscoveryUpdate) -> Equipment {
        let mut inv = self.inner.write().await;
        let now = Utc::now();

        log_takeovers(&inv, &update);

        if let Some(id) = inv.by_ip.get(&update.ip_address).copied() {
            if let Some(existing) = inv.records.get_mut(&id) {
                let seen = advance(existing.last_seen, now);
                existing.apply_discovery(&update, seen);
                tracing::debug!(id = %id, ip = %update.ip_address, "Equipment refreshed by discovery");
                return existing.clone();
            }
        }

        let equipment = Equipment {
            id: inv.allocate_id(),
            ip_address: update.ip_address,
            mac_address: update.mac_address,
            hostname: update.hostname,
            equipment_type: update.equipment_type,
            manufacturer: update.manufacturer,
            model: update.model,
            serial_number: None,
            os_name: update.os_name,
            os_version: update.os_version,
            location: None,
            status: EquipmentStatus::Online,
            last_seen: Some(now),
            specifications: update.specifications,
            is_managed: false,
            asset_tag: None,
            purchase_date: None,
            warranty_expiry: None,
            created_at: now,
            updated_at: now,
        };

        tracing::info!(id = %equipment.id, ip = %equipment.ip_address, "Equipment created by discovery");
        inv.insert(equipment.clone());
        equipment
    }
}

/// Strictly advance `previous` so successive sightings are ordered.
fn advance(previous: Option<DateTime<Utc>>, now: DateTime<Utc>) -> DateTime<Utc> {
    match previous {
        Some(prev) if now <= prev => prev + TimeDelta::microseconds(1),
        _ => now,
    }
}

fn check_unique(
    inv: &Inventory,
    own_id: Option<EquipmentId>,
    ip: &str,
    mac: Option<&str>,
    hostname: Option<&str>,
) -> Result<()> {
    let other = |e: &Equipment| Some(e.id) != own_id;

    if inv.by_ip(ip).is_some_and(other) {
        return Err(InventoryError::Duplicate {
            field: "IP address",
            value: ip.to_string(),
        });
    }

    if let Some(mac) = mac {
        let wanted = normalize_mac(mac);
        let taken = inv.find(|e| {
            other(e) && e.mac_address.as_deref().map(normalize_mac).as_deref() == Some(wanted.as_str())
        });
        if taken.is_some() {
            return Err(InventoryError::Duplicate {
                field: "MAC address",
                value: mac.to_string(),
            });
        }
    }

    if let Some(hostname) = hostname {
        let taken = inv.find(|e| {
            other(e)
                && e.hostname
                    .as_deref()
                    .is_some_and(|h| h.eq_ignore_ascii_case(hostname))
        });
        if taken.is_some() {
            return Err(InventoryError::Duplicate {
                field: "hostname",
                value: hostname.to_string(),
            });
        }
    }

    Ok(())
}

/// Discovery may move a MAC or hostname onto a different IP's record.
fn log_takeovers(inv: &Inventory, update: &DiscoveryUpdate) {
    if let Some(mac) = &update.mac_address {
        let wanted = normalize_mac(mac);
        if let Some(holder) = inv.find(|e| {
            e.ip_address != update.ip_address
                && e.mac_address.as_deref().map(normalize_mac).as_deref() == Some(wanted.as_str())
        }) {
            tracing::debug!(
                mac = %mac,
                ip = %update.ip_address,
                held_by = %holder.ip_address,
                "MAC address also recorded on another equipment"
            );
        }
    }

    if let Some(hostname) = &update.hostname {
        if let Some(holder) = inv.find(|e| {
            e.ip_address != update.ip_address
                && e.hostname
                    .as_deref()
                    .is_some_and(|h| h.eq_ignore_ascii_case(hostname))
        }) {
            tracing::debug!(
                hostname = %hostname,
                ip = %update.ip_address,
                held_by = %holder.ip_address,
                "Hostname also recorded on another equipment"
            );
        }
    }
}
