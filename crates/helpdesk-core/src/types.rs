//! Core domain types for the helpdesk equipment inventory.
//!
//! These types represent inventoried IT assets and the transient values the
//! discovery engine produces while sweeping the network.

use std::fmt;
use std::net::IpAddr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::HelpdeskError;

// ── Equipment ─────────────────────────────────────────────────────

/// Store-assigned identifier of an equipment record. Never changes once assigned.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EquipmentId(pub u64);

impl fmt::Display for EquipmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An inventoried IT asset.
///
/// The IP address is the primary identity used by discovery. MAC address and
/// hostname are secondary uniqueness keys enforced only on manual entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Equipment {
    pub id: EquipmentId,
    pub ip_address: String,
    pub mac_address: Option<String>,
    pub hostname: Option<String>,
    pub equipment_type: EquipmentType,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub os_name: Option<String>,
    pub os_version: Option<String>,
    pub location: Option<String>,
    pub status: EquipmentStatus,
    pub last_seen: Option<DateTime<Utc>>,
    /// Opaque JSON text, typically the serialized [`DeviceSignature`].
    pub specifications: Option<String>,
    pub is_managed: bool,
    pub asset_tag: Option<String>,
    pub purchase_date: Option<DateTime<Utc>>,
    pub warranty_expiry: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Equipment {
    pub fn is_online(&self) -> bool {
        self.status == EquipmentStatus::Online
    }

    /// Apply the discovery-owned fields of `update`, leaving asset-management
    /// fields (asset tag, warranty, managed flag, location, serial) untouched.
    pub fn apply_discovery(&mut self, update: &DiscoveryUpdate, seen: DateTime<Utc>) {
        self.mac_address = update.mac_address.clone();
        self.hostname = update.hostname.clone();
        self.equipment_type = update.equipment_type;
        self.manufacturer = update.manufacturer.clone();
        self.model = update.model.clone();
        self.os_name = update.os_name.clone();
        self.os_version = update.os_version.clone();
        self.specifications = update.specifications.clone();
        self.status = EquipmentStatus::Online;
        self.last_seen = Some(seen);
        self.updated_at = seen;
    }
}

/// Fields supplied when an operator registers equipment by hand.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewEquipment {
    pub ip_address: String,
    pub mac_address: Option<String>,
    pub hostname: Option<String>,
    pub equipment_type: EquipmentType,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub location: Option<String>,
    pub is_managed: bool,
    pub asset_tag: Option<String>,
}

impl NewEquipment {
    /// Check address formats before the record reaches the store.
    pub fn validate(&self) -> Result<(), HelpdeskError> {
        validate_ip_address(&self.ip_address)?;
        if let Some(mac) = &self.mac_address {
            validate_mac_address(mac)?;
        }
        Ok(())
    }
}

/// A discovery observation handed to the store for create-or-update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryUpdate {
    pub ip_address: String,
    pub mac_address: Option<String>,
    pub hostname: Option<String>,
    pub equipment_type: EquipmentType,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub os_name: Option<String>,
    pub os_version: Option<String>,
    pub specifications: Option<String>,
}

impl DiscoveryUpdate {
    pub fn new(ip_address: impl Into<String>, equipment_type: EquipmentType) -> Self {
        Self {
            ip_address: ip_address.into(),
            mac_address: None,
            hostname: None,
            equipment_type,
            manufacturer: None,
            model: None,
            os_name: None,
            os_version: None,
            specifications: None,
        }
    }
}

// ── Discovery values ──────────────────────────────────────────────

/// Management values read from a device over SNMP.
///
/// Any field may be absent when the corresponding query failed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceSignature {
    pub system_description: Option<String>,
    pub system_name: Option<String>,
    pub system_location: Option<String>,
    pub system_contact: Option<String>,
    pub system_uptime: Option<String>,
    pub interface_count: Option<u32>,
    pub process_count: Option<u32>,
}

impl DeviceSignature {
    /// Serialize into the opaque specification text stored on equipment.
    pub fn to_specifications(&self) -> Result<String, HelpdeskError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Best-guess identity of a device derived from its signature or hostname.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub equipment_type: EquipmentType,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub os_name: Option<String>,
    pub os_version: Option<String>,
}

// ── Enums ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EquipmentType {
    Desktop,
    Laptop,
    Server,
    Printer,
    Switch,
    Router,
    AccessPoint,
    Firewall,
    Ups,
    Scanner,
    Projector,
    Phone,
    Monitor,
    Storage,
    #[default]
    Unknown,
}

impl EquipmentType {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Desktop => "Desktop Computer",
            Self::Laptop => "Laptop Computer",
            Self::Server => "Server",
            Self::Printer => "Printer",
            Self::Switch => "Network Switch",
            Self::Router => "Router",
            Self::AccessPoint => "Access Point",
            Self::Firewall => "Firewall",
            Self::Ups => "UPS",
            Self::Scanner => "Scanner",
            Self::Projector => "Projector",
            Self::Phone => "IP Phone",
            Self::Monitor => "Monitor",
            Self::Storage => "Storage Device",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for EquipmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EquipmentStatus {
    Online,
    Offline,
    Maintenance,
    Retired,
    #[default]
    Unknown,
}

impl fmt::Display for EquipmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Online => "Online",
            Self::Offline => "Offline",
            Self::Maintenance => "Under Maintenance",
            Self::Retired => "Retired",
            Self::Unknown => "Unknown",
        })
    }
}

// ── Validation ────────────────────────────────────────────────────

/// Accept dotted IPv4 or any IPv6 literal.
pub fn validate_ip_address(value: &str) -> Result<(), HelpdeskError> {
    value
        .parse::<IpAddr>()
        .map(|_| ())
        .map_err(|_| HelpdeskError::Validation {
            field: "ip_address",
            value: value.to_string(),
        })
}

/// Accept six hex octets separated by `:` or `-`.
pub fn validate_mac_address(value: &str) -> Result<(), HelpdeskError> {
    if is_mac_address(value) {
        Ok(())
    } else {
        Err(HelpdeskError::Validation {
            field: "mac_address",
            value: value.to_string(),
        })
    }
}

/// True if `value` looks like `aa:bb:cc:dd:ee:ff` or `AA-BB-CC-DD-EE-FF`.
pub fn is_mac_address(value: &str) -> bool {
    let sep = match value.chars().nth(2) {
        Some(c @ (':' | '-')) => c,
        _ => return false,
    };
    let octets: Vec<&str> = value.split(sep).collect();
    octets.len() == 6
        && octets
            .iter()
            .all(|o| o.len() == 2 && o.chars().all(|c| c.is_ascii_hexdigit()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equipment_type_serializes_screaming_snake() {
        let json = serde_json::to_string(&EquipmentType::AccessPoint).unwrap();
        assert_eq!(json, "\"ACCESS_POINT\"");

        let json = serde_json::to_string(&EquipmentStatus::Online).unwrap();
        assert_eq!(json, "\"ONLINE\"");
    }

    #[test]
    fn signature_specifications_use_camel_case() {
        let sig = DeviceSignature {
            system_description: Some("Cisco IOS Switch".to_string()),
            interface_count: Some(26),
            ..Default::default()
        };

        let json = sig.to_specifications().unwrap();
        assert!(json.contains("\"systemDescription\":\"Cisco IOS Switch\""));
        assert!(json.contains("\"interfaceCount\":26"));
        assert!(json.contains("\"systemName\":null"));
    }

    #[test]
    fn apply_discovery_keeps_asset_fields() {
        let now = Utc::now();
        let mut eq = Equipment {
            id: EquipmentId(7),
            ip_address: "10.0.0.5".to_string(),
            mac_address: None,
            hostname: None,
            equipment_type: EquipmentType::Unknown,
            manufacturer: None,
            model: None,
            serial_number: Some("SN-1".to_string()),
            os_name: None,
            os_version: None,
            location: Some("Rack 3".to_string()),
            status: EquipmentStatus::Offline,
            last_seen: None,
            specifications: None,
            is_managed: true,
            asset_tag: Some("DGH-0042".to_string()),
            purchase_date: None,
            warranty_expiry: Some(now),
            created_at: now,
            updated_at: now,
        };

        let mut update = DiscoveryUpdate::new("10.0.0.5", EquipmentType::Printer);
        update.manufacturer = Some("HP".to_string());
        eq.apply_discovery(&update, now);

        assert_eq!(eq.id, EquipmentId(7));
        assert_eq!(eq.equipment_type, EquipmentType::Printer);
        assert_eq!(eq.status, EquipmentStatus::Online);
        assert_eq!(eq.asset_tag.as_deref(), Some("DGH-0042"));
        assert_eq!(eq.location.as_deref(), Some("Rack 3"));
        assert!(eq.is_managed);
        assert_eq!(eq.warranty_expiry, Some(now));
    }

    #[test]
    fn mac_address_formats() {
        assert!(is_mac_address("00:1b:63:aa:bb:cc"));
        assert!(is_mac_address("00-1B-63-AA-BB-CC"));
        assert!(!is_mac_address("00:1b:63:aa:bb"));
        assert!(!is_mac_address("00:1b-63:aa:bb:cc"));
        assert!(!is_mac_address("zz:1b:63:aa:bb:cc"));
    }

    #[test]
    fn ip_validation() {
        assert!(validate_ip_address("192.168.1.10").is_ok());
        assert!(validate_ip_address("fe80::1").is_ok());
        assert!(matches!(
            validate_ip_address("192.168.1.300"),
            Err(HelpdeskError::Validation { field: "ip_address", .. })
        ));
    }
}
