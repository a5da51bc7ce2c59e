//! Integration tests for the in-process inventory client.

use helpdesk_core::{DiscoveryUpdate, EquipmentStatus, EquipmentType, NewEquipment};
use helpdesk_inventory::{EquipmentStore, InventoryClient, InventoryError};

fn switch_update(ip: &str) -> DiscoveryUpdate {
    DiscoveryUpdate {
        ip_address: ip.to_string(),
        mac_address: Some("00:1b:63:aa:bb:cc".to_string()),
        hostname: Some("core-sw-01".to_string()),
        equipment_type: EquipmentType::Switch,
        manufacturer: Some("Cisco".to_string()),
        model: Some("IOS".to_string()),
        os_name: None,
        os_version: None,
        specifications: Some("{}".to_string()),
    }
}

fn manual(ip: &str, mac: Option<&str>, hostname: Option<&str>) -> NewEquipment {
    NewEquipment {
        ip_address: ip.to_string(),
        mac_address: mac.map(String::from),
        hostname: hostname.map(String::from),
        equipment_type: EquipmentType::Desktop,
        asset_tag: Some("DGH-0001".to_string()),
        is_managed: true,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_discovery_upsert_is_idempotent() {
    let client = InventoryClient::new();

    let first = client
        .create_or_update_from_discovery(switch_update("10.0.0.2"))
        .await;
    let second = client
        .create_or_update_from_discovery(switch_update("10.0.0.2"))
        .await;

    assert_eq!(client.count().await, 1);
    assert_eq!(first.id, second.id);
    assert!(second.last_seen > first.last_seen);
    assert_eq!(second.status, EquipmentStatus::Online);
    assert_eq!(second.equipment_type, EquipmentType::Switch);
    assert_eq!(first.created_at, second.created_at);
}

#[tokio::test]
async fn test_discovery_preserves_asset_fields() {
    let client = InventoryClient::new();
    let created = client
        .create(manual("10.0.0.9", None, Some("pc-finance-1")))
        .await
        .unwrap();
    assert_eq!(created.status, EquipmentStatus::Unknown);

    let mut update = DiscoveryUpdate::new("10.0.0.9", EquipmentType::Desktop);
    update.os_name = Some("Windows".to_string());
    update.os_version = Some("11".to_string());
    let refreshed = client.create_or_update_from_discovery(update).await;

    assert_eq!(refreshed.id, created.id);
    assert_eq!(refreshed.asset_tag.as_deref(), Some("DGH-0001"));
    assert!(refreshed.is_managed);
    assert_eq!(refreshed.status, EquipmentStatus::Online);
    assert_eq!(refreshed.os_name.as_deref(), Some("Windows"));
    // Discovery owns the hostname field and overwrites it.
    assert_eq!(refreshed.hostname, None);
}

#[tokio::test]
async fn test_manual_create_rejects_duplicates() {
    let client = InventoryClient::new();
    client
        .create(manual("10.0.0.10", Some("AA:BB:CC:DD:EE:01"), Some("printer-2f")))
        .await
        .unwrap();

    let dup_ip = client.create(manual("10.0.0.10", None, None)).await;
    assert!(matches!(
        dup_ip,
        Err(InventoryError::Duplicate { field: "IP address", .. })
    ));

    let dup_mac = client
        .create(manual("10.0.0.11", Some("aa-bb-cc-dd-ee-01"), None))
        .await;
    assert!(matches!(
        dup_mac,
        Err(InventoryError::Duplicate { field: "MAC address", .. })
    ));

    let dup_host = client
        .create(manual("10.0.0.12", None, Some("PRINTER-2F")))
        .await;
    assert!(matches!(
        dup_host,
        Err(InventoryError::Duplicate { field: "hostname", .. })
    ));

    let bad_ip = client.create(manual("10.0.0.300", None, None)).await;
    assert!(matches!(bad_ip, Err(InventoryError::Invalid(_))));
}

#[tokio::test]
async fn test_discovery_takes_over_mac_and_hostname() {
    let client = InventoryClient::new();
    client
        .create(manual("10.0.0.20", Some("00:1b:63:aa:bb:cc"), Some("core-sw-01")))
        .await
        .unwrap();

    // Same MAC and hostname on a different IP: the manual path refuses,
    // the discovery path accepts.
    let eq = client
        .create_or_update_from_discovery(switch_update("10.0.0.21"))
        .await;

    assert_eq!(eq.ip_address, "10.0.0.21");
    assert_eq!(client.count().await, 2);
    assert_eq!(client.count_by_status(EquipmentStatus::Online).await, 1);
}

#[tokio::test]
async fn test_manual_update_moves_ip_index() {
    let client = InventoryClient::new();
    let mut eq = client
        .create(manual("10.0.1.1", None, None))
        .await
        .unwrap();

    eq.ip_address = "10.0.1.2".to_string();
    client.update(eq.clone()).await.unwrap();

    assert!(!client.exists_by_ip_address("10.0.1.1").await);
    assert_eq!(
        client.find_by_ip_address("10.0.1.2").await.map(|e| e.id),
        Some(eq.id)
    );
}

#[tokio::test]
async fn test_store_trait_lookups() {
    let client = InventoryClient::new();
    client
        .create_or_update_from_discovery(switch_update("10.0.0.2"))
        .await;

    let store: &dyn EquipmentStore = &client;
    assert!(store.exists_by_ip_address("10.0.0.2").await);
    assert!(store.exists_by_mac_address("00-1B-63-AA-BB-CC").await);
    assert!(store.exists_by_hostname("CORE-SW-01").await);
    assert!(store.find_by_hostname("unknown-host").await.is_none());
}

#[tokio::test]
async fn test_snapshot_roundtrip_continues_ids() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("inventory.json");

    let client = InventoryClient::new();
    let a = client
        .create_or_update_from_discovery(switch_update("10.0.0.2"))
        .await;
    client.save_snapshot(&path).await.unwrap();

    let restored = InventoryClient::load_snapshot(&path).unwrap();
    assert_eq!(restored.count().await, 1);
    assert_eq!(restored.get(a.id).await.unwrap().ip_address, "10.0.0.2");

    let b = restored
        .create_or_update_from_discovery(switch_update("10.0.0.3"))
        .await;
    assert!(b.id > a.id);
}

#[tokio::test]
async fn test_missing_snapshot_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let restored = InventoryClient::load_snapshot(dir.path().join("absent.json")).unwrap();
    assert_eq!(restored.count().await, 0);
}
