//! Per-host SNMP session and the device signature fetch.

use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;

use async_snmp::{Auth, Client, Retry, UdpClient};
use async_trait::async_trait;
use helpdesk_core::DeviceSignature;

use super::value::{Oid, SnmpValue};
use super::{Result, SnmpError};
use crate::config::SnmpConfig;

pub const SYS_DESCR: &[u32] = &[1, 3, 6, 1, 2, 1, 1, 1, 0];
pub const SYS_UPTIME: &[u32] = &[1, 3, 6, 1, 2, 1, 1, 3, 0];
pub const SYS_CONTACT: &[u32] = &[1, 3, 6, 1, 2, 1, 1, 4, 0];
pub const SYS_NAME: &[u32] = &[1, 3, 6, 1, 2, 1, 1, 5, 0];
pub const SYS_LOCATION: &[u32] = &[1, 3, 6, 1, 2, 1, 1, 6, 0];
pub const IF_NUMBER: &[u32] = &[1, 3, 6, 1, 2, 1, 2, 1, 0];
pub const HR_SYSTEM_PROCESSES: &[u32] = &[1, 3, 6, 1, 2, 1, 25, 1, 6, 0];

/// An open conversation with one agent.
#[async_trait]
pub trait SnmpSession: Send {
    async fn get(&mut self, oid: &Oid) -> Result<SnmpValue>;
}

#[async_trait]
pub trait SessionOpener: Send + Sync {
    async fn open(&self, addr: Ipv4Addr) -> Result<Box<dyn SnmpSession>>;
}

/// Opens v2c sessions over UDP.
#[derive(Debug, Clone)]
pub struct UdpSessionOpener {
    community: String,
    timeout: Duration,
    retries: u32,
    port: u16,
}

impl UdpSessionOpener {
    pub fn new(config: &SnmpConfig) -> Self {
        Self {
            community: config.community.clone(),
            timeout: config.timeout(),
            retries: config.retries,
            port: config.port,
        }
    }
}

#[async_trait]
impl SessionOpener for UdpSessionOpener {
    async fn open(&self, addr: Ipv4Addr) -> Result<Box<dyn SnmpSession>> {
        let client = Client::builder(format!("{addr}:{}", self.port), Auth::v2c(self.community.as_str()))
            .timeout(self.timeout)
            .retry(Retry::fixed(self.retries, Duration::ZERO))
            .connect()
            .await
            .map_err(|e| *e)?;
        Ok(Box::new(UdpSession { client, peer: addr }))
    }
}

struct UdpSession {
    client: UdpClient,
    peer: Ipv4Addr,
}

#[async_trait]
impl SnmpSession for UdpSession {
    async fn get(&mut self, oid: &Oid) -> Result<SnmpValue> {
        let varbind = match self.client.get(&oid.to_wire()).await.map_err(|e| *e) {
            Ok(vb) => vb,
            Err(async_snmp::Error::Timeout { retries, .. }) => {
                return Err(SnmpError::Timeout {
                    addr: self.peer.to_string(),
                    attempts: retries + 1,
                });
            }
            Err(e) => return Err(e.into()),
        };

        let value = SnmpValue::from_wire(&varbind.value);
        if value.is_exception() {
            return Err(SnmpError::Exception {
                oid: oid.clone(),
                value,
            });
        }
        Ok(value)
    }
}

/// Reads the fixed system OID table from a device.
#[derive(Clone)]
pub struct SnmpClient {
    opener: Arc<dyn SessionOpener>,
}

impl SnmpClient {
    pub fn new(opener: Arc<dyn SessionOpener>) -> Self {
        Self { opener }
    }

    pub fn udp(config: &SnmpConfig) -> Self {
        Self::new(Arc::new(UdpSessionOpener::new(config)))
    }

    /// Fetch the device signature.
    ///
    /// sysDescr is queried first; if it fails the device is treated as not
    /// speaking SNMP and `None` is returned. Every other OID is independent:
    /// a failure there leaves only that field empty.
    pub async fn fetch_signature(&self, addr: Ipv4Addr) -> Option<DeviceSignature> {
        let mut session = match self.opener.open(addr).await {
            Ok(s) => s,
            Err(e) => {
                tracing::debug!(ip = %addr, error = %e, "SNMP session could not be opened");
                return None;
            }
        };

        let system_description = match get_text(session.as_mut(), addr, SYS_DESCR).await {
            Some(descr) => descr,
            None => {
                tracing::debug!(ip = %addr, "SNMP not available");
                return None;
            }
        };

        Some(DeviceSignature {
            system_description: Some(system_description),
            system_name: get_text(session.as_mut(), addr, SYS_NAME).await,
            system_location: get_text(session.as_mut(), addr, SYS_LOCATION).await,
            system_contact: get_text(session.as_mut(), addr, SYS_CONTACT).await,
            system_uptime: get_text(session.as_mut(), addr, SYS_UPTIME).await,
            interface_count: get_value(session.as_mut(), addr, IF_NUMBER)
                .await
                .and_then(|v| v.as_u32()),
            process_count: get_value(session.as_mut(), addr, HR_SYSTEM_PROCESSES)
                .await
                .and_then(|v| v.as_u32()),
        })
    }

    /// True if the device answers a sysDescr GET.
    pub async fn test_connectivity(&self, addr: Ipv4Addr) -> bool {
        let mut session = match self.opener.open(addr).await {
            Ok(s) => s,
            Err(e) => {
                tracing::debug!(ip = %addr, error = %e, "SNMP session could not be opened");
                return false;
            }
        };
        get_value(session.as_mut(), addr, SYS_DESCR).await.is_some()
    }
}

async fn get_value(session: &mut dyn SnmpSession, addr: Ipv4Addr, arcs: &[u32]) -> Option<SnmpValue> {
    let oid = Oid::new(arcs);
    match session.get(&oid).await {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::debug!(ip = %addr, oid = %oid, error = %e, "SNMP GET failed");
            None
        }
    }
}

async fn get_text(session: &mut dyn SnmpSession, addr: Ipv4Addr, arcs: &[u32]) -> Option<String> {
    get_value(session, addr, arcs).await.and_then(|v| v.render())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tokio::net::UdpSocket;

    /// Answers from a fixed table; OIDs not in the table fail.
    struct TableOpener {
        table: HashMap<Oid, SnmpValue>,
    }

    struct TableSession {
        table: HashMap<Oid, SnmpValue>,
    }

    #[async_trait]
    impl SessionOpener for TableOpener {
        async fn open(&self, _addr: Ipv4Addr) -> Result<Box<dyn SnmpSession>> {
            Ok(Box::new(TableSession {
                table: self.table.clone(),
            }))
        }
    }

    #[async_trait]
    impl SnmpSession for TableSession {
        async fn get(&mut self, oid: &Oid) -> Result<SnmpValue> {
            self.table.get(oid).cloned().ok_or(SnmpError::Timeout {
                addr: "test".to_string(),
                attempts: 1,
            })
        }
    }

    fn client(entries: &[(&[u32], SnmpValue)]) -> SnmpClient {
        let table = entries
            .iter()
            .map(|(arcs, v)| (Oid::new(arcs), v.clone()))
            .collect();
        SnmpClient::new(Arc::new(TableOpener { table }))
    }

    fn text(s: &str) -> SnmpValue {
        SnmpValue::OctetString(s.as_bytes().to_vec())
    }

    #[tokio::test]
    async fn test_partial_failure_nulls_only_that_field() {
        let c = client(&[
            (SYS_DESCR, text("Linux web01 5.15.0-91-generic Ubuntu")),
            (SYS_NAME, text("web01")),
            (SYS_LOCATION, text("Rack 4")),
            (SYS_CONTACT, text("ops@example.com")),
            // sysUpTime missing
            (IF_NUMBER, SnmpValue::Integer(3)),
            (HR_SYSTEM_PROCESSES, SnmpValue::Gauge32(212)),
        ]);

        let sig = c.fetch_signature(Ipv4Addr::new(10, 0, 0, 5)).await.unwrap();
        assert_eq!(sig.system_description.as_deref(), Some("Linux web01 5.15.0-91-generic Ubuntu"));
        assert_eq!(sig.system_name.as_deref(), Some("web01"));
        assert_eq!(sig.system_location.as_deref(), Some("Rack 4"));
        assert_eq!(sig.system_contact.as_deref(), Some("ops@example.com"));
        assert_eq!(sig.system_uptime, None);
        assert_eq!(sig.interface_count, Some(3));
        assert_eq!(sig.process_count, Some(212));
    }

    #[tokio::test]
    async fn test_missing_sys_descr_means_no_signature() {
        let c = client(&[(SYS_NAME, text("orphan"))]);
        assert!(c.fetch_signature(Ipv4Addr::new(10, 0, 0, 6)).await.is_none());
        assert!(!c.test_connectivity(Ipv4Addr::new(10, 0, 0, 6)).await);
    }

    #[tokio::test]
    async fn test_uptime_rendered_from_timeticks() {
        let c = client(&[
            (SYS_DESCR, text("Cisco IOS Software, C2960 Software")),
            (SYS_UPTIME, SnmpValue::TimeTicks(12_345)),
            (SYS_NAME, SnmpValue::NoSuchObject),
        ]);

        let sig = c.fetch_signature(Ipv4Addr::new(10, 0, 0, 7)).await.unwrap();
        assert_eq!(sig.system_uptime.as_deref(), Some("0:02:03.45"));
        assert_eq!(sig.system_name, None);
        assert_eq!(sig.interface_count, None);
    }

    fn udp_config(port: u16, retries: u32) -> SnmpConfig {
        SnmpConfig {
            community: "public".to_string(),
            timeout: 300,
            retries,
            port,
        }
    }

    #[tokio::test]
    async fn test_udp_session_times_out_without_agent() {
        // Bound but silent.
        let silent = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let port = silent.local_addr().unwrap().port();
        let opener = UdpSessionOpener::new(&udp_config(port, 1));

        let mut session = opener.open(Ipv4Addr::LOCALHOST).await.unwrap();
        let err = session.get(&Oid::new(SYS_DESCR)).await.unwrap_err();
        assert!(matches!(err, SnmpError::Timeout { .. }), "got {err}");
    }
}
