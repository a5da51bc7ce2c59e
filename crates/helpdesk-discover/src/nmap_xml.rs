//! Nmap ping-sweep report deserialization.
//!
//! `nmap -sn -oX -` writes one `<host>` element per probed address with its
//! status, addresses (IPv4 and, on the local segment, MAC) and PTR names.
//! Only those parts of the report are modelled here.

use serde::Deserialize;

use crate::error::{DiscoverError, Result};

/// Root element: `<nmaprun>`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename = "nmaprun")]
pub struct SweepReport {
    #[serde(rename = "@args")]
    pub args: Option<String>,
    #[serde(rename = "host", default)]
    pub hosts: Vec<SweepHost>,
    pub runstats: Option<RunStats>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SweepHost {
    pub status: Option<HostStatus>,
    #[serde(rename = "address", default)]
    pub addresses: Vec<Address>,
    pub hostnames: Option<Hostnames>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HostStatus {
    #[serde(rename = "@state")]
    pub state: String,
    #[serde(rename = "@reason")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Address {
    #[serde(rename = "@addr")]
    pub addr: String,
    #[serde(rename = "@addrtype")]
    pub addr_type: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Hostnames {
    #[serde(rename = "hostname", default)]
    pub names: Vec<Hostname>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Hostname {
    #[serde(rename = "@name")]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RunStats {
    pub hosts: Option<RunStatsHosts>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RunStatsHosts {
    #[serde(rename = "@up")]
    pub up: Option<u32>,
    #[serde(rename = "@total")]
    pub total: Option<u32>,
}

impl SweepHost {
    fn address_of(&self, kind: &str) -> Option<&str> {
        self.addresses
            .iter()
            .find(|a| a.addr_type == kind)
            .map(|a| a.addr.as_str())
    }

    pub fn ipv4(&self) -> Option<&str> {
        self.address_of("ipv4")
    }

    pub fn mac(&self) -> Option<&str> {
        self.address_of("mac")
    }

    /// First reported name (normally the PTR record).
    pub fn hostname(&self) -> Option<&str> {
        self.hostnames
            .as_ref()
            .and_then(|h| h.names.first())
            .map(|h| h.name.as_str())
    }

    pub fn is_up(&self) -> bool {
        self.status.as_ref().is_some_and(|s| s.state == "up")
    }
}

/// Parse the XML written by `nmap -oX -`.
pub fn parse_sweep_report(xml: &[u8]) -> Result<SweepReport> {
    quick_xml::de::from_reader(xml).map_err(|e| DiscoverError::XmlParse(format!("{e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SWEEP_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE nmaprun>
<nmaprun scanner="nmap" args="nmap -sn -oX - 192.168.10.0/29" startstr="Tue Mar  3 09:00:00 2026">
  <host>
    <status state="up" reason="arp-response" reason_ttl="0"/>
    <address addr="192.168.10.1" addrtype="ipv4"/>
    <address addr="00:1B:63:AA:BB:CC" addrtype="mac" vendor="Cisco Systems"/>
    <hostnames>
      <hostname name="core-router.dgh.local" type="PTR"/>
    </hostnames>
  </host>
  <host>
    <status state="up" reason="echo-reply" reason_ttl="128"/>
    <address addr="192.168.10.4" addrtype="ipv4"/>
    <hostnames/>
  </host>
  <host>
    <status state="down" reason="no-response"/>
    <address addr="192.168.10.5" addrtype="ipv4"/>
  </host>
  <runstats>
    <finished time="1772528401" elapsed="1.82" exit="success"/>
    <hosts up="2" down="4" total="6"/>
  </runstats>
</nmaprun>"#;

    #[test]
    fn test_parse_sweep() {
        let report = parse_sweep_report(SWEEP_XML.as_bytes()).unwrap();
        assert_eq!(report.hosts.len(), 3);
        assert!(report.args.as_deref().unwrap().contains("-sn"));

        let router = &report.hosts[0];
        assert!(router.is_up());
        assert_eq!(router.ipv4(), Some("192.168.10.1"));
        assert_eq!(router.mac(), Some("00:1B:63:AA:BB:CC"));
        assert_eq!(router.hostname(), Some("core-router.dgh.local"));

        let bare = &report.hosts[1];
        assert!(bare.is_up());
        assert_eq!(bare.mac(), None);
        assert_eq!(bare.hostname(), None);

        assert!(!report.hosts[2].is_up());

        let stats = report.runstats.unwrap().hosts.unwrap();
        assert_eq!(stats.up, Some(2));
        assert_eq!(stats.total, Some(6));
    }

    #[test]
    fn test_parse_sweep_with_no_hosts() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<nmaprun scanner="nmap" args="nmap -sn 10.99.0.0/24">
  <runstats>
    <hosts up="0" down="254" total="254"/>
  </runstats>
</nmaprun>"#;

        let report = parse_sweep_report(xml.as_bytes()).unwrap();
        assert!(report.hosts.is_empty());
    }

    #[test]
    fn test_truncated_report_is_an_error() {
        let err = parse_sweep_report(b"<nmaprun><host><status state=").unwrap_err();
        assert!(matches!(err, DiscoverError::XmlParse(_)));
    }
}
