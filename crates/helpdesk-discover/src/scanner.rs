//! Nmap-backed ping sweep.
//!
//! Runs `nmap -sn` as a child process via `tokio::process::Command` and turns
//! its XML report into reachability results for one subnet.

use std::net::Ipv4Addr;
use std::time::Instant;

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::{DiscoverError, Result};
use crate::nmap_xml::{self, SweepReport};
use crate::probe::{HostProbeResult, ReachabilityStrategy};
use crate::range::Subnet;

/// Wrapper around the nmap binary.
pub struct NmapSweep {
    nmap_path: String,
}

impl NmapSweep {
    pub fn new(nmap_path: &str) -> Self {
        Self {
            nmap_path: nmap_path.to_string(),
        }
    }

    /// Verify nmap is installed and accessible. Returns the version banner.
    pub async fn verify_installation(&self) -> Result<String> {
        let output = Command::new(&self.nmap_path)
            .arg("--version")
            .output()
            .await
            .map_err(|_| DiscoverError::NmapNotFound {
                path: self.nmap_path.clone(),
            })?;

        if !output.status.success() {
            return Err(DiscoverError::NmapNotFound {
                path: self.nmap_path.clone(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    /// Run a host-discovery-only scan (`-sn`) and return the parsed report.
    pub async fn run(&self, target: &str) -> Result<SweepReport> {
        let output = Command::new(&self.nmap_path)
            .arg("-sn")
            .arg("-oX")
            .arg("-")
            .arg("--noninteractive")
            .arg(target)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| DiscoverError::NmapNotFound {
                path: format!("{}: {e}", self.nmap_path),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            return Err(DiscoverError::NmapFailed {
                code: output.status.code().unwrap_or(-1),
                stderr,
            });
        }

        nmap_xml::parse_sweep_report(&output.stdout)
    }
}

#[async_trait]
impl ReachabilityStrategy for NmapSweep {
    fn name(&self) -> &'static str {
        "nmap"
    }

    async fn sweep(&self, subnet: &Subnet) -> Result<Vec<HostProbeResult>> {
        let start = Instant::now();
        tracing::info!(cidr = %subnet, "Starting nmap ping sweep");

        let report = self.run(subnet.cidr()).await?;
        let results = reachable_hosts(&report, subnet);

        tracing::info!(
            cidr = %subnet,
            hosts_up = results.len(),
            duration_ms = start.elapsed().as_millis(),
            "Nmap ping sweep complete"
        );
        Ok(results)
    }
}

/// Hosts reported up whose IPv4 address lies inside `subnet`.
pub fn reachable_hosts(report: &SweepReport, subnet: &Subnet) -> Vec<HostProbeResult> {
    report
        .hosts
        .iter()
        .filter(|h| h.is_up())
        .filter_map(|h| {
            let address: Ipv4Addr = h.ipv4()?.parse().ok()?;
            if !subnet.contains(&address) {
                return None;
            }
            Some(HostProbeResult {
                address,
                reachable: true,
                hostname: h.hostname().map(String::from),
                mac_address: h.mac().map(str::to_lowercase),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reachable_hosts_filters_down_and_foreign() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<nmaprun scanner="nmap" args="nmap -sn 10.0.0.0/30">
  <host>
    <status state="down" reason="no-response"/>
    <address addr="10.0.0.1" addrtype="ipv4"/>
  </host>
  <host>
    <status state="up" reason="arp-response"/>
    <address addr="10.0.0.2" addrtype="ipv4"/>
    <address addr="00:1B:63:AA:BB:CC" addrtype="mac"/>
  </host>
  <host>
    <status state="up" reason="echo-reply"/>
    <address addr="10.9.9.9" addrtype="ipv4"/>
  </host>
</nmaprun>"#;

        let report = nmap_xml::parse_sweep_report(xml.as_bytes()).unwrap();
        let subnet = Subnet::parse("10.0.0.0/30").unwrap();
        let hosts = reachable_hosts(&report, &subnet);

        assert_eq!(hosts.len(), 1);
        assert_eq!(hosts[0].address, Ipv4Addr::new(10, 0, 0, 2));
        assert!(hosts[0].reachable);
        assert_eq!(hosts[0].mac_address.as_deref(), Some("00:1b:63:aa:bb:cc"));
        assert_eq!(hosts[0].hostname, None);
    }

    #[tokio::test]
    async fn test_missing_binary_is_reported() {
        let sweep = NmapSweep::new("/nonexistent/bin/nmap");
        let err = sweep.verify_installation().await.unwrap_err();
        assert!(matches!(err, DiscoverError::NmapNotFound { .. }));
    }
}
