//! Reachability probing: which candidate addresses answer right now.
//!
//! Two interchangeable strategies implement [`ReachabilityStrategy`]: the
//! nmap-backed sweep in [`crate::scanner`] and the per-host [`PingSweep`]
//! here. [`select_strategy`] picks one at startup.

use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use futures::stream::{self, StreamExt};

use crate::config::DiscoveryConfig;
use crate::error::{DiscoverError, Result};
use crate::range::Subnet;
use crate::scanner::NmapSweep;

/// Outcome of probing one address.
///
/// `hostname` and `mac_address` are filled only when the strategy learned
/// them as a side effect of probing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostProbeResult {
    pub address: Ipv4Addr,
    pub reachable: bool,
    pub hostname: Option<String>,
    pub mac_address: Option<String>,
}

impl HostProbeResult {
    pub fn new(address: Ipv4Addr, reachable: bool) -> Self {
        Self {
            address,
            reachable,
            hostname: None,
            mac_address: None,
        }
    }
}

/// A way of sweeping a whole subnet for live hosts. No ordering guarantee.
#[async_trait]
pub trait ReachabilityStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    async fn sweep(&self, subnet: &Subnet) -> Result<Vec<HostProbeResult>>;
}

/// Liveness check for a single address.
#[async_trait]
pub trait HostProbe: Send + Sync {
    async fn is_alive(&self, addr: Ipv4Addr) -> Result<bool>;
}

/// ICMP echo via `surge-ping`. Needs raw or unprivileged ICMP socket access.
pub struct IcmpProbe;

#[async_trait]
impl HostProbe for IcmpProbe {
    async fn is_alive(&self, addr: Ipv4Addr) -> Result<bool> {
        let payload = [0u8; 56];
        match surge_ping::ping(IpAddr::V4(addr), &payload).await {
            Ok(_) => Ok(true),
            Err(surge_ping::SurgeError::Timeout { .. }) => Ok(false),
            Err(e) => Err(DiscoverError::Probe {
                addr: addr.to_string(),
                reason: e.to_string(),
            }),
        }
    }
}

/// Probes every candidate individually with its own timeout.
///
/// A timeout counts as unreachable. A probe error is logged and that address
/// is left out of the results; the remaining candidates are unaffected.
pub struct PingSweep<P = IcmpProbe> {
    probe: Arc<P>,
    timeout: Duration,
    max_concurrent: usize,
}

impl PingSweep<IcmpProbe> {
    pub fn icmp(timeout: Duration, max_concurrent: usize) -> Self {
        Self::new(IcmpProbe, timeout, max_concurrent)
    }
}

impl<P: HostProbe + 'static> PingSweep<P> {
    pub fn new(probe: P, timeout: Duration, max_concurrent: usize) -> Self {
        Self {
            probe: Arc::new(probe),
            timeout,
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// Probe an explicit candidate sequence and keep the addresses that
    /// answered. Errors and timeouts count as down.
    pub async fn probe_all<I>(&self, candidates: I) -> Vec<HostProbeResult>
    where
        I: IntoIterator<Item = Ipv4Addr>,
    {
        stream::iter(candidates)
            .map(|addr| {
                let probe = self.probe.clone();
                let timeout = self.timeout;
                async move {
                    match tokio::time::timeout(timeout, probe.is_alive(addr)).await {
                        Ok(Ok(true)) => Some(HostProbeResult::new(addr, true)),
                        Ok(Ok(false)) => None,
                        Ok(Err(e)) => {
                            tracing::debug!(ip = %addr, error = %e, "Host probe failed");
                            None
                        }
                        Err(_) => {
                            tracing::debug!(ip = %addr, "Host probe timed out");
                            None
                        }
                    }
                }
            })
            .buffer_unordered(self.max_concurrent)
            .filter_map(|r| async move { r })
            .collect()
            .await
    }
}

#[async_trait]
impl<P: HostProbe + 'static> ReachabilityStrategy for PingSweep<P> {
    fn name(&self) -> &'static str {
        "ping"
    }

    async fn sweep(&self, subnet: &Subnet) -> Result<Vec<HostProbeResult>> {
        let start = Instant::now();
        tracing::info!(
            cidr = %subnet,
            candidates = subnet.host_count(),
            "Starting per-host ping sweep"
        );

        let results = self.probe_all(subnet.hosts()).await;

        tracing::info!(
            cidr = %subnet,
            hosts_up = results.len(),
            duration_ms = start.elapsed().as_millis(),
            "Ping sweep complete"
        );
        Ok(results)
    }
}

/// Choose the sweep strategy once at startup: nmap when the binary answers
/// `--version`, otherwise per-host ICMP.
pub async fn select_strategy(config: &DiscoveryConfig) -> Arc<dyn ReachabilityStrategy> {
    let nmap = NmapSweep::new(&config.nmap_path);
    match nmap.verify_installation().await {
        Ok(version) => {
            tracing::info!(
                nmap_version = %version.lines().next().unwrap_or_default().trim(),
                "Using nmap for reachability sweeps"
            );
            Arc::new(nmap)
        }
        Err(e) => {
            tracing::info!(error = %e, "Nmap unavailable, falling back to ICMP ping sweep");
            Arc::new(PingSweep::icmp(
                config.probe_timeout(),
                config.max_concurrent_probes,
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    /// Alive iff the last octet is even; `.3` always errors; `.5` hangs.
    struct ScriptedProbe;

    #[async_trait]
    impl HostProbe for ScriptedProbe {
        async fn is_alive(&self, addr: Ipv4Addr) -> Result<bool> {
            match addr.octets()[3] {
                3 => Err(DiscoverError::Probe {
                    addr: addr.to_string(),
                    reason: "socket error".to_string(),
                }),
                5 => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok(true)
                }
                n => Ok(n % 2 == 0),
            }
        }
    }

    fn addrs(last: &[u8]) -> Vec<Ipv4Addr> {
        last.iter().map(|&n| Ipv4Addr::new(10, 1, 1, n)).collect()
    }

    fn last_octets(results: &[HostProbeResult]) -> HashSet<u8> {
        results.iter().map(|r| r.address.octets()[3]).collect()
    }

    #[tokio::test]
    async fn test_failing_host_does_not_abort_sweep() {
        let sweep = PingSweep::new(ScriptedProbe, Duration::from_millis(200), 4);
        let results = sweep.probe_all(addrs(&[1, 2, 3, 4, 6])).await;

        assert_eq!(last_octets(&results), HashSet::from([2, 4, 6]));
        assert!(results.iter().all(|r| r.reachable));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timed_out_host_is_left_out() {
        let sweep = PingSweep::new(ScriptedProbe, Duration::from_secs(1), 2);
        let results = sweep.probe_all(addrs(&[5, 2])).await;

        assert_eq!(last_octets(&results), HashSet::from([2]));
    }

    #[tokio::test]
    async fn test_sweep_returns_only_live_hosts() {
        let sweep = PingSweep::new(ScriptedProbe, Duration::from_millis(200), 8);
        let subnet = Subnet::parse("10.1.1.8/29").unwrap();
        let results = sweep.sweep(&subnet).await.unwrap();

        // Candidates 10.1.1.9 to 10.1.1.14; the even ones answer.
        assert_eq!(last_octets(&results), HashSet::from([10, 12, 14]));
        assert!(results.iter().all(|r| r.reachable));
        assert_eq!(sweep.name(), "ping");
    }

    #[tokio::test]
    async fn test_select_falls_back_without_nmap() {
        let config = DiscoveryConfig {
            nmap_path: "/nonexistent/bin/nmap".to_string(),
            ..Default::default()
        };
        let strategy = select_strategy(&config).await;
        assert_eq!(strategy.name(), "ping");
    }
}
