//! Discovery orchestration: subnet sweep, per-host enrichment, reconciliation.

use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use futures::stream::{self, StreamExt};
use helpdesk_core::Equipment;
use helpdesk_inventory::EquipmentStore;
use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::classify::classify;
use crate::config::{DiscoveryConfig, Settings};
use crate::error::{DiscoverError, Result};
use crate::identity::{IdentityResolver, SystemResolver};
use crate::probe::{select_strategy, HostProbeResult, ReachabilityStrategy};
use crate::range::Subnet;
use crate::reconcile::{DiscoveredDevice, Reconciled, Reconciler};
use crate::snmp::SnmpClient;

/// Configuration snapshot reported by [`DiscoveryService::status`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscoveryStatus {
    pub enabled: bool,
    pub subnet_ranges: Vec<String>,
}

impl From<&DiscoveryConfig> for DiscoveryStatus {
    fn from(config: &DiscoveryConfig) -> Self {
        Self {
            enabled: config.enabled,
            subnet_ranges: config.subnets(),
        }
    }
}

/// Summary of one `scan_all` run.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub scan_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub equipment: Vec<Equipment>,
    pub subnets_scanned: usize,
    pub subnets_failed: usize,
    pub hosts_reachable: usize,
    pub created: usize,
    pub updated: usize,
    pub duration_ms: u64,
}

#[derive(Default)]
struct SubnetOutcome {
    reachable: usize,
    reconciled: Vec<Reconciled>,
}

/// The discovery engine.
///
/// Cheap to clone; every clone shares the same strategy, SNMP client and
/// store.
#[derive(Clone)]
pub struct DiscoveryService {
    inner: Arc<Inner>,
}

struct Inner {
    config: DiscoveryConfig,
    strategy: Arc<dyn ReachabilityStrategy>,
    identity: Arc<dyn IdentityResolver>,
    snmp: SnmpClient,
    reconciler: Reconciler,
}

impl DiscoveryService {
    pub fn new(
        config: DiscoveryConfig,
        strategy: Arc<dyn ReachabilityStrategy>,
        identity: Arc<dyn IdentityResolver>,
        snmp: SnmpClient,
        store: Arc<dyn EquipmentStore>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                strategy,
                identity,
                snmp,
                reconciler: Reconciler::new(store),
            }),
        }
    }

    /// Wire up the production collaborators: the startup-selected sweep
    /// strategy, system DNS/ARP lookups and UDP SNMP sessions.
    pub async fn from_settings(settings: &Settings, store: Arc<dyn EquipmentStore>) -> Self {
        let strategy = select_strategy(&settings.discovery).await;
        Self::new(
            settings.discovery.clone(),
            strategy,
            Arc::new(SystemResolver::new(settings.discovery.lookup_timeout())),
            SnmpClient::udp(&settings.snmp),
            store,
        )
    }

    pub fn config(&self) -> &DiscoveryConfig {
        &self.inner.config
    }

    pub fn status(&self) -> DiscoveryStatus {
        DiscoveryStatus::from(&self.inner.config)
    }

    /// Sweep every configured subnet on a background task.
    pub fn scan_all(&self) -> JoinHandle<ScanReport> {
        let svc = self.clone();
        tokio::spawn(async move { svc.run_scan().await })
    }

    /// Discover a single address on a background task, skipping the sweep.
    ///
    /// Resolves to `None`, without touching the store, when the host does not
    /// answer SNMP.
    pub fn scan_one(&self, ip: &str) -> JoinHandle<Result<Option<Equipment>>> {
        let svc = self.clone();
        let ip = ip.to_string();
        tokio::spawn(async move {
            let addr = parse_host(&ip)?;
            svc.discover_single(addr).await
        })
    }

    /// True if the address answers an SNMP sysDescr GET.
    pub async fn test_connectivity(&self, ip: &str) -> bool {
        match parse_host(ip) {
            Ok(addr) => self.inner.snmp.test_connectivity(addr).await,
            Err(e) => {
                tracing::warn!(ip = %ip, error = %e, "Connectivity test skipped");
                false
            }
        }
    }

    /// Run one full discovery pass in the current task.
    pub async fn run_scan(&self) -> ScanReport {
        let scan_id = Uuid::new_v4();
        let started_at = Utc::now();
        let start = Instant::now();
        let subnets = self.inner.config.subnets();

        tracing::info!(
            scan_id = %scan_id,
            subnets = subnets.len(),
            strategy = self.inner.strategy.name(),
            "Starting network discovery"
        );

        let limiter = Arc::new(Semaphore::new(self.inner.config.max_concurrent_subnets.max(1)));
        let outcomes = join_all(subnets.iter().cloned().map(|cidr| {
            let svc = self.clone();
            let limiter = limiter.clone();
            async move {
                let _permit = limiter
                    .acquire_owned()
                    .await
                    .map_err(|e| DiscoverError::Aborted(e.to_string()))?;
                svc.scan_subnet(&cidr).await
            }
        }))
        .await;

        let mut report = ScanReport {
            scan_id,
            started_at,
            equipment: Vec::new(),
            subnets_scanned: 0,
            subnets_failed: 0,
            hosts_reachable: 0,
            created: 0,
            updated: 0,
            duration_ms: 0,
        };

        for (cidr, outcome) in subnets.iter().zip(outcomes) {
            match outcome {
                Ok(outcome) => {
                    report.subnets_scanned += 1;
                    report.hosts_reachable += outcome.reachable;
                    for r in outcome.reconciled {
                        if r.created {
                            report.created += 1;
                        } else {
                            report.updated += 1;
                        }
                        report.equipment.push(r.equipment);
                    }
                }
                Err(e) => {
                    report.subnets_failed += 1;
                    tracing::warn!(scan_id = %scan_id, cidr = %cidr, error = %e, "Subnet scan failed");
                }
            }
        }

        report.duration_ms = start.elapsed().as_millis() as u64;

        if report.subnets_scanned == 0 {
            tracing::warn!(scan_id = %scan_id, failed = report.subnets_failed, "No subnets scanned");
        }
        tracing::info!(
            scan_id = %scan_id,
            subnets_scanned = report.subnets_scanned,
            subnets_failed = report.subnets_failed,
            hosts_reachable = report.hosts_reachable,
            created = report.created,
            updated = report.updated,
            duration_ms = report.duration_ms,
            "Network discovery complete"
        );

        report
    }

    async fn scan_subnet(&self, cidr: &str) -> Result<SubnetOutcome> {
        let subnet = Subnet::parse(cidr)?;
        let probes = self.inner.strategy.sweep(&subnet).await?;
        let reachable: Vec<HostProbeResult> = probes.into_iter().filter(|p| p.reachable).collect();

        tracing::info!(cidr = %subnet, reachable = reachable.len(), "Sweep finished, enriching hosts");

        let mut outcome = SubnetOutcome {
            reachable: reachable.len(),
            ..Default::default()
        };

        let results: Vec<Result<Reconciled>> = stream::iter(reachable)
            .map(|probe| {
                let svc = self.clone();
                async move { svc.discover_probed(probe).await }
            })
            .buffer_unordered(self.inner.config.max_concurrent_hosts.max(1))
            .collect()
            .await;

        for result in results {
            match result {
                Ok(r) => outcome.reconciled.push(r),
                Err(e) => tracing::warn!(cidr = %subnet, error = %e, "Host discovery failed"),
            }
        }
        Ok(outcome)
    }

    /// Enrich and reconcile a host the sweep found alive. Hosts without an
    /// SNMP signature are still recorded.
    async fn discover_probed(&self, probe: HostProbeResult) -> Result<Reconciled> {
        let device = self
            .enrich(probe.address, probe.hostname, probe.mac_address)
            .await;
        self.inner.reconciler.reconcile(&device).await
    }

    async fn discover_single(&self, addr: Ipv4Addr) -> Result<Option<Equipment>> {
        tracing::info!(ip = %addr, "Scanning single device");
        let device = self.enrich(addr, None, None).await;
        if device.signature.is_none() {
            tracing::info!(ip = %addr, "No SNMP response, nothing recorded");
            return Ok(None);
        }
        let reconciled = self.inner.reconciler.reconcile(&device).await?;
        Ok(Some(reconciled.equipment))
    }

    async fn enrich(
        &self,
        addr: Ipv4Addr,
        hostname: Option<String>,
        mac_address: Option<String>,
    ) -> DiscoveredDevice {
        let (hostname, mac_address) = if hostname.is_some() && mac_address.is_some() {
            (hostname, mac_address)
        } else {
            let resolved = self.inner.identity.resolve(addr).await;
            (
                hostname.or(resolved.hostname),
                mac_address.or(resolved.mac_address),
            )
        };

        let signature = self.inner.snmp.fetch_signature(addr).await;
        let classification = classify(signature.as_ref(), hostname.as_deref());

        DiscoveredDevice {
            ip_address: addr,
            hostname,
            mac_address,
            signature,
            classification,
        }
    }
}

fn parse_host(ip: &str) -> Result<Ipv4Addr> {
    ip.trim()
        .parse()
        .map_err(|_| DiscoverError::InvalidAddress(ip.to_string()))
}
