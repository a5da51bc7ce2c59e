//! Hostname and MAC lookup for a reachable address.

use std::future::Future;
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use async_trait::async_trait;
use helpdesk_core::is_mac_address;
use tokio::process::Command;

const ARP_TABLE: &str = "/proc/net/arp";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostIdentity {
    pub hostname: Option<String>,
    pub mac_address: Option<String>,
}

#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn resolve(&self, addr: Ipv4Addr) -> HostIdentity;
}

/// Reverse DNS plus the kernel ARP cache (or `arp -a` where there is no
/// `/proc`). Lookups that fail or outlive the timeout leave the field empty.
pub struct SystemResolver {
    timeout: Duration,
}

impl SystemResolver {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl IdentityResolver for SystemResolver {
    async fn resolve(&self, addr: Ipv4Addr) -> HostIdentity {
        HostIdentity {
            hostname: bounded(self.timeout, "reverse DNS", addr, reverse_lookup(addr)).await,
            mac_address: bounded(self.timeout, "ARP", addr, arp_lookup(addr)).await,
        }
    }
}

/// Run one lookup under a deadline; expiry counts as "not found".
async fn bounded<F>(limit: Duration, lookup: &'static str, addr: Ipv4Addr, fut: F) -> Option<String>
where
    F: Future<Output = Option<String>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(found) => found,
        Err(_) => {
            tracing::debug!(ip = %addr, lookup, timeout_ms = limit.as_millis() as u64, "Lookup timed out");
            None
        }
    }
}

async fn reverse_lookup(addr: Ipv4Addr) -> Option<String> {
    let ip = IpAddr::V4(addr);
    let name = tokio::task::spawn_blocking(move || dns_lookup::lookup_addr(&ip))
        .await
        .ok()?
        .ok()?;
    // The resolver echoes the literal back when there is no PTR record.
    if name == addr.to_string() {
        None
    } else {
        Some(name)
    }
}

async fn arp_lookup(addr: Ipv4Addr) -> Option<String> {
    if let Ok(table) = tokio::fs::read_to_string(ARP_TABLE).await {
        return mac_from_proc_arp(&table, addr);
    }

    let output = Command::new("arp")
        .arg("-a")
        .arg(addr.to_string())
        .kill_on_drop(true)
        .output()
        .await
        .ok()?;
    if !output.status.success() {
        tracing::debug!(ip = %addr, "arp lookup returned non-zero status");
        return None;
    }
    mac_from_arp_output(&String::from_utf8_lossy(&output.stdout), addr)
}

/// Parse the Linux `/proc/net/arp` table:
/// `IP address  HW type  Flags  HW address  Mask  Device`.
pub fn mac_from_proc_arp(table: &str, addr: Ipv4Addr) -> Option<String> {
    let wanted = addr.to_string();
    table.lines().skip(1).find_map(|line| {
        let cols: Vec<&str> = line.split_whitespace().collect();
        match cols.as_slice() {
            [ip, _, flags, mac, ..] if *ip == wanted && *flags != "0x0" => {
                usable_mac(mac)
            }
            _ => None,
        }
    })
}

/// Parse `arp -a <ip>` output from BSD, macOS or Windows.
pub fn mac_from_arp_output(output: &str, addr: Ipv4Addr) -> Option<String> {
    let wanted = addr.to_string();
    let bracketed = format!("({wanted})");
    output
        .lines()
        .filter(|line| {
            line.split_whitespace()
                .any(|tok| tok == wanted || tok == bracketed)
        })
        .flat_map(|line| line.split_whitespace())
        .find_map(usable_mac)
}

fn usable_mac(token: &str) -> Option<String> {
    if is_mac_address(token) && token != "00:00:00:00:00:00" {
        Some(token.replace('-', ":").to_lowercase())
    } else {
        None
    }
}
