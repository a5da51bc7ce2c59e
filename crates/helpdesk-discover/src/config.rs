//! Configuration for the helpdesk network discovery engine.

use std::time::Duration;

use serde::Deserialize;

use crate::error::Result;

/// Top-level settings.
///
/// Loaded from `helpdesk.toml` (`[discovery]` and `[snmp]` sections) and
/// `HELPDESK__` environment variables, e.g. `HELPDESK__SNMP__COMMUNITY`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub discovery: DiscoveryConfig,

    #[serde(default)]
    pub snmp: SnmpConfig,
}

impl Settings {
    /// Load settings from `<file_prefix>.{toml,yaml,json}` (optional) overlaid
    /// with environment variables.
    pub fn load(file_prefix: &str) -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::File::with_name(file_prefix).required(false))
            .add_source(
                config::Environment::with_prefix("HELPDESK")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(cfg.try_deserialize()?)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DiscoveryConfig {
    /// Whether the scheduler fires periodic sweeps.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Comma-separated CIDR list, e.g. "10.0.1.0/24, 10.0.2.0/24".
    #[serde(default = "default_subnet_ranges", alias = "subnet_ranges")]
    pub subnet_ranges: String,

    /// Sweep interval in milliseconds.
    #[serde(default = "default_scan_interval", alias = "scan_interval")]
    pub scan_interval: u64,

    /// Path to the nmap binary used for ping sweeps.
    #[serde(default = "default_nmap_path", alias = "nmap_path")]
    pub nmap_path: String,

    /// Per-host reachability timeout in milliseconds.
    #[serde(default = "default_probe_timeout", alias = "probe_timeout")]
    pub probe_timeout: u64,

    /// Bound on each reverse DNS and ARP lookup, in milliseconds.
    #[serde(default = "default_lookup_timeout", alias = "lookup_timeout")]
    pub lookup_timeout: u64,

    /// Maximum in-flight reachability probes per subnet.
    #[serde(default = "default_max_probes", alias = "max_concurrent_probes")]
    pub max_concurrent_probes: usize,

    /// Maximum hosts interrogated over SNMP at once within a subnet.
    #[serde(default = "default_max_hosts", alias = "max_concurrent_hosts")]
    pub max_concurrent_hosts: usize,

    /// Maximum subnets swept at once.
    #[serde(default = "default_max_subnets", alias = "max_concurrent_subnets")]
    pub max_concurrent_subnets: usize,
}

impl DiscoveryConfig {
    /// The configured CIDR strings, trimmed, empty entries dropped.
    pub fn subnets(&self) -> Vec<String> {
        self.subnet_ranges
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    }

    pub fn scan_interval(&self) -> Duration {
        Duration::from_millis(self.scan_interval.max(1))
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout)
    }

    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_millis(self.lookup_timeout)
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            subnet_ranges: default_subnet_ranges(),
            scan_interval: default_scan_interval(),
            nmap_path: default_nmap_path(),
            probe_timeout: default_probe_timeout(),
            lookup_timeout: default_lookup_timeout(),
            max_concurrent_probes: default_max_probes(),
            max_concurrent_hosts: default_max_hosts(),
            max_concurrent_subnets: default_max_subnets(),
        }
    }
}

/// SNMP v2c session parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct SnmpConfig {
    #[serde(default = "default_community")]
    pub community: String,

    /// Per-attempt timeout in milliseconds.
    #[serde(default = "default_snmp_timeout")]
    pub timeout: u64,

    /// Retransmissions after the first attempt.
    #[serde(default = "default_snmp_retries")]
    pub retries: u32,

    #[serde(default = "default_snmp_port")]
    pub port: u16,
}

impl SnmpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout)
    }
}

impl Default for SnmpConfig {
    fn default() -> Self {
        Self {
            community: default_community(),
            timeout: default_snmp_timeout(),
            retries: default_snmp_retries(),
            port: default_snmp_port(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_subnet_ranges() -> String {
    "192.168.1.0/24".to_string()
}

fn default_scan_interval() -> u64 {
    3_600_000
}

fn default_nmap_path() -> String {
    "nmap".to_string()
}

fn default_probe_timeout() -> u64 {
    1000
}

fn default_lookup_timeout() -> u64 {
    2000
}

fn default_max_probes() -> usize {
    64
}

fn default_max_hosts() -> usize {
    8
}

fn default_max_subnets() -> usize {
    4
}

fn default_community() -> String {
    "public".to_string()
}

fn default_snmp_timeout() -> u64 {
    5000
}

fn default_snmp_retries() -> u32 {
    2
}

fn default_snmp_port() -> u16 {
    161
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let settings = Settings::default();
        assert!(settings.discovery.enabled);
        assert_eq!(settings.discovery.subnets(), vec!["192.168.1.0/24"]);
        assert_eq!(settings.discovery.scan_interval(), Duration::from_secs(3600));
        assert_eq!(settings.discovery.probe_timeout(), Duration::from_secs(1));
        assert_eq!(settings.discovery.lookup_timeout(), Duration::from_secs(2));
        assert_eq!(settings.snmp.community, "public");
        assert_eq!(settings.snmp.timeout(), Duration::from_secs(5));
        assert_eq!(settings.snmp.retries, 2);
        assert_eq!(settings.snmp.port, 161);
    }

    #[test]
    fn test_subnet_list_splitting() {
        let cfg = DiscoveryConfig {
            subnet_ranges: " 10.0.1.0/24, ,10.0.2.0/24 ,".to_string(),
            ..Default::default()
        };
        assert_eq!(cfg.subnets(), vec!["10.0.1.0/24", "10.0.2.0/24"]);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("helpdesk.toml");
        std::fs::write(
            &path,
            r#"
[discovery]
enabled = false
subnet-ranges = "10.0.0.0/30,172.16.5.0/28"
scan-interval = 60000
lookup-timeout = 500

[snmp]
community = "ops-ro"
timeout = 1500
"#,
        )
        .unwrap();

        let prefix = dir.path().join("helpdesk");
        let settings = Settings::load(prefix.to_str().unwrap()).unwrap();

        assert!(!settings.discovery.enabled);
        assert_eq!(
            settings.discovery.subnets(),
            vec!["10.0.0.0/30", "172.16.5.0/28"]
        );
        assert_eq!(settings.discovery.scan_interval(), Duration::from_secs(60));
        assert_eq!(settings.discovery.nmap_path, "nmap");
        assert_eq!(settings.discovery.lookup_timeout(), Duration::from_millis(500));
        assert_eq!(settings.snmp.community, "ops-ro");
        assert_eq!(settings.snmp.timeout, 1500);
        assert_eq!(settings.snmp.retries, 2);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("absent");
        let settings = Settings::load(prefix.to_str().unwrap()).unwrap();
        assert_eq!(settings.discovery.subnet_ranges, "192.168.1.0/24");
    }
}
