//! Subnet enumeration: CIDR string → candidate host addresses.

use std::fmt;
use std::net::Ipv4Addr;

use ipnet::{IpNet, Ipv4AddrRange, Ipv4Net};

use crate::error::{DiscoverError, Result};

/// A parsed IPv4 subnet to sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subnet {
    cidr: String,
    network: Ipv4Net,
}

impl Subnet {
    /// Parse a CIDR such as "192.168.1.0/24". Host bits are masked off, so
    /// "192.168.1.77/24" names the same subnet.
    pub fn parse(cidr: &str) -> Result<Self> {
        let trimmed = cidr.trim();
        let net: IpNet = trimmed.parse().map_err(|e| DiscoverError::InvalidRange {
            cidr: trimmed.to_string(),
            reason: format!("{e}"),
        })?;

        match net {
            IpNet::V4(v4) => Ok(Self {
                cidr: trimmed.to_string(),
                network: v4.trunc(),
            }),
            IpNet::V6(_) => Err(DiscoverError::InvalidRange {
                cidr: trimmed.to_string(),
                reason: "IPv6 sweeping is not supported".to_string(),
            }),
        }
    }

    /// The CIDR as configured.
    pub fn cidr(&self) -> &str {
        &self.cidr
    }

    pub fn network(&self) -> Ipv4Net {
        self.network
    }

    /// Lazily iterate host addresses. Network and broadcast addresses are
    /// excluded for prefixes up to /30; /31 and /32 yield every address.
    /// The iterator is `Clone`, so a sweep can be restarted.
    pub fn hosts(&self) -> Ipv4AddrRange {
        self.network.hosts()
    }

    /// Number of addresses [`Subnet::hosts`] yields.
    pub fn host_count(&self) -> u64 {
        let size = 1u64 << (32 - u32::from(self.network.prefix_len()));
        if self.network.prefix_len() <= 30 {
            size - 2
        } else {
            size
        }
    }

    pub fn contains(&self, addr: &Ipv4Addr) -> bool {
        self.network.contains(addr)
    }
}

impl fmt::Display for Subnet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.cidr)
    }
}
