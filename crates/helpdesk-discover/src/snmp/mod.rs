//! SNMP v2c: per-host GET sessions on top of `async-snmp` and the device
//! signature fetch.

pub mod client;
pub mod value;

use thiserror::Error;

pub use client::{SessionOpener, SnmpClient, SnmpSession, UdpSessionOpener};
pub use value::{Oid, SnmpValue};

#[derive(Error, Debug)]
pub enum SnmpError {
    #[error("No response from {addr} after {attempts} attempt(s)")]
    Timeout { addr: String, attempts: u32 },

    #[error("{oid}: {value}")]
    Exception { oid: Oid, value: SnmpValue },

    #[error("SNMP client error: {0}")]
    Client(#[from] async_snmp::Error),
}

pub type Result<T> = std::result::Result<T, SnmpError>;
