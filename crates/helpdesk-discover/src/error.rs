//! Error types for the helpdesk-discover crate.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DiscoverError {
    #[error("Invalid subnet range {cidr}: {reason}")]
    InvalidRange { cidr: String, reason: String },

    #[error("Nmap not found at path: {path}")]
    NmapNotFound { path: String },

    #[error("Nmap exited with code {code}: {stderr}")]
    NmapFailed { code: i32, stderr: String },

    #[error("Failed to parse nmap XML output: {0}")]
    XmlParse(String),

    #[error("Probe of {addr} failed: {reason}")]
    Probe { addr: String, reason: String },

    #[error("Scan aborted: {0}")]
    Aborted(String),

    #[error("Invalid host address: {0}")]
    InvalidAddress(String),

    #[error("Core error: {0}")]
    Core(#[from] helpdesk_core::HelpdeskError),

    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DiscoverError>;
