use thiserror::Error;

/// Top-level error type for the helpdesk inventory platform.
#[derive(Error, Debug)]
pub enum HelpdeskError {
    #[error("Invalid {field}: {value}")]
    Validation { field: &'static str, value: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
