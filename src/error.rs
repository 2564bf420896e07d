use thiserror::Error;

/// Failures that stop a scan before any probe is sent.
///
/// Per-port transport outcomes are not errors; they are folded into
/// [`crate::types::PortStatus`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    #[error("invalid target: {0}")]
    InvalidTarget(String),
    #[error("invalid port: {0}")]
    InvalidPort(String),
    #[error("invalid scan configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, ScanError>;
