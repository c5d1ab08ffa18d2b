use thiserror::Error as ThisError;

pub type OpaqueError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(ThisError, Debug)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(#[from] InvalidConfiguration),
    #[error("{0}")]
    Opaque(#[from] OpaqueError),
}
pub type Result<T> = std::result::Result<T, Error>;

/// Rejected target or monitor settings, reported when they are built.
#[derive(ThisError, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum InvalidConfiguration {
    #[error("target address is required")]
    MissingAddress,
    #[error("`{0}` is not an IP address or IP:port pair")]
    InvalidAddress(String),
    #[error("target port must be in range 1-65535")]
    ZeroPort,
    #[error("probe timeout must be strictly positive")]
    ZeroTimeout,
    #[error("monitor interval must be strictly positive")]
    ZeroInterval,
}
