use footfall_core::StorageError;
use thiserror::Error;

/// Result type for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;

#[derive(Debug, Clone, Error)]
pub enum LedgerError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("failed to encode ledger: {0}")]
    Encode(String),
    #[error("geolocation client error: {0}")]
    Resolver(String),
}
