use thiserror::Error;

/// Errors produced by platform bridge implementations.
#[derive(Error, Debug)]
pub enum BridgeError {
    /// The host platform does not provide this capability.
    #[error("Bridge capability not available: {0}")]
    NotAvailable(String),

    /// A request or platform call failed.
    #[error("Bridge operation failed: {0}")]
    OperationFailed(String),

    /// Local persistence (blob or secret storage) failed.
    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BridgeError>;
