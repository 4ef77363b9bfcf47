use thiserror::Error;

/// Errors raised while assembling or configuring the core runtime.
#[derive(Error, Debug)]
pub enum Error {
    /// A configuration value is missing or malformed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A required platform capability was not injected.
    #[error("Capability missing: {capability} - {message}")]
    CapabilityMissing { capability: String, message: String },
}

pub type Result<T> = std::result::Result<T, Error>;
