use thiserror::Error;

/// Top-level error type for the Teller system.
///
/// Each variant wraps a subsystem-specific error. Subsystem crates define
/// their own error types and implement `From<SubsystemError> for TellerError`
/// so that the `?` operator works seamlessly across crate boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TellerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Adapter error: {0}")]
    Adapter(String),

    #[error("Fulfillment error: {0}")]
    Fulfillment(String),

    #[error("Bank error: {0}")]
    Bank(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for TellerError {
    fn from(err: toml::de::Error) -> Self {
        TellerError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for TellerError {
    fn from(err: toml::ser::Error) -> Self {
        TellerError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for TellerError {
    fn from(err: serde_json::Error) -> Self {
        TellerError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Teller operations.
pub type Result<T> = std::result::Result<T, TellerError>;
