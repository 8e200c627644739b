//! Error type shared by all backend adapters.

use teller_core::error::TellerError;

/// Failures talking to a conversational backend.
///
/// Adapters do not retry; every failure surfaces here and propagates through
/// the orchestrator unmodified.
#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    #[error("{service} request failed: {message}")]
    Transport {
        service: &'static str,
        message: String,
    },
    #[error("{service} returned status {status}: {message}")]
    Backend {
        service: &'static str,
        status: u16,
        message: String,
    },
    #[error("{service} returned an unreadable response: {message}")]
    InvalidResponse {
        service: &'static str,
        message: String,
    },
    #[error("{service} is not configured: {message}")]
    Configuration {
        service: &'static str,
        message: String,
    },
}

impl AdapterError {
    /// The backend this error came from.
    pub fn service(&self) -> &'static str {
        match self {
            AdapterError::Transport { service, .. }
            | AdapterError::Backend { service, .. }
            | AdapterError::InvalidResponse { service, .. }
            | AdapterError::Configuration { service, .. } => service,
        }
    }
}

impl From<AdapterError> for TellerError {
    fn from(err: AdapterError) -> Self {
        TellerError::Adapter(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adapter_error_display() {
        let err = AdapterError::Transport {
            service: "dialogue engine",
            message: "connection refused".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "dialogue engine request failed: connection refused"
        );

        let err = AdapterError::Backend {
            service: "knowledge search",
            status: 503,
            message: "overloaded".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "knowledge search returned status 503: overloaded"
        );
    }

    #[test]
    fn test_service_accessor() {
        let err = AdapterError::Configuration {
            service: "intent service",
            message: "missing endpoint".to_string(),
        };
        assert_eq!(err.service(), "intent service");
    }

    #[test]
    fn test_adapter_error_into_teller_error() {
        let err: TellerError = AdapterError::InvalidResponse {
            service: "dialogue engine",
            message: "truncated body".to_string(),
        }
        .into();
        assert!(matches!(err, TellerError::Adapter(_)));
        assert!(err.to_string().contains("truncated body"));
    }
}
