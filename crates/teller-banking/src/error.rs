//! Error type for the banking collaborator.

use teller_core::error::TellerError;

/// Infrastructure failures from the bank backend.
///
/// Domain conditions (insufficient funds, invalid amounts) are not errors;
/// they come back as `TransferOutcome { success: false, .. }`.
#[derive(Debug, thiserror::Error)]
pub enum BankError {
    #[error("bank backend unavailable: {0}")]
    Unavailable(String),
    #[error("unknown account: {0}")]
    UnknownAccount(String),
}

impl From<BankError> for TellerError {
    fn from(err: BankError) -> Self {
        TellerError::Bank(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bank_error_display() {
        let err = BankError::Unavailable("connection reset".to_string());
        assert_eq!(err.to_string(), "bank backend unavailable: connection reset");

        let err = BankError::UnknownAccount("brokerage".to_string());
        assert_eq!(err.to_string(), "unknown account: brokerage");
    }

    #[test]
    fn test_bank_error_into_teller_error() {
        let err: TellerError = BankError::Unavailable("down".to_string()).into();
        assert!(matches!(err, TellerError::Bank(_)));
        assert!(err.to_string().contains("down"));
    }
}
