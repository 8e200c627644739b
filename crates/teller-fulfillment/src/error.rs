//! Error type for fulfillment dispatch.

use teller_banking::BankError;
use teller_core::error::TellerError;

/// Internal fulfillment failures.
///
/// These never reach the user: the handler catches them at the top and
/// returns a fixed apology instead. Validation problems (bad amounts,
/// unresolved accounts) are not errors; they become clarification replies.
#[derive(Debug, thiserror::Error)]
pub enum FulfillmentError {
    #[error("bank collaborator failed: {0}")]
    Bank(#[from] BankError),
}

impl From<FulfillmentError> for TellerError {
    fn from(err: FulfillmentError) -> Self {
        TellerError::Fulfillment(err.to_string())
    }
}
