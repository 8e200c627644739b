//! The banking collaborator contract.

use async_trait::async_trait;

use crate::error::BankError;
use crate::types::{Account, AccountKind, Transaction, TransferOutcome};

/// External banking operations the fulfillment handler depends on.
///
/// Implementations are injected by the host application; the routing core
/// never constructs one itself.
#[async_trait]
pub trait BankService: Send + Sync {
    /// All accounts belonging to the current customer.
    async fn accounts(&self) -> Result<Vec<Account>, BankError>;

    /// The most recent transactions, newest first, at most `limit`.
    async fn transactions(&self, limit: usize) -> Result<Vec<Transaction>, BankError>;

    /// Move `amount` between accounts. Domain failures are reported in the
    /// outcome, not as errors.
    async fn transfer(
        &self,
        from: AccountKind,
        to: AccountKind,
        amount: f64,
    ) -> Result<TransferOutcome, BankError>;
}
