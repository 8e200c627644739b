//! Account and transaction value objects.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The two account kinds the demo bank knows about.
///
/// `complement` encodes a binary account universe. Adding a third kind
/// invalidates the single-field inference in the transfer flow; that
/// inference must be redesigned before a new variant is added here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountKind {
    Checking,
    Savings,
}

impl AccountKind {
    /// The other account kind.
    pub fn complement(&self) -> AccountKind {
        match self {
            AccountKind::Checking => AccountKind::Savings,
            AccountKind::Savings => AccountKind::Checking,
        }
    }
}

impl fmt::Display for AccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountKind::Checking => write!(f, "checking"),
            AccountKind::Savings => write!(f, "savings"),
        }
    }
}

impl std::str::FromStr for AccountKind {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "checking" => Ok(AccountKind::Checking),
            "savings" => Ok(AccountKind::Savings),
            _ => Err(format!("Unknown account kind: {}", s)),
        }
    }
}

/// A customer account with its current balance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub kind: AccountKind,
    pub display_name: String,
    pub balance: f64,
}

/// A single ledger entry. `amount` is signed: negative for debits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub date: NaiveDate,
    pub description: String,
    pub amount: f64,
}

/// Result of a transfer request.
///
/// Domain failures (insufficient funds, out-of-range amount) are reported
/// here with `success: false` and a user-facing message that is relayed
/// verbatim; they are never surfaced as errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferOutcome {
    pub success: bool,
    pub message: String,
}

impl TransferOutcome {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}
