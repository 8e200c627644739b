//! In-memory mock bank with a fixed account and transaction table.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::BankError;
use crate::service::BankService;
use crate::types::{Account, AccountKind, Transaction, TransferOutcome};

/// Largest amount accepted in a single transfer.
const MAX_TRANSFER: f64 = 10_000.0;

/// Demo bank backed by process-local state. Balances mutate on successful
/// transfers; everything resets on restart.
pub struct MockBank {
    balances: Mutex<HashMap<AccountKind, f64>>,
    transactions: Vec<Transaction>,
}

impl MockBank {
    /// Create a bank with the standard demo balances and ledger.
    pub fn new() -> Self {
        let mut balances = HashMap::new();
        balances.insert(AccountKind::Checking, 2_543.22);
        balances.insert(AccountKind::Savings, 11_860.75);

        let transactions = vec![
            ledger_entry(2026, 8, 5, "Coffee Collective", -4.50),
            ledger_entry(2026, 8, 4, "Payroll deposit", 2_150.00),
            ledger_entry(2026, 8, 2, "Grocery Mart", -86.31),
            ledger_entry(2026, 7, 30, "Electric utility", -112.09),
            ledger_entry(2026, 7, 28, "Online bookstore", -23.98),
            ledger_entry(2026, 7, 25, "ATM withdrawal", -100.00),
        ];

        Self {
            balances: Mutex::new(balances),
            transactions,
        }
    }

    /// A bank whose ledger is empty, for exercising the no-transactions path.
    pub fn with_empty_ledger() -> Self {
        Self {
            transactions: Vec::new(),
            ..Self::new()
        }
    }
}

impl Default for MockBank {
    fn default() -> Self {
        Self::new()
    }
}

fn ledger_entry(y: i32, m: u32, d: u32, description: &str, amount: f64) -> Transaction {
    Transaction {
        // Constants above are always valid calendar dates.
        date: NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default(),
        description: description.to_string(),
        amount,
    }
}

#[async_trait]
impl BankService for MockBank {
    async fn accounts(&self) -> Result<Vec<Account>, BankError> {
        let balances = self
            .balances
            .lock()
            .map_err(|e| BankError::Unavailable(format!("balance lock poisoned: {}", e)))?;
        let mut accounts: Vec<Account> = balances
            .iter()
            .map(|(kind, balance)| Account {
                kind: *kind,
                display_name: match kind {
                    AccountKind::Checking => "Everyday Checking".to_string(),
                    AccountKind::Savings => "High-Yield Savings".to_string(),
                },
                balance: *balance,
            })
            .collect();
        // Stable order for display: checking first.
        accounts.sort_by_key(|a| a.kind != AccountKind::Checking);
        Ok(accounts)
    }

    async fn transactions(&self, limit: usize) -> Result<Vec<Transaction>, BankError> {
        Ok(self.transactions.iter().take(limit).cloned().collect())
    }

    async fn transfer(
        &self,
        from: AccountKind,
        to: AccountKind,
        amount: f64,
    ) -> Result<TransferOutcome, BankError> {
        if !(amount > 0.0) {
            return Ok(TransferOutcome::rejected(
                "Transfer amounts must be greater than zero.",
            ));
        }
        if amount > MAX_TRANSFER {
            return Ok(TransferOutcome::rejected(format!(
                "Transfers are limited to ${:.2} per request.",
                MAX_TRANSFER
            )));
        }

        let mut balances = self
            .balances
            .lock()
            .map_err(|e| BankError::Unavailable(format!("balance lock poisoned: {}", e)))?;

        let available = *balances
            .get(&from)
            .ok_or_else(|| BankError::UnknownAccount(from.to_string()))?;
        if available < amount {
            return Ok(TransferOutcome::rejected(format!(
                "Insufficient funds in your {} account.",
                from
            )));
        }

        *balances.entry(from).or_insert(0.0) -= amount;
        *balances.entry(to).or_insert(0.0) += amount;

        tracing::info!(%from, %to, amount, "Transfer completed");
        Ok(TransferOutcome::ok(format!(
            "Transferred ${:.2} from {} to {}.",
            amount, from, to
        )))
    }
}
