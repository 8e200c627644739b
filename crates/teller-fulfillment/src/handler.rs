//! The fulfillment state machine.
//!
//! Maps a named intent plus slot parameters and the current context set to
//! a reply, an optional client action, and the next context set. Protected
//! intents are gated on the `authenticated` context; the transfer flow does
//! slot validation and single-field account inference.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use teller_banking::{AccountKind, BankService, Transaction};
use teller_core::types::{Context, ParamValue, PayloadAction};

use crate::context::{is_authenticated, keep_all, keep_only_auth};
use crate::error::FulfillmentError;
use crate::params::{parse_account, parse_amount};

// =============================================================================
// Fixed response text
// =============================================================================

const GREETING: &str = "Hi! I'm Teller, your banking assistant. What can I do for you today?";

const AUTH_PROMPT: &str = "For your security, please sign in before I can help with that.";

const AGENT_REPLY: &str = "Connecting you to an agent now. One moment...";

const HELP_TEXT: &str =
    "I can help you check balances, transfer funds, or review recent transactions.";

const APOLOGY: &str = "Sorry, something went wrong on our end. Please try again.";

const NO_TRANSACTIONS: &str = "You have no recent transactions.";

const SAME_ACCOUNT_REJECTION: &str =
    "The source and destination accounts must be different. Nothing was transferred.";

const TRANSFER_CLARIFICATION: &str =
    "How much would you like to transfer, and between which accounts?";

/// Standard quick-reply menu offered after informational replies.
const MENU_QUICK_REPLIES: [&str; 4] = [
    "Check Balance",
    "Transfer Funds",
    "Transaction History",
    "Talk to Agent",
];

/// Example answers offered while transfer slots are unresolved.
const TRANSFER_QUICK_REPLIES: [&str; 5] = ["$50", "$100", "$500", "To Savings", "To Checking"];

/// How many ledger entries a history request shows.
const HISTORY_LIMIT: usize = 5;

// =============================================================================
// Types
// =============================================================================

/// Known intent names, parsed from the dialogue engine's label.
#[derive(Debug, Clone, PartialEq, Eq)]
enum BankingIntent {
    Welcome,
    CheckBalance,
    TransferFunds,
    TransactionHistory,
    RequestAgent,
    Fallback,
    /// Anything unlisted: stateless FAQ/knowledge intents.
    Other(String),
}

impl BankingIntent {
    fn from_name(name: &str) -> Self {
        match name {
            "welcome" => BankingIntent::Welcome,
            "check.balance" => BankingIntent::CheckBalance,
            "transfer.funds" => BankingIntent::TransferFunds,
            "transaction.history" => BankingIntent::TransactionHistory,
            "request.agent" => BankingIntent::RequestAgent,
            _ if name.eq_ignore_ascii_case("fallback") => BankingIntent::Fallback,
            other => BankingIntent::Other(other.to_string()),
        }
    }

    /// Intents that require the `authenticated` context.
    fn is_protected(&self) -> bool {
        matches!(
            self,
            BankingIntent::CheckBalance
                | BankingIntent::TransferFunds
                | BankingIntent::TransactionHistory
        )
    }
}

/// What a fulfillment branch hands back to the dialogue engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FulfillmentResponse {
    pub text: String,
    #[serde(default)]
    pub quick_replies: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload_action: Option<PayloadAction>,
    #[serde(default)]
    pub output_contexts: Vec<Context>,
}

impl FulfillmentResponse {
    fn text_only(text: impl Into<String>, output_contexts: Vec<Context>) -> Self {
        Self {
            text: text.into(),
            quick_replies: Vec::new(),
            payload_action: None,
            output_contexts,
        }
    }
}

/// Resolved transfer slots.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct TransferSlots {
    from_account: Option<AccountKind>,
    to_account: Option<AccountKind>,
    amount: Option<f64>,
}

impl TransferSlots {
    fn from_parameters(parameters: &HashMap<String, ParamValue>) -> Self {
        Self {
            from_account: parameters.get("from_account").and_then(parse_account),
            to_account: parameters.get("to_account").and_then(parse_account),
            amount: parameters.get("amount").and_then(|v| parse_amount(v)),
        }
    }

    /// Single-field inference: when exactly one account is known, the other
    /// is its complement. Sound only while the account universe is binary;
    /// see [`AccountKind::complement`].
    fn infer_missing_account(self) -> Self {
        match (self.from_account, self.to_account) {
            (Some(from), None) => Self {
                to_account: Some(from.complement()),
                ..self
            },
            (None, Some(to)) => Self {
                from_account: Some(to.complement()),
                ..self
            },
            _ => self,
        }
    }
}

// =============================================================================
// Handler
// =============================================================================

/// Webhook fulfillment handler over an injected bank collaborator.
pub struct FulfillmentHandler {
    bank: Arc<dyn BankService>,
}

impl FulfillmentHandler {
    pub fn new(bank: Arc<dyn BankService>) -> Self {
        Self { bank }
    }

    /// Resolve one intent. Never fails: internal errors are logged and
    /// converted to a fixed apology with cleared contexts, so the user
    /// never sees a raw error.
    pub async fn handle_intent(
        &self,
        intent_name: &str,
        parameters: &HashMap<String, ParamValue>,
        contexts: &[Context],
    ) -> FulfillmentResponse {
        match self.dispatch(intent_name, parameters, contexts).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(intent = intent_name, error = %e, "Fulfillment failed");
                FulfillmentResponse::text_only(APOLOGY, keep_only_auth(contexts))
            }
        }
    }

    async fn dispatch(
        &self,
        intent_name: &str,
        parameters: &HashMap<String, ParamValue>,
        contexts: &[Context],
    ) -> Result<FulfillmentResponse, FulfillmentError> {
        let intent = BankingIntent::from_name(intent_name);

        // Auth gate: protected intents bounce with state intact so the
        // conversation resumes exactly where it left off after sign-in.
        if intent.is_protected() && !is_authenticated(contexts) {
            return Ok(FulfillmentResponse {
                text: AUTH_PROMPT.to_string(),
                quick_replies: Vec::new(),
                payload_action: Some(PayloadAction::RequireAuth),
                output_contexts: keep_all(contexts),
            });
        }

        match intent {
            BankingIntent::Welcome => Ok(FulfillmentResponse {
                text: GREETING.to_string(),
                quick_replies: menu(),
                payload_action: None,
                output_contexts: keep_only_auth(contexts),
            }),
            BankingIntent::CheckBalance => self.check_balance(contexts).await,
            BankingIntent::TransferFunds => self.transfer_funds(parameters, contexts).await,
            BankingIntent::TransactionHistory => self.transaction_history(contexts).await,
            BankingIntent::RequestAgent => Ok(FulfillmentResponse {
                text: AGENT_REPLY.to_string(),
                quick_replies: Vec::new(),
                payload_action: Some(PayloadAction::TransferAgent),
                output_contexts: keep_only_auth(contexts),
            }),
            // Explicitly clear contexts: this is how a stuck slot-filling
            // conversation recovers.
            BankingIntent::Fallback => Ok(FulfillmentResponse {
                text: HELP_TEXT.to_string(),
                quick_replies: menu(),
                payload_action: None,
                output_contexts: keep_only_auth(contexts),
            }),
            // Unlisted intents are stateless FAQ lookups; leave whatever
            // conversation state exists alone.
            BankingIntent::Other(name) => {
                tracing::debug!(intent = %name, "Unlisted intent treated as stateless");
                Ok(FulfillmentResponse {
                    text: HELP_TEXT.to_string(),
                    quick_replies: menu(),
                    payload_action: None,
                    output_contexts: keep_all(contexts),
                })
            }
        }
    }

    async fn check_balance(
        &self,
        contexts: &[Context],
    ) -> Result<FulfillmentResponse, FulfillmentError> {
        let accounts = self.bank.accounts().await?;
        let summary = if accounts.is_empty() {
            "You don't have any open accounts.".to_string()
        } else {
            accounts
                .iter()
                .map(|a| format!("{}: {}", a.display_name, format_usd(a.balance)))
                .collect::<Vec<_>>()
                .join("\n")
        };
        Ok(FulfillmentResponse {
            text: summary,
            quick_replies: menu(),
            payload_action: None,
            output_contexts: keep_only_auth(contexts),
        })
    }

    async fn transfer_funds(
        &self,
        parameters: &HashMap<String, ParamValue>,
        contexts: &[Context],
    ) -> Result<FulfillmentResponse, FulfillmentError> {
        let slots = TransferSlots::from_parameters(parameters).infer_missing_account();

        let (Some(from), Some(to), Some(amount)) =
            (slots.from_account, slots.to_account, slots.amount)
        else {
            // Slot-filling is still in flight: keep every context alive.
            return Ok(FulfillmentResponse {
                text: TRANSFER_CLARIFICATION.to_string(),
                quick_replies: TRANSFER_QUICK_REPLIES
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
                payload_action: None,
                output_contexts: keep_all(contexts),
            });
        };

        if from == to {
            return Ok(FulfillmentResponse::text_only(
                SAME_ACCOUNT_REJECTION,
                keep_only_auth(contexts),
            ));
        }

        let outcome = self.bank.transfer(from, to, amount).await?;
        let text = if outcome.success {
            format!(
                "Done! {} has been moved from {} to {}.",
                format_usd(amount),
                from,
                to
            )
        } else {
            // Domain failures are relayed verbatim.
            outcome.message
        };
        Ok(FulfillmentResponse {
            text,
            quick_replies: menu(),
            payload_action: None,
            output_contexts: keep_only_auth(contexts),
        })
    }

    async fn transaction_history(
        &self,
        contexts: &[Context],
    ) -> Result<FulfillmentResponse, FulfillmentError> {
        let transactions = self.bank.transactions(HISTORY_LIMIT).await?;
        let text = if transactions.is_empty() {
            NO_TRANSACTIONS.to_string()
        } else {
            let mut lines = vec!["Here are your recent transactions:".to_string()];
            for (i, txn) in transactions.iter().enumerate() {
                lines.push(format_transaction(i + 1, txn));
            }
            lines.join("\n")
        };
        Ok(FulfillmentResponse {
            text,
            quick_replies: menu(),
            payload_action: None,
            output_contexts: keep_only_auth(contexts),
        })
    }
}

// =============================================================================
// Formatting helpers
// =============================================================================

fn menu() -> Vec<String> {
    MENU_QUICK_REPLIES.iter().map(|s| s.to_string()).collect()
}

/// Format a dollar amount with grouping commas, e.g. `$1,200.50`.
fn format_usd(amount: f64) -> String {
    let negative = amount < 0.0;
    let cents = (amount.abs() * 100.0).round() as u64;
    let dollars = (cents / 100).to_string();
    let rem = cents % 100;

    let mut grouped = String::new();
    for (i, c) in dollars.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    let grouped: String = grouped.chars().rev().collect();

    format!("{}${}.{:02}", if negative { "-" } else { "" }, grouped, rem)
}

fn format_transaction(position: usize, txn: &Transaction) -> String {
    format!(
        "{}. {} {}: {}",
        position,
        txn.date.format("%Y-%m-%d"),
        txn.description,
        format_usd(txn.amount)
    )
}

// =============================================================================
// Tests
// =============================================================================
