//! Slot parameter parsing for the transfer flow.

use std::sync::LazyLock;

use regex::Regex;

use teller_banking::AccountKind;
use teller_core::types::ParamValue;

/// Characters stripped before numeric parsing: currency symbols, grouping
/// commas, whitespace.
static AMOUNT_STRIP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[$,\s]").expect("Invalid amount regex"));

/// Parse a transfer amount from a slot value.
///
/// Accepts a number or a text like `"$1,200.50"`. Non-numeric, non-finite,
/// and non-positive values all resolve to `None`.
pub fn parse_amount(value: &ParamValue) -> Option<f64> {
    let amount = match value {
        ParamValue::Number(n) => *n,
        ParamValue::Text(s) => {
            let cleaned = AMOUNT_STRIP_RE.replace_all(s, "");
            cleaned.parse::<f64>().ok()?
        }
        _ => return None,
    };
    (amount.is_finite() && amount > 0.0).then_some(amount)
}

/// Normalize free text naming an account into an [`AccountKind`].
///
/// "checking account", "my checkings", "check" all resolve to Checking;
/// anything containing "sav" resolves to Savings.
pub fn parse_account(value: &ParamValue) -> Option<AccountKind> {
    let text = value.as_text()?.to_lowercase();
    if text.contains("check") {
        Some(AccountKind::Checking)
    } else if text.contains("sav") {
        Some(AccountKind::Savings)
    } else {
        None
    }
}
