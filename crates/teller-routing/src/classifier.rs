//! Lexical intent classifier.
//!
//! Buckets free text into Banking, Support, or General via case-insensitive
//! substring matching against two fixed keyword lists, checked in that
//! order. No learning, no external calls; deterministic and total over all
//! string inputs.

use teller_core::types::Category;

/// Keywords that route a message to the banking path (checked first).
const BANKING_KEYWORDS: &[&str] = &[
    "balance",
    "transfer",
    "account",
    "transaction",
    "deposit",
    "withdraw",
    "savings",
    "checking",
    "money",
    "funds",
    "payment",
    "loan",
    "statement",
];

/// Keywords that mark a message as a support question.
const SUPPORT_KEYWORDS: &[&str] = &[
    "help",
    "support",
    "hours",
    "fee",
    "branch",
    "location",
    "contact",
    "agent",
    "password",
    "locked",
    "lost",
    "stolen",
    "card",
];

/// Classify a message. First banking keyword match wins, then support;
/// anything else (including the empty string) is General.
pub fn classify(text: &str) -> Category {
    let lower = text.to_lowercase();
    if BANKING_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
        return Category::Banking;
    }
    if SUPPORT_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
        return Category::Support;
    }
    Category::General
}

#[cfg(test)]
mod tests {
    use super::*;

    // ---- Banking ----

    #[test]
    fn test_banking_keywords_match() {
        assert_eq!(classify("check my balance"), Category::Banking);
        assert_eq!(classify("I want to transfer $50"), Category::Banking);
        assert_eq!(classify("show my recent transactions"), Category::Banking);
        assert_eq!(classify("move money to savings"), Category::Banking);
    }

    #[test]
    fn test_banking_match_is_case_insensitive() {
        assert_eq!(classify("CHECK MY BALANCE"), Category::Banking);
        assert_eq!(classify("Transfer Funds"), Category::Banking);
        assert_eq!(classify("mY aCcOuNt"), Category::Banking);
    }

    #[test]
    fn test_banking_keyword_inside_longer_word() {
        // Substring matching is deliberate: "transactions" contains
        // "transaction".
        assert_eq!(classify("transactions"), Category::Banking);
    }

    #[test]
    fn test_banking_wins_over_support() {
        // Contains both "balance" (banking) and "help" (support); the
        // banking list is checked first.
        assert_eq!(classify("help me check my balance"), Category::Banking);
    }

    // ---- Support ----

    #[test]
    fn test_support_keywords_match() {
        assert_eq!(classify("what are your hours"), Category::Support);
        assert_eq!(classify("I lost my card"), Category::Support);
        assert_eq!(classify("talk to an agent please"), Category::Support);
        assert_eq!(classify("what is the overdraft fee"), Category::Support);
    }

    #[test]
    fn test_support_match_is_case_insensitive() {
        assert_eq!(classify("HELP"), Category::Support);
    }

    // ---- General ----

    #[test]
    fn test_unmatched_text_is_general() {
        assert_eq!(classify("tell me a joke"), Category::General);
        assert_eq!(classify("what's the weather like"), Category::General);
        assert_eq!(classify("good morning"), Category::General);
    }

    #[test]
    fn test_empty_string_is_general() {
        assert_eq!(classify(""), Category::General);
    }

    #[test]
    fn test_whitespace_only_is_general() {
        assert_eq!(classify("   \t\n"), Category::General);
    }

    #[test]
    fn test_unicode_text_is_general() {
        assert_eq!(classify("\u{00bf}qu\u{00e9} tal?"), Category::General);
    }

    // ---- Purity ----

    #[test]
    fn test_classify_is_idempotent() {
        for text in ["check my balance", "what are your hours", "hello there"] {
            assert_eq!(classify(text), classify(text));
        }
    }

    #[test]
    fn test_classify_never_returns_search() {
        for text in ["balance", "hours", "anything else", ""] {
            assert_ne!(classify(text), Category::Search);
        }
    }
}
