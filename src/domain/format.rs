//! Human-readable descriptions embedded in history responses.
//!
//! Consumers match on this wording, so it must stay byte-for-byte stable.

use crate::domain::model::{Amount, Claim, ClaimHistoryEntry, Policy, PolicyHistoryEntry};
use chrono::NaiveDate;
use rust_decimal::RoundingStrategy;

pub const UNKNOWN_PROVIDER: &str = "Unknown Provider";

/// Renders an amount the en-US way: `$1,234.50`, `-$450.00`.
///
/// Sub-cent values round half away from zero.
pub fn format_currency(amount: Amount) -> String {
    let rounded = amount
        .as_decimal()
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let fixed = format!("{:.2}", rounded.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if Amount::from(rounded).is_negative() { "-" } else { "" };
    format!("{}${}.{}", sign, grouped, cents)
}

pub fn describe_policy(provider: &str, end_date: NaiveDate) -> String {
    format!(
        "Insurance policy with {} (valid until {})",
        provider,
        end_date.format("%Y-%m-%d")
    )
}

pub fn describe_claim(description: &str, amount: Amount) -> String {
    format!(
        "Insurance claim: {} (Amount: {})",
        description,
        format_currency(amount)
    )
}

pub fn policy_entry(policy: &Policy) -> PolicyHistoryEntry {
    let provider = policy
        .provider
        .clone()
        .unwrap_or_else(|| UNKNOWN_PROVIDER.to_string());
    let description = describe_policy(&provider, policy.end_date);

    PolicyHistoryEntry {
        provider,
        start_date: policy.start_date,
        end_date: policy.end_date,
        description,
    }
}

pub fn claim_entry(claim: &Claim) -> ClaimHistoryEntry {
    ClaimHistoryEntry {
        claim_date: claim.claim_date,
        description: describe_claim(&claim.description, claim.amount),
    }
}
