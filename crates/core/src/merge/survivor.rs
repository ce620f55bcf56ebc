//! Survivor selection.

use super::request::Operand;
use crate::person::CreditCounts;

/// Decide which operand survives.
///
/// An explicit choice wins. Otherwise the operand with more cast + crew
/// credits survives; on a tie the first operand (A) is kept.
pub fn select_survivor(
    explicit: Option<Operand>,
    credits_a: CreditCounts,
    credits_b: CreditCounts,
) -> Operand {
    if let Some(operand) = explicit {
        return operand;
    }
    if credits_b.total() > credits_a.total() {
        Operand::B
    } else {
        Operand::A
    }
}

/// Suggested survivor as reported by the merge preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum SuggestedSurvivor {
    A,
    B,
    #[serde(rename = "TIE")]
    Tie,
}

pub fn suggest_survivor(credits_a: CreditCounts, credits_b: CreditCounts) -> SuggestedSurvivor {
    match credits_a.total().cmp(&credits_b.total()) {
        std::cmp::Ordering::Greater => SuggestedSurvivor::A,
        std::cmp::Ordering::Less => SuggestedSurvivor::B,
        std::cmp::Ordering::Equal => SuggestedSurvivor::Tie,
    }
}
