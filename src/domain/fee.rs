//! Fee rules for worker entries.
//!
//! The fee is normally a quarter of the total, with a few discount and
//! premium bands. Rules are keyed on the worker's half of the total:
//!
//! | Total | Half | Fee  |
//! |-------|------|------|
//! | 80    | 40   | 20   |
//! | 90    | 45   | 20   |
//! | 95    | 47.5 | 22.5 |
//! | 100   | 50   | 25   |
//! | 105   | 52.5 | 27.5 |
//! | 110   | 55   | 25   |
//!
//! Totals outside the table pay 32.5 when their whole part ends in 5 and
//! 30 otherwise.

use super::{Amount, amounts_equal};

/// Exact-match rules as (half value, fee).
const HALF_VALUE_RULES: [(Amount, Amount); 5] = [
    (40.0, 20.0),
    (45.0, 20.0),
    (50.0, 25.0),
    (52.5, 27.5),
    (55.0, 25.0),
];

/// Standalone rule: a total of 95 pays 22.5.
const DISCOUNTED_TOTAL: (Amount, Amount) = (95.0, 22.5);

pub const FEE_ENDING_IN_FIVE: Amount = 32.5;
pub const FEE_DEFAULT: Amount = 30.0;

/// Compute the fee due for a total.
///
/// A positive `custom_due` always wins. Callers validate `total > 0`.
pub fn compute_fee(total: Amount, custom_due: Option<Amount>) -> Amount {
    if let Some(due) = custom_due.filter(|due| *due > 0.0) {
        return due;
    }

    let half_value = total / 2.0;
    if let Some((_, fee)) = HALF_VALUE_RULES
        .iter()
        .find(|(half, _)| amounts_equal(half_value, *half))
    {
        return *fee;
    }

    if amounts_equal(total, DISCOUNTED_TOTAL.0) {
        return DISCOUNTED_TOTAL.1;
    }

    if (total.trunc() as i64) % 10 == 5 {
        FEE_ENDING_IN_FIVE
    } else {
        FEE_DEFAULT
    }
}

/// Worker's remaining balance: their half of the total minus what they
/// already withdrew and the fee. May be negative.
pub fn settle(total: Amount, withdrawn: Amount, due: Amount) -> Amount {
    total / 2.0 - withdrawn - due
}
