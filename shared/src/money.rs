//! Fixed-point money helpers
//!
//! All monetary amounts in the core are [`rust_decimal::Decimal`] quantized to
//! two fractional digits using half-up rounding (never banker's rounding) —
//! the wire representation is a JSON number, round-tripped through
//! [`rust_decimal::Decimal`] on input and output rather than `f64`.

use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Quantize `value` to two decimal places, half-up.
pub fn quantize(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Parse a decimal from a string, quantizing the result to two decimal places.
pub fn parse_money(s: &str) -> Result<Decimal, rust_decimal::Error> {
    Decimal::from_str(s).map(quantize)
}

/// Split `total` across `n` equal shares, half-up, with the last share
/// absorbing whatever residue truncation leaves behind so that the shares
/// sum exactly back to `total`.
///
/// Used by the equal-split engine and by quantity-weighted proportional
/// distribution (tax/tip across split-bill people).
pub fn equal_shares(total: Decimal, n: u32) -> Vec<Decimal> {
    assert!(n > 0, "equal_shares requires at least one share");
    let n_dec = Decimal::from(n);
    let share = (total / n_dec).round_dp_with_strategy(2, RoundingStrategy::ToZero);
    let mut shares = vec![share; n as usize];
    let distributed: Decimal = share * Decimal::from(n - 1);
    if let Some(last) = shares.last_mut() {
        *last = quantize(total - distributed);
    }
    shares
}

/// Distribute `total` proportionally across `weights`, quantized to the
/// cent, with the final element absorbing the rounding residue so the
/// distributed amounts sum exactly to `total`.
pub fn proportional_shares(total: Decimal, weights: &[Decimal]) -> Vec<Decimal> {
    if weights.is_empty() {
        return Vec::new();
    }
    let weight_sum: Decimal = weights.iter().sum();
    if weight_sum.is_zero() {
        return vec![Decimal::ZERO; weights.len()];
    }
    let mut shares: Vec<Decimal> = weights
        .iter()
        .map(|w| quantize(total * *w / weight_sum))
        .collect();
    let distributed: Decimal = shares[..shares.len() - 1].iter().sum();
    if let Some(last) = shares.last_mut() {
        *last = quantize(total - distributed);
    }
    shares
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn quantizes_half_up() {
        assert_eq!(quantize(d("1.005")), d("1.01"));
        assert_eq!(quantize(d("1.004")), d("1.00"));
    }

    #[test]
    fn equal_shares_sum_to_total_with_residue_on_last() {
        let shares = equal_shares(d("120.01"), 3);
        assert_eq!(shares, vec![d("40.00"), d("40.00"), d("40.01")]);
        assert_eq!(shares.iter().sum::<Decimal>(), d("120.01"));
    }

    #[test]
    fn proportional_shares_sum_to_total() {
        let shares = proportional_shares(d("10.00"), &[d("100.01"), d("50.00")]);
        assert_eq!(shares.iter().sum::<Decimal>(), d("10.00"));
    }
}
