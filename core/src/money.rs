//! Money handling: Decimal amounts in the API, integer cents in SQLite.
//!
//! Values are kept exact everywhere. Rounding to the currency's minor
//! unit happens only when a value is formatted for display.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Decimal places of the Brazilian real.
pub const MINOR_UNIT_SCALE: u32 = 2;

/// Convert an amount to cents.
/// Returns None if the amount has sub-cent digits or does not fit an i64.
pub fn to_cents(amount: Decimal) -> Option<i64> {
    if has_sub_cents(amount) {
        return None;
    }
    amount.checked_mul(Decimal::ONE_HUNDRED)?.to_i64()
}

/// True if the amount has digits below the currency's minor unit.
pub fn has_sub_cents(amount: Decimal) -> bool {
    amount.round_dp(MINOR_UNIT_SCALE) != amount
}

pub fn from_cents(cents: i64) -> Decimal {
    Decimal::new(cents, MINOR_UNIT_SCALE)
}

/// `R$ 1.234,56`: pt-BR grouping, two decimals.
pub fn format_brl(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(
        MINOR_UNIT_SCALE,
        RoundingStrategy::MidpointAwayFromZero,
    );
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    let text = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));
    format!("{sign}R$ {},{frac_part}", group_thousands(int_part))
}

/// `R$ 50k`: compact form used on goal labels.
pub fn format_thousands(amount: Decimal) -> String {
    let thousands = (amount / Decimal::ONE_THOUSAND).normalize();
    format!("R$ {thousands}k")
}

/// A rate such as 0.0125 rendered as `1.25%`.
pub fn format_rate(rate: Decimal) -> String {
    format_percent(rate * Decimal::ONE_HUNDRED)
}

/// A value already in percent rendered with two decimals, e.g. `15.00%`.
pub fn format_percent(percent: Decimal) -> String {
    let rounded = percent.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{rounded:.2}%")
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn cents_conversion() {
        assert_eq!(to_cents(dec!(49999.99)), Some(4_999_999));
        assert_eq!(to_cents(dec!(10)), Some(1000));
        assert_eq!(to_cents(dec!(0.005)), None);
        assert_eq!(from_cents(4_999_999), dec!(49999.99));
    }

    #[test]
    fn amounts_beyond_i64_cents_do_not_convert() {
        assert_eq!(to_cents(Decimal::MAX), None);
        assert!(!has_sub_cents(Decimal::MAX));
        assert_eq!(to_cents(from_cents(i64::MAX)), Some(i64::MAX));
    }

    #[test]
    fn brl_formatting() {
        assert_eq!(format_brl(dec!(0)), "R$ 0,00");
        assert_eq!(format_brl(dec!(1234.5)), "R$ 1.234,50");
        assert_eq!(format_brl(dec!(1262.500125)), "R$ 1.262,50");
        assert_eq!(format_brl(dec!(1000000)), "R$ 1.000.000,00");
        assert_eq!(format_brl(dec!(0.005)), "R$ 0,01");
        assert_eq!(format_brl(dec!(-250)), "-R$ 250,00");
    }

    #[test]
    fn compact_and_percent_formatting() {
        assert_eq!(format_thousands(dec!(50000)), "R$ 50k");
        assert_eq!(format_thousands(dec!(101000)), "R$ 101k");
        assert_eq!(format_rate(dec!(0.0125)), "1.25%");
        assert_eq!(format_rate(Decimal::ZERO), "0.00%");
        assert_eq!(format_percent(dec!(15)), "15.00%");
    }
}
