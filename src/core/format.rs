//! German-locale number and date formatting for the invoice template.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

/// Format an amount as German-locale euros: `1.234,50 €`.
///
/// Rounds to cents half away from zero, like the browser `Intl` formatter
/// the platform's frontend uses.
pub fn format_currency(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    let plain = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));
    format!("{sign}{},{frac_part} €", group_thousands(int_part))
}

/// Currency text for an amount shown as a deduction: `-30,00 €`.
pub fn format_negated_currency(amount: Decimal) -> String {
    format!("-{}", format_currency(amount))
}

/// `DD.MM.YYYY` for a timestamp (UTC calendar date).
pub fn format_date(ts: DateTime<Utc>) -> String {
    format_naive_date(ts.date_naive())
}

/// `DD.MM.YYYY`.
pub fn format_naive_date(date: NaiveDate) -> String {
    date.format("%d.%m.%Y").to_string()
}

/// Convert a fractional tax rate to whole percent (0.19 → 19).
pub fn format_percent(rate: Decimal) -> u32 {
    rate.checked_mul(dec!(100))
        .and_then(|pct| {
            pct.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
                .to_u32()
        })
        .unwrap_or(0)
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
    use chrono::TimeZone;

    #[test]
    fn currency_basic() {
        assert_eq!(format_currency(dec!(535.5)), "535,50 €");
        assert_eq!(format_currency(dec!(0)), "0,00 €");
        assert_eq!(format_currency(dec!(80)), "80,00 €");
    }

    #[test]
    fn currency_groups_thousands() {
        assert_eq!(format_currency(dec!(1234.5)), "1.234,50 €");
        assert_eq!(format_currency(dec!(1234567.891)), "1.234.567,89 €");
        assert_eq!(format_currency(dec!(100000)), "100.000,00 €");
    }

    #[test]
    fn currency_rounds_half_away_from_zero() {
        assert_eq!(format_currency(dec!(0.125)), "0,13 €");
        assert_eq!(format_currency(dec!(-0.125)), "-0,13 €");
        assert_eq!(format_currency(dec!(-0.001)), "0,00 €");
    }

    #[test]
    fn negated_currency() {
        assert_eq!(format_negated_currency(dec!(30)), "-30,00 €");
    }

    #[test]
    fn dates() {
        let ts = Utc.with_ymd_and_hms(2024, 6, 5, 23, 59, 0).unwrap();
        assert_eq!(format_date(ts), "05.06.2024");
    }

    #[test]
    fn percent() {
        assert_eq!(format_percent(dec!(0.19)), 19);
        assert_eq!(format_percent(dec!(0.07)), 7);
        assert_eq!(format_percent(dec!(0.075)), 8);
        assert_eq!(format_percent(dec!(0)), 0);
    }
}
