// src/common/money.rs

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds an amount for presentation. Arithmetic elsewhere stays exact.
pub fn round_display(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Formats an amount as rupees with Indian digit grouping, e.g. `₹1,23,456.50`.
pub fn format_inr(amount: Decimal) -> String {
    let rounded = round_display(amount);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let text = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let grouped = group_indian(int_part);
    let sign = if negative { "-" } else { "" };
    format!("{}₹{}.{}", sign, grouped, frac_part)
}

// Last three digits, then groups of two: 12345678 -> 1,23,45,678
fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();
    format!("{},{}", groups.join(","), tail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn rounds_half_away_from_zero() {
        assert_eq!(round_display(Decimal::from_str("10.005").unwrap()), Decimal::from_str("10.01").unwrap());
        assert_eq!(round_display(Decimal::from_str("-10.005").unwrap()), Decimal::from_str("-10.01").unwrap());
    }

    #[test]
    fn indian_grouping() {
        assert_eq!(format_inr(Decimal::from(0)), "₹0.00");
        assert_eq!(format_inr(Decimal::from(999)), "₹999.00");
        assert_eq!(format_inr(Decimal::from(4720)), "₹4,720.00");
        assert_eq!(format_inr(Decimal::from_str("123456.5").unwrap()), "₹1,23,456.50");
        assert_eq!(format_inr(Decimal::from(12345678)), "₹1,23,45,678.00");
        assert_eq!(format_inr(Decimal::from(-1500)), "-₹1,500.00");
    }
}
