//! Display formatting for amounts and rates.

use rust_decimal::{Decimal, RoundingStrategy};

/// Currency symbol used for every displayed amount.
pub const CURRENCY_SYMBOL: &str = "₹";

/// Round half away from zero to two places and render without grouping.
pub fn format_fixed2(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{rounded:.2}")
}

/// Render an amount as `₹12,34,567.89`: Indian digit grouping (last three
/// digits, then pairs) and exactly two decimals.
pub fn format_inr(amount: Decimal) -> String {
    let fixed = format_fixed2(amount);
    let (sign, unsigned) = match fixed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", fixed.as_str()),
    };
    let (int_part, frac_part) = unsigned.split_once('.').unwrap_or((unsigned, "00"));
    let sign = if int_part.chars().all(|c| c == '0') && frac_part.chars().all(|c| c == '0') {
        ""
    } else {
        sign
    };
    format!("{sign}{CURRENCY_SYMBOL}{}.{frac_part}", group_indian(int_part))
}

fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let begin = end.saturating_sub(2);
        groups.push(&head[begin..end]);
        end = begin;
    }
    groups.reverse();
    format!("{},{tail}", groups.join(","))
}

/// Rate to two decimals followed by `%`, e.g. `8.50%`.
pub fn format_rate_pct(rate: Decimal) -> String {
    format!("{}%", format_fixed2(rate))
}
