//! Currency display for prices and offer amounts.

#[cfg(test)]
#[path = "money_test.rs"]
mod money_test;

/// Three fraction digits: amounts are kept in thousandths.
const SCALE: u64 = 1_000;
const SCALE_F64: f64 = 1_000.0;

/// Format an amount as dollars with thousands separators, e.g. `$250,000`.
///
/// Up to three fraction digits are kept, trailing zeros dropped. Non-finite
/// values render as `$0`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn format_usd(amount: f64) -> String {
    if !amount.is_finite() {
        return "$0".to_owned();
    }
    // Float-to-int `as` saturates, so huge values clamp instead of wrapping.
    let scaled = (amount.abs() * SCALE_F64).round() as u64;
    let whole = scaled / SCALE;
    let fraction = scaled % SCALE;

    let sign = if amount < 0.0 && scaled > 0 { "-" } else { "" };
    let mut out = format!("{sign}${}", group_thousands(whole));
    if fraction > 0 {
        let digits = format!("{fraction:03}");
        out.push('.');
        out.push_str(digits.trim_end_matches('0'));
    }
    out
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
