// Amount handling module
// Decimal-string amounts travel through the router untouched; this file parses
// them for arithmetic and converts between display and base-unit representations
//
// Numan Thabit 2025 Nov

use anyhow::{ensure, Context, Result};

pub const DEFAULT_DECIMALS: u32 = 18;

/// Parse a decimal amount string into a finite, non-negative number.
pub fn parse_amount(raw: &str) -> Result<f64> {
    let trimmed = raw.trim();
    ensure!(!trimmed.is_empty(), "amount is empty");
    let value: f64 = trimmed
        .parse()
        .with_context(|| format!("amount {trimmed:?} is not a number"))?;
    ensure!(value.is_finite(), "amount {trimmed:?} is not finite");
    ensure!(value >= 0.0, "amount {trimmed:?} is negative");
    Ok(value)
}

/// Render a computed amount the way route payloads expect it: shortest
/// round-trip representation, no trailing `.0` for whole numbers.
pub fn format_decimal(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    format!("{value}")
}

/// Scale `amount` by a retention factor and render it as a decimal string.
pub fn retain(amount: f64, factor: f64) -> String {
    format_decimal(amount * factor)
}

/// Convert a display amount ("1.5") into base units ("1500000" for 6 decimals).
pub fn parse_units(amount: &str, decimals: u32) -> Result<String> {
    let trimmed = amount.trim();
    ensure!(!trimmed.is_empty(), "amount is empty");
    let (whole, fraction) = match trimmed.split_once('.') {
        Some((w, f)) => (w, f),
        None => (trimmed, ""),
    };
    ensure!(
        !(whole.is_empty() && fraction.is_empty()),
        "amount {trimmed:?} has no digits"
    );
    ensure!(
        whole.chars().all(|c| c.is_ascii_digit()) && fraction.chars().all(|c| c.is_ascii_digit()),
        "amount {trimmed:?} contains non-digit characters"
    );
    ensure!(
        fraction.len() <= decimals as usize,
        "amount {trimmed:?} has more than {decimals} fractional digits"
    );

    let mut digits = String::with_capacity(whole.len() + decimals as usize);
    digits.push_str(whole);
    digits.push_str(fraction);
    digits.extend(std::iter::repeat('0').take(decimals as usize - fraction.len()));

    let normalized = digits.trim_start_matches('0');
    Ok(if normalized.is_empty() {
        "0".to_string()
    } else {
        normalized.to_string()
    })
}

/// Convert base units back into a display amount with six fractional digits.
pub fn format_units(base_units: &str, decimals: u32) -> Result<String> {
    let trimmed = base_units.trim();
    ensure!(
        !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_digit()),
        "base units {trimmed:?} must be an unsigned integer"
    );
    let width = decimals as usize;
    let padded = format!("{trimmed:0>width$}", width = width + 1);
    let split = padded.len() - width;
    let rendered = format!("{}.{}", &padded[..split], &padded[split..]);
    let value: f64 = rendered
        .parse()
        .with_context(|| format!("render {trimmed} with {decimals} decimals"))?;
    Ok(format!("{value:.6}"))
}

/// Lenient form of [`format_units`] for log fields and other display-only amounts.
pub fn format_amount(base_units: &str, decimals: u32) -> String {
    format_units(base_units, decimals).unwrap_or_else(|_| "0.000000".to_string())
}

/// Lenient form of [`parse_units`]; malformed input becomes "0".
pub fn parse_amount_units(amount: &str, decimals: u32) -> String {
    parse_units(amount, decimals).unwrap_or_else(|_| "0".to_string())
}
