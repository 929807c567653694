//! Validation and input coercion for the Quote Builder

use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::models::Quote;

// ============================================================================
// Record Identifiers
// ============================================================================

/// Record store ids look like `rec` followed by 14 alphanumerics
pub fn is_valid_record_id(id: &str) -> bool {
    id.len() == 17
        && id.starts_with("rec")
        && id[3..].chars().all(|c| c.is_ascii_alphanumeric())
}

pub fn validate_record_id(id: &str) -> Result<(), &'static str> {
    if is_valid_record_id(id) {
        Ok(())
    } else {
        Err("Record id must be 'rec' followed by 14 letters or digits")
    }
}

// ============================================================================
// Numeric Coercion
// ============================================================================

/// Longest numeric prefix of `raw`: optional sign, digits, optional fraction
fn numeric_prefix(raw: &str) -> &str {
    let s = raw.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'-') | Some(b'+')) {
        end = 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        if frac_end > frac_start {
            digits += frac_end - frac_start;
            end = frac_end;
        } else if digits > 0 {
            end = frac_start;
        }
    }
    if digits == 0 {
        return "";
    }
    s[..end].trim_end_matches('.')
}

/// Coerce free text typed into a currency field. Anything that does not
/// start with a number becomes zero, so "12abc" is 12 and "abc" is 0.
pub fn parse_amount(raw: &str) -> Decimal {
    let prefix = numeric_prefix(raw);
    if prefix.is_empty() {
        return Decimal::ZERO;
    }
    let (negative, digits) = match prefix.as_bytes()[0] {
        b'-' => (true, &prefix[1..]),
        b'+' => (false, &prefix[1..]),
        _ => (false, prefix),
    };
    let normalized = if digits.starts_with('.') {
        format!("0{}", digits)
    } else {
        digits.to_string()
    };
    let value = Decimal::from_str(&normalized).unwrap_or(Decimal::ZERO);
    if negative {
        -value
    } else {
        value
    }
}

/// Coerce free text typed into a count field. Fractions are truncated and
/// negatives become zero.
pub fn parse_count(raw: &str) -> u32 {
    let amount = parse_amount(raw).trunc();
    if amount <= Decimal::ZERO {
        return 0;
    }
    amount.to_u32().unwrap_or(u32::MAX)
}

/// Like `parse_count`, but blank input means "not set"
pub fn parse_optional_count(raw: &str) -> Option<u32> {
    if raw.trim().is_empty() {
        None
    } else {
        Some(parse_count(raw))
    }
}

// ============================================================================
// General Validations
// ============================================================================

/// Validate email format (basic check)
pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if email.contains('@') && email.contains('.') && email.len() >= 5 {
        Ok(())
    } else {
        Err("Invalid email format")
    }
}

/// Whole percentage between 0 and 100
pub fn validate_percentage(value: Decimal) -> Result<(), &'static str> {
    if value < Decimal::ZERO || value > Decimal::ONE_HUNDRED {
        return Err("Percentage must be between 0 and 100");
    }
    Ok(())
}

/// Checks a quote before it is sent to the record store
pub fn validate_quote(quote: &Quote) -> Result<(), &'static str> {
    if quote.options.is_empty() {
        return Err("Quote must have at least one option");
    }
    if !quote.customer.email.is_empty() {
        validate_email(&quote.customer.email)?;
    }
    validate_percentage(quote.budget.profit_target)?;
    validate_percentage(quote.budget.agent_commission)?;
    for option in &quote.options {
        if let Some(p) = option.profit_target {
            validate_percentage(p)?;
        }
        if let Some(c) = option.agent_commission {
            validate_percentage(c)?;
        }
    }
    if let Some(id) = quote.id.as_deref().filter(|id| !id.is_empty()) {
        if id.starts_with("rec") {
            validate_record_id(id)?;
        }
    }
    Ok(())
}
