use std::fmt;

/// Money is represented as integer cents to avoid floating-point precision
/// issues. For EUR/USD, 1 unit = 100 cents, so 12.34 = 1234 cents.
pub type Cents = i64;

/// Format cents as a human-readable amount string.
/// Example: 5000 -> "50.00", -1234 -> "-12.34"
pub fn format_cents(cents: Cents) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs_cents = cents.abs();
    format!("{}{}.{:02}", sign, abs_cents / 100, abs_cents % 100)
}

/// Parse a decimal amount into cents.
/// Accepts "50", "50.5", "50.00", ".50" and a leading sign; more than two
/// decimal digits are truncated. Anything else is rejected.
pub fn parse_cents(input: &str) -> Result<Cents, ParseCentsError> {
    let err = || ParseCentsError(input.to_string());

    let trimmed = input.trim();
    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    if digits.is_empty() {
        return Err(err());
    }

    let (units_str, frac_str) = match digits.split_once('.') {
        Some((units, frac)) => (units, frac),
        None => (digits, ""),
    };
    if units_str.is_empty() && frac_str.is_empty() {
        return Err(err());
    }
    if !units_str.bytes().all(|b| b.is_ascii_digit()) {
        return Err(err());
    }
    if !frac_str.bytes().all(|b| b.is_ascii_digit()) {
        return Err(err());
    }

    let units: i64 = if units_str.is_empty() {
        0
    } else {
        units_str.parse().map_err(|_| err())?
    };
    let frac: i64 = match frac_str.len() {
        0 => 0,
        // A single digit like "5" means 50 cents
        1 => frac_str.parse::<i64>().map_err(|_| err())? * 10,
        _ => frac_str[..2].parse().map_err(|_| err())?,
    };

    let cents = units * 100 + frac;
    Ok(if negative { -cents } else { cents })
}

/// Returned when an amount string fails to parse; carries the rejected input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseCentsError(pub String);

impl fmt::Display for ParseCentsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid money format: '{}'", self.0)
    }
}

impl std::error::Error for ParseCentsError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_cents() {
        assert_eq!(format_cents(5000), "50.00");
        assert_eq!(format_cents(1234), "12.34");
        assert_eq!(format_cents(1), "0.01");
        assert_eq!(format_cents(0), "0.00");
        assert_eq!(format_cents(-5000), "-50.00");
        assert_eq!(format_cents(-1), "-0.01");
    }

    #[test]
    fn test_parse_cents() {
        assert_eq!(parse_cents("50.00"), Ok(5000));
        assert_eq!(parse_cents("50"), Ok(5000));
        assert_eq!(parse_cents("12.34"), Ok(1234));
        assert_eq!(parse_cents("12.5"), Ok(1250));
        assert_eq!(parse_cents("0.01"), Ok(1));
        assert_eq!(parse_cents(".50"), Ok(50));
        assert_eq!(parse_cents(" 3.50 "), Ok(350));
        assert_eq!(parse_cents("-50.00"), Ok(-5000));
        assert_eq!(parse_cents("+2"), Ok(200));
        assert_eq!(parse_cents("100.999"), Ok(10099)); // Truncates
    }

    #[test]
    fn test_parse_cents_invalid() {
        assert!(parse_cents("abc").is_err());
        assert!(parse_cents("").is_err());
        assert!(parse_cents(".").is_err());
        assert!(parse_cents("-").is_err());
        assert!(parse_cents("12.34.56").is_err());
        assert!(parse_cents("12.3x").is_err());
        assert!(parse_cents("1 2").is_err());
    }
}
