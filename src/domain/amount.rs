use std::fmt;

/// Monetary amounts are plain decimals. Fee rules key on half values
/// (`total / 2`), so comparisons go through [`amounts_equal`].
pub type Amount = f64;

/// Absolute tolerance for comparing amounts.
pub const AMOUNT_EPSILON: f64 = 1e-6;

pub fn amounts_equal(a: Amount, b: Amount) -> bool {
    (a - b).abs() <= AMOUNT_EPSILON
}

/// Non-finite values count as zero in sums.
pub fn finite_or_zero(value: Amount) -> Amount {
    if value.is_finite() { value } else { 0.0 }
}

/// Format an amount for display and export.
/// Whole values drop the fractional part: 20.0 -> "20", 27.5 -> "27.5".
pub fn format_amount(amount: Amount) -> String {
    if amount.fract() == 0.0 && amount.abs() < 1e15 {
        format!("{}", amount as i64)
    } else {
        format!("{}", amount)
    }
}

/// Parse a decimal string into an amount.
/// Example: "50" -> 50.0, "52.5" -> 52.5, ".5" -> 0.5
pub fn parse_amount(input: &str) -> Result<Amount, ParseAmountError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(ParseAmountError::Empty);
    }

    let value: f64 = input
        .parse()
        .map_err(|_| ParseAmountError::InvalidFormat)?;

    if !value.is_finite() {
        return Err(ParseAmountError::InvalidFormat);
    }
    Ok(value)
}

/// Parse an optional CSV cell: empty means absent.
pub fn parse_optional_amount(input: &str) -> Result<Option<Amount>, ParseAmountError> {
    if input.trim().is_empty() {
        Ok(None)
    } else {
        parse_amount(input).map(Some)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseAmountError {
    Empty,
    InvalidFormat,
}

impl fmt::Display for ParseAmountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseAmountError::Empty => write!(f, "empty amount"),
            ParseAmountError::InvalidFormat => write!(f, "invalid amount format"),
        }
    }
}

impl std::error::Error for ParseAmountError {}
