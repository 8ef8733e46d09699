//! Money types for API boundary enforcement
//!
//! - `PositiveAmount`: format-validated, strictly positive transfer amount

use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};

/// Maximum fractional digits the ledger stores (`NUMERIC(20, 4)`)
pub const AMOUNT_SCALE: u32 = 4;

/// Exclusive upper bound: 16 integer digits
pub const AMOUNT_LIMIT: i64 = crate::ledger::models::BALANCE_LIMIT;

// ============================================================================
// PositiveAmount: Format-Validated Decimal at Serde Layer
// ============================================================================

/// Strictly positive amount, validated during deserialization
///
/// Accepts a JSON string (`"20.50"`) or number (`20.5`):
/// - Rejects `.5` (must be `0.5`) and `5.` (must be `5` or `5.0`)
/// - Rejects scientific notation and a `+` prefix
/// - Rejects zero and negative values
/// - Rejects more than 4 fractional digits or 16 integer digits
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositiveAmount(Decimal);

impl PositiveAmount {
    pub fn new(d: Decimal) -> Result<Self, String> {
        if d <= Decimal::ZERO {
            return Err("Amount must be greater than zero".to_string());
        }
        if d.normalize().scale() > AMOUNT_SCALE {
            return Err(format!(
                "Amount supports at most {} decimal places",
                AMOUNT_SCALE
            ));
        }
        if d >= Decimal::from(AMOUNT_LIMIT) {
            return Err("Amount is too large".to_string());
        }
        Ok(Self(d))
    }

    pub fn parse(s: &str) -> Result<Self, String> {
        if s.is_empty() {
            return Err("Amount cannot be empty".to_string());
        }
        if s.starts_with('.') {
            return Err("Invalid format: use 0.5 not .5".to_string());
        }
        if s.ends_with('.') {
            return Err("Invalid format: use 5.0 not 5.".to_string());
        }
        if s.contains('e') || s.contains('E') {
            return Err("Invalid format: scientific notation not allowed".to_string());
        }
        if s.starts_with('+') {
            return Err("Invalid format: + prefix not allowed".to_string());
        }

        let d = Decimal::from_str(s).map_err(|e| format!("Invalid decimal: {}", e))?;
        Self::new(d)
    }

    pub fn inner(self) -> Decimal {
        self.0
    }
}

impl std::ops::Deref for PositiveAmount {
    type Target = Decimal;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<'de> Deserialize<'de> for PositiveAmount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::Error;

        // Support both JSON number and JSON string
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum DecimalOrString {
            String(String),
            Number(Decimal),
        }

        match DecimalOrString::deserialize(deserializer)? {
            DecimalOrString::String(s) => Self::parse(&s).map_err(D::Error::custom),
            DecimalOrString::Number(d) => Self::new(d).map_err(D::Error::custom),
        }
    }
}

impl Serialize for PositiveAmount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        // Serialize as string to preserve precision
        serializer.serialize_str(&self.0.to_string())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_json(json: &str) -> Result<PositiveAmount, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[test]
    fn test_accepts_string_and_number() {
        assert_eq!(
            *parse_json(r#""20.50""#).unwrap(),
            Decimal::from_str("20.5").unwrap()
        );
        assert_eq!(*parse_json("20").unwrap(), Decimal::from(20));
        assert_eq!(
            *parse_json("0.25").unwrap(),
            Decimal::from_str("0.25").unwrap()
        );
    }

    #[test]
    fn test_rejects_non_positive() {
        assert!(parse_json(r#""0""#).is_err());
        assert!(parse_json("0").is_err());
        assert!(parse_json(r#""-5""#).is_err());
        assert!(parse_json("-5").is_err());
    }

    #[test]
    fn test_rejects_bad_formats() {
        let err = parse_json(r#"".5""#).unwrap_err();
        assert!(err.to_string().contains("use 0.5 not .5"));

        let err = parse_json(r#""5.""#).unwrap_err();
        assert!(err.to_string().contains("use 5.0 not 5."));

        let err = parse_json(r#""1e3""#).unwrap_err();
        assert!(err.to_string().contains("scientific notation"));

        assert!(parse_json(r#""+5""#).is_err());
        assert!(parse_json(r#""""#).is_err());
        assert!(parse_json(r#""abc""#).is_err());
        assert!(parse_json("true").is_err());
    }

    #[test]
    fn test_precision_and_range() {
        assert!(PositiveAmount::parse("1.2345").is_ok());
        // Trailing zeros do not count against the scale
        assert!(PositiveAmount::parse("1.23450").is_ok());
        assert!(PositiveAmount::parse("1.23456").is_err());
        assert!(PositiveAmount::parse("9999999999999999.9999").is_ok());
        assert!(PositiveAmount::parse("10000000000000000").is_err());
    }

    #[test]
    fn test_serializes_as_string() {
        let amount = PositiveAmount::parse("12.5").unwrap();
        assert_eq!(serde_json::to_string(&amount).unwrap(), r#""12.5""#);
    }
}
