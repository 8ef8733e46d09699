//! Input validation for currency codes and owner names
//!
//! [`CurrencyCode`] keeps its field private so a value can only be built
//! through [`CurrencyCode::new`]. The `validate_*` functions plug the same
//! rules into `#[derive(Validate)]` request types.

use std::fmt;

/// Currencies accounts may be opened in
pub const SUPPORTED_CURRENCIES: &[&str] = &["USD", "EUR", "CAD", "GBP", "INR"];

pub const OWNER_MAX_LEN: usize = 255;

// ============================================================================
// Validation Errors
// ============================================================================

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ValidationError {
    #[error("Currency must be uppercase: got '{got}', expected '{expected}'")]
    CurrencyNotUppercase { got: String, expected: String },

    #[error("Unsupported currency '{0}'")]
    UnsupportedCurrency(String),

    #[error("Invalid length for {field}: expected {min}-{max}, got {actual}")]
    InvalidLength {
        field: &'static str,
        min: usize,
        max: usize,
        actual: usize,
    },
}

impl ValidationError {
    fn code(&self) -> &'static str {
        match self {
            ValidationError::CurrencyNotUppercase { .. } => "currency_not_uppercase",
            ValidationError::UnsupportedCurrency(_) => "unsupported_currency",
            ValidationError::InvalidLength { .. } => "invalid_length",
        }
    }
}

impl From<ValidationError> for validator::ValidationError {
    fn from(err: ValidationError) -> Self {
        validator::ValidationError::new(err.code()).with_message(err.to_string().into())
    }
}

// ============================================================================
// CurrencyCode
// ============================================================================

/// Validated currency code (three uppercase letters, on the supported list)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// # Examples
    /// ```
    /// use fund_transfer::account::validation::CurrencyCode;
    ///
    /// let usd = CurrencyCode::new("USD").unwrap();
    /// assert_eq!(usd.as_str(), "USD");
    ///
    /// assert!(CurrencyCode::new("usd").is_err()); // lowercase rejected
    /// assert!(CurrencyCode::new("XYZ").is_err()); // not supported
    /// ```
    pub fn new(code: &str) -> Result<Self, ValidationError> {
        let code = code.trim();

        if code.len() != 3 {
            return Err(ValidationError::InvalidLength {
                field: "currency",
                min: 3,
                max: 3,
                actual: code.len(),
            });
        }

        let expected = code.to_uppercase();
        if code != expected {
            return Err(ValidationError::CurrencyNotUppercase {
                got: code.to_string(),
                expected,
            });
        }

        if !SUPPORTED_CURRENCIES.contains(&code) {
            return Err(ValidationError::UnsupportedCurrency(code.to_string()));
        }

        Ok(Self(code.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for CurrencyCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ============================================================================
// validator hooks
// ============================================================================

pub fn validate_currency(code: &str) -> Result<(), validator::ValidationError> {
    CurrencyCode::new(code).map(|_| ()).map_err(Into::into)
}

/// Owner must be non-blank and fit the column
pub fn validate_owner(owner: &str) -> Result<(), validator::ValidationError> {
    let len = owner.trim().chars().count();
    if len == 0 || owner.len() > OWNER_MAX_LEN {
        return Err(ValidationError::InvalidLength {
            field: "owner",
            min: 1,
            max: OWNER_MAX_LEN,
            actual: len,
        }
        .into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_valid() {
        for code in SUPPORTED_CURRENCIES {
            assert!(CurrencyCode::new(code).is_ok(), "{} should be valid", code);
        }
        // Surrounding whitespace is tolerated
        assert_eq!(CurrencyCode::new(" EUR ").unwrap().as_str(), "EUR");
    }

    #[test]
    fn test_currency_uppercase_required() {
        let err = CurrencyCode::new("usd").unwrap_err();
        assert!(matches!(err, ValidationError::CurrencyNotUppercase { .. }));

        let err = CurrencyCode::new("Eur").unwrap_err();
        assert!(matches!(err, ValidationError::CurrencyNotUppercase { .. }));
    }

    #[test]
    fn test_currency_invalid_length() {
        let err = CurrencyCode::new("").unwrap_err();
        assert!(matches!(err, ValidationError::InvalidLength { .. }));

        let err = CurrencyCode::new("USDT").unwrap_err();
        assert!(matches!(err, ValidationError::InvalidLength { .. }));
    }

    #[test]
    fn test_currency_unsupported() {
        assert_eq!(
            CurrencyCode::new("XYZ").unwrap_err(),
            ValidationError::UnsupportedCurrency("XYZ".to_string())
        );
    }

    #[test]
    fn test_validator_hooks() {
        assert!(validate_currency("USD").is_ok());
        let err = validate_currency("BTC").unwrap_err();
        assert_eq!(err.code, "unsupported_currency");

        assert!(validate_owner("rahul").is_ok());
        assert!(validate_owner("   ").is_err());
        assert!(validate_owner(&"x".repeat(OWNER_MAX_LEN + 1)).is_err());
    }
}
