//! HTTP handlers
//!
//! - [`account`]: account CRUD and entry listing
//! - [`transfer`]: transfer posting and lookup
//! - [`health`]: liveness of the ledger store

pub mod account;
pub mod health;
pub mod transfer;

pub use account::{
    CreateAccountRequest, PageQuery, UpdateAccountRequest, create_account, delete_account,
    get_account, list_accounts, list_entries, update_account,
};
pub use health::{HealthResponse, health_check};
pub use transfer::{CreateTransferRequest, create_transfer, get_transfer};

use super::types::ApiError;

/// Parse a positive numeric id from a path segment
pub(crate) fn parse_id(raw: &str, what: &str) -> Result<i64, ApiError> {
    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ApiError::bad_request(format!("Invalid {} id: {}", what, raw))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("42", "account").unwrap(), 42);
        assert!(parse_id("0", "account").is_err());
        assert!(parse_id("-3", "account").is_err());
        let err = parse_id("abc", "transfer").unwrap_err();
        assert_eq!(err.msg, "Invalid transfer id: abc");
    }
}
