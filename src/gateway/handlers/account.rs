//! Account CRUD handlers

use std::sync::Arc;

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::super::state::AppState;
use super::super::types::{
    AccountDeleted, ApiError, ApiResult,
    money::{AMOUNT_LIMIT, AMOUNT_SCALE},
    ok,
};
use super::parse_id;
use crate::account::validation::{validate_currency, validate_owner};
use crate::ledger::{Account, AccountChanges, Entry, NewAccount, Page, StoreError};

// ============================================================================
// Request types
// ============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateAccountRequest {
    #[validate(custom(function = "validate_currency"))]
    #[schema(example = "USD")]
    pub currency: String,
    #[validate(custom(function = "validate_owner"))]
    #[schema(example = "rahul")]
    pub owner: String,
    /// Opening balance, defaults to 0
    #[serde(default)]
    #[schema(value_type = Option<String>, example = "100.00")]
    pub balance: Option<Decimal>,
}

/// Only currency and owner can change; a `balance` field is rejected
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateAccountRequest {
    #[validate(custom(function = "validate_currency"))]
    #[schema(example = "EUR")]
    pub currency: Option<String>,
    #[validate(custom(function = "validate_owner"))]
    pub owner: Option<String>,
}

/// Highest page number a listing accepts
pub const MAX_PAGE_ID: i64 = 1_000_000;

#[derive(Debug, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// 1-based page number
    #[validate(range(min = 1, max = MAX_PAGE_ID))]
    #[param(minimum = 1, maximum = 1_000_000, example = 1)]
    pub page_id: i64,
    #[validate(range(min = 5, max = 10))]
    #[param(minimum = 5, maximum = 10, example = 5)]
    pub page_size: i64,
}

impl PageQuery {
    pub fn into_page(self) -> Page {
        Page::new(self.page_id, self.page_size)
    }
}

fn opening_balance(balance: Option<Decimal>) -> Result<Decimal, ApiError> {
    let balance = balance.unwrap_or(Decimal::ZERO);
    if balance < Decimal::ZERO {
        return Err(ApiError::bad_request("Opening balance cannot be negative"));
    }
    if balance.normalize().scale() > AMOUNT_SCALE {
        return Err(ApiError::bad_request(format!(
            "Opening balance supports at most {} decimal places",
            AMOUNT_SCALE
        )));
    }
    if balance >= Decimal::from(AMOUNT_LIMIT) {
        return Err(ApiError::bad_request("Opening balance is too large"));
    }
    Ok(balance)
}

// ============================================================================
// Handlers
// ============================================================================

/// Create account
///
/// POST /api/v1/accounts
#[utoipa::path(
    post,
    path = "/api/v1/accounts",
    request_body = CreateAccountRequest,
    responses(
        (status = 200, description = "Account created", body = Account, content_type = "application/json"),
        (status = 400, description = "Invalid currency, owner or balance")
    ),
    tag = "Account"
)]
pub async fn create_account(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateAccountRequest>, JsonRejection>,
) -> ApiResult<Account> {
    let Json(req) = payload?;
    req.validate()?;

    let account = state
        .store
        .create_account(NewAccount {
            currency: req.currency.trim().to_string(),
            owner: req.owner.trim().to_string(),
            opening_balance: opening_balance(req.balance)?,
        })
        .await?;

    tracing::info!(account_id = account.id, currency = %account.currency, "Account created");
    ok(account)
}

/// List accounts
///
/// GET /api/v1/accounts?page_id=1&page_size=5
#[utoipa::path(
    get,
    path = "/api/v1/accounts",
    params(PageQuery),
    responses(
        (status = 200, description = "One page of accounts, ordered by id", body = Vec<Account>, content_type = "application/json"),
        (status = 400, description = "Invalid paging parameters")
    ),
    tag = "Account"
)]
pub async fn list_accounts(
    State(state): State<Arc<AppState>>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> ApiResult<Vec<Account>> {
    let Query(query) = query?;
    query.validate()?;

    let accounts = state.store.list_accounts(query.into_page()).await?;
    ok(accounts)
}

/// Get account by id
///
/// GET /api/v1/accounts/{id}
#[utoipa::path(
    get,
    path = "/api/v1/accounts/{id}",
    params(("id" = i64, Path, description = "Account ID")),
    responses(
        (status = 200, description = "Account", body = Account, content_type = "application/json"),
        (status = 400, description = "Malformed id or account not found")
    ),
    tag = "Account"
)]
pub async fn get_account(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Account> {
    let id = parse_id(&id, "account")?;
    match state.store.get_account(id).await? {
        Some(account) => ok(account),
        None => ApiError::from(StoreError::AccountNotFound(id)).into_err(),
    }
}

/// Update account currency and/or owner
///
/// PUT /api/v1/accounts/{id}
#[utoipa::path(
    put,
    path = "/api/v1/accounts/{id}",
    params(("id" = i64, Path, description = "Account ID")),
    request_body = UpdateAccountRequest,
    responses(
        (status = 200, description = "Updated account", body = Account, content_type = "application/json"),
        (status = 400, description = "Invalid fields, balance supplied, or account not found")
    ),
    tag = "Account"
)]
pub async fn update_account(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateAccountRequest>, JsonRejection>,
) -> ApiResult<Account> {
    let id = parse_id(&id, "account")?;
    let Json(req) = payload?;
    req.validate()?;

    let changes = AccountChanges {
        currency: req.currency.map(|c| c.trim().to_string()),
        owner: req.owner.map(|o| o.trim().to_string()),
    };
    if changes.is_empty() {
        return ApiError::bad_request("Nothing to update: supply currency and/or owner").into_err();
    }

    let account = state.store.update_account(id, changes).await?;
    tracing::info!(account_id = id, "Account updated");
    ok(account)
}

/// Delete account
///
/// DELETE /api/v1/accounts/{id}
///
/// Fails while any transfer or entry references the account.
#[utoipa::path(
    delete,
    path = "/api/v1/accounts/{id}",
    params(("id" = i64, Path, description = "Account ID")),
    responses(
        (status = 200, description = "Account deleted", body = AccountDeleted, content_type = "application/json"),
        (status = 400, description = "Account not found or still referenced")
    ),
    tag = "Account"
)]
pub async fn delete_account(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<AccountDeleted> {
    let id = parse_id(&id, "account")?;
    state.store.delete_account(id).await?;
    tracing::info!(account_id = id, "Account deleted");
    ok(AccountDeleted { id, deleted: true })
}

/// List ledger entries of an account, newest first
///
/// GET /api/v1/accounts/{id}/entries?page_id=1&page_size=5
#[utoipa::path(
    get,
    path = "/api/v1/accounts/{id}/entries",
    params(
        ("id" = i64, Path, description = "Account ID"),
        PageQuery
    ),
    responses(
        (status = 200, description = "One page of entries", body = Vec<Entry>, content_type = "application/json"),
        (status = 400, description = "Invalid parameters or account not found")
    ),
    tag = "Account"
)]
pub async fn list_entries(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> ApiResult<Vec<Entry>> {
    let id = parse_id(&id, "account")?;
    let Query(query) = query?;
    query.validate()?;

    if state.store.get_account(id).await?.is_none() {
        return ApiError::from(StoreError::AccountNotFound(id)).into_err();
    }
    let entries = state.store.list_entries(id, query.into_page()).await?;
    ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_rejects_unknown_fields() {
        let result: Result<CreateAccountRequest, _> =
            serde_json::from_str(r#"{"currency":"USD","owner":"a","id":3}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_update_request_rejects_balance() {
        let result: Result<UpdateAccountRequest, _> =
            serde_json::from_str(r#"{"owner":"a","balance":"100"}"#);
        assert!(result.unwrap_err().to_string().contains("balance"));
    }

    #[test]
    fn test_create_request_validation() {
        let req: CreateAccountRequest =
            serde_json::from_str(r#"{"currency":"USD","owner":"rahul","balance":24.5}"#).unwrap();
        assert!(req.validate().is_ok());
        assert_eq!(req.balance, Some(Decimal::new(245, 1)));

        let req: CreateAccountRequest =
            serde_json::from_str(r#"{"currency":"usd","owner":" "}"#).unwrap();
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("currency"));
        assert!(fields.contains_key("owner"));
    }

    #[test]
    fn test_page_query_bounds() {
        let ok = PageQuery {
            page_id: 1,
            page_size: 5,
        };
        assert!(ok.validate().is_ok());

        let last = PageQuery {
            page_id: MAX_PAGE_ID,
            page_size: 10,
        };
        assert!(last.validate().is_ok());

        for (page_id, page_size) in [
            (0, 5),
            (1, 4),
            (1, 11),
            (MAX_PAGE_ID + 1, 5),
            (i64::MAX, 10),
        ] {
            let q = PageQuery { page_id, page_size };
            assert!(q.validate().is_err(), "{} / {}", page_id, page_size);
        }
    }

    #[test]
    fn test_opening_balance_rules() {
        assert_eq!(opening_balance(None).unwrap(), Decimal::ZERO);
        assert!(opening_balance(Some(Decimal::new(-1, 0))).is_err());
        assert!(opening_balance(Some(Decimal::new(123456, 5))).is_err());
        assert!(opening_balance(Some(Decimal::from(AMOUNT_LIMIT))).is_err());
        assert!(opening_balance(Some(Decimal::MAX)).is_err());
        assert!(opening_balance(Some(Decimal::from(AMOUNT_LIMIT - 1))).is_ok());
        assert_eq!(
            opening_balance(Some(Decimal::new(2400, 2))).unwrap(),
            Decimal::new(24, 0)
        );
    }
}
