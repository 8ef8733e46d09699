//! Transfer handlers

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use super::super::state::AppState;
use super::super::types::{ApiError, ApiResult, PositiveAmount, TransferDetails, ok};
use super::parse_id;
use crate::account::validation::validate_currency;
use crate::ledger::StoreError;
use crate::transfer::{PostedTransfer, TransferRequest};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateTransferRequest {
    #[validate(range(min = 1))]
    #[schema(example = 1)]
    pub from_account_id: i64,
    #[validate(range(min = 1))]
    #[schema(example = 2)]
    pub to_account_id: i64,
    /// Positive amount, as a string or number
    #[schema(value_type = String, example = "20.00")]
    pub amount: PositiveAmount,
    #[validate(custom(function = "validate_currency"))]
    #[schema(example = "USD")]
    pub currency: String,
}

impl CreateTransferRequest {
    fn into_request(self) -> TransferRequest {
        TransferRequest::new(
            self.from_account_id,
            self.to_account_id,
            self.amount.inner(),
            self.currency.trim(),
        )
    }
}

/// Post a transfer
///
/// POST /api/v1/transfers
///
/// Records the transfer, a debit and a credit entry, and moves both balances
/// in one transaction. Repeating a request posts a second transfer.
#[utoipa::path(
    post,
    path = "/api/v1/transfers",
    request_body = CreateTransferRequest,
    responses(
        (status = 200, description = "Transfer committed", body = PostedTransfer, content_type = "application/json"),
        (status = 400, description = "Invalid request, unknown account, currency mismatch, insufficient funds, or a rejected step"),
        (status = 409, description = "Concurrent update conflict; nothing was applied"),
        (status = 500, description = "Store or transaction failure; nothing was applied")
    ),
    tag = "Transfer"
)]
pub async fn create_transfer(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateTransferRequest>, JsonRejection>,
) -> ApiResult<PostedTransfer> {
    let Json(req) = payload?;
    req.validate()?;

    let posted = state
        .orchestrator
        .post_transfer(req.into_request())
        .await
        .map_err(|e| {
            let err = ApiError::from(e);
            if err.status.is_server_error() {
                tracing::error!(code = err.code, error = %err.msg, "Transfer failed");
            } else {
                tracing::debug!(code = err.code, error = %err.msg, "Transfer rejected");
            }
            err
        })?;
    ok(posted)
}

/// Get a transfer with its entries
///
/// GET /api/v1/transfers/{id}
#[utoipa::path(
    get,
    path = "/api/v1/transfers/{id}",
    params(("id" = i64, Path, description = "Transfer ID")),
    responses(
        (status = 200, description = "Transfer and its debit/credit entries", body = TransferDetails, content_type = "application/json"),
        (status = 400, description = "Malformed id or transfer not found")
    ),
    tag = "Transfer"
)]
pub async fn get_transfer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<TransferDetails> {
    let id = parse_id(&id, "transfer")?;
    let transfer = state
        .store
        .get_transfer(id)
        .await?
        .ok_or(StoreError::TransferNotFound(id))?;
    let entries = state.store.list_transfer_entries(id).await?;
    ok(TransferDetails { transfer, entries })
}
