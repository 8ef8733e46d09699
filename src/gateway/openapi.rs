//! OpenAPI / Swagger UI Documentation
//!
//! - Swagger UI: `http://localhost:8080/docs`
//! - OpenAPI JSON: `http://localhost:8080/api-docs/openapi.json`

use utoipa::OpenApi;

use crate::gateway::handlers::{
    CreateAccountRequest, CreateTransferRequest, HealthResponse, UpdateAccountRequest,
};
use crate::gateway::types::{AccountDeleted, TransferDetails};
use crate::ledger::{Account, Entry, Transfer};
use crate::transfer::PostedTransfer;

/// Main API Documentation struct
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Fund Transfer API",
        version = "1.0.0",
        description = "Account management and atomic double-entry transfers between accounts of the same currency.",
        license(
            name = "MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Development"),
    ),
    paths(
        crate::gateway::handlers::health::health_check,
        crate::gateway::handlers::account::create_account,
        crate::gateway::handlers::account::list_accounts,
        crate::gateway::handlers::account::get_account,
        crate::gateway::handlers::account::update_account,
        crate::gateway::handlers::account::delete_account,
        crate::gateway::handlers::account::list_entries,
        crate::gateway::handlers::transfer::create_transfer,
        crate::gateway::handlers::transfer::get_transfer,
    ),
    components(
        schemas(
            HealthResponse,
            Account,
            Transfer,
            Entry,
            CreateAccountRequest,
            UpdateAccountRequest,
            CreateTransferRequest,
            PostedTransfer,
            TransferDetails,
            AccountDeleted,
        )
    ),
    tags(
        (name = "Account", description = "Account CRUD and ledger entries"),
        (name = "Transfer", description = "Atomic fund transfers"),
        (name = "System", description = "Health checks")
    )
)]
pub struct ApiDoc;
