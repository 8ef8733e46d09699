//! Gateway types module
//!
//! ## Input Types
//! - [`PositiveAmount`]: Format-validated transfer amount
//!
//! ## Output Types
//! - [`ApiResponse<T>`]: Unified API response wrapper
//! - [`ApiError`]: Error response with HTTP status and error code
//!
//! ## Submodules
//! - [`money`]: Money types
//! - [`response`]: Response types and error codes

pub mod money;
pub mod response;

// Re-export commonly used types at module root
pub use money::PositiveAmount;
pub use response::{
    AccountDeleted, ApiError, ApiResponse, ApiResult, TransferDetails, error_codes, ok,
};
