//! Inventory backend boundary
//!
//! The pipeline talks to the backend through [`InventoryApi`] so the CLI can
//! wire the HTTP client while tests substitute an in-memory fake.

pub mod client;
pub mod types;

pub use client::HttpInventoryApi;
pub use types::{AssetPayload, BulkCreateResponse, NewOptionsReport, PeripheralPayload};

use thiserror::Error;

/// Errors from the backend boundary
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Backend returned {status}: {message}")]
    Backend { status: u16, message: String },

    #[error("Unexpected response shape: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    /// Whether this failure is the backend rejecting records it already
    /// holds. Re-importing the same file is a steady-state outcome, so the
    /// orchestrator reports it as a soft success rather than a hard error.
    pub fn is_duplicate_rejection(&self) -> bool {
        let message = match self {
            ApiError::Backend { message, .. } => message,
            _ => return false,
        };
        let lower = message.to_lowercase();
        lower.contains("already exist") || lower.contains("duplicate")
    }
}

/// What the import pipeline needs from the inventory backend.
pub trait InventoryApi {
    /// Create assets in bulk. `mode` tells the server whether invalid
    /// records were filtered client-side or should be skipped server-side.
    fn bulk_create(
        &self,
        assets: &[AssetPayload],
        mode: &str,
    ) -> Result<BulkCreateResponse, ApiError>;

    /// Report which reference-data values the payload would introduce.
    fn precheck_new_options(&self, assets: &[AssetPayload]) -> Result<NewOptionsReport, ApiError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_rejection_is_detected_case_insensitively() {
        let err = ApiError::Backend {
            status: 409,
            message: "Assets Already Exist in inventory".into(),
        };
        assert!(err.is_duplicate_rejection());

        let err = ApiError::Backend {
            status: 400,
            message: "duplicate serial numbers".into(),
        };
        assert!(err.is_duplicate_rejection());

        let err = ApiError::Backend {
            status: 500,
            message: "internal error".into(),
        };
        assert!(!err.is_duplicate_rejection());
    }
}
