//! Medusa store API client.
//!
//! # Architecture
//!
//! - Plain REST over `reqwest` with JSON bodies; no generated client
//! - The commerce backend is the source of truth - carts are re-read after
//!   every mutation rather than patched locally
//! - Every request carries the `x-publishable-api-key` header
//! - Cart reads pass a `fields` expansion so shipping methods and the
//!   payment collection (with its sessions) come back inline
//!
//! # Example
//!
//! ```rust,ignore
//! use driftwood_storefront::medusa::StoreClient;
//!
//! let client = StoreClient::new(&config.medusa);
//!
//! let cart = client.retrieve_cart("cart_01HX...").await?;
//! let options = client.list_shipping_options("cart_01HX...").await?;
//! ```

mod store;
pub mod types;

pub use store::{CART_FIELDS, StoreClient};
pub use types::*;

use thiserror::Error;

/// Errors that can occur when interacting with the Medusa store API.
#[derive(Debug, Error)]
pub enum MedusaError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned a structured error response.
    #[error("API error: {status} - {message}")]
    Api {
        /// HTTP status of the rejected request.
        status: u16,
        /// Message from the backend's error body.
        message: String,
    },

    /// API returned a non-success status without a parseable error body.
    #[error("Unexpected status: {status}")]
    UnexpectedStatus {
        /// HTTP status of the response.
        status: u16,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_medusa_error_display() {
        let err = MedusaError::NotFound("cart cart_123".to_string());
        assert_eq!(err.to_string(), "Not found: cart cart_123");

        let err = MedusaError::UnexpectedStatus { status: 503 };
        assert_eq!(err.to_string(), "Unexpected status: 503");
    }

    #[test]
    fn test_api_error_display_includes_message() {
        let err = MedusaError::Api {
            status: 400,
            message: "Shipping address is required".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "API error: 400 - Shipping address is required"
        );
    }
}
