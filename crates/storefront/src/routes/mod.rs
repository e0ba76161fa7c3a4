//! HTTP route handlers for the storefront checkout API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                         - Liveness check
//! GET  /health/ready                   - Readiness check (pings the backend)
//!
//! # Checkout
//! POST /checkout/cart                  - Attach a cart id to the session
//! POST /checkout/place-order           - Full checkout, default provider (form)
//!
//! # PayPal wallet
//! POST /checkout/paypal                - Open a PayPal session, return its order id
//! POST /checkout/paypal/complete       - Complete an approved cart
//! POST /checkout/paypal/place-order    - Approved-order one-shot checkout
//! ```

pub mod checkout;

use axum::{Router, routing::post};

use crate::state::AppState;

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/cart", post(checkout::attach_cart))
        .route("/place-order", post(checkout::place_order))
        .route("/paypal", post(checkout::prepare_paypal))
        .route("/paypal/complete", post(checkout::complete_paypal))
        .route("/paypal/place-order", post(checkout::place_order_with_paypal))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new().nest("/checkout", checkout_routes())
}
