//! Checkout flow: address, shipping, payment, order placement.
//!
//! # Architecture
//!
//! - [`flow::CheckoutFlow`] drives the sequence; route handlers own one
//!   flow per request
//! - [`ops::CartOperations`] abstracts the backend so the flow can be
//!   exercised against a scripted fake
//! - [`payment::PaymentStrategy`] keeps provider differences (manual
//!   capture vs. PayPal wallet approval) out of the flow itself
//! - Region gating lives in one place: [`address::validate`] checks the
//!   country against [`driftwood_core::RegionPolicy`] before any backend
//!   call
//!
//! # Example
//!
//! ```rust,ignore
//! use driftwood_storefront::checkout::{CheckoutFlow, ManualPayment};
//!
//! let strategy = ManualPayment::new(config.checkout.default_provider_id.clone());
//! let mut flow = CheckoutFlow::new(state.store(), cart_id, state.region_policy().clone());
//! let completion = flow.run(&input, same_as_billing, &strategy).await?;
//! ```

pub mod address;
pub mod error;
pub mod flow;
pub mod ops;
pub mod payment;
pub mod shipping;

pub use address::{AddressInput, ValidAddress, validate};
pub use error::CheckoutError;
pub use flow::{CheckoutFlow, CheckoutState};
pub use ops::CartOperations;
pub use payment::{
    Completion, ManualPayment, PaymentStrategy, SessionOutcome, WalletPayment, confirmation_path,
};
pub use shipping::SelectionPolicy;
