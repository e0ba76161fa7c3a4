//! Driftwood Storefront library.
//!
//! This crate provides the checkout service functionality as a library,
//! allowing it to be tested and reused.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod checkout;
pub mod config;
pub mod error;
pub mod medusa;
pub mod middleware;
pub mod routes;
pub mod state;
