//! Driftwood Core - Shared types library.
//!
//! This crate provides common types used across Driftwood components:
//! - `storefront` - Public-facing checkout service
//! - `integration-tests` - Cross-crate behavior tests
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no HTTP clients.
//! This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for emails, country codes, and the region policy

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
