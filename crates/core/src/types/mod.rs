//! Core types for Driftwood.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod country;
pub mod email;
pub mod region;

pub use country::{CountryCode, CountryCodeError};
pub use email::{Email, EmailError};
pub use region::RegionPolicy;
