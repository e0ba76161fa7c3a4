//! Checkout failure modes.

use driftwood_core::CountryCode;
use thiserror::Error;

use crate::medusa::MedusaError;

/// Errors the checkout flow can surface.
///
/// The `Display` impl is the internal/log form. [`CheckoutError::user_message`]
/// produces the client-safe string shown to shoppers; backend transport
/// details never leak through it.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// A required address field was blank.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// A field was present but failed validation.
    #[error("invalid {field}: {message}")]
    InvalidField {
        /// Name of the rejected field.
        field: &'static str,
        /// What was wrong with it.
        message: String,
    },

    /// The shipping country is outside the supported region.
    #[error("unsupported shipping country {requested} (supported: {supported})")]
    RegionRestricted {
        /// Country the shopper asked for.
        requested: CountryCode,
        /// Country the store ships to.
        supported: CountryCode,
    },

    /// The session's cart id no longer resolves to a cart.
    #[error("cart not found")]
    CartMissing,

    /// The backend accepted the address update but the re-read cart has no
    /// shipping address.
    #[error("shipping address missing after update")]
    AddressNotPersisted,

    /// The backend offered no shipping options for the cart.
    #[error("no shipping options available for cart")]
    NoShippingOptions,

    /// The backend accepted the shipping method but the re-read cart has no
    /// shipping methods.
    #[error("shipping method missing after update")]
    ShippingNotPersisted,

    /// A payment provider session was created but is unusable (e.g. no
    /// external order id where one is required).
    #[error("payment session unusable for provider {provider}")]
    PaymentIntegration {
        /// Display label of the payment strategy.
        provider: String,
    },

    /// The backend refused to convert the cart into an order.
    #[error("cart completion rejected by backend")]
    PlacementFailed,

    /// A backend call failed underneath checkout.
    #[error(transparent)]
    Backend(#[from] MedusaError),
}

impl CheckoutError {
    /// The message shown to the shopper.
    ///
    /// Structured backend rejections (`MedusaError::Api`) pass their message
    /// through, since those describe the shopper's own input. Transport and
    /// parse failures collapse to a generic retry message.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::MissingField(field) => format!("missing required field: {field}"),
            Self::InvalidField { field, message } => format!("invalid {field}: {message}"),
            Self::RegionRestricted { supported, .. } => {
                format!("we currently only ship to {}", supported.to_display_upper())
            }
            Self::CartMissing => "cart not found".to_string(),
            Self::AddressNotPersisted => "failed to set shipping address".to_string(),
            Self::NoShippingOptions => "no shipping options available".to_string(),
            Self::ShippingNotPersisted => "failed to set shipping method".to_string(),
            Self::PaymentIntegration { provider } => {
                format!("failed to create {provider} order")
            }
            Self::PlacementFailed => "order placement failed".to_string(),
            Self::Backend(MedusaError::Api { message, .. }) => message.clone(),
            Self::Backend(_) => "something went wrong, please try again".to_string(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_message() {
        let err = CheckoutError::MissingField("last_name");
        assert_eq!(err.user_message(), "missing required field: last_name");
    }

    #[test]
    fn test_region_message_uses_uppercase_code() {
        let err = CheckoutError::RegionRestricted {
            requested: CountryCode::parse("ca").unwrap(),
            supported: CountryCode::parse("us").unwrap(),
        };
        assert_eq!(err.user_message(), "we currently only ship to US");
    }

    #[test]
    fn test_api_rejection_passes_through() {
        let err = CheckoutError::Backend(MedusaError::Api {
            status: 400,
            message: "Invalid postal code".to_string(),
        });
        assert_eq!(err.user_message(), "Invalid postal code");
    }

    #[test]
    fn test_transport_failure_is_generic() {
        let err = CheckoutError::Backend(MedusaError::UnexpectedStatus { status: 502 });
        assert_eq!(err.user_message(), "something went wrong, please try again");
        // Internal detail stays in Display, off the user path
        assert!(err.to_string().contains("502"));
    }

    #[test]
    fn test_payment_integration_names_provider() {
        let err = CheckoutError::PaymentIntegration {
            provider: "PayPal".to_string(),
        };
        assert_eq!(err.user_message(), "failed to create PayPal order");
    }
}
