//! Shipping address validation and persistence.
//!
//! Validation is pure and runs before any backend call, so a rejected
//! address never touches the cart. [`commit`] writes the validated address
//! and re-reads the cart to confirm the backend actually stored it.

use driftwood_core::{CountryCode, Email, RegionPolicy};
use tracing::instrument;

use crate::checkout::error::CheckoutError;
use crate::checkout::ops::CartOperations;
use crate::medusa::types::{Address, Cart, CartUpdate};

/// Raw address fields as submitted by the shopper.
///
/// All fields arrive as strings; `province` and `phone` may be blank.
#[derive(Debug, Clone, Default)]
pub struct AddressInput {
    /// Contact email.
    pub email: String,
    /// Recipient first name.
    pub first_name: String,
    /// Recipient last name.
    pub last_name: String,
    /// Street address line.
    pub address_1: String,
    /// City name.
    pub city: String,
    /// State or province. Optional.
    pub province: String,
    /// Postal or ZIP code.
    pub postal_code: String,
    /// Two-letter country code, any case.
    pub country_code: String,
    /// Contact phone number. Optional.
    pub phone: String,
}

/// An address that passed validation and the region gate.
#[derive(Debug, Clone)]
pub struct ValidAddress {
    /// Normalized contact email.
    pub email: Email,
    /// Normalized shipping country.
    pub country: CountryCode,
    /// The address in backend form, trimmed, with blanks mapped to `None`.
    pub address: Address,
}

/// Validate raw address input against required fields and the region policy.
///
/// # Errors
///
/// Returns [`CheckoutError::MissingField`] for the first blank required
/// field, [`CheckoutError::InvalidField`] for a malformed email or country
/// code, and [`CheckoutError::RegionRestricted`] when the country is outside
/// the supported region.
pub fn validate(
    input: &AddressInput,
    region: &RegionPolicy,
) -> Result<ValidAddress, CheckoutError> {
    let required: [(&'static str, &str); 7] = [
        ("email", &input.email),
        ("first_name", &input.first_name),
        ("last_name", &input.last_name),
        ("address_1", &input.address_1),
        ("city", &input.city),
        ("postal_code", &input.postal_code),
        ("country_code", &input.country_code),
    ];

    for (name, value) in required {
        if value.trim().is_empty() {
            return Err(CheckoutError::MissingField(name));
        }
    }

    let email = Email::parse(&input.email).map_err(|e| CheckoutError::InvalidField {
        field: "email",
        message: e.to_string(),
    })?;

    let country =
        CountryCode::parse(&input.country_code).map_err(|e| CheckoutError::InvalidField {
            field: "country_code",
            message: e.to_string(),
        })?;

    if !region.allows(&country) {
        return Err(CheckoutError::RegionRestricted {
            requested: country,
            supported: region.supported().clone(),
        });
    }

    let address = Address {
        first_name: input.first_name.trim().to_string(),
        last_name: input.last_name.trim().to_string(),
        address_1: input.address_1.trim().to_string(),
        city: input.city.trim().to_string(),
        province: non_empty(&input.province),
        postal_code: input.postal_code.trim().to_string(),
        country_code: country.as_str().to_string(),
        phone: non_empty(&input.phone),
    };

    Ok(ValidAddress {
        email,
        country,
        address,
    })
}

/// Write a validated address to the cart and confirm it persisted.
///
/// Sets the cart email and shipping address, plus the billing address when
/// `same_as_billing` is set. Repeating a commit overwrites the previous
/// address; the backend keeps one shipping address per cart.
///
/// # Errors
///
/// Returns [`CheckoutError::CartMissing`] if the cart disappears between the
/// update and the re-read, and [`CheckoutError::AddressNotPersisted`] if the
/// re-read cart still has no shipping address.
#[instrument(skip(ops, valid))]
pub async fn commit(
    ops: &dyn CartOperations,
    cart_id: &str,
    valid: &ValidAddress,
    same_as_billing: bool,
) -> Result<Cart, CheckoutError> {
    let update = CartUpdate {
        email: Some(valid.email.as_str().to_string()),
        shipping_address: Some(valid.address.clone()),
        billing_address: same_as_billing.then(|| valid.address.clone()),
    };

    ops.update_cart(cart_id, &update).await?;

    let cart = ops
        .retrieve_cart(cart_id)
        .await?
        .ok_or(CheckoutError::CartMissing)?;

    if cart.shipping_address.is_none() {
        tracing::error!(
            cart_id,
            "cart update accepted but shipping address did not persist"
        );
        return Err(CheckoutError::AddressNotPersisted);
    }

    Ok(cart)
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
