//! Shipping option resolution.
//!
//! The storefront does not ask the shopper to pick a shipping option; it
//! lists what the backend offers for the cart and applies one according to
//! a [`SelectionPolicy`], then re-reads the cart to confirm the method
//! stuck.

use tracing::instrument;

use crate::checkout::error::CheckoutError;
use crate::checkout::ops::CartOperations;
use crate::medusa::types::{Cart, PriceType, ShippingOption};

/// How to choose among the shipping options the backend offers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SelectionPolicy {
    /// Take the first option in backend order.
    #[default]
    First,
    /// Take the cheapest flat-priced option. Calculated options are treated
    /// as unpriced and never win over a flat price.
    Cheapest,
}

/// Pick a shipping option according to `policy`.
///
/// Returns `None` when `options` is empty.
#[must_use]
pub fn select(options: &[ShippingOption], policy: SelectionPolicy) -> Option<&ShippingOption> {
    match policy {
        SelectionPolicy::First => options.first(),
        SelectionPolicy::Cheapest => options
            .iter()
            .min_by(|a, b| flat_amount(a).total_cmp(&flat_amount(b))),
    }
}

fn flat_amount(option: &ShippingOption) -> f64 {
    match option.price_type {
        PriceType::Flat => option.amount.unwrap_or(f64::INFINITY),
        PriceType::Calculated => f64::INFINITY,
    }
}

/// Resolve shipping for a cart: list options, apply one, confirm it stuck.
///
/// Applying an option replaces any method already on the cart; the backend
/// keeps a single shipping method per cart in this flow.
///
/// # Errors
///
/// Returns [`CheckoutError::NoShippingOptions`] when the backend offers
/// none (before any mutation is attempted), [`CheckoutError::CartMissing`]
/// if the cart disappears, and [`CheckoutError::ShippingNotPersisted`] if
/// the re-read cart has no shipping methods.
#[instrument(skip(ops))]
pub async fn resolve(
    ops: &dyn CartOperations,
    cart_id: &str,
    policy: SelectionPolicy,
) -> Result<Cart, CheckoutError> {
    let options = ops.list_shipping_options(cart_id).await?;

    let Some(option) = select(&options, policy) else {
        return Err(CheckoutError::NoShippingOptions);
    };

    ops.set_shipping_method(cart_id, &option.id).await?;

    let cart = ops
        .retrieve_cart(cart_id)
        .await?
        .ok_or(CheckoutError::CartMissing)?;

    if cart.shipping_methods.is_empty() {
        tracing::error!(cart_id, "shipping method accepted but did not persist");
        return Err(CheckoutError::ShippingNotPersisted);
    }

    Ok(cart)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn flat(id: &str, amount: f64) -> ShippingOption {
        ShippingOption {
            id: id.to_string(),
            name: format!("option {id}"),
            price_type: PriceType::Flat,
            amount: Some(amount),
        }
    }

    fn calculated(id: &str) -> ShippingOption {
        ShippingOption {
            id: id.to_string(),
            name: format!("option {id}"),
            price_type: PriceType::Calculated,
            amount: None,
        }
    }

    #[test]
    fn test_first_takes_backend_order() {
        let options = vec![flat("so_express", 15.0), flat("so_standard", 5.0)];
        let picked = select(&options, SelectionPolicy::First).unwrap();
        assert_eq!(picked.id, "so_express");
    }

    #[test]
    fn test_cheapest_picks_lowest_flat() {
        let options = vec![
            flat("so_express", 15.0),
            flat("so_standard", 5.0),
            flat("so_priority", 9.5),
        ];
        let picked = select(&options, SelectionPolicy::Cheapest).unwrap();
        assert_eq!(picked.id, "so_standard");
    }

    #[test]
    fn test_cheapest_ignores_calculated() {
        let options = vec![calculated("so_carrier"), flat("so_standard", 5.0)];
        let picked = select(&options, SelectionPolicy::Cheapest).unwrap();
        assert_eq!(picked.id, "so_standard");
    }

    #[test]
    fn test_empty_options_select_none() {
        assert!(select(&[], SelectionPolicy::First).is_none());
        assert!(select(&[], SelectionPolicy::Cheapest).is_none());
    }
}
