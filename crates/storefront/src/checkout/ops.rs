//! Backend operations the checkout flow depends on.
//!
//! [`CartOperations`] is the seam between checkout logic and the Medusa
//! client: the flow, address commit, shipping resolution, and payment
//! strategies all talk to the backend through this trait, so tests can
//! substitute a scripted fake for the real HTTP client.

use async_trait::async_trait;

use crate::medusa::MedusaError;
use crate::medusa::types::{Cart, CartCompletion, CartUpdate, ShippingOption};

/// Cart mutations and reads used by checkout.
///
/// Implemented by [`crate::medusa::StoreClient`] for production and by the
/// integration-test fake for scripted scenarios.
#[async_trait]
pub trait CartOperations: Send + Sync {
    /// Fetch a cart with its checkout relations expanded, or `None` if the
    /// backend does not know the id.
    async fn retrieve_cart(&self, cart_id: &str) -> Result<Option<Cart>, MedusaError>;

    /// Apply a partial update (email, addresses) to a cart.
    async fn update_cart(&self, cart_id: &str, update: &CartUpdate) -> Result<Cart, MedusaError>;

    /// List the shipping options the backend offers for a cart.
    async fn list_shipping_options(
        &self,
        cart_id: &str,
    ) -> Result<Vec<ShippingOption>, MedusaError>;

    /// Apply a shipping option to a cart, replacing any previous method.
    async fn set_shipping_method(&self, cart_id: &str, option_id: &str) -> Result<(), MedusaError>;

    /// Open a payment session with `provider_id` on the cart's payment
    /// collection, creating the collection first if the cart has none.
    ///
    /// Returns the re-read cart so the caller sees the stored session.
    async fn initiate_payment_session(
        &self,
        cart: &Cart,
        provider_id: &str,
        data: Option<serde_json::Value>,
    ) -> Result<Cart, MedusaError>;

    /// Complete the cart, converting it into an order or reporting why the
    /// backend refused.
    async fn complete_cart(&self, cart_id: &str) -> Result<CartCompletion, MedusaError>;
}
