//! Domain types for the Medusa store API.
//!
//! These mirror the subset of the REST payloads the checkout flow touches.
//! Fields the storefront never reads are omitted rather than carried along.

use serde::{Deserialize, Serialize};

// =============================================================================
// Address Types
// =============================================================================

/// A shipping or billing address as the backend stores it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    /// Recipient first name.
    pub first_name: String,
    /// Recipient last name.
    pub last_name: String,
    /// Street address line.
    pub address_1: String,
    /// City name.
    pub city: String,
    /// State or province, where the country uses one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub province: Option<String>,
    /// Postal or ZIP code.
    pub postal_code: String,
    /// Lowercase ISO 3166-1 alpha-2 country code.
    pub country_code: String,
    /// Contact phone number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

// =============================================================================
// Cart Types
// =============================================================================

/// A cart as returned by `GET /store/carts/{id}`.
///
/// Relations (`items`, `shipping_methods`, `payment_collection`) are only
/// populated when the request asks for them via [`super::CART_FIELDS`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    /// Cart ID.
    pub id: String,
    /// Customer email, once set.
    pub email: Option<String>,
    /// Shipping address, once set.
    pub shipping_address: Option<Address>,
    /// Billing address, once set.
    pub billing_address: Option<Address>,
    /// Line items.
    #[serde(default)]
    pub items: Vec<CartItem>,
    /// Shipping methods applied to the cart.
    #[serde(default)]
    pub shipping_methods: Vec<ShippingMethod>,
    /// Payment collection, once payment has been initiated.
    pub payment_collection: Option<PaymentCollection>,
}

/// A line item in a cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    /// Line item ID.
    pub id: String,
    /// Product title.
    pub title: String,
    /// Quantity ordered.
    pub quantity: i64,
    /// Unit price in the cart's currency.
    pub unit_price: f64,
}

/// A shipping method applied to a cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShippingMethod {
    /// Shipping method ID.
    pub id: String,
    /// The shipping option this method was created from.
    pub shipping_option_id: Option<String>,
    /// Price of the method in the cart's currency.
    pub amount: f64,
}

/// Partial cart update for `POST /store/carts/{id}`.
///
/// Only the fields that are `Some` are sent; the backend leaves the rest
/// untouched.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CartUpdate {
    /// New customer email.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// New shipping address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<Address>,
    /// New billing address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_address: Option<Address>,
}

// =============================================================================
// Shipping Option Types
// =============================================================================

/// A shipping option available for a cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShippingOption {
    /// Shipping option ID.
    pub id: String,
    /// Display name (e.g., "Standard Shipping").
    pub name: String,
    /// Whether the price is flat or computed by the fulfillment provider.
    pub price_type: PriceType,
    /// Price in the cart's currency. Absent for calculated options until
    /// the provider has quoted them.
    pub amount: Option<f64>,
}

/// Pricing model of a shipping option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceType {
    /// Fixed price known up front.
    Flat,
    /// Price computed by the fulfillment provider at checkout time.
    Calculated,
}

// =============================================================================
// Payment Types
// =============================================================================

/// The payment collection attached to a cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentCollection {
    /// Payment collection ID.
    pub id: String,
    /// Payment sessions opened against this collection.
    #[serde(default)]
    pub payment_sessions: Vec<PaymentSession>,
}

/// A payment session within a payment collection.
///
/// The `data` blob is provider-specific; for PayPal it carries the external
/// order id under the `id` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentSession {
    /// Payment session ID.
    pub id: String,
    /// Provider that owns this session (e.g., `pp_system_default`).
    pub provider_id: String,
    /// Provider-specific session data.
    #[serde(default)]
    pub data: serde_json::Value,
}

// =============================================================================
// Order Types
// =============================================================================

/// An order created from a completed cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Order ID.
    pub id: String,
    /// Human-facing sequential order number.
    pub display_id: Option<i64>,
}

/// Result of `POST /store/carts/{id}/complete`.
///
/// The backend discriminates on a `type` tag: `"order"` when the cart was
/// converted, `"cart"` when completion was rejected and the cart survives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CartCompletion {
    /// The cart was converted into an order.
    Order {
        /// The created order.
        order: Order,
    },
    /// Completion was rejected; the cart is returned unchanged.
    Cart {
        /// The surviving cart.
        cart: Box<Cart>,
        /// Reason the completion was rejected, when the backend provides one.
        error: Option<CompletionError>,
    },
}

/// Error details attached to a rejected cart completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionError {
    /// Backend-provided failure message.
    pub message: String,
}
