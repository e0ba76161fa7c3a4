//! Integration test support for Driftwood.
//!
//! [`MockCommerce`] is a scripted, recording stand-in for the Medusa store
//! client. Tests preload it with a cart and shipping options, optionally
//! script provider session payloads or one failing operation, run a
//! checkout flow against it, and then assert on both the outcome and the
//! exact calls the backend saw.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p driftwood-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `checkout_flow` - address, shipping, and default-provider checkout
//! - `wallet_flow` - PayPal session preparation and approved-order completion
//! - `instrumentation` - span coverage of checkout steps and strategies

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use driftwood_core::{CountryCode, RegionPolicy};
use driftwood_storefront::checkout::{AddressInput, CartOperations};
use driftwood_storefront::medusa::{
    Cart, CartCompletion, CartUpdate, MedusaError, Order, PaymentCollection, PaymentSession,
    PriceType, ShippingMethod, ShippingOption,
};

// =============================================================================
// Recorded Calls
// =============================================================================

/// One backend call as the mock saw it, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    /// Cart read.
    RetrieveCart,
    /// Email/address update.
    UpdateCart,
    /// Shipping options listing.
    ListShippingOptions,
    /// Shipping method application.
    SetShippingMethod {
        /// The option the flow picked.
        option_id: String,
    },
    /// Payment session creation.
    InitiatePaymentSession {
        /// The provider the flow asked for.
        provider_id: String,
        /// The session data the flow passed along.
        data: Option<serde_json::Value>,
    },
    /// Cart completion.
    CompleteCart,
}

impl RecordedCall {
    /// Stable name for call-order assertions.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::RetrieveCart => "retrieve_cart",
            Self::UpdateCart => "update_cart",
            Self::ListShippingOptions => "list_shipping_options",
            Self::SetShippingMethod { .. } => "set_shipping_method",
            Self::InitiatePaymentSession { .. } => "initiate_payment_session",
            Self::CompleteCart => "complete_cart",
        }
    }
}

// =============================================================================
// MockCommerce
// =============================================================================

#[derive(Default)]
struct MockState {
    cart: Option<Cart>,
    shipping_options: Vec<ShippingOption>,
    calls: Vec<RecordedCall>,
    drop_shipping_address_on_read: bool,
    drop_shipping_methods_on_read: bool,
    scripted_sessions: Option<Vec<PaymentSession>>,
    scripted_completion: Option<CartCompletion>,
    fail_on: Option<(String, u16, String)>,
}

impl MockState {
    fn failure_for(&self, operation: &str) -> Option<MedusaError> {
        self.fail_on.as_ref().and_then(|(op, status, message)| {
            (op == operation).then(|| MedusaError::Api {
                status: *status,
                message: message.clone(),
            })
        })
    }
}

/// Scripted, recording fake of the commerce backend.
///
/// Cheap to clone; clones share state, so a test can keep a handle for
/// assertions while the flow owns another.
#[derive(Clone, Default)]
pub struct MockCommerce {
    state: Arc<Mutex<MockState>>,
}

impl MockCommerce {
    /// A mock with no cart at all; every read answers `None`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A mock preloaded with the given cart.
    #[must_use]
    pub fn with_cart(cart: Cart) -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                cart: Some(cart),
                ..MockState::default()
            })),
        }
    }

    // =========================================================================
    // Scripting
    // =========================================================================

    /// Set the shipping options the backend offers.
    pub async fn set_shipping_options(&self, options: Vec<ShippingOption>) {
        self.state.lock().await.shipping_options = options;
    }

    /// Make cart reads come back without a shipping address, simulating an
    /// update that was accepted but never persisted.
    pub async fn drop_shipping_address_on_read(&self) {
        self.state.lock().await.drop_shipping_address_on_read = true;
    }

    /// Make cart reads come back without shipping methods.
    pub async fn drop_shipping_methods_on_read(&self) {
        self.state.lock().await.drop_shipping_methods_on_read = true;
    }

    /// Script the payment sessions that session creation attaches to the
    /// cart, replacing the default synthesized one.
    pub async fn script_sessions(&self, sessions: Vec<PaymentSession>) {
        self.state.lock().await.scripted_sessions = Some(sessions);
    }

    /// Script the result of cart completion.
    pub async fn script_completion(&self, completion: CartCompletion) {
        self.state.lock().await.scripted_completion = Some(completion);
    }

    /// Make one operation fail with a structured API error.
    pub async fn fail_on(&self, operation: &str, status: u16, message: &str) {
        self.state.lock().await.fail_on =
            Some((operation.to_string(), status, message.to_string()));
    }

    // =========================================================================
    // Assertions
    // =========================================================================

    /// Every call the mock saw, in order.
    pub async fn calls(&self) -> Vec<RecordedCall> {
        self.state.lock().await.calls.clone()
    }

    /// Call names in order, including cart re-reads.
    pub async fn call_names(&self) -> Vec<&'static str> {
        self.state
            .lock()
            .await
            .calls
            .iter()
            .map(RecordedCall::name)
            .collect()
    }

    /// Call names in order, with cart re-reads filtered out. This is the
    /// semantic checkout sequence.
    pub async fn operation_names(&self) -> Vec<&'static str> {
        self.state
            .lock()
            .await
            .calls
            .iter()
            .filter(|call| !matches!(call, RecordedCall::RetrieveCart))
            .map(RecordedCall::name)
            .collect()
    }

    /// The stored cart as it stands now. `None` once a completion converted
    /// it into an order, or if none was ever loaded.
    pub async fn cart(&self) -> Option<Cart> {
        self.state.lock().await.cart.clone()
    }
}

#[async_trait]
impl CartOperations for MockCommerce {
    async fn retrieve_cart(&self, cart_id: &str) -> Result<Option<Cart>, MedusaError> {
        let mut state = self.state.lock().await;
        state.calls.push(RecordedCall::RetrieveCart);
        if let Some(err) = state.failure_for("retrieve_cart") {
            return Err(err);
        }

        let Some(mut cart) = state.cart.clone().filter(|cart| cart.id == cart_id) else {
            return Ok(None);
        };

        if state.drop_shipping_address_on_read {
            cart.shipping_address = None;
        }
        if state.drop_shipping_methods_on_read {
            cart.shipping_methods.clear();
        }

        Ok(Some(cart))
    }

    async fn update_cart(&self, cart_id: &str, update: &CartUpdate) -> Result<Cart, MedusaError> {
        let mut state = self.state.lock().await;
        state.calls.push(RecordedCall::UpdateCart);
        if let Some(err) = state.failure_for("update_cart") {
            return Err(err);
        }

        let cart = state
            .cart
            .as_mut()
            .filter(|cart| cart.id == cart_id)
            .ok_or_else(|| MedusaError::NotFound(format!("cart {cart_id}")))?;

        // Updates overwrite; the cart carries one address of each kind
        if let Some(email) = &update.email {
            cart.email = Some(email.clone());
        }
        if let Some(address) = &update.shipping_address {
            cart.shipping_address = Some(address.clone());
        }
        if let Some(address) = &update.billing_address {
            cart.billing_address = Some(address.clone());
        }

        Ok(cart.clone())
    }

    async fn list_shipping_options(
        &self,
        _cart_id: &str,
    ) -> Result<Vec<ShippingOption>, MedusaError> {
        let mut state = self.state.lock().await;
        state.calls.push(RecordedCall::ListShippingOptions);
        if let Some(err) = state.failure_for("list_shipping_options") {
            return Err(err);
        }

        Ok(state.shipping_options.clone())
    }

    async fn set_shipping_method(
        &self,
        cart_id: &str,
        option_id: &str,
    ) -> Result<(), MedusaError> {
        let mut state = self.state.lock().await;
        state.calls.push(RecordedCall::SetShippingMethod {
            option_id: option_id.to_string(),
        });
        if let Some(err) = state.failure_for("set_shipping_method") {
            return Err(err);
        }

        let amount = state
            .shipping_options
            .iter()
            .find(|option| option.id == option_id)
            .and_then(|option| option.amount)
            .unwrap_or_default();

        let cart = state
            .cart
            .as_mut()
            .filter(|cart| cart.id == cart_id)
            .ok_or_else(|| MedusaError::NotFound(format!("cart {cart_id}")))?;

        // Applying an option replaces the cart's method, never appends
        cart.shipping_methods = vec![ShippingMethod {
            id: format!("sm_{option_id}"),
            shipping_option_id: Some(option_id.to_string()),
            amount,
        }];

        Ok(())
    }

    async fn initiate_payment_session(
        &self,
        cart: &Cart,
        provider_id: &str,
        data: Option<serde_json::Value>,
    ) -> Result<Cart, MedusaError> {
        let mut state = self.state.lock().await;
        state.calls.push(RecordedCall::InitiatePaymentSession {
            provider_id: provider_id.to_string(),
            data: data.clone(),
        });
        if let Some(err) = state.failure_for("initiate_payment_session") {
            return Err(err);
        }

        let scripted = state.scripted_sessions.clone();
        let stored = state
            .cart
            .as_mut()
            .filter(|stored| stored.id == cart.id)
            .ok_or_else(|| MedusaError::NotFound(format!("cart {}", cart.id)))?;

        let sessions = scripted.unwrap_or_else(|| {
            vec![PaymentSession {
                id: format!("payses_{provider_id}"),
                provider_id: provider_id.to_string(),
                data: data.unwrap_or_else(|| serde_json::json!({})),
            }]
        });

        stored.payment_collection = Some(PaymentCollection {
            id: "paycol_test".to_string(),
            payment_sessions: sessions,
        });

        Ok(stored.clone())
    }

    async fn complete_cart(&self, cart_id: &str) -> Result<CartCompletion, MedusaError> {
        let mut state = self.state.lock().await;
        state.calls.push(RecordedCall::CompleteCart);
        if let Some(err) = state.failure_for("complete_cart") {
            return Err(err);
        }

        if state.cart.as_ref().is_none_or(|cart| cart.id != cart_id) {
            return Err(MedusaError::NotFound(format!("cart {cart_id}")));
        }

        let completion = state
            .scripted_completion
            .clone()
            .unwrap_or_else(|| CartCompletion::Order {
                order: Order {
                    id: "order_123".to_string(),
                    display_id: Some(1001),
                },
            });

        // A converted cart is gone; a rejected completion leaves it alone
        if matches!(completion, CartCompletion::Order { .. }) {
            state.cart = None;
        }

        Ok(completion)
    }
}

// =============================================================================
// Fixture Builders
// =============================================================================

/// A cart with just an id, as the backend returns it before checkout.
#[must_use]
pub fn cart_with_id(id: &str) -> Cart {
    Cart {
        id: id.to_string(),
        email: None,
        shipping_address: None,
        billing_address: None,
        items: vec![],
        shipping_methods: vec![],
        payment_collection: None,
    }
}

/// A complete, valid US address submission.
#[must_use]
pub fn us_address_input() -> AddressInput {
    AddressInput {
        email: "jane@example.com".to_string(),
        first_name: "Jane".to_string(),
        last_name: "Doe".to_string(),
        address_1: "1 Main St".to_string(),
        city: "Portland".to_string(),
        province: "or".to_string(),
        postal_code: "97201".to_string(),
        country_code: "us".to_string(),
        phone: String::new(),
    }
}

/// A flat-priced shipping option.
#[must_use]
pub fn flat_option(id: &str, name: &str, amount: f64) -> ShippingOption {
    ShippingOption {
        id: id.to_string(),
        name: name.to_string(),
        price_type: PriceType::Flat,
        amount: Some(amount),
    }
}

/// A payment session for `provider_id` carrying the given data blob.
#[must_use]
pub fn payment_session(provider_id: &str, data: serde_json::Value) -> PaymentSession {
    PaymentSession {
        id: format!("payses_{provider_id}"),
        provider_id: provider_id.to_string(),
        data,
    }
}

/// Region policy shipping to the US only, as the storefront configures it.
#[must_use]
pub fn us_region() -> RegionPolicy {
    RegionPolicy::new(CountryCode::parse("us").expect("valid country code"))
}
