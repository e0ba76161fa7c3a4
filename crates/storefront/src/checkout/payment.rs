//! Payment strategies.
//!
//! Checkout finishes through a [`PaymentStrategy`]: open a payment session
//! on the cart, then complete the cart into an order. Two strategies exist:
//!
//! - [`ManualPayment`]: the system-default provider. The session needs no
//!   provider data and the order confirmation is a server-side redirect.
//! - [`WalletPayment`]: an external wallet (PayPal). Opening the session
//!   yields an external order id the browser hands to the wallet SDK for
//!   approval; finalization replays that id back into a fresh session
//!   before the cart is completed.
//!
//! Sessions are always located by `provider_id`, never by position, since
//! the backend may keep sessions for several providers on one collection.

use async_trait::async_trait;
use driftwood_core::CountryCode;
use tracing::instrument;

use crate::checkout::error::CheckoutError;
use crate::checkout::ops::CartOperations;
use crate::medusa::types::{Cart, CartCompletion};

/// What initiating a payment session produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The session is in place; the cart can be completed.
    Ready,
    /// The provider issued an external order id the client must get
    /// approved before the cart can be completed.
    ExternalOrder {
        /// Provider-side order id (e.g. a PayPal order id).
        order_id: String,
    },
}

/// How the shopper reaches the order confirmation page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// Server-side redirect (form submissions).
    Redirect {
        /// Confirmation page path.
        url: String,
    },
    /// Client-side navigation (JSON responses to wallet callbacks).
    Navigate {
        /// Confirmation page path.
        url: String,
    },
}

impl Completion {
    /// The confirmation URL regardless of delivery mechanism.
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Self::Redirect { url } | Self::Navigate { url } => url,
        }
    }
}

/// A way of paying for a cart.
#[async_trait]
pub trait PaymentStrategy: Send + Sync {
    /// Display label used in shopper-facing failure messages.
    fn label(&self) -> &str;

    /// Open a payment session on the cart.
    async fn initiate(
        &self,
        ops: &dyn CartOperations,
        cart: &Cart,
    ) -> Result<SessionOutcome, CheckoutError>;

    /// Complete the cart into an order and say where to send the shopper.
    async fn complete(
        &self,
        ops: &dyn CartOperations,
        cart_id: &str,
        country: &CountryCode,
    ) -> Result<Completion, CheckoutError>;
}

// =============================================================================
// Manual (system default) payment
// =============================================================================

/// Pay through the backend's system-default provider.
///
/// Used for manual capture setups where no external approval happens at
/// checkout time.
#[derive(Debug, Clone)]
pub struct ManualPayment {
    provider_id: String,
}

impl ManualPayment {
    /// Create a manual strategy for the given provider.
    #[must_use]
    pub fn new(provider_id: impl Into<String>) -> Self {
        Self {
            provider_id: provider_id.into(),
        }
    }
}

#[async_trait]
impl PaymentStrategy for ManualPayment {
    fn label(&self) -> &str {
        "manual"
    }

    #[instrument(skip(self, ops, cart), fields(cart_id = %cart.id, provider = %self.provider_id))]
    async fn initiate(
        &self,
        ops: &dyn CartOperations,
        cart: &Cart,
    ) -> Result<SessionOutcome, CheckoutError> {
        ops.initiate_payment_session(cart, &self.provider_id, None)
            .await?;
        Ok(SessionOutcome::Ready)
    }

    #[instrument(skip(self, ops, country), fields(provider = %self.provider_id))]
    async fn complete(
        &self,
        ops: &dyn CartOperations,
        cart_id: &str,
        country: &CountryCode,
    ) -> Result<Completion, CheckoutError> {
        let url = finalize(ops, cart_id, country).await?;
        Ok(Completion::Redirect { url })
    }
}

// =============================================================================
// Wallet (PayPal) payment
// =============================================================================

/// Pay through an external wallet provider.
///
/// Without an approved order id, [`initiate`](PaymentStrategy::initiate)
/// opens a fresh session and extracts the provider's external order id for
/// the client to approve. With one ([`Self::with_approved_order`]), the id
/// is replayed into the session data so the provider can capture it when
/// the cart completes.
#[derive(Debug, Clone)]
pub struct WalletPayment {
    provider_id: String,
    label: String,
    approved_order_id: Option<String>,
}

impl WalletPayment {
    /// PayPal wallet strategy for the given provider.
    #[must_use]
    pub fn paypal(provider_id: impl Into<String>) -> Self {
        Self {
            provider_id: provider_id.into(),
            label: "PayPal".to_string(),
            approved_order_id: None,
        }
    }

    /// Attach the external order id the shopper already approved.
    #[must_use]
    pub fn with_approved_order(mut self, order_id: impl Into<String>) -> Self {
        self.approved_order_id = Some(order_id.into());
        self
    }
}

#[async_trait]
impl PaymentStrategy for WalletPayment {
    fn label(&self) -> &str {
        &self.label
    }

    #[instrument(skip(self, ops, cart), fields(cart_id = %cart.id, provider = %self.provider_id))]
    async fn initiate(
        &self,
        ops: &dyn CartOperations,
        cart: &Cart,
    ) -> Result<SessionOutcome, CheckoutError> {
        let data = self
            .approved_order_id
            .as_ref()
            .map(|id| serde_json::json!({ "id": id }));
        let replaying_approved = data.is_some();

        let cart = ops
            .initiate_payment_session(cart, &self.provider_id, data)
            .await?;

        if replaying_approved {
            return Ok(SessionOutcome::Ready);
        }

        match external_order_id(&cart, &self.provider_id) {
            Some(order_id) => Ok(SessionOutcome::ExternalOrder {
                order_id: order_id.to_string(),
            }),
            None => {
                log_missing_external_id(&cart, &self.provider_id);
                Err(CheckoutError::PaymentIntegration {
                    provider: self.label.clone(),
                })
            }
        }
    }

    #[instrument(skip(self, ops, country), fields(provider = %self.provider_id))]
    async fn complete(
        &self,
        ops: &dyn CartOperations,
        cart_id: &str,
        country: &CountryCode,
    ) -> Result<Completion, CheckoutError> {
        let url = finalize(ops, cart_id, country).await?;
        Ok(Completion::Navigate { url })
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Path of the order confirmation page.
#[must_use]
pub fn confirmation_path(country: &CountryCode, order_id: &str) -> String {
    format!("/{}/order/confirmed/{order_id}", country.as_str())
}

/// Complete the cart and return the confirmation path.
#[instrument(skip(ops, country))]
async fn finalize(
    ops: &dyn CartOperations,
    cart_id: &str,
    country: &CountryCode,
) -> Result<String, CheckoutError> {
    match ops.complete_cart(cart_id).await? {
        CartCompletion::Order { order } => Ok(confirmation_path(country, &order.id)),
        CartCompletion::Cart { cart, error } => {
            tracing::error!(
                cart_id = %cart.id,
                reason = error.as_ref().map_or("unknown", |e| e.message.as_str()),
                "cart completion rejected by backend"
            );
            Err(CheckoutError::PlacementFailed)
        }
    }
}

/// Find the session belonging to `provider_id` and read its external order
/// id from the `id` key of the session data.
fn external_order_id<'a>(cart: &'a Cart, provider_id: &str) -> Option<&'a str> {
    cart.payment_collection
        .as_ref()?
        .payment_sessions
        .iter()
        .find(|session| session.provider_id == provider_id)?
        .data
        .get("id")
        .and_then(serde_json::Value::as_str)
}

fn log_missing_external_id(cart: &Cart, provider_id: &str) {
    let sessions = cart
        .payment_collection
        .as_ref()
        .map(|collection| collection.payment_sessions.as_slice())
        .unwrap_or_default();

    let session_providers: Vec<&str> = sessions
        .iter()
        .map(|session| session.provider_id.as_str())
        .collect();

    let session_data_keys: Vec<&String> = sessions
        .iter()
        .find(|session| session.provider_id == provider_id)
        .and_then(|session| session.data.as_object())
        .map(|data| data.keys().collect())
        .unwrap_or_default();

    tracing::error!(
        cart_id = %cart.id,
        provider_id,
        ?session_providers,
        ?session_data_keys,
        "payment session has no external order id"
    );
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::medusa::types::{PaymentCollection, PaymentSession};

    fn cart_with_sessions(sessions: Vec<PaymentSession>) -> Cart {
        Cart {
            id: "cart_01HXYZ".to_string(),
            email: None,
            shipping_address: None,
            billing_address: None,
            items: vec![],
            shipping_methods: vec![],
            payment_collection: Some(PaymentCollection {
                id: "paycol_1".to_string(),
                payment_sessions: sessions,
            }),
        }
    }

    fn session(provider_id: &str, data: serde_json::Value) -> PaymentSession {
        PaymentSession {
            id: format!("payses_{provider_id}"),
            provider_id: provider_id.to_string(),
            data,
        }
    }

    #[test]
    fn test_external_order_id_selected_by_provider_not_position() {
        // The wallet session sits behind two others; position must not matter.
        let cart = cart_with_sessions(vec![
            session("pp_system_default", serde_json::json!({})),
            session("pp_stripe_stripe", serde_json::json!({"client_secret": "cs_1"})),
            session("pp_paypal_paypal", serde_json::json!({"id": "PAY-123"})),
        ]);

        assert_eq!(
            external_order_id(&cart, "pp_paypal_paypal"),
            Some("PAY-123")
        );
    }

    #[test]
    fn test_external_order_id_missing_key() {
        let cart = cart_with_sessions(vec![session(
            "pp_paypal_paypal",
            serde_json::json!({"status": "CREATED"}),
        )]);

        assert_eq!(external_order_id(&cart, "pp_paypal_paypal"), None);
    }

    #[test]
    fn test_external_order_id_non_string() {
        let cart = cart_with_sessions(vec![session(
            "pp_paypal_paypal",
            serde_json::json!({"id": 42}),
        )]);

        assert_eq!(external_order_id(&cart, "pp_paypal_paypal"), None);
    }

    #[test]
    fn test_external_order_id_no_matching_provider() {
        let cart = cart_with_sessions(vec![session(
            "pp_system_default",
            serde_json::json!({"id": "not-a-wallet-order"}),
        )]);

        assert_eq!(external_order_id(&cart, "pp_paypal_paypal"), None);
    }

    #[test]
    fn test_external_order_id_no_collection() {
        let cart = Cart {
            payment_collection: None,
            ..cart_with_sessions(vec![])
        };

        assert_eq!(external_order_id(&cart, "pp_paypal_paypal"), None);
    }

    #[test]
    fn test_confirmation_path() {
        let us = CountryCode::parse("us").unwrap();
        assert_eq!(
            confirmation_path(&us, "order_123"),
            "/us/order/confirmed/order_123"
        );
    }

    #[test]
    fn test_completion_url_accessor() {
        let completion = Completion::Navigate {
            url: "/us/order/confirmed/order_123".to_string(),
        };
        assert_eq!(completion.url(), "/us/order/confirmed/order_123");
    }
}
