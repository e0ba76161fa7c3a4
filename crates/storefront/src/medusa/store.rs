//! Medusa store API client implementation.
//!
//! Thin REST wrapper over `reqwest` 0.13. Mutations return the refreshed
//! cart where the API provides one; the checkout flow still re-reads the
//! cart afterwards to verify what actually persisted.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::instrument;

use crate::checkout::CartOperations;
use crate::config::MedusaConfig;
use crate::medusa::MedusaError;
use crate::medusa::types::{
    Cart, CartCompletion, CartUpdate, PaymentCollection, ShippingOption,
};

/// Header carrying the sales-channel publishable key on every store request.
const PUBLISHABLE_KEY_HEADER: &str = "x-publishable-api-key";

/// Field expansion for cart reads.
///
/// Pulls in line items, shipping methods, and the payment collection with
/// its sessions so a single read shows the full checkout state.
pub const CART_FIELDS: &str =
    "*items,*shipping_methods,*payment_collection,*payment_collection.payment_sessions";

// =============================================================================
// StoreClient
// =============================================================================

/// Client for the Medusa store API.
#[derive(Clone)]
pub struct StoreClient {
    inner: Arc<StoreClientInner>,
}

struct StoreClientInner {
    client: reqwest::Client,
    base_url: String,
    publishable_key: String,
}

impl StoreClient {
    /// Create a new store API client.
    #[must_use]
    pub fn new(config: &MedusaConfig) -> Self {
        Self {
            inner: Arc::new(StoreClientInner {
                client: reqwest::Client::new(),
                // Url serializes the root path with a trailing slash
                base_url: config.backend_url.as_str().trim_end_matches('/').to_string(),
                publishable_key: config.publishable_key.clone(),
            }),
        }
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.inner
            .client
            .get(format!("{}/{path}", self.inner.base_url))
            .header(PUBLISHABLE_KEY_HEADER, &self.inner.publishable_key)
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.inner
            .client
            .post(format!("{}/{path}", self.inner.base_url))
            .header(PUBLISHABLE_KEY_HEADER, &self.inner.publishable_key)
    }

    // =========================================================================
    // Cart Methods
    // =========================================================================

    /// Fetch a cart with its checkout relations expanded.
    ///
    /// Returns `Ok(None)` when the backend reports the cart does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    #[instrument(skip(self))]
    pub async fn retrieve_cart(&self, cart_id: &str) -> Result<Option<Cart>, MedusaError> {
        let response = self
            .get(&format!("store/carts/{cart_id}"))
            .query(&[("fields", CART_FIELDS)])
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let body: CartResponse = parse_response(response).await?;
        Ok(Some(body.cart))
    }

    /// Update cart fields (email, shipping address, billing address).
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the update or the request fails.
    #[instrument(skip(self, update))]
    pub async fn update_cart(
        &self,
        cart_id: &str,
        update: &CartUpdate,
    ) -> Result<Cart, MedusaError> {
        let response = self
            .post(&format!("store/carts/{cart_id}"))
            .query(&[("fields", CART_FIELDS)])
            .json(update)
            .send()
            .await?;

        let body: CartResponse = parse_response(response).await?;
        Ok(body.cart)
    }

    /// List the shipping options available for a cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    #[instrument(skip(self))]
    pub async fn list_shipping_options(
        &self,
        cart_id: &str,
    ) -> Result<Vec<ShippingOption>, MedusaError> {
        let response = self
            .get("store/shipping-options")
            .query(&[("cart_id", cart_id)])
            .send()
            .await?;

        let body: ShippingOptionsResponse = parse_response(response).await?;
        Ok(body.shipping_options)
    }

    /// Apply a shipping option to a cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the option or the request fails.
    #[instrument(skip(self))]
    pub async fn add_shipping_method(
        &self,
        cart_id: &str,
        option_id: &str,
    ) -> Result<Cart, MedusaError> {
        let response = self
            .post(&format!("store/carts/{cart_id}/shipping-methods"))
            .query(&[("fields", CART_FIELDS)])
            .json(&serde_json::json!({ "option_id": option_id }))
            .send()
            .await?;

        let body: CartResponse = parse_response(response).await?;
        Ok(body.cart)
    }

    // =========================================================================
    // Payment Methods
    // =========================================================================

    /// Create a payment collection for a cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    #[instrument(skip(self))]
    pub async fn create_payment_collection(
        &self,
        cart_id: &str,
    ) -> Result<PaymentCollection, MedusaError> {
        let response = self
            .post("store/payment-collections")
            .json(&serde_json::json!({ "cart_id": cart_id }))
            .send()
            .await?;

        let body: PaymentCollectionResponse = parse_response(response).await?;
        Ok(body.payment_collection)
    }

    /// Open a payment session with the given provider.
    ///
    /// `data` is forwarded verbatim as the session's provider data; PayPal
    /// finalization passes the approved external order id here.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider rejects the session or the request fails.
    #[instrument(skip(self, data))]
    pub async fn create_payment_session(
        &self,
        collection_id: &str,
        provider_id: &str,
        data: Option<serde_json::Value>,
    ) -> Result<PaymentCollection, MedusaError> {
        let body = match data {
            Some(data) => serde_json::json!({ "provider_id": provider_id, "data": data }),
            None => serde_json::json!({ "provider_id": provider_id }),
        };

        let response = self
            .post(&format!(
                "store/payment-collections/{collection_id}/payment-sessions"
            ))
            .json(&body)
            .send()
            .await?;

        let body: PaymentCollectionResponse = parse_response(response).await?;
        Ok(body.payment_collection)
    }

    /// Complete a cart, converting it into an order.
    ///
    /// The response discriminates on a `type` tag; a rejected completion
    /// comes back as the surviving cart plus an error message.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    #[instrument(skip(self))]
    pub async fn complete_cart(&self, cart_id: &str) -> Result<CartCompletion, MedusaError> {
        let response = self
            .post(&format!("store/carts/{cart_id}/complete"))
            .send()
            .await?;

        parse_response(response).await
    }

    // =========================================================================
    // Health
    // =========================================================================

    /// Check whether the backend is reachable.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend reports unhealthy.
    #[instrument(skip(self))]
    pub async fn health(&self) -> Result<(), MedusaError> {
        let response = self.get("health").send().await?;
        let status = response.status();

        if status.is_success() {
            Ok(())
        } else {
            Err(MedusaError::UnexpectedStatus {
                status: status.as_u16(),
            })
        }
    }
}

#[async_trait]
impl CartOperations for StoreClient {
    async fn retrieve_cart(&self, cart_id: &str) -> Result<Option<Cart>, MedusaError> {
        self.retrieve_cart(cart_id).await
    }

    async fn update_cart(&self, cart_id: &str, update: &CartUpdate) -> Result<Cart, MedusaError> {
        self.update_cart(cart_id, update).await
    }

    async fn list_shipping_options(
        &self,
        cart_id: &str,
    ) -> Result<Vec<ShippingOption>, MedusaError> {
        self.list_shipping_options(cart_id).await
    }

    async fn set_shipping_method(
        &self,
        cart_id: &str,
        option_id: &str,
    ) -> Result<(), MedusaError> {
        self.add_shipping_method(cart_id, option_id).await?;
        Ok(())
    }

    async fn initiate_payment_session(
        &self,
        cart: &Cart,
        provider_id: &str,
        data: Option<serde_json::Value>,
    ) -> Result<Cart, MedusaError> {
        let collection = match &cart.payment_collection {
            Some(collection) => collection.clone(),
            None => self.create_payment_collection(&cart.id).await?,
        };

        self.create_payment_session(&collection.id, provider_id, data)
            .await?;

        // Re-read so the caller sees the session the backend actually stored
        self.retrieve_cart(&cart.id)
            .await?
            .ok_or_else(|| MedusaError::NotFound(format!("cart {}", cart.id)))
    }

    async fn complete_cart(&self, cart_id: &str) -> Result<CartCompletion, MedusaError> {
        self.complete_cart(cart_id).await
    }
}

// =============================================================================
// Response Parsing
// =============================================================================

#[derive(Deserialize)]
struct CartResponse {
    cart: Cart,
}

#[derive(Deserialize)]
struct ShippingOptionsResponse {
    shipping_options: Vec<ShippingOption>,
}

#[derive(Deserialize)]
struct PaymentCollectionResponse {
    payment_collection: PaymentCollection,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Read the body as text first so parse failures can be logged with context.
async fn parse_response<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, MedusaError> {
    let status = response.status();
    let response_text = response.text().await?;

    if !status.is_success() {
        if let Ok(body) = serde_json::from_str::<ApiErrorBody>(&response_text) {
            return Err(MedusaError::Api {
                status: status.as_u16(),
                message: body.message,
            });
        }

        tracing::error!(
            status = %status,
            body = %response_text.chars().take(500).collect::<String>(),
            "Medusa API returned non-success status"
        );
        return Err(MedusaError::UnexpectedStatus {
            status: status.as_u16(),
        });
    }

    match serde_json::from_str(&response_text) {
        Ok(parsed) => Ok(parsed),
        Err(e) => {
            tracing::error!(
                error = %e,
                body = %response_text.chars().take(500).collect::<String>(),
                "Failed to parse Medusa API response"
            );
            Err(MedusaError::Parse(e))
        }
    }
}
