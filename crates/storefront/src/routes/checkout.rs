//! Checkout route handlers.
//!
//! The cart id lives in the session; the client attaches it once via
//! `POST /checkout/cart` and the checkout handlers pick it up from there.
//!
//! Two response styles coexist. The plain place-order endpoint is a form
//! target, so it answers with a 303 redirect on success and a 422 plus a
//! plain-text message on failure. The PayPal endpoints are called from the
//! wallet SDK's callbacks, which read JSON bodies; they answer 200 with
//! either the expected payload or an `{"error": ...}` body.

use axum::{
    Form, Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use driftwood_core::CountryCode;

use crate::checkout::{self, AddressInput, CheckoutFlow, ManualPayment, WalletPayment};
use crate::error::AppError;
use crate::middleware::session_keys;
use crate::state::AppState;

// =============================================================================
// Session Helpers
// =============================================================================

/// Get the cart ID from the session.
async fn get_cart_id(session: &Session) -> Option<String> {
    session
        .get::<String>(session_keys::CART_ID)
        .await
        .ok()
        .flatten()
}

/// Set the cart ID in the session.
async fn set_cart_id(
    session: &Session,
    cart_id: &str,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CART_ID, cart_id).await
}

// =============================================================================
// Request / Response Types
// =============================================================================

/// Body of `POST /checkout/cart`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachCartRequest {
    /// Cart id created by the client against the backend.
    pub cart_id: String,
}

/// Address fields as the client submits them.
///
/// Nested address objects keep the backend's snake_case field names. All
/// fields default to empty so blanks reach validation and get reported as
/// missing fields rather than as a deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AddressPayload {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub address_1: String,
    pub city: String,
    pub province: String,
    pub postal_code: String,
    pub country_code: String,
    pub phone: String,
}

impl AddressPayload {
    fn into_input(self) -> AddressInput {
        AddressInput {
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
            address_1: self.address_1,
            city: self.city,
            province: self.province,
            postal_code: self.postal_code,
            country_code: self.country_code,
            phone: self.phone,
        }
    }
}

/// Form body of `POST /checkout/place-order`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PlaceOrderForm {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub address_1: String,
    pub city: String,
    pub province: String,
    pub postal_code: String,
    pub country_code: String,
    pub phone: String,
    /// Checkbox; present (any value) means billing address = shipping.
    pub same_as_billing: Option<String>,
}

impl PlaceOrderForm {
    fn address_input(&self) -> AddressInput {
        AddressInput {
            email: self.email.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            address_1: self.address_1.clone(),
            city: self.city.clone(),
            province: self.province.clone(),
            postal_code: self.postal_code.clone(),
            country_code: self.country_code.clone(),
            phone: self.phone.clone(),
        }
    }
}

/// Body of `POST /checkout/paypal`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreparePaypalRequest {
    /// Shipping address to persist before the session is opened.
    pub address: AddressPayload,
    /// Whether the billing address mirrors the shipping address.
    #[serde(default)]
    pub same_as_billing: bool,
}

/// Success body of `POST /checkout/paypal`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreparePaypalResponse {
    /// External order id for the wallet SDK to get approved.
    pub paypal_order_id: String,
}

/// Body of `POST /checkout/paypal/complete`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletePaypalRequest {
    /// Country for the confirmation URL.
    pub country_code: String,
}

/// Success body of `POST /checkout/paypal/complete`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletePaypalResponse {
    /// Confirmation page the client should navigate to.
    pub redirect_url: String,
}

/// Body of `POST /checkout/paypal/place-order`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderPaypalRequest {
    /// External order id the shopper already approved in the wallet.
    pub paypal_order_id: String,
    /// Shipping address to persist before the session is opened.
    pub address: AddressPayload,
    /// Whether the billing address mirrors the shipping address.
    #[serde(default)]
    pub same_as_billing: bool,
    /// Country for the confirmation URL.
    pub country_code: String,
}

/// Error body for the JSON endpoints.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Shopper-facing message.
    pub error: String,
}

fn json_error(message: impl Into<String>) -> Response {
    Json(ErrorResponse {
        error: message.into(),
    })
    .into_response()
}

// =============================================================================
// Handlers
// =============================================================================

/// Attach a cart id to the session.
///
/// Verifies the cart exists against the backend before storing the id, so
/// later checkout calls fail on their own terms rather than on a typo'd id.
///
/// # Errors
///
/// Returns 400 for a blank id, 404 for an unknown cart, 502 if the backend
/// cannot be reached.
#[instrument(skip(state, session, body))]
pub async fn attach_cart(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<AttachCartRequest>,
) -> Result<StatusCode, AppError> {
    let cart_id = body.cart_id.trim();
    if cart_id.is_empty() {
        return Err(AppError::BadRequest("cart id is required".to_string()));
    }

    let cart = state
        .store()
        .retrieve_cart(cart_id)
        .await?
        .ok_or_else(|| AppError::NotFound("cart not found".to_string()))?;

    set_cart_id(&session, &cart.id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Place an order with the default payment provider.
///
/// Runs the whole checkout from the submitted form: address, shipping,
/// payment session, completion. On success redirects (303) to the order
/// confirmation page; on failure answers 422 with a plain-text message the
/// form can surface inline.
#[instrument(skip(state, session, form))]
pub async fn place_order(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<PlaceOrderForm>,
) -> Response {
    let Some(cart_id) = get_cart_id(&session).await else {
        return (StatusCode::UNPROCESSABLE_ENTITY, "cart not found".to_string()).into_response();
    };

    let strategy = ManualPayment::new(state.config().checkout.default_provider_id.clone());
    let mut flow = CheckoutFlow::new(state.store(), cart_id, state.region_policy().clone());

    match flow.run(&form.address_input(), form.same_as_billing.is_some(), &strategy).await {
        Ok(completion) => Redirect::to(completion.url()).into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "checkout failed");
            (StatusCode::UNPROCESSABLE_ENTITY, e.user_message()).into_response()
        }
    }
}

/// Open a PayPal payment session and hand back its external order id.
///
/// Persists the address and shipping method first so the session is opened
/// against a fully priced cart, then extracts the PayPal order id for the
/// wallet SDK to run its approval flow on.
#[instrument(skip(state, session, body))]
pub async fn prepare_paypal(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<PreparePaypalRequest>,
) -> Response {
    let Some(cart_id) = get_cart_id(&session).await else {
        return json_error("cart not found");
    };

    let strategy = WalletPayment::paypal(state.config().checkout.paypal_provider_id.clone());
    let mut flow = CheckoutFlow::new(state.store(), cart_id, state.region_policy().clone());

    match flow
        .prepare(&body.address.into_input(), body.same_as_billing, &strategy)
        .await
    {
        Ok(paypal_order_id) => Json(PreparePaypalResponse { paypal_order_id }).into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "paypal session failed");
            json_error(e.user_message())
        }
    }
}

/// Complete a cart whose PayPal session the shopper already approved.
///
/// Called from the wallet SDK's `onApprove` callback; the session opened by
/// [`prepare_paypal`] already carries the external order id, so this only
/// completes the cart and reports where to navigate.
#[instrument(skip(state, session, body))]
pub async fn complete_paypal(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<CompletePaypalRequest>,
) -> Response {
    let country = match CountryCode::parse(&body.country_code) {
        Ok(country) => country,
        Err(e) => return json_error(format!("invalid country_code: {e}")),
    };

    let Some(cart_id) = get_cart_id(&session).await else {
        return json_error("cart not found");
    };

    let strategy = WalletPayment::paypal(state.config().checkout.paypal_provider_id.clone());
    let mut flow = CheckoutFlow::new(state.store(), cart_id, state.region_policy().clone());

    match flow.place_order(&strategy, &country).await {
        Ok(completion) => Json(CompletePaypalResponse {
            redirect_url: completion.url().to_string(),
        })
        .into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "paypal completion failed");
            json_error(e.user_message())
        }
    }
}

/// Place an order from an already-approved PayPal order in one call.
///
/// Replays the approved external order id into a fresh payment session
/// (`data: {"id": ...}`) so the provider can capture it, then completes the
/// cart. The confirmation URL uses the request's `countryCode`.
#[instrument(skip(state, session, body))]
pub async fn place_order_with_paypal(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<PlaceOrderPaypalRequest>,
) -> Response {
    let country = match CountryCode::parse(&body.country_code) {
        Ok(country) => country,
        Err(e) => return json_error(format!("invalid country_code: {e}")),
    };

    let Some(cart_id) = get_cart_id(&session).await else {
        return json_error("cart not found");
    };

    let valid = match checkout::validate(&body.address.into_input(), state.region_policy()) {
        Ok(valid) => valid,
        Err(e) => return json_error(e.user_message()),
    };

    let strategy = WalletPayment::paypal(state.config().checkout.paypal_provider_id.clone())
        .with_approved_order(body.paypal_order_id);
    let mut flow = CheckoutFlow::new(state.store(), cart_id, state.region_policy().clone());

    let result = async {
        flow.set_address(&valid, body.same_as_billing).await?;
        flow.resolve_shipping().await?;
        flow.initiate_payment(&strategy).await?;
        flow.place_order(&strategy, &country).await
    }
    .await;

    match result {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "paypal one-shot checkout failed");
            json_error(e.user_message())
        }
    }
}
