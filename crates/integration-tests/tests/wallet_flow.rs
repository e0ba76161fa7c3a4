//! Integration tests for the PayPal wallet flow.
//!
//! The wallet checkout runs in two halves: prepare (open a session, hand
//! the external order id to the client for approval) and finalize (replay
//! the approved id, complete the cart). These tests script the session
//! shapes the backend can produce and check both halves, including the
//! session-selection rule: always by provider id, never by position.

use driftwood_core::CountryCode;
use driftwood_integration_tests::{
    MockCommerce, RecordedCall, cart_with_id, flat_option, payment_session, us_address_input,
    us_region,
};
use driftwood_storefront::checkout::{
    CheckoutError, CheckoutFlow, Completion, ManualPayment, WalletPayment,
};
use driftwood_storefront::medusa::{CartCompletion, CompletionError, Order};
use serde_json::json;

const PAYPAL: &str = "pp_paypal_paypal";

fn mock_with_shipping() -> MockCommerce {
    MockCommerce::with_cart(cart_with_id("cart_1"))
}

async fn offer_standard_shipping(mock: &MockCommerce) {
    mock.set_shipping_options(vec![flat_option("so_standard", "Standard Shipping", 5.0)])
        .await;
}

// =============================================================================
// Session Extraction Tests
// =============================================================================

#[tokio::test]
async fn test_prepare_extracts_order_id_by_provider_id() {
    let mock = mock_with_shipping();
    offer_standard_shipping(&mock).await;
    // The wallet session sits last, behind two unrelated providers
    mock.script_sessions(vec![
        payment_session("pp_system_default", json!({})),
        payment_session("pp_stripe_stripe", json!({"client_secret": "cs_test_1"})),
        payment_session(PAYPAL, json!({"id": "PAY-123", "status": "CREATED"})),
    ])
    .await;

    let strategy = WalletPayment::paypal(PAYPAL);
    let mut flow = CheckoutFlow::new(&mock, "cart_1", us_region());

    let order_id = flow
        .prepare(&us_address_input(), false, &strategy)
        .await
        .expect("prepare should yield the external order id");

    assert_eq!(order_id, "PAY-123");
}

#[tokio::test]
async fn test_prepare_fails_when_session_has_no_order_id() {
    let mock = mock_with_shipping();
    offer_standard_shipping(&mock).await;
    mock.script_sessions(vec![payment_session(PAYPAL, json!({"status": "CREATED"}))])
        .await;

    let strategy = WalletPayment::paypal(PAYPAL);
    let mut flow = CheckoutFlow::new(&mock, "cart_1", us_region());

    let err = flow
        .prepare(&us_address_input(), false, &strategy)
        .await
        .expect_err("session without an id must not be usable");

    assert!(matches!(err, CheckoutError::PaymentIntegration { .. }));
    assert_eq!(err.user_message(), "failed to create PayPal order");
}

#[tokio::test]
async fn test_prepare_fails_when_no_session_matches_provider() {
    let mock = mock_with_shipping();
    offer_standard_shipping(&mock).await;
    // Another provider's session carries an id; it must not be picked up
    mock.script_sessions(vec![payment_session(
        "pp_system_default",
        json!({"id": "not-the-wallet-order"}),
    )])
    .await;

    let strategy = WalletPayment::paypal(PAYPAL);
    let mut flow = CheckoutFlow::new(&mock, "cart_1", us_region());

    let err = flow
        .prepare(&us_address_input(), false, &strategy)
        .await
        .expect_err("a foreign session must not satisfy the wallet");

    assert!(matches!(err, CheckoutError::PaymentIntegration { .. }));
}

#[tokio::test]
async fn test_prepare_rejects_strategy_without_external_order() {
    let mock = mock_with_shipping();
    offer_standard_shipping(&mock).await;

    let strategy = ManualPayment::new("pp_system_default");
    let mut flow = CheckoutFlow::new(&mock, "cart_1", us_region());

    let err = flow
        .prepare(&us_address_input(), false, &strategy)
        .await
        .expect_err("manual payment never yields an external order");

    assert!(matches!(err, CheckoutError::PaymentIntegration { .. }));
    assert_eq!(err.user_message(), "failed to create manual order");
}

// =============================================================================
// Finalization Tests
// =============================================================================

#[tokio::test]
async fn test_prepare_then_complete_round_trip() {
    let mock = mock_with_shipping();
    offer_standard_shipping(&mock).await;
    mock.script_sessions(vec![payment_session(PAYPAL, json!({"id": "PAY-123"}))])
        .await;
    mock.script_completion(CartCompletion::Order {
        order: Order {
            id: "order_9".to_string(),
            display_id: Some(7),
        },
    })
    .await;

    let strategy = WalletPayment::paypal(PAYPAL);
    let mut flow = CheckoutFlow::new(&mock, "cart_1", us_region());

    let order_id = flow
        .prepare(&us_address_input(), false, &strategy)
        .await
        .expect("prepare should succeed");
    assert_eq!(order_id, "PAY-123");

    let us = CountryCode::parse("us").expect("valid country code");
    let completion = flow
        .place_order(&strategy, &us)
        .await
        .expect("approved cart should complete");

    assert!(matches!(completion, Completion::Navigate { .. }));
    assert_eq!(completion.url(), "/us/order/confirmed/order_9");
}

#[tokio::test]
async fn test_approved_order_id_replayed_into_session_data() {
    let mock = mock_with_shipping();
    offer_standard_shipping(&mock).await;

    let strategy = WalletPayment::paypal(PAYPAL).with_approved_order("PAY-XYZ");
    let mut flow = CheckoutFlow::new(&mock, "cart_1", us_region());

    let completion = flow
        .run(&us_address_input(), false, &strategy)
        .await
        .expect("approved checkout should complete");

    assert!(matches!(completion, Completion::Navigate { .. }));
    assert_eq!(completion.url(), "/us/order/confirmed/order_123");

    // The approved id must round-trip back as the session's data.id
    assert!(
        mock.calls()
            .await
            .contains(&RecordedCall::InitiatePaymentSession {
                provider_id: PAYPAL.to_string(),
                data: Some(json!({"id": "PAY-XYZ"})),
            }),
        "session must carry the approved order id"
    );
}

#[tokio::test]
async fn test_rejected_completion_keeps_cart() {
    let mock = mock_with_shipping();
    offer_standard_shipping(&mock).await;
    mock.script_completion(CartCompletion::Cart {
        cart: Box::new(cart_with_id("cart_1")),
        error: Some(CompletionError {
            message: "Payment authorization failed".to_string(),
        }),
    })
    .await;

    let strategy = WalletPayment::paypal(PAYPAL).with_approved_order("PAY-XYZ");
    let mut flow = CheckoutFlow::new(&mock, "cart_1", us_region());

    let err = flow
        .run(&us_address_input(), false, &strategy)
        .await
        .expect_err("rejected completion should fail the flow");

    assert!(matches!(err, CheckoutError::PlacementFailed));
    assert_eq!(err.user_message(), "order placement failed");
    assert!(
        mock.cart().await.is_some(),
        "the cart must survive a rejected completion"
    );
}
