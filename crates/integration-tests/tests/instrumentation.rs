//! Tests for the tracing spans the checkout flow emits.
//!
//! A collecting subscriber layer records span names while a flow runs
//! against the backend fake; the assertions pin one span per checkout
//! step and strategy call.

use std::sync::{Arc, Mutex};

use tracing::span::{Attributes, Id};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::{Context, SubscriberExt};

use driftwood_integration_tests::{
    MockCommerce, cart_with_id, flat_option, payment_session, us_address_input, us_region,
};
use driftwood_storefront::checkout::{CheckoutFlow, ManualPayment, WalletPayment};

/// Records the name of every span opened while it is installed.
#[derive(Clone, Default)]
struct SpanRecorder {
    spans: Arc<Mutex<Vec<&'static str>>>,
}

impl SpanRecorder {
    fn names(&self) -> Vec<&'static str> {
        self.spans.lock().expect("span list").clone()
    }
}

impl<S: tracing::Subscriber> Layer<S> for SpanRecorder {
    fn on_new_span(&self, attrs: &Attributes<'_>, _id: &Id, _ctx: Context<'_, S>) {
        self.spans.lock().expect("span list").push(attrs.metadata().name());
    }
}

#[tokio::test]
async fn test_manual_checkout_opens_a_span_per_step() {
    let recorder = SpanRecorder::default();
    let subscriber = tracing_subscriber::registry().with(recorder.clone());
    let _guard = tracing::subscriber::set_default(subscriber);

    let mock = MockCommerce::with_cart(cart_with_id("cart_1"));
    mock.set_shipping_options(vec![flat_option("so_standard", "Standard Shipping", 5.0)])
        .await;
    let strategy = ManualPayment::new("pp_system_default");
    let mut flow = CheckoutFlow::new(&mock, "cart_1", us_region());

    flow.run(&us_address_input(), false, &strategy)
        .await
        .expect("checkout should succeed");

    assert_eq!(
        recorder.names(),
        [
            "set_address",
            "commit",
            "resolve_shipping",
            "resolve",
            "initiate_payment",
            "initiate",
            "place_order",
            "complete",
            "finalize",
        ],
        "every step and strategy call should open its own span"
    );
}

#[tokio::test]
async fn test_wallet_preparation_spans_stop_at_the_session() {
    let recorder = SpanRecorder::default();
    let subscriber = tracing_subscriber::registry().with(recorder.clone());
    let _guard = tracing::subscriber::set_default(subscriber);

    let mock = MockCommerce::with_cart(cart_with_id("cart_1"));
    mock.set_shipping_options(vec![flat_option("so_standard", "Standard Shipping", 5.0)])
        .await;
    mock.script_sessions(vec![payment_session(
        "pp_paypal_paypal",
        serde_json::json!({"id": "PAY-123"}),
    )])
    .await;
    let strategy = WalletPayment::paypal("pp_paypal_paypal");
    let mut flow = CheckoutFlow::new(&mock, "cart_1", us_region());

    let order_id = flow
        .prepare(&us_address_input(), false, &strategy)
        .await
        .expect("preparation should succeed");

    assert_eq!(order_id, "PAY-123");
    assert_eq!(
        recorder.names(),
        [
            "set_address",
            "commit",
            "resolve_shipping",
            "resolve",
            "initiate_payment",
            "initiate",
        ],
        "preparation must not open placement spans"
    );
}
