//! Checkout orchestration.
//!
//! [`CheckoutFlow`] walks a cart through the checkout sequence:
//!
//! 1. validate and persist the shipping address
//! 2. resolve a shipping method from the backend's options
//! 3. open a payment session via a [`PaymentStrategy`]
//! 4. complete the cart into an order
//!
//! The remote cart is the source of truth throughout: every step re-reads
//! it to confirm what persisted, and a stale cart id fails fast with
//! [`CheckoutError::CartMissing`] before anything is mutated. The local
//! [`CheckoutState`] records how far a flow got. Steps may be repeated
//! while the flow is open (re-committing an address moves it back to
//! [`CheckoutState::AddressSet`]), but [`CheckoutState::OrderPlaced`] is
//! terminal: completion consumed the cart, so every further step fails
//! without touching the backend.

use driftwood_core::{CountryCode, RegionPolicy};
use tracing::instrument;

use crate::checkout::address::{self, AddressInput, ValidAddress};
use crate::checkout::error::CheckoutError;
use crate::checkout::ops::CartOperations;
use crate::checkout::payment::{Completion, PaymentStrategy, SessionOutcome};
use crate::checkout::shipping::{self, SelectionPolicy};
use crate::medusa::types::Cart;

/// How far a checkout flow has progressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutState {
    /// Nothing has happened yet.
    Idle,
    /// Shipping address persisted on the cart.
    AddressSet,
    /// Shipping method persisted on the cart.
    ShippingSet,
    /// Payment session opened.
    PaymentInitiated,
    /// Cart completed into an order. Terminal.
    OrderPlaced,
}

/// Orchestrates checkout for one cart.
pub struct CheckoutFlow<'a> {
    ops: &'a dyn CartOperations,
    cart_id: String,
    region: RegionPolicy,
    selection: SelectionPolicy,
    state: CheckoutState,
}

impl<'a> CheckoutFlow<'a> {
    /// Create a flow for `cart_id` with the default shipping selection.
    #[must_use]
    pub fn new(
        ops: &'a dyn CartOperations,
        cart_id: impl Into<String>,
        region: RegionPolicy,
    ) -> Self {
        Self {
            ops,
            cart_id: cart_id.into(),
            region,
            selection: SelectionPolicy::default(),
            state: CheckoutState::Idle,
        }
    }

    /// Override the shipping selection policy.
    #[must_use]
    pub const fn with_selection(mut self, selection: SelectionPolicy) -> Self {
        self.selection = selection;
        self
    }

    /// How far this flow has progressed.
    ///
    /// Once [`CheckoutState::OrderPlaced`] is reached, every step fails
    /// with [`CheckoutError::CartMissing`] and the state stays put.
    #[must_use]
    pub const fn state(&self) -> CheckoutState {
        self.state
    }

    fn require_open(&self) -> Result<(), CheckoutError> {
        // `OrderPlaced` is terminal; the completed cart no longer exists.
        if self.state == CheckoutState::OrderPlaced {
            return Err(CheckoutError::CartMissing);
        }
        Ok(())
    }

    async fn require_cart(&self) -> Result<Cart, CheckoutError> {
        self.ops
            .retrieve_cart(&self.cart_id)
            .await?
            .ok_or(CheckoutError::CartMissing)
    }

    // =========================================================================
    // Steps
    // =========================================================================

    /// Persist a validated address (and email) on the cart.
    ///
    /// Committing again with a different address overwrites the previous
    /// one; the cart carries a single shipping address.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::CartMissing`] for a stale cart id or a
    /// placed flow, before any mutation, or the errors of
    /// [`address::commit`].
    #[instrument(skip(self, valid), fields(cart_id = %self.cart_id))]
    pub async fn set_address(
        &mut self,
        valid: &ValidAddress,
        same_as_billing: bool,
    ) -> Result<Cart, CheckoutError> {
        self.require_open()?;
        self.require_cart().await?;

        let cart = address::commit(self.ops, &self.cart_id, valid, same_as_billing).await?;
        self.state = CheckoutState::AddressSet;
        tracing::debug!(cart_id = %self.cart_id, "shipping address persisted");
        Ok(cart)
    }

    /// Resolve and persist a shipping method for the cart.
    ///
    /// # Errors
    ///
    /// See [`shipping::resolve`].
    #[instrument(skip(self), fields(cart_id = %self.cart_id))]
    pub async fn resolve_shipping(&mut self) -> Result<Cart, CheckoutError> {
        self.require_open()?;
        let cart = shipping::resolve(self.ops, &self.cart_id, self.selection).await?;
        self.state = CheckoutState::ShippingSet;
        tracing::debug!(cart_id = %self.cart_id, "shipping method persisted");
        Ok(cart)
    }

    /// Open a payment session with the given strategy.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::CartMissing`] for a stale cart id, or
    /// whatever the strategy reports.
    #[instrument(
        skip(self, strategy),
        fields(cart_id = %self.cart_id, strategy = strategy.label())
    )]
    pub async fn initiate_payment(
        &mut self,
        strategy: &dyn PaymentStrategy,
    ) -> Result<SessionOutcome, CheckoutError> {
        self.require_open()?;
        let cart = self.require_cart().await?;

        let outcome = strategy.initiate(self.ops, &cart).await?;
        self.state = CheckoutState::PaymentInitiated;
        tracing::debug!(
            cart_id = %self.cart_id,
            strategy = strategy.label(),
            "payment session opened"
        );
        Ok(outcome)
    }

    /// Complete the cart into an order.
    ///
    /// # Errors
    ///
    /// Returns whatever the strategy reports, typically
    /// [`CheckoutError::PlacementFailed`] when the backend refuses.
    #[instrument(
        skip(self, strategy, country),
        fields(cart_id = %self.cart_id, strategy = strategy.label())
    )]
    pub async fn place_order(
        &mut self,
        strategy: &dyn PaymentStrategy,
        country: &CountryCode,
    ) -> Result<Completion, CheckoutError> {
        self.require_open()?;
        let completion = strategy.complete(self.ops, &self.cart_id, country).await?;
        self.state = CheckoutState::OrderPlaced;
        tracing::info!(cart_id = %self.cart_id, url = completion.url(), "order placed");
        Ok(completion)
    }

    // =========================================================================
    // Drivers
    // =========================================================================

    /// Run the whole checkout in one shot and place the order.
    ///
    /// Validation happens before any backend call, so bad input leaves the
    /// cart untouched.
    ///
    /// # Errors
    ///
    /// Returns the first error of the validation or of any step.
    pub async fn run(
        &mut self,
        input: &AddressInput,
        same_as_billing: bool,
        strategy: &dyn PaymentStrategy,
    ) -> Result<Completion, CheckoutError> {
        let valid = address::validate(input, &self.region)?;

        self.set_address(&valid, same_as_billing).await?;
        self.resolve_shipping().await?;
        self.initiate_payment(strategy).await?;
        self.place_order(strategy, &valid.country).await
    }

    /// Run checkout up to the payment session and return the external
    /// order id the client must get approved.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::PaymentIntegration`] if the strategy did
    /// not produce an external order, besides the errors of [`Self::run`]'s
    /// earlier steps.
    pub async fn prepare(
        &mut self,
        input: &AddressInput,
        same_as_billing: bool,
        strategy: &dyn PaymentStrategy,
    ) -> Result<String, CheckoutError> {
        let valid = address::validate(input, &self.region)?;

        self.set_address(&valid, same_as_billing).await?;
        self.resolve_shipping().await?;

        match self.initiate_payment(strategy).await? {
            SessionOutcome::ExternalOrder { order_id } => Ok(order_id),
            SessionOutcome::Ready => Err(CheckoutError::PaymentIntegration {
                provider: strategy.label().to_string(),
            }),
        }
    }
}
