//! Application state shared across handlers.

use std::sync::Arc;

use driftwood_core::RegionPolicy;

use crate::config::StorefrontConfig;
use crate::medusa::StoreClient;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the commerce client and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    store: StoreClient,
    region: RegionPolicy,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: StorefrontConfig) -> Self {
        let store = StoreClient::new(&config.medusa);
        let region = RegionPolicy::new(config.checkout.supported_country.clone());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                region,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the Medusa store API client.
    #[must_use]
    pub fn store(&self) -> &StoreClient {
        &self.inner.store
    }

    /// Get a reference to the region eligibility policy.
    #[must_use]
    pub fn region_policy(&self) -> &RegionPolicy {
        &self.inner.region
    }
}
