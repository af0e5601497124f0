//! Application state shared across handlers.

use std::sync::Arc;

use crate::catalog::Catalog;
use crate::config::ServerConfig;
use crate::services::{CheckoutService, IdempotencyCache, PaymentGateway, ShopService, StubGateway};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// shop, the checkout pipeline and the payment gateway.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    shop: ShopService,
    checkout: CheckoutService,
    gateway: Arc<dyn PaymentGateway>,
}

impl AppState {
    /// Create application state with the default catalog and the in-process
    /// payment gateway.
    #[must_use]
    pub fn new(config: ServerConfig) -> Self {
        Self::with_gateway(config, Catalog::default(), Arc::new(StubGateway::new()))
    }

    /// Create application state with a specific catalog and gateway.
    #[must_use]
    pub fn with_gateway(
        config: ServerConfig,
        catalog: Catalog,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Self {
        let shop = ShopService::new(catalog, config.starting_balance);
        Self::from_parts(config, shop, gateway)
    }

    /// Assemble state around an existing shop service.
    #[must_use]
    pub fn from_parts(
        config: ServerConfig,
        shop: ShopService,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Self {
        let idempotency = IdempotencyCache::new(config.checkout.idempotency_ttl);
        let checkout = CheckoutService::new(shop.clone(), idempotency, &config.checkout);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                shop,
                checkout,
                gateway,
            }),
        }
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get a reference to the player and cart owner.
    #[must_use]
    pub fn shop(&self) -> &ShopService {
        &self.inner.shop
    }

    /// Get a reference to the checkout pipeline.
    #[must_use]
    pub fn checkout(&self) -> &CheckoutService {
        &self.inner.checkout
    }

    /// Get the configured payment gateway.
    #[must_use]
    pub fn gateway(&self) -> &dyn PaymentGateway {
        self.inner.gateway.as_ref()
    }
}
