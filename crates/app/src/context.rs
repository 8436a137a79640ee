//! App Context

use std::{sync::Arc, time::Duration};

use redis::{Client, RedisError};
use sqlx::migrate::MigrateError;
use thiserror::Error;
use tracing::info;

use crate::{
    auth::{AuthError, AuthVerifier, UsersApiAuthVerifier, UsersApiConfig},
    cache::TieredCache,
    config::AppConfig,
    customers::CustomerId,
    database::{self, Db},
    domain::{
        carts::{
            CartManager, CartsService,
            models::Cart,
            repositories::{LocalCartStore, PgCartStore},
        },
        checkout::{CheckoutOrchestrator, CheckoutService},
        items::{
            ItemStockManager, ItemsService,
            models::{Item, ItemUuid},
            publisher::RedisChangePublisher,
            repositories::{LocalItemStore, PgItemStore, RedisItemStore},
        },
        sales::{
            SalesLedger, SalesService,
            models::{Sale, SaleUuid},
            repositories::{LocalSaleStore, PgSaleStore},
        },
    },
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),

    #[error("failed to run database migrations")]
    Migrate(#[source] MigrateError),

    #[error("failed to connect to redis")]
    Redis(#[source] RedisError),

    #[error("failed to build users API client")]
    Auth(#[source] AuthError),
}

/// Every service, wired to its primary store and cache tiers.
#[derive(Clone)]
pub struct AppContext {
    pub items: Arc<dyn ItemsService>,
    pub carts: Arc<dyn CartsService>,
    pub sales: Arc<dyn SalesService>,
    pub checkout: Arc<dyn CheckoutService>,
    pub auth: Arc<dyn AuthVerifier>,
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext").finish_non_exhaustive()
    }
}

impl AppContext {
    /// Connect every backing service and wire the managers.
    ///
    /// Items read through an in-process tier then Redis; carts and sales
    /// only keep an in-process tier.
    ///
    /// # Errors
    ///
    /// Returns an error when the database, Redis or the users API client
    /// cannot be set up, or when migrations fail.
    pub async fn from_config(config: &AppConfig) -> Result<Self, AppInitError> {
        let pool = database::connect(&config.database.database_url, config.request_timeout())
            .await
            .map_err(AppInitError::Database)?;

        database::migrate(&pool)
            .await
            .map_err(AppInitError::Migrate)?;

        let redis = Client::open(config.cache.redis_url.as_str())
            .map_err(AppInitError::Redis)?
            .get_connection_manager()
            .await
            .map_err(AppInitError::Redis)?;

        let auth = UsersApiAuthVerifier::new(UsersApiConfig {
            url: config.users_api.users_api_url.clone(),
            timeout: Duration::from_secs(config.users_api.users_api_timeout_seconds),
        })
        .map_err(AppInitError::Auth)?;

        let db = Db::new(pool);
        let local_ttl = config.cache.local_ttl();

        let item_tiers = TieredCache::<ItemUuid, Item>::new()
            .with_tier("local", Arc::new(LocalItemStore::new(local_ttl)))
            .with_tier(
                "redis",
                Arc::new(RedisItemStore::new(redis.clone(), config.cache.redis_ttl())),
            );

        let items: Arc<dyn ItemsService> = Arc::new(ItemStockManager::new(
            Arc::new(PgItemStore::new(db.clone())),
            item_tiers,
            Arc::new(RedisChangePublisher::new(
                redis,
                config.item_events_channel.as_str(),
            )),
        ));

        let carts: Arc<dyn CartsService> = Arc::new(CartManager::new(
            Arc::new(PgCartStore::new(db.clone())),
            TieredCache::<CustomerId, Cart>::new()
                .with_tier("local", Arc::new(LocalCartStore::new(local_ttl))),
            items.clone(),
        ));

        let sales: Arc<dyn SalesService> = Arc::new(SalesLedger::new(
            Arc::new(PgSaleStore::new(db)),
            TieredCache::<SaleUuid, Sale>::new()
                .with_tier("local", Arc::new(LocalSaleStore::new(local_ttl))),
            items.clone(),
        ));

        let checkout = Arc::new(CheckoutOrchestrator::new(
            carts.clone(),
            items.clone(),
            sales.clone(),
        ));

        info!(channel = %config.item_events_channel, "application context ready");

        Ok(Self {
            items,
            carts,
            sales,
            checkout,
            auth: Arc::new(auth),
        })
    }
}
