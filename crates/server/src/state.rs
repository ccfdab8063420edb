//! Application state shared across handlers.

use std::sync::Arc;

use harvest_market_core::farm::FarmDetails;
use harvest_market_core::store::StoreDetails;
use sqlx::PgPool;

use crate::config::ServerConfig;
use crate::db::{PgProfileRepository, PgWishlistRepository};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    pool: PgPool,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: ServerConfig, pool: PgPool) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, pool }),
        }
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Farm profile repository.
    #[must_use]
    pub fn farms(&self) -> PgProfileRepository<'_, FarmDetails> {
        PgProfileRepository::new(self.pool())
    }

    /// Store profile repository.
    #[must_use]
    pub fn stores(&self) -> PgProfileRepository<'_, StoreDetails> {
        PgProfileRepository::new(self.pool())
    }

    /// Persisted wishlist repository.
    #[must_use]
    pub fn wishlists(&self) -> PgWishlistRepository<'_> {
        PgWishlistRepository::new(self.pool())
    }
}
