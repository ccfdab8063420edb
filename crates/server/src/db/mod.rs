//! Database operations for the market `PostgreSQL` database.
//!
//! ## Tables (schema `market`)
//!
//! - `farm_profile` - Farm profile documents (JSONB) with a version column
//! - `store_profile` - Store profile documents (JSONB) with a version column
//! - `wishlist` - One persisted wishlist per user
//! - `wishlist_item` - Wishlist items, unique per `(wishlist_id, item_id, item_type)`
//!
//! Sessions live in `tower_sessions.session`.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p harvest-market-cli -- migrate
//! ```
//!
//! # Storage seams
//!
//! Services depend on [`ProfileStore`] and [`WishlistStore`] rather than on the
//! `PostgreSQL` repositories directly, so they can run against any backend that
//! honours the same compare-and-swap and natural-key contracts.

pub mod profiles;
pub mod wishlists;

use std::future::Future;
use std::time::Duration;

use harvest_market_core::wishlist::{NaturalKey, Wishlist, WishlistItem};
use harvest_market_core::{Profile, ProfileDocument, UserId, WishlistId};
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use profiles::{PgProfileRepository, PgTable};
pub use wishlists::PgWishlistRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// The write lost a race against a concurrent one.
    #[error("conflict: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
/// * `max_connections` - Upper bound on pooled connections
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(
    database_url: &secrecy::SecretString,
    max_connections: u32,
) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .min_connections(2.min(max_connections))
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Document storage for one profile kind.
///
/// Writes are whole-document replacements guarded by the stored version.
pub trait ProfileStore<D: ProfileDocument>: Send + Sync {
    /// Insert a new profile at version 1.
    fn insert(
        &self,
        owner: UserId,
        details: &D,
    ) -> impl Future<Output = Result<Profile<D>, RepositoryError>> + Send;

    /// Load a profile by id.
    fn find(
        &self,
        id: D::Id,
    ) -> impl Future<Output = Result<Option<Profile<D>>, RepositoryError>> + Send;

    /// All profiles owned by `owner`, oldest first.
    fn list_by_owner(
        &self,
        owner: UserId,
    ) -> impl Future<Output = Result<Vec<Profile<D>>, RepositoryError>> + Send;

    /// Replace the document if the stored version still equals
    /// `expected_version`, bumping the version.
    ///
    /// Returns `RepositoryError::Conflict` when the version moved and
    /// `RepositoryError::NotFound` when the profile is gone.
    fn replace(
        &self,
        id: D::Id,
        expected_version: i64,
        details: &D,
    ) -> impl Future<Output = Result<Profile<D>, RepositoryError>> + Send;

    /// Delete a profile. Returns whether a row was removed.
    fn delete(&self, id: D::Id) -> impl Future<Output = Result<bool, RepositoryError>> + Send;
}

/// Persisted wishlist storage.
///
/// Item inserts are idempotent on the natural key: inserting a key that is
/// already present is not an error and changes nothing.
pub trait WishlistStore: Send + Sync {
    /// Load the user's wishlist, creating an empty one on first access.
    fn load_or_create(
        &self,
        user: UserId,
    ) -> impl Future<Output = Result<Wishlist, RepositoryError>> + Send;

    /// Insert one item. Returns `false` if the natural key was already present.
    fn insert_item(
        &self,
        wishlist: WishlistId,
        item: &WishlistItem,
    ) -> impl Future<Output = Result<bool, RepositoryError>> + Send;

    /// Insert many items in one write. Returns the number actually inserted.
    fn insert_items(
        &self,
        wishlist: WishlistId,
        items: &[WishlistItem],
    ) -> impl Future<Output = Result<u64, RepositoryError>> + Send;

    /// Remove an item. Returns whether it existed.
    fn remove_item(
        &self,
        wishlist: WishlistId,
        key: &NaturalKey,
    ) -> impl Future<Output = Result<bool, RepositoryError>> + Send;

    /// Replace an item's notes. Returns whether it existed.
    fn update_notes(
        &self,
        wishlist: WishlistId,
        key: &NaturalKey,
        notes: Option<&str>,
    ) -> impl Future<Output = Result<bool, RepositoryError>> + Send;

    /// Remove every item, keeping the wishlist record.
    fn clear(&self, wishlist: WishlistId) -> impl Future<Output = Result<u64, RepositoryError>> + Send;
}
