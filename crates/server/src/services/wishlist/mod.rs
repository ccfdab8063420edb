//! The dual wishlist store.
//!
//! Anonymous visitors get a [`GuestWishlistStore`] kept in their session;
//! signed-in users get a [`PersistedWishlist`] in the database. Both implement
//! [`WishlistBackend`] with the same semantics, and [`DualWishlist`] picks the
//! active one for a request.

pub mod merge;

use std::future::Future;

use chrono::Utc;
use harvest_market_core::UserId;
use harvest_market_core::wishlist::{
    GuestWishlist, NaturalKey, NewWishlistItem, WishlistItem, WishlistItems, WishlistSummary,
};
use harvest_market_core::WishlistError;
use tower_sessions::Session;

use crate::db::WishlistStore;
use crate::error::Result;
use crate::models::session_keys;

pub use merge::{MergeReport, merge_guest_into_user, run_pending_merge};

/// Operations every wishlist store supports.
pub trait WishlistBackend: Send + Sync {
    /// The loaded collection.
    fn items(&self) -> impl Future<Output = Result<WishlistItems>> + Send;

    /// Add an item, rejecting a duplicate natural key or a full wishlist.
    fn add_item(&self, item: WishlistItem) -> impl Future<Output = Result<WishlistItem>> + Send;

    /// Remove an item. Returns whether it was present.
    fn remove_item(&self, key: &NaturalKey) -> impl Future<Output = Result<bool>> + Send;

    /// Replace an item's notes. Returns whether it was present.
    fn update_notes(
        &self,
        key: &NaturalKey,
        notes: Option<String>,
    ) -> impl Future<Output = Result<bool>> + Send;

    /// Empty the collection, keeping the wishlist itself.
    fn clear(&self) -> impl Future<Output = Result<()>> + Send;

    /// Whether an item with `key` is present.
    fn contains(&self, key: &NaturalKey) -> impl Future<Output = Result<bool>> + Send {
        async move { Ok(self.items().await?.contains(key)) }
    }

    /// Counts over the loaded collection.
    fn summary(&self) -> impl Future<Output = Result<WishlistSummary>> + Send {
        async move { Ok(self.items().await?.summary()) }
    }
}

/// Validate an add payload as received from a client.
///
/// # Errors
///
/// Returns `AppError::Wishlist` if the payload is invalid.
pub fn new_item(payload: NewWishlistItem) -> Result<WishlistItem> {
    Ok(payload.into_item(Utc::now())?)
}

/// The guest wishlist held in the visitor's session.
pub struct GuestWishlistStore<'a> {
    session: &'a Session,
    max_items: usize,
}

impl<'a> GuestWishlistStore<'a> {
    #[must_use]
    pub const fn new(session: &'a Session, max_items: usize) -> Self {
        Self { session, max_items }
    }

    /// Load the guest wishlist.
    ///
    /// An unreadable session value is logged and treated as empty, so one
    /// corrupt blob cannot wedge every later request.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Session` if the session store fails.
    pub async fn load(&self) -> Result<GuestWishlist> {
        match self
            .session
            .get::<GuestWishlist>(session_keys::GUEST_WISHLIST)
            .await
        {
            Ok(guest) => Ok(guest.unwrap_or_default()),
            Err(tower_sessions::session::Error::SerdeJson(e)) => {
                tracing::warn!(error = %e, "Discarding unreadable guest wishlist");
                Ok(GuestWishlist::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, guest: &GuestWishlist) -> Result<()> {
        self.session
            .insert(session_keys::GUEST_WISHLIST, guest)
            .await?;
        Ok(())
    }

    /// Drop the guest wishlist from the session entirely.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Session` if the session store fails.
    pub async fn discard(&self) -> Result<()> {
        self.session
            .remove::<GuestWishlist>(session_keys::GUEST_WISHLIST)
            .await?;
        Ok(())
    }
}

impl WishlistBackend for GuestWishlistStore<'_> {
    async fn items(&self) -> Result<WishlistItems> {
        Ok(self.load().await?.items)
    }

    async fn add_item(&self, item: WishlistItem) -> Result<WishlistItem> {
        let mut guest = self.load().await?;
        guest.items.add(item.clone(), self.max_items)?;
        self.save(&guest).await?;
        Ok(item)
    }

    async fn remove_item(&self, key: &NaturalKey) -> Result<bool> {
        let mut guest = self.load().await?;
        let removed = guest.items.remove(key);
        if removed {
            self.save(&guest).await?;
        }
        Ok(removed)
    }

    async fn update_notes(&self, key: &NaturalKey, notes: Option<String>) -> Result<bool> {
        let mut guest = self.load().await?;
        let found = guest.items.update_notes(key, notes);
        if found {
            self.save(&guest).await?;
        }
        Ok(found)
    }

    async fn clear(&self) -> Result<()> {
        let mut guest = self.load().await?;
        guest.items.clear();
        self.save(&guest).await
    }
}

/// A signed-in user's persisted wishlist.
pub struct PersistedWishlist<S> {
    store: S,
    user: UserId,
    max_items: usize,
}

impl<S: WishlistStore> PersistedWishlist<S> {
    #[must_use]
    pub const fn new(store: S, user: UserId, max_items: usize) -> Self {
        Self {
            store,
            user,
            max_items,
        }
    }
}

impl<S: WishlistStore> WishlistBackend for PersistedWishlist<S> {
    async fn items(&self) -> Result<WishlistItems> {
        Ok(self.store.load_or_create(self.user).await?.items)
    }

    async fn add_item(&self, item: WishlistItem) -> Result<WishlistItem> {
        let mut wishlist = self.store.load_or_create(self.user).await?;
        wishlist.items.add(item.clone(), self.max_items)?;

        // A concurrent add of the same key can land between load and insert.
        if !self.store.insert_item(wishlist.id, &item).await? {
            return Err(WishlistError::Duplicate(item.key()).into());
        }
        tracing::info!(user_id = %self.user, item = %item.key(), "Wishlist item added");
        Ok(item)
    }

    async fn remove_item(&self, key: &NaturalKey) -> Result<bool> {
        let wishlist = self.store.load_or_create(self.user).await?;
        Ok(self.store.remove_item(wishlist.id, key).await?)
    }

    async fn update_notes(&self, key: &NaturalKey, notes: Option<String>) -> Result<bool> {
        let wishlist = self.store.load_or_create(self.user).await?;
        Ok(self
            .store
            .update_notes(wishlist.id, key, notes.as_deref())
            .await?)
    }

    async fn clear(&self) -> Result<()> {
        let wishlist = self.store.load_or_create(self.user).await?;
        let removed = self.store.clear(wishlist.id).await?;
        tracing::info!(user_id = %self.user, removed, "Wishlist cleared");
        Ok(())
    }
}

/// The wishlist store active for a request.
pub enum DualWishlist<'a, S> {
    Guest(GuestWishlistStore<'a>),
    Persisted(PersistedWishlist<S>),
}

impl<'a, S: WishlistStore> DualWishlist<'a, S> {
    /// The guest store when nobody is signed in, the persisted one otherwise.
    #[must_use]
    pub fn for_user(
        session: &'a Session,
        store: S,
        user: Option<UserId>,
        max_items: usize,
    ) -> Self {
        match user {
            Some(user) => Self::Persisted(PersistedWishlist::new(store, user, max_items)),
            None => Self::Guest(GuestWishlistStore::new(session, max_items)),
        }
    }
}

impl<S: WishlistStore> WishlistBackend for DualWishlist<'_, S> {
    async fn items(&self) -> Result<WishlistItems> {
        match self {
            Self::Guest(guest) => guest.items().await,
            Self::Persisted(persisted) => persisted.items().await,
        }
    }

    async fn add_item(&self, item: WishlistItem) -> Result<WishlistItem> {
        match self {
            Self::Guest(guest) => guest.add_item(item).await,
            Self::Persisted(persisted) => persisted.add_item(item).await,
        }
    }

    async fn remove_item(&self, key: &NaturalKey) -> Result<bool> {
        match self {
            Self::Guest(guest) => guest.remove_item(key).await,
            Self::Persisted(persisted) => persisted.remove_item(key).await,
        }
    }

    async fn update_notes(&self, key: &NaturalKey, notes: Option<String>) -> Result<bool> {
        match self {
            Self::Guest(guest) => guest.update_notes(key, notes).await,
            Self::Persisted(persisted) => persisted.update_notes(key, notes).await,
        }
    }

    async fn clear(&self) -> Result<()> {
        match self {
            Self::Guest(guest) => guest.clear().await,
            Self::Persisted(persisted) => persisted.clear().await,
        }
    }
}
