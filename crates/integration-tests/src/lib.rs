//! Integration tests for Harvest Market.
//!
//! The services are exercised end to end against in-memory implementations
//! of the repository traits, so no database is needed:
//!
//! ```bash
//! cargo test -p harvest-market-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `farm_discriminator` - Farm registration, updates, ownership and CAS
//! - `store_editor` - Store operation envelopes against stored profiles
//! - `wishlist_merge` - Guest and persisted wishlists, sign-in merge

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicI32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use harvest_market_core::wishlist::{NaturalKey, Wishlist, WishlistItem, WishlistItems};
use harvest_market_core::{Profile, ProfileDocument, UserId, WishlistId};
use harvest_market_server::db::{ProfileStore, RepositoryError, WishlistStore};
use harvest_market_server::middleware::set_current_user;
use harvest_market_server::models::CurrentUser;
use tower_sessions::{MemoryStore, Session};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Profile storage held in memory, with the same version semantics as the
/// `PostgreSQL` repository.
pub struct MemoryProfileStore<D: ProfileDocument> {
    rows: Mutex<BTreeMap<i32, Profile<D>>>,
    next_id: AtomicI32,
}

impl<D: ProfileDocument> Default for MemoryProfileStore<D> {
    fn default() -> Self {
        Self {
            rows: Mutex::new(BTreeMap::new()),
            next_id: AtomicI32::new(1),
        }
    }
}

impl<D: ProfileDocument> MemoryProfileStore<D> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The stored profile, bypassing ownership checks.
    #[must_use]
    pub fn get(&self, id: D::Id) -> Option<Profile<D>> {
        let key: i32 = id.into();
        lock(&self.rows).get(&key).cloned()
    }

    /// Simulate a concurrent writer bumping the stored version.
    pub fn bump_version(&self, id: D::Id) {
        let key: i32 = id.into();
        if let Some(profile) = lock(&self.rows).get_mut(&key) {
            profile.version += 1;
        }
    }
}

impl<D: ProfileDocument> ProfileStore<D> for MemoryProfileStore<D> {
    async fn insert(&self, owner: UserId, details: &D) -> Result<Profile<D>, RepositoryError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let now = Utc::now();
        let profile = Profile {
            id: D::Id::from(id),
            owner_id: owner,
            details: details.clone(),
            version: 1,
            created_at: now,
            updated_at: now,
        };
        lock(&self.rows).insert(id, profile.clone());
        Ok(profile)
    }

    async fn find(&self, id: D::Id) -> Result<Option<Profile<D>>, RepositoryError> {
        Ok(self.get(id))
    }

    async fn list_by_owner(&self, owner: UserId) -> Result<Vec<Profile<D>>, RepositoryError> {
        Ok(lock(&self.rows)
            .values()
            .filter(|profile| profile.owner_id == owner)
            .cloned()
            .collect())
    }

    async fn replace(
        &self,
        id: D::Id,
        expected_version: i64,
        details: &D,
    ) -> Result<Profile<D>, RepositoryError> {
        let key: i32 = id.into();
        let mut rows = lock(&self.rows);
        let profile = rows.get_mut(&key).ok_or(RepositoryError::NotFound)?;
        if profile.version != expected_version {
            return Err(RepositoryError::Conflict(format!(
                "{} {id} is at version {}, expected {expected_version}",
                D::KIND,
                profile.version
            )));
        }
        profile.details = details.clone();
        profile.version += 1;
        profile.updated_at = Utc::now();
        Ok(profile.clone())
    }

    async fn delete(&self, id: D::Id) -> Result<bool, RepositoryError> {
        let key: i32 = id.into();
        Ok(lock(&self.rows).remove(&key).is_some())
    }
}

struct StoredWishlist {
    id: WishlistId,
    items: Vec<WishlistItem>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl StoredWishlist {
    fn touch_if(&mut self, changed: bool) {
        if changed {
            self.updated_at = Utc::now();
        }
    }
}

#[derive(Default)]
struct WishlistRows {
    by_user: BTreeMap<i32, StoredWishlist>,
    next_id: i32,
}

impl WishlistRows {
    fn find_mut(&mut self, wishlist: WishlistId) -> Result<&mut StoredWishlist, RepositoryError> {
        self.by_user
            .values_mut()
            .find(|stored| stored.id == wishlist)
            .ok_or(RepositoryError::NotFound)
    }
}

/// Persisted wishlist storage held in memory.
///
/// Inserts ignore keys already present, like `ON CONFLICT DO NOTHING`, and
/// any write that changes an item advances `updated_at`. Clones share the
/// same rows.
#[derive(Clone, Default)]
pub struct MemoryWishlistStore {
    rows: Arc<Mutex<WishlistRows>>,
    fail_bulk_inserts: Arc<AtomicBool>,
    bulk_inserts: Arc<AtomicUsize>,
}

impl MemoryWishlistStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every later bulk insert fail with a database error.
    pub fn fail_bulk_inserts(&self, fail: bool) {
        self.fail_bulk_inserts.store(fail, Ordering::SeqCst);
    }

    /// Number of bulk inserts attempted so far.
    #[must_use]
    pub fn bulk_insert_count(&self) -> usize {
        self.bulk_inserts.load(Ordering::SeqCst)
    }

    /// The user's stored items, in insertion order.
    #[must_use]
    pub fn items_for(&self, user: UserId) -> Vec<WishlistItem> {
        lock(&self.rows)
            .by_user
            .get(&user.as_i32())
            .map(|stored| stored.items.clone())
            .unwrap_or_default()
    }
}

fn insert_if_absent(items: &mut Vec<WishlistItem>, item: &WishlistItem) -> bool {
    let key = item.key();
    if items.iter().any(|existing| existing.key() == key) {
        return false;
    }
    items.push(item.clone());
    true
}

impl WishlistStore for MemoryWishlistStore {
    async fn load_or_create(&self, user: UserId) -> Result<Wishlist, RepositoryError> {
        let key = user.as_i32();
        let mut rows = lock(&self.rows);
        if !rows.by_user.contains_key(&key) {
            rows.next_id += 1;
            let id = WishlistId::new(rows.next_id);
            let now = Utc::now();
            rows.by_user.insert(
                key,
                StoredWishlist {
                    id,
                    items: Vec::new(),
                    created_at: now,
                    updated_at: now,
                },
            );
        }
        let stored = rows.by_user.get(&key).ok_or(RepositoryError::NotFound)?;

        Ok(Wishlist {
            id: stored.id,
            user_id: user,
            items: WishlistItems::from(stored.items.clone()),
            created_at: stored.created_at,
            updated_at: stored.updated_at,
        })
    }

    async fn insert_item(
        &self,
        wishlist: WishlistId,
        item: &WishlistItem,
    ) -> Result<bool, RepositoryError> {
        let mut rows = lock(&self.rows);
        let stored = rows.find_mut(wishlist)?;
        let inserted = insert_if_absent(&mut stored.items, item);
        stored.touch_if(inserted);
        Ok(inserted)
    }

    async fn insert_items(
        &self,
        wishlist: WishlistId,
        items: &[WishlistItem],
    ) -> Result<u64, RepositoryError> {
        self.bulk_inserts.fetch_add(1, Ordering::SeqCst);
        if self.fail_bulk_inserts.load(Ordering::SeqCst) {
            return Err(RepositoryError::Database(sqlx::Error::PoolTimedOut));
        }

        let mut rows = lock(&self.rows);
        let stored = rows.find_mut(wishlist)?;
        let inserted = items
            .iter()
            .filter(|item| insert_if_absent(&mut stored.items, item))
            .count();
        stored.touch_if(inserted > 0);
        Ok(u64::try_from(inserted).unwrap_or(u64::MAX))
    }

    async fn remove_item(
        &self,
        wishlist: WishlistId,
        key: &NaturalKey,
    ) -> Result<bool, RepositoryError> {
        let mut rows = lock(&self.rows);
        let stored = rows.find_mut(wishlist)?;
        let before = stored.items.len();
        stored.items.retain(|item| item.key() != *key);
        let removed = stored.items.len() != before;
        stored.touch_if(removed);
        Ok(removed)
    }

    async fn update_notes(
        &self,
        wishlist: WishlistId,
        key: &NaturalKey,
        notes: Option<&str>,
    ) -> Result<bool, RepositoryError> {
        let mut rows = lock(&self.rows);
        let stored = rows.find_mut(wishlist)?;
        let Some(item) = stored.items.iter_mut().find(|item| item.key() == *key) else {
            return Ok(false);
        };
        item.notes = notes.map(str::to_owned);
        stored.touch_if(true);
        Ok(true)
    }

    async fn clear(&self, wishlist: WishlistId) -> Result<u64, RepositoryError> {
        let mut rows = lock(&self.rows);
        let stored = rows.find_mut(wishlist)?;
        let removed = u64::try_from(stored.items.len()).unwrap_or(u64::MAX);
        stored.items.clear();
        stored.touch_if(removed > 0);
        Ok(removed)
    }
}

/// A fresh anonymous session backed by an in-memory session store.
#[must_use]
pub fn anonymous_session() -> Session {
    Session::new(None, Arc::new(MemoryStore::default()), None)
}

/// Sign `user` in on `session`, as an upstream authenticator would.
///
/// # Errors
///
/// Returns an error if the session cannot be written.
pub async fn sign_in(session: &Session, user: UserId) -> Result<(), tower_sessions::session::Error> {
    set_current_user(session, &CurrentUser { id: user }).await
}
