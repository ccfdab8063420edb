//! Wishlist repository.
//!
//! Item writes rely on the `(wishlist_id, item_id, item_type)` unique
//! constraint: every insert is `ON CONFLICT DO NOTHING`, so replaying an
//! insert (a retried merge, a double-clicked add) never duplicates a key.
//!
//! Any write that changes at least one item row also advances the parent
//! wishlist's `updated_at`.

use chrono::{DateTime, Utc};
use harvest_market_core::wishlist::{ItemType, NaturalKey, Wishlist, WishlistItem, WishlistItems};
use harvest_market_core::{CurrencyCode, ItemId, UserId, WishlistId};
use rust_decimal::Decimal;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use super::{RepositoryError, WishlistStore};

/// Repository for wishlist database operations.
pub struct PgWishlistRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PgWishlistRepository<'a> {
    /// Create a new wishlist repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    async fn touch(&self, wishlist: WishlistId) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE market.wishlist SET updated_at = NOW() WHERE id = $1")
            .bind(wishlist.as_i32())
            .execute(self.pool)
            .await?;
        Ok(())
    }

    async fn load_items(&self, wishlist: WishlistId) -> Result<WishlistItems, RepositoryError> {
        let rows = sqlx::query(
            r"
            SELECT item_id, item_type, name, image, price, currency,
                   in_stock, availability, notes, added_at
            FROM market.wishlist_item
            WHERE wishlist_id = $1
            ORDER BY added_at, id
            ",
        )
        .bind(wishlist.as_i32())
        .fetch_all(self.pool)
        .await?;

        let items = rows
            .iter()
            .map(item_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(WishlistItems::from(items))
    }
}

fn item_from_row(row: &PgRow) -> Result<WishlistItem, RepositoryError> {
    let item_id: String = row.try_get("item_id")?;
    let item_id = ItemId::parse(&item_id).map_err(|e| {
        RepositoryError::DataCorruption(format!("invalid item id in database: {e}"))
    })?;

    let item_type: String = row.try_get("item_type")?;
    let item_type = item_type.parse::<ItemType>().map_err(|e| {
        RepositoryError::DataCorruption(format!("invalid item type in database: {e}"))
    })?;

    let currency = row
        .try_get::<Option<String>, _>("currency")?
        .map(|code| code.parse::<CurrencyCode>())
        .transpose()
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid currency in database: {e}")))?;

    Ok(WishlistItem {
        item_id,
        item_type,
        name: row.try_get("name")?,
        image: row.try_get("image")?,
        price: row.try_get("price")?,
        currency,
        in_stock: row.try_get("in_stock")?,
        availability: row.try_get("availability")?,
        notes: row.try_get("notes")?,
        added_at: row.try_get("added_at")?,
    })
}

impl WishlistStore for PgWishlistRepository<'_> {
    async fn load_or_create(&self, user: UserId) -> Result<Wishlist, RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO market.wishlist (user_id)
            VALUES ($1)
            ON CONFLICT (user_id) DO NOTHING
            ",
        )
        .bind(user.as_i32())
        .execute(self.pool)
        .await?;

        let row = sqlx::query(
            r"
            SELECT id, user_id, created_at, updated_at
            FROM market.wishlist
            WHERE user_id = $1
            ",
        )
        .bind(user.as_i32())
        .fetch_one(self.pool)
        .await?;

        let id = WishlistId::new(row.try_get("id")?);
        let items = self.load_items(id).await?;

        Ok(Wishlist {
            id,
            user_id: UserId::new(row.try_get("user_id")?),
            items,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    async fn insert_item(
        &self,
        wishlist: WishlistId,
        item: &WishlistItem,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            INSERT INTO market.wishlist_item
                (wishlist_id, item_id, item_type, name, image, price, currency,
                 in_stock, availability, notes, added_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (wishlist_id, item_id, item_type) DO NOTHING
            ",
        )
        .bind(wishlist.as_i32())
        .bind(item.item_id.as_str())
        .bind(item.item_type.as_str())
        .bind(&item.name)
        .bind(item.image.as_deref())
        .bind(item.price)
        .bind(item.currency.map(|c| c.as_str()))
        .bind(item.in_stock)
        .bind(item.availability.as_deref())
        .bind(item.notes.as_deref())
        .bind(item.added_at)
        .execute(self.pool)
        .await?;

        let changed = result.rows_affected() > 0;
        if changed {
            self.touch(wishlist).await?;
        }
        Ok(changed)
    }

    async fn insert_items(
        &self,
        wishlist: WishlistId,
        items: &[WishlistItem],
    ) -> Result<u64, RepositoryError> {
        if items.is_empty() {
            return Ok(0);
        }

        let mut item_ids = Vec::with_capacity(items.len());
        let mut item_types = Vec::with_capacity(items.len());
        let mut names = Vec::with_capacity(items.len());
        let mut images: Vec<Option<String>> = Vec::with_capacity(items.len());
        let mut prices: Vec<Option<Decimal>> = Vec::with_capacity(items.len());
        let mut currencies: Vec<Option<String>> = Vec::with_capacity(items.len());
        let mut in_stock = Vec::with_capacity(items.len());
        let mut availability: Vec<Option<String>> = Vec::with_capacity(items.len());
        let mut notes: Vec<Option<String>> = Vec::with_capacity(items.len());
        let mut added_at: Vec<DateTime<Utc>> = Vec::with_capacity(items.len());

        for item in items {
            item_ids.push(item.item_id.to_string());
            item_types.push(item.item_type.as_str().to_owned());
            names.push(item.name.clone());
            images.push(item.image.clone());
            prices.push(item.price);
            currencies.push(item.currency.map(|c| c.as_str().to_owned()));
            in_stock.push(item.in_stock);
            availability.push(item.availability.clone());
            notes.push(item.notes.clone());
            added_at.push(item.added_at);
        }

        let result = sqlx::query(
            r"
            INSERT INTO market.wishlist_item
                (wishlist_id, item_id, item_type, name, image, price, currency,
                 in_stock, availability, notes, added_at)
            SELECT $1::int, *
            FROM UNNEST(
                $2::text[], $3::text[], $4::text[], $5::text[], $6::numeric[],
                $7::text[], $8::bool[], $9::text[], $10::text[], $11::timestamptz[]
            )
            ON CONFLICT (wishlist_id, item_id, item_type) DO NOTHING
            ",
        )
        .bind(wishlist.as_i32())
        .bind(item_ids)
        .bind(item_types)
        .bind(names)
        .bind(images)
        .bind(prices)
        .bind(currencies)
        .bind(in_stock)
        .bind(availability)
        .bind(notes)
        .bind(added_at)
        .execute(self.pool)
        .await?;

        let inserted = result.rows_affected();
        if inserted > 0 {
            self.touch(wishlist).await?;
        }
        Ok(inserted)
    }

    async fn remove_item(
        &self,
        wishlist: WishlistId,
        key: &NaturalKey,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM market.wishlist_item
            WHERE wishlist_id = $1 AND item_id = $2 AND item_type = $3
            ",
        )
        .bind(wishlist.as_i32())
        .bind(key.item_id.as_str())
        .bind(key.item_type.as_str())
        .execute(self.pool)
        .await?;

        let changed = result.rows_affected() > 0;
        if changed {
            self.touch(wishlist).await?;
        }
        Ok(changed)
    }

    async fn update_notes(
        &self,
        wishlist: WishlistId,
        key: &NaturalKey,
        notes: Option<&str>,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE market.wishlist_item
            SET notes = $4
            WHERE wishlist_id = $1 AND item_id = $2 AND item_type = $3
            ",
        )
        .bind(wishlist.as_i32())
        .bind(key.item_id.as_str())
        .bind(key.item_type.as_str())
        .bind(notes)
        .execute(self.pool)
        .await?;

        let changed = result.rows_affected() > 0;
        if changed {
            self.touch(wishlist).await?;
        }
        Ok(changed)
    }

    async fn clear(&self, wishlist: WishlistId) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM market.wishlist_item WHERE wishlist_id = $1")
            .bind(wishlist.as_i32())
            .execute(self.pool)
            .await?;

        let removed = result.rows_affected();
        if removed > 0 {
            self.touch(wishlist).await?;
        }
        Ok(removed)
    }
}
