//! Wishlist items, natural keys and guest merge planning.
//!
//! A visitor keeps a guest wishlist in their session until they sign in; a
//! signed-in user has a persisted wishlist. Both share [`WishlistItems`], so
//! add, remove, clear and summary behave identically whichever store backs
//! them. Items are identified by their [`NaturalKey`], the referenced product
//! id plus whether it is a farm or store product.

use core::fmt;
use core::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::WishlistError;
use crate::types::{CurrencyCode, ItemId, UserId, WishlistId};

/// Kind of product a wishlist item refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ItemType {
    FarmProduct,
    StoreProduct,
}

impl ItemType {
    /// Wire and storage representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::FarmProduct => "FarmProduct",
            Self::StoreProduct => "StoreProduct",
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemType {
    type Err = WishlistError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FarmProduct" => Ok(Self::FarmProduct),
            "StoreProduct" => Ok(Self::StoreProduct),
            other => Err(WishlistError::InvalidItem(format!(
                "unknown item type `{other}`"
            ))),
        }
    }
}

/// The identity of a wishlist item within one wishlist.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NaturalKey {
    pub item_id: ItemId,
    pub item_type: ItemType,
}

impl NaturalKey {
    #[must_use]
    pub const fn new(item_id: ItemId, item_type: ItemType) -> Self {
        Self { item_id, item_type }
    }
}

impl fmt::Display for NaturalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.item_type, self.item_id)
    }
}

/// Add-item payload.
///
/// Display data (name, image, price) is captured at add time and is not kept
/// in sync with the referenced product.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWishlistItem {
    pub item_id: ItemId,
    pub item_type: ItemType,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub currency: Option<CurrencyCode>,
    #[serde(default = "default_in_stock")]
    pub in_stock: bool,
    #[serde(default)]
    pub availability: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

const fn default_in_stock() -> bool {
    true
}

impl NewWishlistItem {
    /// Validate the payload and stamp it with `added_at`.
    ///
    /// # Errors
    ///
    /// Returns `WishlistError::InvalidItem` if the name is blank or the price
    /// is negative.
    pub fn into_item(self, added_at: DateTime<Utc>) -> Result<WishlistItem, WishlistError> {
        let item = WishlistItem {
            item_id: self.item_id,
            item_type: self.item_type,
            name: self.name.trim().to_owned(),
            image: self.image,
            price: self.price,
            currency: self.currency,
            in_stock: self.in_stock,
            availability: self.availability,
            notes: self.notes,
            added_at,
        };
        item.validate()?;
        Ok(item)
    }
}

/// A product reference held in a wishlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistItem {
    pub item_id: ItemId,
    pub item_type: ItemType,
    pub name: String,
    pub image: Option<String>,
    pub price: Option<Decimal>,
    pub currency: Option<CurrencyCode>,
    pub in_stock: bool,
    pub availability: Option<String>,
    pub notes: Option<String>,
    pub added_at: DateTime<Utc>,
}

impl WishlistItem {
    /// The item's natural key.
    #[must_use]
    pub fn key(&self) -> NaturalKey {
        NaturalKey::new(self.item_id.clone(), self.item_type)
    }

    /// Check display data captured at add time.
    ///
    /// # Errors
    ///
    /// Returns `WishlistError::InvalidItem` if the name is blank or the price
    /// is negative.
    pub fn validate(&self) -> Result<(), WishlistError> {
        if self.name.trim().is_empty() {
            return Err(WishlistError::InvalidItem("name cannot be blank".to_owned()));
        }
        if self.price.is_some_and(|p| p.is_sign_negative()) {
            return Err(WishlistError::InvalidItem(
                "price cannot be negative".to_owned(),
            ));
        }
        Ok(())
    }

    fn matches(&self, key: &NaturalKey) -> bool {
        self.item_type == key.item_type && self.item_id == key.item_id
    }
}

/// Counts returned by `getSummary`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistSummary {
    pub total_items: usize,
    pub farm_products: usize,
    pub store_products: usize,
}

/// An ordered wishlist collection with unique natural keys.
///
/// Deserializing drops later duplicates, so a tampered or legacy session
/// blob cannot break uniqueness.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<WishlistItem>", into = "Vec<WishlistItem>")]
pub struct WishlistItems(Vec<WishlistItem>);

impl From<Vec<WishlistItem>> for WishlistItems {
    fn from(items: Vec<WishlistItem>) -> Self {
        let mut unique: Vec<WishlistItem> = Vec::with_capacity(items.len());
        for item in items {
            if !unique.iter().any(|u| u.matches(&item.key())) {
                unique.push(item);
            }
        }
        Self(unique)
    }
}

impl From<WishlistItems> for Vec<WishlistItem> {
    fn from(items: WishlistItems) -> Self {
        items.0
    }
}

impl WishlistItems {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Append an item.
    ///
    /// # Errors
    ///
    /// - `WishlistError::Duplicate` if the natural key is already present
    /// - `WishlistError::Full` if the collection holds `max` items
    pub fn add(&mut self, item: WishlistItem, max: usize) -> Result<(), WishlistError> {
        let key = item.key();
        if self.contains(&key) {
            return Err(WishlistError::Duplicate(key));
        }
        if self.0.len() >= max {
            return Err(WishlistError::Full { max });
        }
        self.0.push(item);
        Ok(())
    }

    /// Remove the item with `key`. Returns whether anything was removed.
    pub fn remove(&mut self, key: &NaturalKey) -> bool {
        let before = self.0.len();
        self.0.retain(|item| !item.matches(key));
        self.0.len() != before
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    #[must_use]
    pub fn contains(&self, key: &NaturalKey) -> bool {
        self.0.iter().any(|item| item.matches(key))
    }

    #[must_use]
    pub fn get(&self, key: &NaturalKey) -> Option<&WishlistItem> {
        self.0.iter().find(|item| item.matches(key))
    }

    /// Replace the notes of the item with `key`. Returns whether it exists.
    pub fn update_notes(&mut self, key: &NaturalKey, notes: Option<String>) -> bool {
        match self.0.iter_mut().find(|item| item.matches(key)) {
            Some(item) => {
                item.notes = notes;
                true
            }
            None => false,
        }
    }

    /// Totals over the loaded collection.
    #[must_use]
    pub fn summary(&self) -> WishlistSummary {
        let farm_products = self
            .0
            .iter()
            .filter(|item| item.item_type == ItemType::FarmProduct)
            .count();
        WishlistSummary {
            total_items: self.0.len(),
            farm_products,
            store_products: self.0.len() - farm_products,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &WishlistItem> {
        self.0.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a WishlistItems {
    type Item = &'a WishlistItem;
    type IntoIter = core::slice::Iter<'a, WishlistItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// The pre-authentication wishlist kept in a visitor's session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestWishlist {
    pub items: WishlistItems,
}

/// A user's persisted wishlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Wishlist {
    pub id: WishlistId,
    pub user_id: UserId,
    pub items: WishlistItems,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// What a guest-to-user merge will write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergePlan {
    /// Guest items whose key is not yet persisted, in guest order.
    pub to_insert: Vec<WishlistItem>,
    /// Guest items already present in the persisted wishlist.
    pub already_present: usize,
    /// Guest items dropped because the persisted wishlist would exceed `max`.
    pub over_capacity: usize,
}

impl MergePlan {
    /// Guest items the plan accounted for.
    #[must_use]
    pub fn attempted(&self) -> usize {
        self.to_insert.len() + self.already_present + self.over_capacity
    }
}

/// Stage a merge of `guest` into `persisted` without exceeding `max` items.
#[must_use]
pub fn plan_merge(guest: &WishlistItems, persisted: &WishlistItems, max: usize) -> MergePlan {
    let mut plan = MergePlan::default();
    let room = max.saturating_sub(persisted.len());
    for item in guest {
        if persisted.contains(&item.key()) {
            plan.already_present += 1;
        } else if plan.to_insert.len() < room {
            plan.to_insert.push(item.clone());
        } else {
            plan.over_capacity += 1;
        }
    }
    plan
}

/// Where a session stands relative to the guest-to-user merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WishlistSessionState {
    /// No signed-in user; the guest wishlist is active.
    Anonymous,
    /// Signed in, guest wishlist not yet merged for this user.
    AuthenticatedUnmerged(UserId),
    /// Signed in and merged; the persisted wishlist is the only source.
    AuthenticatedMerged(UserId),
}

impl WishlistSessionState {
    /// Derive the state from the session's current user and merge marker.
    ///
    /// A marker recorded for a different user does not count, so switching
    /// accounts in one session merges again.
    #[must_use]
    pub fn resolve(current_user: Option<UserId>, merged_for: Option<UserId>) -> Self {
        match current_user {
            None => Self::Anonymous,
            Some(user) if merged_for == Some(user) => Self::AuthenticatedMerged(user),
            Some(user) => Self::AuthenticatedUnmerged(user),
        }
    }

    /// The signed-in user, if any.
    #[must_use]
    pub const fn user(&self) -> Option<UserId> {
        match self {
            Self::Anonymous => None,
            Self::AuthenticatedUnmerged(user) | Self::AuthenticatedMerged(user) => Some(*user),
        }
    }

    #[must_use]
    pub const fn needs_merge(&self) -> bool {
        matches!(self, Self::AuthenticatedUnmerged(_))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn item(id: &str, item_type: ItemType) -> WishlistItem {
        WishlistItem {
            item_id: ItemId::parse(id).unwrap(),
            item_type,
            name: format!("item {id}"),
            image: None,
            price: Some(Decimal::new(1250, 2)),
            currency: Some(CurrencyCode::NGN),
            in_stock: true,
            availability: None,
            notes: None,
            added_at: Utc::now(),
        }
    }

    fn key(id: &str, item_type: ItemType) -> NaturalKey {
        NaturalKey::new(ItemId::parse(id).unwrap(), item_type)
    }

    #[test]
    fn test_add_rejects_duplicate_key() {
        let mut items = WishlistItems::new();
        items.add(item("42", ItemType::FarmProduct), 10).unwrap();
        let err = items.add(item("42", ItemType::FarmProduct), 10).unwrap_err();
        assert_eq!(err, WishlistError::Duplicate(key("42", ItemType::FarmProduct)));
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn test_same_id_different_type_are_distinct() {
        let mut items = WishlistItems::new();
        items.add(item("42", ItemType::FarmProduct), 10).unwrap();
        items.add(item("42", ItemType::StoreProduct), 10).unwrap();
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn test_add_respects_capacity() {
        let mut items = WishlistItems::new();
        items.add(item("1", ItemType::FarmProduct), 1).unwrap();
        assert_eq!(
            items.add(item("2", ItemType::FarmProduct), 1),
            Err(WishlistError::Full { max: 1 })
        );
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut items = WishlistItems::new();
        items.add(item("1", ItemType::StoreProduct), 10).unwrap();
        assert!(!items.remove(&key("1", ItemType::FarmProduct)));
        assert!(items.remove(&key("1", ItemType::StoreProduct)));
        assert!(items.is_empty());
    }

    #[test]
    fn test_clear_then_summary_is_zero() {
        let mut items = WishlistItems::new();
        items.add(item("1", ItemType::StoreProduct), 10).unwrap();
        items.add(item("2", ItemType::FarmProduct), 10).unwrap();
        items.add(item("3", ItemType::FarmProduct), 10).unwrap();
        assert_eq!(
            items.summary(),
            WishlistSummary {
                total_items: 3,
                farm_products: 2,
                store_products: 1
            }
        );
        items.clear();
        assert_eq!(items.summary(), WishlistSummary::default());
    }

    #[test]
    fn test_update_notes() {
        let mut items = WishlistItems::new();
        items.add(item("1", ItemType::FarmProduct), 10).unwrap();
        let k = key("1", ItemType::FarmProduct);
        assert!(items.update_notes(&k, Some("for the weekend".to_owned())));
        assert_eq!(items.get(&k).unwrap().notes.as_deref(), Some("for the weekend"));
        assert!(!items.update_notes(&key("9", ItemType::FarmProduct), None));
    }

    #[test]
    fn test_deserialize_drops_duplicates() {
        let raw = serde_json::to_value(vec![
            item("1", ItemType::FarmProduct),
            item("1", ItemType::FarmProduct),
            item("2", ItemType::FarmProduct),
        ])
        .unwrap();
        let items: WishlistItems = serde_json::from_value(raw).unwrap();
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn test_new_item_validation() {
        let payload: NewWishlistItem = serde_json::from_value(serde_json::json!({
            "itemId": "p-1",
            "itemType": "StoreProduct",
            "name": "  Honey jar  ",
            "price": "9.99"
        }))
        .unwrap();
        let stored = payload.into_item(Utc::now()).unwrap();
        assert_eq!(stored.name, "Honey jar");
        assert!(stored.in_stock);

        let blank: NewWishlistItem = serde_json::from_value(serde_json::json!({
            "itemId": "p-1",
            "itemType": "StoreProduct",
            "name": " "
        }))
        .unwrap();
        assert!(matches!(
            blank.into_item(Utc::now()),
            Err(WishlistError::InvalidItem(_))
        ));

        assert!(
            serde_json::from_value::<NewWishlistItem>(serde_json::json!({
                "itemId": "p-1",
                "itemType": "Gadget",
                "name": "x"
            }))
            .is_err()
        );
    }

    #[test]
    fn test_plan_merge_absorbs_present_and_caps() {
        let mut persisted = WishlistItems::new();
        persisted.add(item("1", ItemType::FarmProduct), 10).unwrap();

        let mut guest = WishlistItems::new();
        for id in ["1", "2", "3", "4"] {
            guest.add(item(id, ItemType::FarmProduct), 10).unwrap();
        }

        let plan = plan_merge(&guest, &persisted, 3);
        let inserted: Vec<_> = plan.to_insert.iter().map(|i| i.item_id.as_str()).collect();
        assert_eq!(inserted, ["2", "3"]);
        assert_eq!(plan.already_present, 1);
        assert_eq!(plan.over_capacity, 1);
        assert_eq!(plan.attempted(), 4);
    }

    #[test]
    fn test_session_state_resolution() {
        let user = UserId::new(7);
        let other = UserId::new(8);
        assert_eq!(
            WishlistSessionState::resolve(None, Some(user)),
            WishlistSessionState::Anonymous
        );
        assert!(WishlistSessionState::resolve(Some(user), None).needs_merge());
        assert!(WishlistSessionState::resolve(Some(user), Some(other)).needs_merge());
        assert_eq!(
            WishlistSessionState::resolve(Some(user), Some(user)),
            WishlistSessionState::AuthenticatedMerged(user)
        );
        assert_eq!(
            WishlistSessionState::AuthenticatedMerged(user).user(),
            Some(user)
        );
    }
}
