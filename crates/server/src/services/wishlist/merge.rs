//! Guest-to-user wishlist merge.
//!
//! The merge runs once per sign-in. Guest items are staged against the
//! persisted wishlist, written in one idempotent bulk insert, and only then is
//! the guest wishlist dropped and the session marked as merged. A failed write
//! leaves the session untouched so the next request tries again.

use harvest_market_core::UserId;
use harvest_market_core::wishlist::{WishlistItems, WishlistSessionState, plan_merge};
use serde::Serialize;
use tower_sessions::Session;
use tracing::instrument;

use super::GuestWishlistStore;
use crate::db::WishlistStore;
use crate::error::Result;
use crate::middleware::auth::current_user;
use crate::models::session_keys;

/// Outcome of one merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MergeReport {
    /// Guest items considered.
    pub attempted: usize,
    /// Items written to the persisted wishlist.
    pub inserted: usize,
    /// Items not written: already present, invalid, or over capacity.
    pub skipped: usize,
}

/// Merge the session's guest wishlist into `user`'s persisted wishlist.
///
/// # Errors
///
/// Returns an error if the persisted wishlist cannot be loaded or written, or
/// the session cannot be updated. The guest wishlist is kept in that case.
#[instrument(skip(session, store), fields(user_id = %user))]
pub async fn merge_guest_into_user<S: WishlistStore>(
    session: &Session,
    store: &S,
    user: UserId,
    max_items: usize,
) -> Result<MergeReport> {
    let guest_store = GuestWishlistStore::new(session, max_items);
    let guest = guest_store.load().await?;
    let attempted = guest.items.len();

    let mut report = MergeReport {
        attempted,
        ..MergeReport::default()
    };

    if attempted > 0 {
        let valid: WishlistItems = guest
            .items
            .iter()
            .filter(|item| match item.validate() {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!(item = %item.key(), error = %e, "Skipping invalid guest item");
                    false
                }
            })
            .cloned()
            .collect::<Vec<_>>()
            .into();

        let wishlist = store.load_or_create(user).await?;
        let plan = plan_merge(&valid, &wishlist.items, max_items);
        if plan.over_capacity > 0 {
            tracing::warn!(
                dropped = plan.over_capacity,
                max_items,
                "Guest items dropped at wishlist capacity"
            );
        }

        let inserted = store.insert_items(wishlist.id, &plan.to_insert).await?;
        report.inserted = usize::try_from(inserted).unwrap_or(usize::MAX);
    }

    report.skipped = report.attempted.saturating_sub(report.inserted);

    guest_store.discard().await?;
    session
        .insert(session_keys::WISHLIST_MERGED_FOR, user)
        .await?;

    tracing::info!(
        attempted = report.attempted,
        inserted = report.inserted,
        skipped = report.skipped,
        "Guest wishlist merged"
    );
    Ok(report)
}

/// Run the merge if the session is signed in but not yet merged.
///
/// Returns `None` when there was nothing to do (anonymous or already merged).
///
/// # Errors
///
/// Returns an error if the session cannot be read or the merge fails.
pub async fn run_pending_merge<S: WishlistStore>(
    session: &Session,
    store: &S,
    max_items: usize,
) -> Result<Option<MergeReport>> {
    let user = current_user(session).await?.map(|user| user.id);
    let merged_for: Option<UserId> = session.get(session_keys::WISHLIST_MERGED_FOR).await?;

    match WishlistSessionState::resolve(user, merged_for) {
        WishlistSessionState::AuthenticatedUnmerged(user) => {
            merge_guest_into_user(session, store, user, max_items)
                .await
                .map(Some)
        }
        WishlistSessionState::Anonymous | WishlistSessionState::AuthenticatedMerged(_) => Ok(None),
    }
}
