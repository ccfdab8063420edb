//! Wishlist API handlers.
//!
//! Every handler resolves the active store for the request: the session's
//! guest wishlist for anonymous visitors, the persisted wishlist once signed
//! in. Responses have the same shape either way.

use axum::{
    Json, Router,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    routing::{get, post},
};
use harvest_market_core::ItemId;
use harvest_market_core::wishlist::{
    ItemType, NaturalKey, NewWishlistItem, WishlistItem, WishlistItems, WishlistSummary,
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use crate::db::PgWishlistRepository;
use crate::error::Result;
use crate::middleware::OptionalAuth;
use crate::services::wishlist::{self, DualWishlist, WishlistBackend};
use crate::state::AppState;

/// Build the wishlist router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/wishlist", get(show).delete(clear))
        .route("/api/wishlist/summary", get(summary))
        .route("/api/wishlist/items", post(add_item))
        .route(
            "/api/wishlist/items/{item_type}/{item_id}",
            get(check_item).patch(update_notes).delete(remove_item),
        )
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WishlistResponse {
    items: WishlistItems,
    summary: WishlistSummary,
    authenticated: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InWishlistResponse {
    in_wishlist: bool,
}

#[derive(Debug, Serialize)]
struct RemovedResponse {
    removed: bool,
}

#[derive(Debug, Serialize)]
struct UpdatedResponse {
    updated: bool,
}

#[derive(Debug, Deserialize)]
struct NotesRequest {
    #[serde(default)]
    notes: Option<String>,
}

fn active_wishlist<'a>(
    state: &'a AppState,
    session: &'a Session,
    auth: &OptionalAuth,
) -> DualWishlist<'a, PgWishlistRepository<'a>> {
    DualWishlist::for_user(
        session,
        state.wishlists(),
        auth.0.map(|user| user.id),
        state.config().max_wishlist_items,
    )
}

fn item_key(
    path: std::result::Result<Path<(ItemType, ItemId)>, PathRejection>,
) -> Result<NaturalKey> {
    let Path((item_type, item_id)) = path?;
    Ok(NaturalKey::new(item_id, item_type))
}

/// The active wishlist with its summary.
#[instrument(skip_all)]
async fn show(
    auth: OptionalAuth,
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<WishlistResponse>> {
    let items = active_wishlist(&state, &session, &auth).items().await?;
    Ok(Json(WishlistResponse {
        summary: items.summary(),
        items,
        authenticated: auth.0.is_some(),
    }))
}

/// Item counts for the active wishlist.
#[instrument(skip_all)]
async fn summary(
    auth: OptionalAuth,
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<WishlistSummary>> {
    Ok(Json(
        active_wishlist(&state, &session, &auth).summary().await?,
    ))
}

/// Add an item.
#[instrument(skip_all)]
async fn add_item(
    auth: OptionalAuth,
    State(state): State<AppState>,
    session: Session,
    body: std::result::Result<Json<NewWishlistItem>, JsonRejection>,
) -> Result<(StatusCode, Json<WishlistItem>)> {
    let Json(payload) = body?;
    let item = wishlist::new_item(payload)?;
    let item = active_wishlist(&state, &session, &auth)
        .add_item(item)
        .await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// Whether an item is in the active wishlist.
#[instrument(skip_all)]
async fn check_item(
    auth: OptionalAuth,
    State(state): State<AppState>,
    session: Session,
    path: std::result::Result<Path<(ItemType, ItemId)>, PathRejection>,
) -> Result<Json<InWishlistResponse>> {
    let key = item_key(path)?;
    let in_wishlist = active_wishlist(&state, &session, &auth)
        .contains(&key)
        .await?;
    Ok(Json(InWishlistResponse { in_wishlist }))
}

/// Replace an item's notes.
#[instrument(skip_all)]
async fn update_notes(
    auth: OptionalAuth,
    State(state): State<AppState>,
    session: Session,
    path: std::result::Result<Path<(ItemType, ItemId)>, PathRejection>,
    body: std::result::Result<Json<NotesRequest>, JsonRejection>,
) -> Result<Json<UpdatedResponse>> {
    let key = item_key(path)?;
    let Json(request) = body?;
    let updated = active_wishlist(&state, &session, &auth)
        .update_notes(&key, request.notes)
        .await?;
    Ok(Json(UpdatedResponse { updated }))
}

/// Remove an item. Removing an absent item is not an error.
#[instrument(skip_all)]
async fn remove_item(
    auth: OptionalAuth,
    State(state): State<AppState>,
    session: Session,
    path: std::result::Result<Path<(ItemType, ItemId)>, PathRejection>,
) -> Result<Json<RemovedResponse>> {
    let key = item_key(path)?;
    let removed = active_wishlist(&state, &session, &auth)
        .remove_item(&key)
        .await?;
    Ok(Json(RemovedResponse { removed }))
}

/// Empty the active wishlist.
#[instrument(skip_all)]
async fn clear(
    auth: OptionalAuth,
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<WishlistSummary>> {
    let active = active_wishlist(&state, &session, &auth);
    active.clear().await?;
    Ok(Json(active.summary().await?))
}
