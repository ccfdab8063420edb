//! Sign-in detection for the wishlist merge.
//!
//! Runs on every request inside the session layer. When the session carries a
//! current user with no merge marker for that user, the guest wishlist is
//! merged before the handler sees the request, so the handler always reads the
//! merged wishlist. A failed merge is logged and the request proceeds; the
//! marker is not written, so the next request retries.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tower_sessions::Session;

use crate::services::wishlist::run_pending_merge;
use crate::state::AppState;

/// Middleware that merges the guest wishlist once per sign-in.
pub async fn wishlist_merge_middleware(
    State(state): State<AppState>,
    session: Session,
    request: Request,
    next: Next,
) -> Response {
    let store = state.wishlists();
    match run_pending_merge(&session, &store, state.config().max_wishlist_items).await {
        Ok(Some(report)) => {
            tracing::debug!(inserted = report.inserted, "Wishlist merge completed for request");
        }
        Ok(None) => {}
        Err(e) => {
            tracing::error!(error = %e, "Guest wishlist merge failed; retrying on next request");
        }
    }

    next.run(request).await
}
