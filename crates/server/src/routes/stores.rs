//! Store profile API handlers.

use axum::{
    Json, Router,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    routing::get,
};
use harvest_market_core::StoreProfileId;
use harvest_market_core::store::{OperationEnvelope, StoreInfo, StoreProfile};
use tracing::instrument;

use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::services::{profiles, stores};
use crate::state::AppState;

/// Build the stores router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/stores", get(index).post(create))
        .route("/api/stores/{id}", get(show).patch(update).delete(destroy))
}

/// List the caller's stores.
#[instrument(skip_all, fields(user_id = %user.id))]
async fn index(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<StoreProfile>>> {
    Ok(Json(profiles::list_profiles(&state.stores(), user.id).await?))
}

/// Register a store from its store info.
#[instrument(skip_all, fields(user_id = %user.id))]
async fn create(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    body: std::result::Result<Json<StoreInfo>, JsonRejection>,
) -> Result<(StatusCode, Json<StoreProfile>)> {
    let Json(info) = body?;
    let profile = stores::register_store(&state.stores(), user.id, info).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

/// Read a store profile. Profiles are public.
#[instrument(skip_all)]
async fn show(
    State(state): State<AppState>,
    id: std::result::Result<Path<StoreProfileId>, PathRejection>,
) -> Result<Json<StoreProfile>> {
    let Path(id) = id?;
    Ok(Json(profiles::find_profile(&state.stores(), id).await?))
}

/// Apply one operation envelope to a store the caller owns.
#[instrument(skip_all, fields(user_id = %user.id))]
async fn update(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    id: std::result::Result<Path<StoreProfileId>, PathRejection>,
    body: std::result::Result<Json<OperationEnvelope>, JsonRejection>,
) -> Result<Json<StoreProfile>> {
    let Path(id) = id?;
    let Json(envelope) = body?;
    Ok(Json(
        stores::edit_store(&state.stores(), id, user.id, envelope).await?,
    ))
}

/// Delete a store the caller owns.
#[instrument(skip_all, fields(user_id = %user.id))]
async fn destroy(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    id: std::result::Result<Path<StoreProfileId>, PathRejection>,
) -> Result<StatusCode> {
    let Path(id) = id?;
    profiles::delete_profile(&state.stores(), id, user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
