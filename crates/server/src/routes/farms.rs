//! Farm profile API handlers.

use axum::{
    Json, Router,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    routing::get,
};
use harvest_market_core::FarmProfileId;
use harvest_market_core::farm::{FarmDetails, FarmProfile, FarmUpdateRequest};
use tracing::instrument;

use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::services::{farms, profiles};
use crate::state::AppState;

/// Build the farms router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/farms", get(index).post(create))
        .route("/api/farms/{id}", get(show).patch(update).delete(destroy))
}

/// List the caller's farms.
#[instrument(skip_all, fields(user_id = %user.id))]
async fn index(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<FarmProfile>>> {
    Ok(Json(profiles::list_profiles(&state.farms(), user.id).await?))
}

/// Register a farm.
#[instrument(skip_all, fields(user_id = %user.id))]
async fn create(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    body: std::result::Result<Json<FarmDetails>, JsonRejection>,
) -> Result<(StatusCode, Json<FarmProfile>)> {
    let Json(details) = body?;
    let profile = farms::register_farm(&state.farms(), user.id, details).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

/// Read a farm profile. Profiles are public.
#[instrument(skip_all)]
async fn show(
    State(state): State<AppState>,
    id: std::result::Result<Path<FarmProfileId>, PathRejection>,
) -> Result<Json<FarmProfile>> {
    let Path(id) = id?;
    Ok(Json(profiles::find_profile(&state.farms(), id).await?))
}

/// Apply `{basicInfo?, arrayUpdates?}` to a farm the caller owns.
#[instrument(skip_all, fields(user_id = %user.id))]
async fn update(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    id: std::result::Result<Path<FarmProfileId>, PathRejection>,
    body: std::result::Result<Json<FarmUpdateRequest>, JsonRejection>,
) -> Result<Json<FarmProfile>> {
    let Path(id) = id?;
    let Json(request) = body?;
    Ok(Json(
        farms::update_farm(&state.farms(), id, user.id, &request).await?,
    ))
}

/// Delete a farm the caller owns.
#[instrument(skip_all, fields(user_id = %user.id))]
async fn destroy(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    id: std::result::Result<Path<FarmProfileId>, PathRejection>,
) -> Result<StatusCode> {
    let Path(id) = id?;
    profiles::delete_profile(&state.farms(), id, user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
