//! Farm profile registration and updates.

use harvest_market_core::UserId;
use harvest_market_core::farm::{FarmDetails, FarmProfile, FarmUpdateRequest};
use harvest_market_core::FarmProfileId;
use tracing::instrument;

use super::profiles::owned_profile;
use crate::db::ProfileStore;
use crate::error::Result;

/// Register a new farm for `owner`.
///
/// # Errors
///
/// Returns `AppError::Mutation` if the payload is invalid, or
/// `AppError::Database` if the insert fails.
#[instrument(skip(store, details), fields(owner_id = %owner))]
pub async fn register_farm<S>(store: &S, owner: UserId, details: FarmDetails) -> Result<FarmProfile>
where
    S: ProfileStore<FarmDetails>,
{
    let details = details.validate()?;
    let profile = store.insert(owner, &details).await?;
    tracing::info!(
        farm_id = %profile.id,
        farm_type = %profile.details.farm_type(),
        "Farm registered"
    );
    Ok(profile)
}

/// Apply a basic-info patch and array operations to a farm the caller owns.
///
/// The whole request is validated before anything is written; a request
/// that changes nothing is not written at all.
///
/// # Errors
///
/// - `AppError::NotFound` if the farm is absent or not owned by `user`
/// - `AppError::Mutation` if any part of the request is invalid
/// - `AppError::Database` with `Conflict` if the farm changed concurrently
#[instrument(skip(store, request), fields(farm_id = %id, user_id = %user))]
pub async fn update_farm<S>(
    store: &S,
    id: FarmProfileId,
    user: UserId,
    request: &FarmUpdateRequest,
) -> Result<FarmProfile>
where
    S: ProfileStore<FarmDetails>,
{
    let profile = owned_profile(store, id, user).await?;
    let next = profile.details.apply_update(request)?;

    if next == profile.details {
        tracing::debug!("Farm update changed nothing");
        return Ok(profile);
    }

    let updated = store.replace(id, profile.version, &next).await?;
    tracing::info!(
        version = updated.version,
        farm_type = %updated.details.farm_type(),
        array_updates = request.array_updates.len(),
        "Farm updated"
    );
    Ok(updated)
}
