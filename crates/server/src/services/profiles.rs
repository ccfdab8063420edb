//! Operations shared by every profile kind, including the ownership guard.
//!
//! A profile that does not exist and a profile owned by someone else are
//! indistinguishable to the caller: both are `404 Not Found`.

use harvest_market_core::{Profile, ProfileDocument, UserId};
use tracing::instrument;

use crate::db::ProfileStore;
use crate::error::{AppError, Result};

fn not_found<D: ProfileDocument>(id: D::Id) -> AppError {
    AppError::NotFound(format!("{} {id} not found", D::KIND))
}

/// Load a profile for public reading.
///
/// # Errors
///
/// Returns `AppError::NotFound` if the profile does not exist.
pub async fn find_profile<D, S>(store: &S, id: D::Id) -> Result<Profile<D>>
where
    D: ProfileDocument,
    S: ProfileStore<D>,
{
    store.find(id).await?.ok_or_else(|| not_found::<D>(id))
}

/// Load a profile the caller owns.
///
/// # Errors
///
/// Returns `AppError::NotFound` if the profile does not exist or belongs to
/// another user.
#[instrument(skip(store), fields(kind = D::KIND, profile_id = %id, user_id = %user))]
pub async fn owned_profile<D, S>(store: &S, id: D::Id, user: UserId) -> Result<Profile<D>>
where
    D: ProfileDocument,
    S: ProfileStore<D>,
{
    match store.find(id).await? {
        Some(profile) if profile.is_owned_by(user) => Ok(profile),
        Some(_) => {
            tracing::info!("Profile belongs to another user");
            Err(not_found::<D>(id))
        }
        None => Err(not_found::<D>(id)),
    }
}

/// All profiles of one kind owned by `owner`.
///
/// # Errors
///
/// Returns `AppError::Database` if the query fails.
pub async fn list_profiles<D, S>(store: &S, owner: UserId) -> Result<Vec<Profile<D>>>
where
    D: ProfileDocument,
    S: ProfileStore<D>,
{
    Ok(store.list_by_owner(owner).await?)
}

/// Delete a profile the caller owns.
///
/// # Errors
///
/// Returns `AppError::NotFound` if the profile does not exist, belongs to
/// another user, or was deleted concurrently.
#[instrument(skip(store), fields(kind = D::KIND, profile_id = %id, user_id = %user))]
pub async fn delete_profile<D, S>(store: &S, id: D::Id, user: UserId) -> Result<()>
where
    D: ProfileDocument,
    S: ProfileStore<D>,
{
    owned_profile(store, id, user).await?;
    if !store.delete(id).await? {
        return Err(not_found::<D>(id));
    }
    tracing::info!("Profile deleted");
    Ok(())
}
