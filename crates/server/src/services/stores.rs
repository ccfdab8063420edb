//! Store profile registration and sub-collection editing.

use harvest_market_core::UserId;
use harvest_market_core::StoreProfileId;
use harvest_market_core::store::{
    Applied, OperationEnvelope, StoreCommand, StoreDetails, StoreInfo, StoreProfile,
};
use tracing::instrument;

use super::profiles::owned_profile;
use crate::db::ProfileStore;
use crate::error::Result;

/// Register a new store for `owner` with empty collections.
///
/// # Errors
///
/// Returns `AppError::Mutation` if the store info is invalid, or
/// `AppError::Database` if the insert fails.
#[instrument(skip(store, info), fields(owner_id = %owner))]
pub async fn register_store<S>(store: &S, owner: UserId, info: StoreInfo) -> Result<StoreProfile>
where
    S: ProfileStore<StoreDetails>,
{
    let details = StoreDetails::new(info.validate()?);
    let profile = store.insert(owner, &details).await?;
    tracing::info!(store_id = %profile.id, "Store registered");
    Ok(profile)
}

/// Apply one envelope operation to a store the caller owns.
///
/// The envelope is turned into a command before the store is loaded, so a
/// malformed request never touches storage.
///
/// # Errors
///
/// - `AppError::Mutation` if the envelope is malformed or an add collides
/// - `AppError::NotFound` if the store is absent or not owned by `user`
/// - `AppError::Database` with `Conflict` if the store changed concurrently
#[instrument(skip(store, envelope), fields(store_id = %id, user_id = %user, operation = %envelope.operation))]
pub async fn edit_store<S>(
    store: &S,
    id: StoreProfileId,
    user: UserId,
    envelope: OperationEnvelope,
) -> Result<StoreProfile>
where
    S: ProfileStore<StoreDetails>,
{
    let command = StoreCommand::try_from(envelope)?;
    let mut profile = owned_profile(store, id, user).await?;

    match profile.details.apply(command)? {
        Applied::Unchanged => {
            tracing::debug!("Store operation addressed nothing");
            Ok(profile)
        }
        Applied::Changed => {
            let updated = store.replace(id, profile.version, &profile.details).await?;
            tracing::info!(
                version = updated.version,
                branches = updated.details.branches.len(),
                store_images = updated.details.store_images.len(),
                "Store updated"
            );
            Ok(updated)
        }
    }
}
