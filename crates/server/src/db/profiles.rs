//! Profile repository for farm and store documents.
//!
//! Both profile kinds share one table shape, so a single generic repository
//! serves them; [`PgTable`] names the table per document type.

use std::marker::PhantomData;

use harvest_market_core::farm::FarmDetails;
use harvest_market_core::store::StoreDetails;
use harvest_market_core::{Profile, ProfileDocument, UserId};
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{PgPool, Row};

use super::{ProfileStore, RepositoryError};

/// Columns selected for every profile row.
const COLUMNS: &str = "id, owner_id, document, version, created_at, updated_at";

/// A profile document stored in its own table.
pub trait PgTable: ProfileDocument {
    /// Schema-qualified table name.
    const TABLE: &'static str;
}

impl PgTable for FarmDetails {
    const TABLE: &'static str = "market.farm_profile";
}

impl PgTable for StoreDetails {
    const TABLE: &'static str = "market.store_profile";
}

/// Repository for profile database operations.
pub struct PgProfileRepository<'a, D> {
    pool: &'a PgPool,
    _document: PhantomData<fn() -> D>,
}

impl<'a, D: PgTable> PgProfileRepository<'a, D> {
    /// Create a new profile repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            pool,
            _document: PhantomData,
        }
    }
}

fn profile_from_row<D: PgTable>(row: &PgRow) -> Result<Profile<D>, RepositoryError> {
    let Json(details) = row.try_get::<Json<D>, _>("document").map_err(|e| {
        RepositoryError::DataCorruption(format!("invalid {} document in database: {e}", D::KIND))
    })?;

    Ok(Profile {
        id: D::Id::from(row.try_get::<i32, _>("id")?),
        owner_id: UserId::new(row.try_get("owner_id")?),
        details,
        version: row.try_get("version")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

impl<D: PgTable> ProfileStore<D> for PgProfileRepository<'_, D> {
    async fn insert(&self, owner: UserId, details: &D) -> Result<Profile<D>, RepositoryError> {
        let sql = format!(
            "INSERT INTO {} (owner_id, document) VALUES ($1, $2) RETURNING {COLUMNS}",
            D::TABLE
        );
        let row = sqlx::query(&sql)
            .bind(owner.as_i32())
            .bind(Json(details))
            .fetch_one(self.pool)
            .await?;

        profile_from_row(&row)
    }

    async fn find(&self, id: D::Id) -> Result<Option<Profile<D>>, RepositoryError> {
        let raw_id: i32 = id.into();
        let sql = format!("SELECT {COLUMNS} FROM {} WHERE id = $1", D::TABLE);
        let row = sqlx::query(&sql)
            .bind(raw_id)
            .fetch_optional(self.pool)
            .await?;

        row.as_ref().map(profile_from_row).transpose()
    }

    async fn list_by_owner(&self, owner: UserId) -> Result<Vec<Profile<D>>, RepositoryError> {
        let sql = format!(
            "SELECT {COLUMNS} FROM {} WHERE owner_id = $1 ORDER BY created_at, id",
            D::TABLE
        );
        let rows = sqlx::query(&sql)
            .bind(owner.as_i32())
            .fetch_all(self.pool)
            .await?;

        rows.iter().map(profile_from_row).collect()
    }

    async fn replace(
        &self,
        id: D::Id,
        expected_version: i64,
        details: &D,
    ) -> Result<Profile<D>, RepositoryError> {
        let raw_id: i32 = id.into();
        let sql = format!(
            "UPDATE {} SET document = $3, version = version + 1, updated_at = NOW() \
             WHERE id = $1 AND version = $2 RETURNING {COLUMNS}",
            D::TABLE
        );
        let row = sqlx::query(&sql)
            .bind(raw_id)
            .bind(expected_version)
            .bind(Json(details))
            .fetch_optional(self.pool)
            .await?;

        if let Some(row) = row {
            return profile_from_row(&row);
        }

        let sql = format!("SELECT version FROM {} WHERE id = $1", D::TABLE);
        let current: Option<i64> = sqlx::query_scalar(&sql)
            .bind(raw_id)
            .fetch_optional(self.pool)
            .await?;

        match current {
            Some(version) => Err(RepositoryError::Conflict(format!(
                "{} {id} is at version {version}, expected {expected_version}",
                D::KIND
            ))),
            None => Err(RepositoryError::NotFound),
        }
    }

    async fn delete(&self, id: D::Id) -> Result<bool, RepositoryError> {
        let raw_id: i32 = id.into();
        let sql = format!("DELETE FROM {} WHERE id = $1", D::TABLE);
        let result = sqlx::query(&sql)
            .bind(raw_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
