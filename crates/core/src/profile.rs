//! Versioned, owned profile documents.
//!
//! Farm and store profiles share one storage shape: a document body owned by a
//! single user, wrapped with the server-maintained id, owner, version and
//! timestamps. The version increments on every successful write and is the
//! compare-and-swap token for optimistic concurrency.

use core::fmt;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::types::UserId;

/// A document body that can be stored as a profile.
pub trait ProfileDocument:
    Clone + fmt::Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Id type of the profile wrapping this document.
    type Id: Copy
        + Eq
        + fmt::Debug
        + fmt::Display
        + From<i32>
        + Into<i32>
        + Serialize
        + DeserializeOwned
        + Send
        + Sync
        + 'static;

    /// Human-readable kind used in logs and error messages (`farm`, `store`).
    const KIND: &'static str;
}

/// A stored profile: the document plus its server-maintained envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", bound = "")]
pub struct Profile<D: ProfileDocument> {
    pub id: D::Id,
    pub owner_id: UserId,
    #[serde(flatten)]
    pub details: D,
    /// Optimistic concurrency token.
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<D: ProfileDocument> Profile<D> {
    /// Whether `user` owns this profile.
    #[must_use]
    pub fn is_owned_by(&self, user: UserId) -> bool {
        self.owner_id == user
    }
}
