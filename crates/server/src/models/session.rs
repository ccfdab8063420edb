//! Session-related types.
//!
//! Types stored in the session for authentication and wishlist state.

use serde::{Deserialize, Serialize};

use harvest_market_core::UserId;

/// Session-stored user identity.
///
/// Sign-in happens upstream of this service; whatever authenticates the
/// visitor writes this into the session and the extractors read it back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// The signed-in user's id.
    pub id: UserId,
}

/// Session keys.
pub mod keys {
    /// Key for storing the current signed-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the guest wishlist kept before sign-in.
    pub const GUEST_WISHLIST: &str = "guest_wishlist";

    /// Key recording which user the guest wishlist was merged for.
    pub const WISHLIST_MERGED_FOR: &str = "wishlist_merged_for";
}
