//! Harvest Market Core - Domain types and the profile mutation engine.
//!
//! This crate provides the types shared by all Harvest Market components:
//! - `server` - JSON API for farm profiles, store profiles and wishlists
//! - `cli` - Command-line tools for migrations
//!
//! # Architecture
//!
//! The core crate contains only types and pure state transitions - no I/O, no
//! database access, no HTTP. Every invariant of a profile document is enforced
//! here, so the server only has to load, apply and write back.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, email addresses and currency codes
//! - [`profile`] - Versioned, owned profile documents
//! - [`farm`] - Farm profiles and the production discriminator
//! - [`store`] - Store profiles and the sub-collection editor
//! - [`wishlist`] - Wishlist items, natural keys and guest merge planning
//! - [`error`] - Validation errors raised by the mutation engine

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod error;
pub mod farm;
pub mod profile;
pub mod store;
pub mod types;
pub mod wishlist;

pub use error::{MutationError, WishlistError};
pub use profile::{Profile, ProfileDocument};
pub use types::*;
