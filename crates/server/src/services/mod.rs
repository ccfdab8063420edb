//! Business logic between the HTTP handlers and the repositories.
//!
//! Services are generic over the storage traits in [`crate::db`]; handlers
//! pass the `PostgreSQL` repositories, tests pass in-memory ones.

pub mod farms;
pub mod profiles;
pub mod stores;
pub mod wishlist;
