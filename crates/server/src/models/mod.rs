//! Session-scoped models for the server.

pub mod session;

pub use session::{CurrentUser, keys as session_keys};
