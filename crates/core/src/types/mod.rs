//! Core types for Harvest Market.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod currency;
pub mod email;
pub mod id;

pub use currency::{CurrencyCode, UnknownCurrency};
pub use email::{Email, EmailError};
pub use id::*;
