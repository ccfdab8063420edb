//! Harvest Market server library.
//!
//! JSON API for farm profiles, store profiles and wishlists. Profiles are
//! owned documents edited through the mutation engine in
//! `harvest_market_core`; wishlists are kept in the visitor's session until
//! sign-in and persisted afterwards.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
