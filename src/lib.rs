//! Bulletin tracking service and API access layer
//!
//! The crate splits into a served CRUD surface for bulletin records and a
//! client library for consuming it alongside an external news-search API,
//! built from composable pieces: an injectable TTL cache, a bounded retry
//! engine, and an observable call-state container.

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod server;
pub mod store;

pub use error::{Error, Result};
