//! HTTP backend for lists and their items.
//!
//! Requests are routed by path prefix to one of two resources, each served by
//! the same generic handlers over a SQLite store.

pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod resource;
pub mod routes;
pub mod store;

pub use error::ApiError;
pub use routes::{app, AppState};
pub use store::Store;
