//! Database layer - connection pool, schema, and the item repository
//!
//! # Design Principles
//!
//! - Connection pool (max 5 connections by default) - no Arc<Mutex<Connection>>
//! - One transaction per repository call, released on every exit path
//! - Absence is `Ok(None)` / `Ok(false)`, never an error

pub mod items;
pub mod migrations;
pub mod pool;

pub use items::{DbError, ItemRepo};
pub use pool::{create_pool, create_pool_with_options, DEFAULT_DATABASE_URL};
