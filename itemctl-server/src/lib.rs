//! itemctl-server: item CRUD over HTTP
//!
//! Five JSON endpoints over a single PostgreSQL table, plus a welcome
//! message and a health probe.

pub mod db;
pub mod http;
pub mod models;

pub use db::{create_pool, DbError, ItemRepo};
pub use http::{build_router, run_server, ApiError, AppState, ServerConfig, ServerError};
pub use models::{Item, ItemPatch, NewItem, UpdateItemRequest, ValidationError};
