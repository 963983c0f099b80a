//! Fleetgate Database — SurrealDB connection management, schema, and
//! repository implementations for the directory store.
//!
//! This crate provides:
//! - Connection management ([`DbManager`], [`DbConfig`])
//! - Schema initialization and migrations ([`run_migrations`])
//! - Built-in catalog seeding ([`seed_builtin_catalog`])
//! - Repository implementations for the `fleetgate-core` traits

mod bootstrap;
mod connection;
mod error;
pub mod repository;
mod schema;

pub use bootstrap::seed_builtin_catalog;
pub use connection::{DbConfig, DbManager};
pub use error::DbError;
pub use schema::{run_migrations, schema_v1};
