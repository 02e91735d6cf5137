//! Database module: models and schema for persistent storage.
//!
//! Layout:
//! - `models.rs`: artifact kinds, stored rows and sweep reports
//! - `schema.rs`: SQL DDL for initializing the database (SQLite-first)
//! - `sqlite.rs`: `ArtifactStorage`, the TTL-aware store

pub mod models;
pub mod schema;
pub mod sqlite;

pub use models::{ArtifactKind, CleanupReport, StoredArtifact, TableStats};
pub use schema::SQLITE_INIT;
pub use sqlite::{ArtifactStorage, SqlitePool};
