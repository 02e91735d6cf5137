//! Request and response payloads of the HTTP API.

pub mod api;

pub use api::{ApiResponse, PersistOptions, StoredRef};
