pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod generators;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod service;
pub mod types;

pub use error::BuddyError;
pub use router::{BuddyState, buddy_router};
