use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};

use crate::config::Config;
use crate::db::ArtifactStorage;
use crate::generators::BulkGenerator;
use crate::handlers::{artifacts, export, files, generate, health, logs};
use crate::service::janitor_actor::JanitorHandle;

/// JSON request bodies above this size are rejected with 413.
pub const REQUEST_BODY_LIMIT: usize = 8 * 1024 * 1024;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct BuddyState {
    pub storage: ArtifactStorage,
    pub janitor: JanitorHandle,
    pub bulk: BulkGenerator,
    pub file_limiter: Arc<DefaultDirectRateLimiter>,
    pub admin_key: Arc<str>,
    pub default_ttl: chrono::Duration,
    pub environment: Arc<str>,
    pub started_at: Instant,
}

impl BuddyState {
    pub fn new(storage: ArtifactStorage, janitor: JanitorHandle, cfg: &Config) -> Self {
        let per_minute = NonZeroU32::new(cfg.file_requests_per_minute).unwrap_or(NonZeroU32::MIN);
        Self {
            storage,
            janitor,
            bulk: BulkGenerator::default().with_limit(cfg.file_size_limit()),
            file_limiter: Arc::new(RateLimiter::direct(Quota::per_minute(per_minute))),
            admin_key: Arc::from(cfg.admin_key.as_str()),
            default_ttl: cfg.default_ttl(),
            environment: Arc::from(cfg.environment.as_str()),
            started_at: Instant::now(),
        }
    }
}

pub fn buddy_router(state: BuddyState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/detailed", get(health::health_detailed))
        .route("/api/logs", post(logs::client_log))
        .route("/api/passwords", post(generate::passwords))
        .route("/api/uuids", post(generate::uuids))
        .route("/api/personal-info", post(generate::personal_info))
        .route("/api/numbers", post(generate::numbers))
        .route("/api/text/stats", post(generate::text_stats))
        .route("/api/text/generate", post(generate::text_generate))
        .route("/api/export", post(export::export))
        .route("/api/files/generate", get(files::generate_file))
        .route("/api/artifacts/{kind}/{id}", get(artifacts::get_artifact))
        .route("/api/stats", get(artifacts::stats))
        .route("/api/admin/cleanup", post(artifacts::admin_cleanup))
        .layer(DefaultBodyLimit::max(REQUEST_BODY_LIMIT))
        .with_state(state)
}
