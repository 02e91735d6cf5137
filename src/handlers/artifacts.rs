use axum::{Json, extract::State};
use serde_json::{Value, json};
use tracing::info;

use crate::db::{ArtifactKind, CleanupReport, StoredArtifact};
use crate::error::BuddyError;
use crate::middleware::{ApiPath, RequireAdminKey};
use crate::router::BuddyState;
use crate::types::ApiResponse;

/// GET /api/artifacts/{kind}/{id}
pub async fn get_artifact(
    State(state): State<BuddyState>,
    ApiPath((kind, id)): ApiPath<(String, i64)>,
) -> Result<Json<ApiResponse<StoredArtifact>>, BuddyError> {
    let kind: ArtifactKind = kind.parse()?;
    let artifact = state
        .storage
        .get(kind, id)
        .await?
        .ok_or_else(|| BuddyError::NotFound {
            kind: kind.as_str().to_string(),
            id,
        })?;
    Ok(ApiResponse::ok(artifact))
}

/// GET /api/stats -> per-table counts plus the last expiry sweep.
pub async fn stats(State(state): State<BuddyState>) -> Result<Json<ApiResponse<Value>>, BuddyError> {
    let tables = state.storage.stats().await?;
    let last_cleanup = state.janitor.last_report().await?;
    Ok(ApiResponse::ok(json!({
        "tables": tables,
        "lastCleanup": last_cleanup,
    })))
}

/// POST /api/admin/cleanup -> delete expired rows now.
pub async fn admin_cleanup(
    _auth: RequireAdminKey,
    State(state): State<BuddyState>,
) -> Result<Json<ApiResponse<CleanupReport>>, BuddyError> {
    let report = state.janitor.sweep_now().await?;
    info!(deleted = report.total(), "manual cleanup finished");
    Ok(ApiResponse::ok(report))
}
