pub mod artifacts;
pub mod export;
pub mod files;
pub mod generate;
pub mod health;
pub mod logs;

use chrono::Utc;
use serde_json::Value;

use crate::config::MAX_TTL_SECS;
use crate::db::ArtifactKind;
use crate::error::BuddyError;
use crate::router::BuddyState;
use crate::types::{PersistOptions, StoredRef};

/// Store `payload` when the request asked for it.
pub(crate) async fn maybe_persist(
    state: &BuddyState,
    kind: ArtifactKind,
    payload: &Value,
    opts: &PersistOptions,
) -> Result<Option<StoredRef>, BuddyError> {
    if !opts.persist {
        return Ok(None);
    }
    let ttl = match opts.ttl_secs {
        Some(0) => return Err(BuddyError::InvalidInput("ttlSecs must be positive".into())),
        Some(secs) if secs > MAX_TTL_SECS => {
            return Err(BuddyError::InvalidInput(format!(
                "ttlSecs must not exceed {MAX_TTL_SECS}"
            )));
        }
        Some(secs) => chrono::Duration::seconds(secs as i64),
        None => state.default_ttl,
    };
    let expires_at = Utc::now()
        .checked_add_signed(ttl)
        .ok_or_else(|| BuddyError::InvalidInput("ttl is out of range".into()))?;
    let artifact_id = state.storage.insert(kind, payload, ttl).await?;
    tracing::debug!(kind = kind.as_str(), artifact_id, "artifact stored");
    Ok(Some(StoredRef {
        artifact_id,
        expires_at,
    }))
}
