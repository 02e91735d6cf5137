use axum::Json;
use serde_json::{Value, json};
use tracing::{debug, error, info, warn};

use crate::middleware::ApiJson;
use crate::types::ApiResponse;
use crate::types::api::{ClientLogEntry, ClientLogLevel};

const MAX_MESSAGE_CHARS: usize = 2000;

/// POST /api/logs -> re-emit a browser-side log line through tracing.
pub async fn client_log(ApiJson(entry): ApiJson<ClientLogEntry>) -> Json<ApiResponse<Value>> {
    let message: String = entry.message.chars().take(MAX_MESSAGE_CHARS).collect();
    let context = entry
        .context
        .as_ref()
        .map(Value::to_string)
        .unwrap_or_default();

    match entry.level {
        ClientLogLevel::Debug => debug!(source = "client", %context, "{message}"),
        ClientLogLevel::Info => info!(source = "client", %context, "{message}"),
        ClientLogLevel::Warn => warn!(source = "client", %context, "{message}"),
        ClientLogLevel::Error => error!(source = "client", %context, "{message}"),
    }
    ApiResponse::ok(json!({ "received": true }))
}
