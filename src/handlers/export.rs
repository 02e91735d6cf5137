use axum::{
    http::header,
    response::{IntoResponse, Response},
};

use crate::error::BuddyError;
use crate::export::export_records;
use crate::middleware::ApiJson;
use crate::types::api::ExportRequest;

const MAX_EXPORT_RECORDS: usize = 100_000;

/// Keep file names header-safe: ASCII alphanumerics, `-`, `_` and `.` only.
pub(crate) fn sanitize_file_stem(name: &str) -> String {
    let stem: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        .collect();
    let stem = stem.trim_matches('.');
    if stem.is_empty() {
        "testdata".to_string()
    } else {
        stem.to_string()
    }
}

/// POST /api/export -> downloadable body in the requested format.
pub async fn export(ApiJson(req): ApiJson<ExportRequest>) -> Result<Response, BuddyError> {
    if req.records.len() > MAX_EXPORT_RECORDS {
        return Err(BuddyError::InvalidInput(format!(
            "at most {MAX_EXPORT_RECORDS} records can be exported at once"
        )));
    }
    let exported = export_records(&req.records, req.format)?;
    let stem = sanitize_file_stem(req.file_name.as_deref().unwrap_or("testdata"));
    let file_name = exported.file_name(&stem);
    tracing::info!(records = req.records.len(), file = %file_name, "records exported");

    Ok((
        [
            (
                header::CONTENT_TYPE,
                format!("{}; charset=utf-8", exported.mime_type),
            ),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        exported.body,
    )
        .into_response())
}
