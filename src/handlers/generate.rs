use axum::{Json, extract::State};
use chrono::Utc;
use serde::Serialize;
use serde_json::{Value, json};
use tracing::info;

use super::maybe_persist;
use crate::db::ArtifactKind;
use crate::error::BuddyError;
use crate::generators::text::{self, TextStats};
use crate::generators::{
    GeneratedPasswords, PersonalField, UuidItem, number, password, personal, uuid,
};
use crate::middleware::ApiJson;
use crate::router::BuddyState;
use crate::types::api::{
    NumberRequest, PasswordRequest, PersonalInfoRequest, PersonalInfoResponse, TextGenerateRequest,
    TextGenerateResponse, TextStatsRequest, UuidRequest,
};
use crate::types::{ApiResponse, StoredRef};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordResponse {
    #[serde(flatten)]
    pub generated: GeneratedPasswords,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stored: Option<StoredRef>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UuidResponse {
    pub uuids: Vec<UuidItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stored: Option<StoredRef>,
}

/// POST /api/passwords
pub async fn passwords(
    State(state): State<BuddyState>,
    ApiJson(req): ApiJson<PasswordRequest>,
) -> Result<Json<ApiResponse<PasswordResponse>>, BuddyError> {
    let generated = password::generate_passwords(&mut rand::rng(), &req.options, req.count)?;
    info!(
        count = generated.passwords.len(),
        length = req.options.length,
        "passwords generated"
    );
    let stored = maybe_persist(
        &state,
        ArtifactKind::Password,
        &serde_json::to_value(&generated)?,
        &req.persist,
    )
    .await?;
    Ok(ApiResponse::ok(PasswordResponse { generated, stored }))
}

/// POST /api/uuids
pub async fn uuids(
    State(state): State<BuddyState>,
    ApiJson(req): ApiJson<UuidRequest>,
) -> Result<Json<ApiResponse<UuidResponse>>, BuddyError> {
    let uuids = uuid::generate_uuids_local(&mut rand::rng(), req.count, req.version, req.format)?;
    info!(count = uuids.len(), version = ?req.version, "uuids generated");
    let stored = maybe_persist(
        &state,
        ArtifactKind::Uuid,
        &serde_json::to_value(&uuids)?,
        &req.persist,
    )
    .await?;
    Ok(ApiResponse::ok(UuidResponse { uuids, stored }))
}

/// POST /api/personal-info
pub async fn personal_info(
    State(state): State<BuddyState>,
    ApiJson(req): ApiJson<PersonalInfoRequest>,
) -> Result<Json<ApiResponse<PersonalInfoResponse>>, BuddyError> {
    let today = Utc::now().date_naive();
    let people = personal::generate_personal_info(&mut rand::rng(), &req.options, today)?;
    let fields = if req.options.fields.is_empty() {
        PersonalField::ALL.to_vec()
    } else {
        req.options.fields.clone()
    };
    let records: Vec<Value> = people
        .iter()
        .map(|p| Value::Object(p.project(&fields)))
        .collect();
    info!(count = records.len(), "personal info generated");

    let stored = maybe_persist(
        &state,
        ArtifactKind::PersonalInfo,
        &Value::Array(records.clone()),
        &req.persist,
    )
    .await?;
    Ok(ApiResponse::ok(PersonalInfoResponse {
        records,
        fields,
        stored,
    }))
}

/// POST /api/numbers
pub async fn numbers(
    ApiJson(req): ApiJson<NumberRequest>,
) -> Result<Json<ApiResponse<Value>>, BuddyError> {
    let values = number::generate_numbers(&mut rand::rng(), &req.spec, req.count)?;
    Ok(ApiResponse::ok(json!({ "values": values })))
}

/// POST /api/text/stats
pub async fn text_stats(
    ApiJson(req): ApiJson<TextStatsRequest>,
) -> Json<ApiResponse<TextStats>> {
    ApiResponse::ok(text::text_stats(&req.text))
}

/// POST /api/text/generate
pub async fn text_generate(
    ApiJson(req): ApiJson<TextGenerateRequest>,
) -> Result<Json<ApiResponse<TextGenerateResponse>>, BuddyError> {
    let text = match req {
        TextGenerateRequest::Random { char_class, length } => {
            text::generate_text(&mut rand::rng(), char_class, length)?
        }
        TextGenerateRequest::Repeat { unit, length } => text::repeat_text(&unit, length)?,
        TextGenerateRequest::FullWidth { text } => text::to_full_width(&text),
        TextGenerateRequest::HalfWidth { text } => text::to_half_width(&text),
        TextGenerateRequest::Base64Encode { text } => text::base64_encode(&text),
        TextGenerateRequest::Base64Decode { text } => text::base64_decode(&text)?,
    };
    Ok(ApiResponse::ok(TextGenerateResponse {
        chars: text.chars().count(),
        bytes: text.len(),
        text,
    }))
}
