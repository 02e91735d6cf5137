use axum::{Json, response::IntoResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::export::{ExportFormat, Record};
use crate::generators::number::NumberSpec;
use crate::generators::text::CharClass;
use crate::generators::{
    ContentKind, PasswordOptions, PersonalField, PersonalInfoOptions, UuidFormat, UuidVersion,
};

/// Success envelope: `{"success": true, "data": …}`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data,
        })
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> axum::response::Response {
        Json(self).into_response()
    }
}

/// Optional persistence shared by the generation requests.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PersistOptions {
    pub persist: bool,
    /// Overrides the configured default TTL.
    pub ttl_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredRef {
    pub artifact_id: i64,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordRequest {
    #[serde(default = "one")]
    pub count: usize,
    #[serde(flatten)]
    pub options: PasswordOptions,
    #[serde(flatten)]
    pub persist: PersistOptions,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UuidRequest {
    #[serde(default = "one")]
    pub count: usize,
    #[serde(default)]
    pub version: UuidVersion,
    #[serde(default)]
    pub format: UuidFormat,
    #[serde(flatten)]
    pub persist: PersistOptions,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInfoRequest {
    #[serde(flatten)]
    pub options: PersonalInfoOptions,
    #[serde(flatten)]
    pub persist: PersistOptions,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInfoResponse {
    pub records: Vec<Value>,
    pub fields: Vec<PersonalField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stored: Option<StoredRef>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NumberRequest {
    #[serde(default = "one")]
    pub count: usize,
    #[serde(flatten)]
    pub spec: NumberSpec,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TextStatsRequest {
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum TextGenerateRequest {
    #[serde(rename_all = "camelCase")]
    Random { char_class: CharClass, length: usize },
    Repeat { unit: String, length: usize },
    FullWidth { text: String },
    HalfWidth { text: String },
    Base64Encode { text: String },
    Base64Decode { text: String },
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextGenerateResponse {
    pub text: String,
    pub chars: usize,
    pub bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRequest {
    pub records: Vec<Record>,
    pub format: ExportFormat,
    pub file_name: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FileMode {
    /// Tiled chunks streamed to the client; exact byte length.
    #[default]
    Bulk,
    /// A well-formed document close to the requested size.
    Structured,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileQuery {
    pub size: u64,
    #[serde(default, rename = "type")]
    pub kind: ContentKind,
    #[serde(default)]
    pub mode: FileMode,
    #[serde(default)]
    pub persist: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClientLogEntry {
    pub level: ClientLogLevel,
    pub message: String,
    #[serde(default)]
    pub context: Option<Value>,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ClientLogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

fn one() -> usize {
    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn password_request_flattens_options() {
        let req: PasswordRequest = serde_json::from_value(json!({
            "count": 3,
            "length": 20,
            "symbols": true,
            "excludeAmbiguous": true,
            "persist": true,
            "ttlSecs": 60
        }))
        .unwrap();
        assert_eq!(req.count, 3);
        assert_eq!(req.options.length, 20);
        assert!(req.options.symbols && req.options.exclude_ambiguous);
        assert!(req.options.uppercase);
        assert!(req.persist.persist);
        assert_eq!(req.persist.ttl_secs, Some(60));
    }

    #[test]
    fn number_request_is_tagged() {
        let req: NumberRequest =
            serde_json::from_value(json!({"kind": "integer", "min": 1, "max": 6, "count": 4}))
                .unwrap();
        assert_eq!(req.spec, NumberSpec::Integer { min: 1, max: 6 });
        assert_eq!(req.count, 4);
    }

    #[test]
    fn text_request_modes() {
        let req: TextGenerateRequest =
            serde_json::from_value(json!({"mode": "random", "charClass": "kanji", "length": 5}))
                .unwrap();
        assert!(matches!(
            req,
            TextGenerateRequest::Random {
                char_class: CharClass::Kanji,
                length: 5
            }
        ));
    }
}
