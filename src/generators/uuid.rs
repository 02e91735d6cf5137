//! UUID generator.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::BuddyError;

pub const MAX_UUID_COUNT: usize = 10_000;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UuidVersion {
    /// Timestamp-based layout: epoch millis in the time fields, random node.
    V1,
    #[default]
    V4,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UuidFormat {
    #[default]
    Standard,
    Uppercase,
    NoHyphens,
    Braces,
    Urn,
}

impl UuidFormat {
    pub fn render(self, uuid: &Uuid) -> String {
        match self {
            UuidFormat::Standard => uuid.hyphenated().to_string(),
            UuidFormat::Uppercase => uuid.hyphenated().to_string().to_uppercase(),
            UuidFormat::NoHyphens => uuid.simple().to_string(),
            UuidFormat::Braces => uuid.braced().to_string(),
            UuidFormat::Urn => uuid.urn().to_string(),
        }
    }

    /// Whether `value` has the shape this format renders.
    pub fn matches(self, value: &str) -> bool {
        let inner = match self {
            UuidFormat::Braces => value.strip_prefix('{').and_then(|v| v.strip_suffix('}')),
            UuidFormat::Urn => value.strip_prefix("urn:uuid:"),
            _ => Some(value),
        };
        let Some(inner) = inner else {
            return false;
        };
        let hex_ok = |c: char| match self {
            UuidFormat::Uppercase => c.is_ascii_digit() || ('A'..='F').contains(&c),
            _ => c.is_ascii_digit() || ('a'..='f').contains(&c),
        };
        if self == UuidFormat::NoHyphens {
            return inner.len() == 32 && inner.chars().all(hex_ok);
        }
        let groups: Vec<&str> = inner.split('-').collect();
        groups.iter().map(|g| g.len()).eq([8, 4, 4, 4, 12])
            && groups.iter().all(|g| g.chars().all(hex_ok))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UuidItem {
    pub id: u64,
    pub value: String,
    pub version: UuidVersion,
    pub format: UuidFormat,
    pub created_at: DateTime<Utc>,
}

/// Random UUID with the RFC 4122 version 4 and variant bits set.
pub fn uuid_v4<R: Rng>(rng: &mut R) -> Uuid {
    let mut bytes = [0u8; 16];
    rng.fill(&mut bytes);

    bytes[6] = (bytes[6] & 0x0f) | 0x40;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;

    Uuid::from_bytes(bytes)
}

/// Timestamp-based UUID. `seq` fills the low 12 bits of `time_hi` so that
/// several ids minted within the same millisecond stay distinct.
pub fn uuid_v1_like<R: Rng>(rng: &mut R, now: DateTime<Utc>, seq: u16) -> Uuid {
    let millis = now.timestamp_millis().max(0) as u64;
    let time_low = (millis & 0xffff_ffff) as u32;
    let time_mid = ((millis >> 32) & 0xffff) as u16;
    let time_hi = 0x1000 | (seq & 0x0fff);

    let mut tail = [0u8; 8];
    rng.fill(&mut tail);
    tail[0] = (tail[0] & 0x3f) | 0x80;
    // Random node ids carry the multicast bit.
    tail[2] |= 0x01;

    Uuid::from_fields(time_low, time_mid, time_hi, &tail)
}

/// Generate exactly `count` UUIDs in the requested version and format.
pub fn generate_uuids_local<R: Rng>(
    rng: &mut R,
    count: usize,
    version: UuidVersion,
    format: UuidFormat,
) -> Result<Vec<UuidItem>, BuddyError> {
    if count == 0 || count > MAX_UUID_COUNT {
        return Err(BuddyError::InvalidInput(format!(
            "count must be between 1 and {MAX_UUID_COUNT}"
        )));
    }

    let now = Utc::now();
    let items = (0..count)
        .map(|i| {
            let uuid = match version {
                UuidVersion::V4 => uuid_v4(rng),
                UuidVersion::V1 => uuid_v1_like(rng, now, i as u16),
            };
            UuidItem {
                id: i as u64 + 1,
                value: format.render(&uuid),
                version,
                format,
                created_at: now,
            }
        })
        .collect();
    Ok(items)
}
