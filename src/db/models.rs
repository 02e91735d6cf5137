use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::error::BuddyError;

/// Kind of generated artifact; each kind lives in its own table.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum ArtifactKind {
    Password,
    Uuid,
    PersonalInfo,
    File,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 4] = [
        ArtifactKind::Password,
        ArtifactKind::Uuid,
        ArtifactKind::PersonalInfo,
        ArtifactKind::File,
    ];

    pub fn table(self) -> &'static str {
        match self {
            ArtifactKind::Password => "generated_passwords",
            ArtifactKind::Uuid => "generated_uuids",
            ArtifactKind::PersonalInfo => "generated_personal_info",
            ArtifactKind::File => "generated_files",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ArtifactKind::Password => "password",
            ArtifactKind::Uuid => "uuid",
            ArtifactKind::PersonalInfo => "personal-info",
            ArtifactKind::File => "file",
        }
    }
}

impl FromStr for ArtifactKind {
    type Err = BuddyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ArtifactKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s || k.table() == s)
            .ok_or_else(|| BuddyError::InvalidInput(format!("unknown artifact kind: {s}")))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoredArtifact {
    pub id: i64,
    pub kind: ArtifactKind,
    pub payload: Value,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl StoredArtifact {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TableStats {
    pub total: i64,
    pub expired: i64,
}

/// Row deletions per table from one expiry sweep.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CleanupReport {
    pub deleted: BTreeMap<ArtifactKind, u64>,
    pub ran_at: Option<DateTime<Utc>>,
}

impl CleanupReport {
    pub fn total(&self) -> u64 {
        self.deleted.values().sum()
    }
}
