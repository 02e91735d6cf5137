use crate::db::models::{ArtifactKind, CleanupReport, StoredArtifact, TableStats};
use crate::db::schema::SQLITE_INIT;
use crate::error::BuddyError;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Pool, Row, Sqlite};
use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

pub type SqlitePool = Pool<Sqlite>;

/// RFC3339 UTC with fixed millisecond precision; lexicographic order matches time order.
fn ts(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[derive(Clone)]
pub struct ArtifactStorage {
    pool: SqlitePool,
}

impl ArtifactStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating if missing) the database and make sure the schema exists.
    pub async fn connect(database_url: &str) -> Result<Self, BuddyError> {
        let connect_opts = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let mut pool_opts = SqlitePoolOptions::new();
        // every in-memory connection is its own database
        if database_url.contains(":memory:") {
            pool_opts = pool_opts.max_connections(1);
        }
        let pool = pool_opts.connect_with(connect_opts).await?;
        let storage = Self::new(pool);
        storage.init_schema().await?;
        Ok(storage)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Initialize the schema by executing the bundled DDL.
    pub async fn init_schema(&self) -> Result<(), BuddyError> {
        // execute multiple statements safely (SQLite supports multi-commands but sqlx::query doesn't)
        for stmt in SQLITE_INIT.split(';') {
            let s = stmt.trim();
            if s.is_empty() {
                continue;
            }
            sqlx::query(s).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Drop every artifact table and recreate the schema.
    pub async fn reset(&self) -> Result<(), BuddyError> {
        let mut tx = self.pool.begin().await?;
        for kind in ArtifactKind::ALL {
            sqlx::query(&format!("DROP TABLE IF EXISTS {}", kind.table()))
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        self.init_schema().await
    }

    pub async fn ping(&self) -> Result<(), BuddyError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Store one payload; it expires `ttl` from now. Returns the row id.
    pub async fn insert(
        &self,
        kind: ArtifactKind,
        payload: &Value,
        ttl: Duration,
    ) -> Result<i64, BuddyError> {
        let ids = self.insert_many(kind, std::slice::from_ref(payload), ttl).await?;
        ids.into_iter()
            .next()
            .ok_or_else(|| BuddyError::Generation("insert returned no id".to_string()))
    }

    /// Batch insert using a single transaction. Returns ids in the same order.
    pub async fn insert_many(
        &self,
        kind: ArtifactKind,
        payloads: &[Value],
        ttl: Duration,
    ) -> Result<Vec<i64>, BuddyError> {
        if ttl <= Duration::zero() {
            return Err(BuddyError::InvalidInput("ttl must be positive".to_string()));
        }
        let now = Utc::now();
        let created_at = ts(now);
        let expires_at = now
            .checked_add_signed(ttl)
            .map(ts)
            .ok_or_else(|| BuddyError::InvalidInput("ttl is out of range".to_string()))?;
        let sql = format!(
            "INSERT INTO {} (payload, created_at, expires_at) VALUES (?, ?, ?)",
            kind.table()
        );

        let mut tx = self.pool.begin().await?;
        let mut ids = Vec::with_capacity(payloads.len());
        for payload in payloads {
            let result = sqlx::query(&sql)
                .bind(serde_json::to_string(payload)?)
                .bind(&created_at)
                .bind(&expires_at)
                .execute(&mut *tx)
                .await?;
            ids.push(result.last_insert_rowid());
        }
        tx.commit().await?;
        Ok(ids)
    }

    /// Fetch a stored artifact; `None` when missing or already expired.
    pub async fn get(
        &self,
        kind: ArtifactKind,
        id: i64,
    ) -> Result<Option<StoredArtifact>, BuddyError> {
        let row = sqlx::query(&format!(
            "SELECT id, payload, created_at, expires_at FROM {} WHERE id = ? AND expires_at > ?",
            kind.table()
        ))
        .bind(id)
        .bind(ts(Utc::now()))
        .fetch_optional(&self.pool)
        .await?;
        row.map(|r| Self::row_to_model(kind, r)).transpose()
    }

    /// Newest non-expired rows first.
    pub async fn list_recent(
        &self,
        kind: ArtifactKind,
        limit: i64,
    ) -> Result<Vec<StoredArtifact>, BuddyError> {
        let rows = sqlx::query(&format!(
            "SELECT id, payload, created_at, expires_at FROM {} WHERE expires_at > ? ORDER BY id DESC LIMIT ?",
            kind.table()
        ))
        .bind(ts(Utc::now()))
        .bind(limit.max(0))
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter()
            .map(|r| Self::row_to_model(kind, r))
            .collect()
    }

    /// Delete every row whose `expires_at` is at or before `now`.
    pub async fn cleanup_expired(&self, now: DateTime<Utc>) -> Result<CleanupReport, BuddyError> {
        let cutoff = ts(now);
        let mut deleted = BTreeMap::new();
        let mut tx = self.pool.begin().await?;
        for kind in ArtifactKind::ALL {
            let result = sqlx::query(&format!(
                "DELETE FROM {} WHERE expires_at <= ?",
                kind.table()
            ))
            .bind(&cutoff)
            .execute(&mut *tx)
            .await?;
            deleted.insert(kind, result.rows_affected());
        }
        tx.commit().await?;
        Ok(CleanupReport {
            deleted,
            ran_at: Some(now),
        })
    }

    pub async fn stats(&self) -> Result<BTreeMap<ArtifactKind, TableStats>, BuddyError> {
        let now = ts(Utc::now());
        let mut out = BTreeMap::new();
        for kind in ArtifactKind::ALL {
            let (total, expired): (i64, i64) = sqlx::query_as(&format!(
                "SELECT COUNT(*), COALESCE(SUM(CASE WHEN expires_at <= ? THEN 1 ELSE 0 END), 0) FROM {}",
                kind.table()
            ))
            .bind(&now)
            .fetch_one(&self.pool)
            .await?;
            out.insert(kind, TableStats { total, expired });
        }
        Ok(out)
    }

    /// Write a consistent copy of the database to `dest` (must not exist yet).
    pub async fn backup(&self, dest: &Path) -> Result<(), BuddyError> {
        if dest.exists() {
            return Err(BuddyError::InvalidInput(format!(
                "backup target {} already exists",
                dest.display()
            )));
        }
        sqlx::query("VACUUM INTO ?")
            .bind(dest.to_string_lossy().into_owned())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    fn row_to_model(kind: ArtifactKind, row: SqliteRow) -> Result<StoredArtifact, BuddyError> {
        let id: i64 = row.try_get("id")?;
        let payload_json: String = row.try_get("payload")?;
        let created_str: String = row.try_get("created_at")?;
        let expires_str: String = row.try_get("expires_at")?;

        let payload: Value = serde_json::from_str(&payload_json)
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
        let parse = |s: &str| {
            DateTime::parse_from_rfc3339(s)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| sqlx::Error::Decode(Box::new(e)))
        };

        Ok(StoredArtifact {
            id,
            kind,
            payload,
            created_at: parse(&created_str)?,
            expires_at: parse(&expires_str)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn storage() -> ArtifactStorage {
        ArtifactStorage::connect("sqlite::memory:").await.unwrap()
    }

    #[tokio::test]
    async fn insert_and_get_round_trip() {
        let s = storage().await;
        let payload = json!({"passwords": ["abc123XYZ"]});
        let id = s
            .insert(ArtifactKind::Password, &payload, Duration::hours(1))
            .await
            .unwrap();
        let got = s.get(ArtifactKind::Password, id).await.unwrap().unwrap();
        assert_eq!(got.payload, payload);
        assert_eq!(got.kind, ArtifactKind::Password);
        assert!(!got.is_expired(Utc::now()));
        // kinds live in separate tables
        assert!(s.get(ArtifactKind::Uuid, id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn cleanup_removes_only_expired_rows() {
        let s = storage().await;
        s.insert_many(
            ArtifactKind::Uuid,
            &[json!(1), json!(2), json!(3)],
            Duration::milliseconds(1),
        )
        .await
        .unwrap();
        s.insert(ArtifactKind::Uuid, &json!(4), Duration::hours(1))
            .await
            .unwrap();

        let report = s
            .cleanup_expired(Utc::now() + Duration::seconds(1))
            .await
            .unwrap();
        assert_eq!(report.deleted[&ArtifactKind::Uuid], 3);
        assert_eq!(report.total(), 3);

        let stats = s.stats().await.unwrap();
        assert_eq!(stats[&ArtifactKind::Uuid].total, 1);
        assert_eq!(stats[&ArtifactKind::Password].total, 0);
    }

    #[tokio::test]
    async fn expired_rows_are_invisible() {
        let s = storage().await;
        let id = s
            .insert(ArtifactKind::File, &json!({"size": 10}), Duration::milliseconds(1))
            .await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert!(s.get(ArtifactKind::File, id).await.unwrap().is_none());
        assert!(s.list_recent(ArtifactKind::File, 10).await.unwrap().is_empty());
        assert_eq!(s.stats().await.unwrap()[&ArtifactKind::File].expired, 1);
    }

    #[tokio::test]
    async fn non_positive_ttl_rejected() {
        let s = storage().await;
        assert!(
            s.insert(ArtifactKind::Password, &json!(null), Duration::zero())
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn overflowing_ttl_rejected() {
        let s = storage().await;
        let err = s
            .insert(ArtifactKind::Uuid, &json!([]), Duration::MAX)
            .await
            .unwrap_err();
        assert!(matches!(err, BuddyError::InvalidInput(_)));
        assert_eq!(s.stats().await.unwrap()[&ArtifactKind::Uuid].total, 0);
    }

    #[tokio::test]
    async fn reset_empties_tables() {
        let s = storage().await;
        s.insert(ArtifactKind::PersonalInfo, &json!({}), Duration::hours(1))
            .await
            .unwrap();
        s.reset().await.unwrap();
        assert_eq!(s.stats().await.unwrap()[&ArtifactKind::PersonalInfo].total, 0);
    }

    #[tokio::test]
    async fn backup_writes_a_copy() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("live.db");
        let s = ArtifactStorage::connect(&format!("sqlite:{}", db_path.display()))
            .await
            .unwrap();
        s.insert(ArtifactKind::Password, &json!(["x"]), Duration::hours(1))
            .await
            .unwrap();

        let dest = dir.path().join("backup.db");
        s.backup(&dest).await.unwrap();
        assert!(dest.exists());
        assert!(s.backup(&dest).await.is_err());

        let copy = ArtifactStorage::connect(&format!("sqlite:{}", dest.display()))
            .await
            .unwrap();
        assert_eq!(copy.stats().await.unwrap()[&ArtifactKind::Password].total, 1);
    }
}
