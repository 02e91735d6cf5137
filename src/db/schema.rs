//! SQL DDL for the generated-artifact tables.
//!
//! Every table has the same shape:
//! - `id` INTEGER PRIMARY KEY AUTOINCREMENT
//! - `payload` TEXT holding the generated value as JSON
//! - `created_at` / `expires_at` TEXT, RFC3339 UTC with millisecond precision,
//!   so string comparison orders them correctly
//! - an index on `expires_at` for the expiry sweep

pub const SQLITE_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS generated_passwords (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    payload TEXT NOT NULL,
    created_at TEXT NOT NULL,
    expires_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_generated_passwords_expires_at ON generated_passwords(expires_at);

CREATE TABLE IF NOT EXISTS generated_uuids (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    payload TEXT NOT NULL,
    created_at TEXT NOT NULL,
    expires_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_generated_uuids_expires_at ON generated_uuids(expires_at);

CREATE TABLE IF NOT EXISTS generated_personal_info (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    payload TEXT NOT NULL,
    created_at TEXT NOT NULL,
    expires_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_generated_personal_info_expires_at ON generated_personal_info(expires_at);

-- Metadata only, file content is never stored.
CREATE TABLE IF NOT EXISTS generated_files (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    payload TEXT NOT NULL,
    created_at TEXT NOT NULL,
    expires_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_generated_files_expires_at ON generated_files(expires_at);
"#;
