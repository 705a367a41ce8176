// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Schema creation and idempotent migration.
//!
//! Schema version is recorded in `schema_version`; `migrate` adds any
//! missing columns via `PRAGMA table_info` introspection so re-opening an
//! older database file never fails.

use rusqlite::Connection;
use tracing::info;

use crate::error::StorageError;

pub const CURRENT_SCHEMA_VERSION: i64 = 1;

pub fn migrate(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);

        CREATE TABLE IF NOT EXISTS tasks (
            job_id      TEXT PRIMARY KEY,
            mode        TEXT NOT NULL,
            iterations  INTEGER NOT NULL,
            created_at  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS rounds (
            job_id     TEXT NOT NULL,
            idx        INTEGER NOT NULL,
            role       TEXT NOT NULL,
            prompt     TEXT NOT NULL,
            response   TEXT NOT NULL,
            ts         INTEGER NOT NULL,
            duration_ms INTEGER NOT NULL DEFAULT 0,
            FOREIGN KEY (job_id) REFERENCES tasks(job_id)
        );

        CREATE UNIQUE INDEX IF NOT EXISTS idx_rounds_job_idx_role
            ON rounds (job_id, idx, role);
        ",
    )?;

    let version: i64 =
        conn.query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |row| {
            row.get(0)
        })?;

    if version < CURRENT_SCHEMA_VERSION {
        add_column_if_missing(conn, "rounds", "duration_ms", "INTEGER NOT NULL DEFAULT 0")?;
        conn.execute("INSERT INTO schema_version (version) VALUES (?1)", [CURRENT_SCHEMA_VERSION])?;
        info!(from = version, to = CURRENT_SCHEMA_VERSION, "migrated conversation store schema");
    }

    Ok(())
}

fn add_column_if_missing(
    conn: &Connection,
    table: &str,
    column: &str,
    ddl: &str,
) -> Result<(), StorageError> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
    let has_column = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .filter_map(Result::ok)
        .any(|name| name == column);
    drop(stmt);

    if !has_column {
        conn.execute(&format!("ALTER TABLE {table} ADD COLUMN {column} {ddl}"), [])?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "migrations_tests.rs"]
mod tests;
