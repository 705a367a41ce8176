// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Conversation Store: durable per-round dialogue persistence.
//!
//! Backed by an embedded `rusqlite` database. Writes across workers are
//! serialized by the connection's own mutex (the concurrency model in spec
//! §5 names this as the serialization point for terminal progress updates:
//! a job's last store write happens-before its terminal status is visible).

use std::path::Path;

use chrono::Utc;
use parking_lot::Mutex;
use patentloom_core::{Mode, Role, Round, RoundView};
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::StorageError;
use crate::migrations::migrate;

fn role_str(role: Role) -> &'static str {
    match role {
        Role::Writer => "writer",
        Role::Modifier => "modifier",
        Role::Reviewer => "reviewer",
    }
}

fn role_from_str(s: &str) -> Option<Role> {
    match s {
        "writer" => Some(Role::Writer),
        "modifier" => Some(Role::Modifier),
        "reviewer" => Some(Role::Reviewer),
        _ => None,
    }
}

/// Durable store for task metadata and per-round dialogue.
pub struct ConversationStore {
    conn: Mutex<Connection>,
}

impl ConversationStore {
    /// Open (creating if absent) the database at `path`, running migrations.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let conn = Connection::open(path)?;
        migrate(&conn)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    /// Open an in-memory store, primarily for tests.
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        migrate(&conn)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    /// Register a task's metadata. Idempotent: re-registering the same
    /// `job_id` is a no-op rather than a duplicate-key error.
    pub fn register_task(
        &self,
        job_id: &str,
        mode: Mode,
        iterations: u32,
    ) -> Result<(), StorageError> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT OR IGNORE INTO tasks (job_id, mode, iterations, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![job_id, mode.to_string(), iterations, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    /// Append an immutable round record.
    ///
    /// Fails with [`StorageError::DuplicateRound`] if a record for this
    /// `(job_id, index, role)` already exists (spec §3: each round has
    /// exactly one writer-or-modifier and one reviewer record).
    pub fn log_round(&self, round: &Round) -> Result<(), StorageError> {
        let conn = self.conn.lock();
        let exists: bool = conn
            .query_row(
                "SELECT COUNT(*) FROM rounds WHERE job_id = ?1 AND idx = ?2 AND role = ?3",
                params![round.job_id, round.index, role_str(round.role)],
                |row| row.get::<_, i64>(0),
            )?
            > 0;
        if exists {
            return Err(StorageError::DuplicateRound {
                job_id: round.job_id.clone(),
                index: round.index,
                role: role_str(round.role),
            });
        }
        conn.execute(
            "INSERT INTO rounds (job_id, idx, role, prompt, response, ts, duration_ms)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                round.job_id,
                round.index,
                role_str(round.role),
                round.prompt,
                round.response,
                round.timestamp_ms,
                round.duration_ms,
            ],
        )?;
        Ok(())
    }

    /// Distinct round indices recorded for a job, ascending.
    pub fn rounds_for(&self, job_id: &str) -> Result<Vec<u32>, StorageError> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare("SELECT DISTINCT idx FROM rounds WHERE job_id = ?1 ORDER BY idx ASC")?;
        let rows = stmt
            .query_map(params![job_id], |row| row.get::<_, u32>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// The writer/modifier/reviewer view for a single round.
    pub fn round(&self, job_id: &str, index: u32) -> Result<RoundView, StorageError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT role, prompt, response, ts, duration_ms FROM rounds
             WHERE job_id = ?1 AND idx = ?2",
        )?;
        let mut view = RoundView::default();
        let rows = stmt.query_map(params![job_id, index], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, u64>(3)?,
                row.get::<_, u64>(4)?,
            ))
        })?;
        for row in rows {
            let (role_text, prompt, response, ts, duration_ms) = row?;
            let Some(role) = role_from_str(&role_text) else { continue };
            let record = Round::new(job_id, index, role, prompt, response, ts, duration_ms);
            match role {
                Role::Writer => view.writer = Some(record),
                Role::Modifier => view.modifier = Some(record),
                Role::Reviewer => view.reviewer = Some(record),
            }
        }
        Ok(view)
    }

    /// Remove all task metadata and round records for a job.
    pub fn delete(&self, job_id: &str) -> Result<(), StorageError> {
        let conn = self.conn.lock();
        conn.execute("DELETE FROM rounds WHERE job_id = ?1", params![job_id])?;
        conn.execute("DELETE FROM tasks WHERE job_id = ?1", params![job_id])?;
        Ok(())
    }

    /// Whether a task has been registered (used by tests and diagnostics).
    pub fn has_task(&self, job_id: &str) -> Result<bool, StorageError> {
        let conn = self.conn.lock();
        let found: Option<String> = conn
            .query_row("SELECT job_id FROM tasks WHERE job_id = ?1", params![job_id], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(found.is_some())
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
