// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors raised by the Conversation Store.

use patentloom_core::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("round {index} for job {job_id} already has a {role} record")]
    DuplicateRound { job_id: String, index: u32, role: &'static str },

    #[error("no {role} record exists yet for job {job_id} round {index}")]
    MissingDraft { job_id: String, index: u32, role: &'static str },
}

impl StorageError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StorageError::Sqlite(_) => ErrorKind::Io,
            StorageError::DuplicateRound { .. } => ErrorKind::Invalid,
            StorageError::MissingDraft { .. } => ErrorKind::Invalid,
        }
    }
}
