// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! User Prompt Record: the process-wide custom writer/reviewer prompts,
//! persisted atomically (write to a sibling file, then rename).

use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use patentloom_core::Clock;
use serde::{Deserialize, Serialize};

use crate::error::PromptError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPromptRecord {
    #[serde(default)]
    pub writer_prompt: String,
    #[serde(default)]
    pub reviewer_prompt: String,
    pub updated_at: u64,
}

impl UserPromptRecord {
    fn empty(epoch_ms: u64) -> Self {
        Self { writer_prompt: String::new(), reviewer_prompt: String::new(), updated_at: epoch_ms }
    }
}

/// The single process-wide instance of the user's custom prompts.
/// Initialized at startup, swappable via [`UserPromptStore::set`], never
/// re-read from disk per request.
pub struct UserPromptStore {
    path: PathBuf,
    record: RwLock<UserPromptRecord>,
}

impl UserPromptStore {
    pub fn open(path: impl Into<PathBuf>, clock: &impl Clock) -> Result<Self, PromptError> {
        let path = path.into();
        let record = match std::fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                UserPromptRecord::empty(clock.epoch_ms())
            }
            Err(err) => return Err(err.into()),
        };
        Ok(Self { path, record: RwLock::new(record) })
    }

    pub fn get(&self) -> UserPromptRecord {
        self.record.read().clone()
    }

    pub fn set(
        &self,
        writer_prompt: String,
        reviewer_prompt: String,
        clock: &impl Clock,
    ) -> Result<(), PromptError> {
        let record = UserPromptRecord { writer_prompt, reviewer_prompt, updated_at: clock.epoch_ms() };
        persist_atomically(&self.path, &record)?;
        *self.record.write() = record;
        Ok(())
    }
}

fn persist_atomically(path: &Path, record: &UserPromptRecord) -> Result<(), PromptError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, serde_json::to_vec_pretty(record)?)?;
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}

#[cfg(test)]
#[path = "user_prompts_tests.rs"]
mod tests;
