// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error taxonomy for the Iteration Engine and Source Summarizer.

use patentloom_core::ErrorKind;
use patentloom_gateway::GatewayError;
use patentloom_prompts::PromptError;
use patentloom_storage::StorageError;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Prompt(#[from] PromptError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("run was cancelled")]
    Cancelled,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::Prompt(e) => e.kind(),
            EngineError::Gateway(e) => e.kind(),
            EngineError::Storage(e) => e.kind(),
            EngineError::Cancelled => ErrorKind::Cancelled,
            EngineError::Io(_) => ErrorKind::Io,
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
