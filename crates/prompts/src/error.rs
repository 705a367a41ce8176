// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error taxonomy for prompt loading and assembly.

use patentloom_core::ErrorKind;

#[derive(Debug, thiserror::Error)]
pub enum PromptError {
    #[error("template for role '{role}' failed validation: {reason}")]
    InvalidTemplate { role: &'static str, reason: String },

    #[error("assembled prompt exceeds the configured limit even after compression")]
    TooLarge,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("malformed template yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("malformed user prompt record: {0}")]
    Json(#[from] serde_json::Error),
}

impl PromptError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PromptError::TooLarge => ErrorKind::PromptTooLarge,
            PromptError::InvalidTemplate { .. } | PromptError::Yaml(_) | PromptError::Json(_) => {
                ErrorKind::Invalid
            }
            PromptError::Io(_) => ErrorKind::Io,
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
