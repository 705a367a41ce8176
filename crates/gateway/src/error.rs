// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error taxonomy for the LLM Gateway.

use patentloom_core::ErrorKind;

#[derive(Debug, Clone, thiserror::Error)]
pub enum GatewayError {
    #[error("request to the model timed out")]
    Timeout,

    #[error("rate limited by the model provider")]
    RateLimit { retry_after_ms: Option<u64> },

    #[error("transient failure calling the model: {0}")]
    Transient(String),

    #[error("authentication rejected by the model provider")]
    Auth,

    #[error("quota exhausted")]
    Quota,

    #[error("invalid request: {0}")]
    Invalid(String),
}

impl GatewayError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GatewayError::Timeout => ErrorKind::LlmTimeout,
            GatewayError::RateLimit { .. } => ErrorKind::LlmRateLimit,
            GatewayError::Transient(_) => ErrorKind::LlmTransient,
            GatewayError::Auth => ErrorKind::LlmAuth,
            GatewayError::Quota => ErrorKind::LlmQuota,
            GatewayError::Invalid(_) => ErrorKind::Invalid,
        }
    }

    /// Whether the Gateway should retry this class of error (spec §4.4:
    /// timeout, transient network, and rate-limit are retryable; auth,
    /// quota, and validation errors are raised immediately).
    pub fn is_retryable(&self) -> bool {
        matches!(self, GatewayError::Timeout | GatewayError::RateLimit { .. } | GatewayError::Transient(_))
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
