// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The serialized, retrying adapter to the remote model (spec §4.4).

use std::sync::Arc;
use std::time::Duration;

use patentloom_core::Role;

use crate::client::LlmClient;
use crate::error::GatewayError;
use crate::redact::redact;

pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);
pub const DEFAULT_MAX_OUTPUT_LENGTH: usize = 20_000;

const TRUNCATION_TAG: &str = "[truncated]";

/// Single serialized entry point to the remote model. All calls share one
/// mutual-exclusion gate, so only one remote call is ever in flight.
pub struct LlmGateway {
    client: Arc<dyn LlmClient>,
    gate: tokio::sync::Mutex<()>,
    retry_attempts: u32,
    retry_delay: Duration,
    max_output_length: usize,
}

impl LlmGateway {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self {
            client,
            gate: tokio::sync::Mutex::new(()),
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
            retry_delay: DEFAULT_RETRY_DELAY,
            max_output_length: DEFAULT_MAX_OUTPUT_LENGTH,
        }
    }

    pub fn with_limits(mut self, retry_attempts: u32, retry_delay: Duration, max_output_length: usize) -> Self {
        self.retry_attempts = retry_attempts;
        self.retry_delay = retry_delay;
        self.max_output_length = max_output_length;
        self
    }

    /// `call(prompt) -> response`, synchronous from the caller's viewpoint:
    /// retries retryable errors with exponential backoff before surfacing
    /// a terminal error.
    pub async fn call(&self, role: Role, round: u32, prompt: &str) -> Result<String, GatewayError> {
        let _permit = self.gate.lock().await;
        let started = std::time::Instant::now();
        let mut attempt = 0u32;

        loop {
            match self.client.complete(prompt).await {
                Ok(response) => {
                    let (output, was_truncated) = truncate_output(response, self.max_output_length);
                    tracing::info!(
                        role = %role,
                        round,
                        prompt_len = prompt.chars().count(),
                        response_len = output.chars().count(),
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        retries = attempt,
                        truncated = was_truncated,
                        "llm call completed"
                    );
                    return Ok(output);
                }
                Err(err) if err.is_retryable() && attempt < self.retry_attempts => {
                    let delay = retry_delay_for(&err, self.retry_delay, attempt);
                    tracing::warn!(
                        role = %role,
                        round,
                        attempt,
                        error = %redact(&err.to_string()),
                        delay_ms = delay.as_millis() as u64,
                        "retrying llm call"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => {
                    tracing::error!(
                        role = %role,
                        round,
                        retries = attempt,
                        error_kind = %err.kind(),
                        error = %redact(&err.to_string()),
                        "llm call failed"
                    );
                    return Err(err);
                }
            }
        }
    }
}

fn retry_delay_for(err: &GatewayError, base: Duration, attempt: u32) -> Duration {
    if let GatewayError::RateLimit { retry_after_ms: Some(ms) } = err {
        return Duration::from_millis(*ms);
    }
    base.saturating_mul(2u32.saturating_pow(attempt))
}

fn truncate_output(response: String, max_len: usize) -> (String, bool) {
    if response.chars().count() <= max_len {
        return (response, false);
    }
    let boundary = max_len.saturating_sub(TRUNCATION_TAG.len() + 1);
    let mut truncated: String = response.chars().take(boundary).collect();
    truncated.push(' ');
    truncated.push_str(TRUNCATION_TAG);
    (truncated, true)
}

#[cfg(test)]
#[path = "gateway_tests.rs"]
mod tests;
