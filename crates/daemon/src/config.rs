// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resolved daemon configuration, assembled once at startup from `env`.

use std::path::PathBuf;
use std::time::Duration;

use crate::env;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("ANTHROPIC_API_KEY is not set")]
    MissingApiKey,
}

/// Default bound on queued-but-not-yet-running jobs (spec §4.1: "configured
/// bound"; not itself one of the named env vars).
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    pub anthropic_model: String,
    pub anthropic_max_tokens: u32,
    pub host: String,
    pub port: u16,
    pub max_workers: usize,
    pub queue_capacity: usize,
    pub task_timeout: Duration,
    pub llm_timeout: Duration,
    pub retry_attempts: u32,
    pub retry_delay: Duration,
    pub max_input_length: usize,
    pub max_output_length: usize,
    pub output_dir: PathBuf,
    pub prompts_dir: PathBuf,
    pub conversations_db_path: PathBuf,
    pub user_prompts_path: PathBuf,
    pub job_retention: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            anthropic_api_key: env::anthropic_api_key().ok_or(ConfigError::MissingApiKey)?,
            anthropic_model: env::anthropic_model(),
            anthropic_max_tokens: env::anthropic_max_tokens(),
            host: env::host(),
            port: env::port(),
            max_workers: env::max_workers(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            task_timeout: env::task_timeout(),
            llm_timeout: env::llm_timeout(),
            retry_attempts: env::retry_attempts(),
            retry_delay: env::retry_delay(),
            max_input_length: env::max_input_length(),
            max_output_length: env::max_output_length(),
            output_dir: env::output_dir(),
            prompts_dir: env::prompts_dir(),
            conversations_db_path: env::conversations_db_path(),
            user_prompts_path: env::user_prompts_path(),
            job_retention: env::job_retention(),
        })
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
