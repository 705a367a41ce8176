// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate (spec §6).

use std::path::PathBuf;
use std::time::Duration;

/// Remote model credential. No default: absence is a startup error.
pub fn anthropic_api_key() -> Option<String> {
    std::env::var("ANTHROPIC_API_KEY").ok().filter(|s| !s.is_empty())
}

pub fn anthropic_model() -> String {
    std::env::var("ANTHROPIC_MODEL").unwrap_or_else(|_| "claude-3-5-sonnet-20241022".to_string())
}

pub fn anthropic_max_tokens() -> u32 {
    parse_or("ANTHROPIC_MAX_TOKENS", 4096)
}

pub fn host() -> String {
    std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string())
}

pub fn port() -> u16 {
    parse_or("PORT", 8081)
}

pub fn max_workers() -> usize {
    parse_or("MAX_WORKERS", 3)
}

/// Per-job wall-clock deadline.
pub fn task_timeout() -> Duration {
    Duration::from_secs(parse_or("TASK_TIMEOUT", 1800))
}

/// Per-LLM-call deadline, passed through to the gateway's HTTP client.
pub fn llm_timeout() -> Duration {
    Duration::from_secs(parse_or("LLM_TIMEOUT", 300))
}

pub fn retry_attempts() -> u32 {
    parse_or("RETRY_ATTEMPTS", 3)
}

/// Base retry delay; the gateway doubles this per attempt.
pub fn retry_delay() -> Duration {
    Duration::from_secs(parse_or("RETRY_DELAY", 1))
}

pub fn max_input_length() -> usize {
    parse_or("MAX_INPUT_LENGTH", patentloom_prompts::DEFAULT_MAX_INPUT_LENGTH)
}

pub fn max_output_length() -> usize {
    parse_or("MAX_OUTPUT_LENGTH", patentloom_gateway::DEFAULT_MAX_OUTPUT_LENGTH)
}

pub fn output_dir() -> PathBuf {
    std::env::var("OUTPUT_DIR").map(PathBuf::from).unwrap_or_else(|_| PathBuf::from("output"))
}

pub fn prompts_dir() -> PathBuf {
    std::env::var("PROMPTS_DIR").map(PathBuf::from).unwrap_or_else(|_| PathBuf::from("prompts"))
}

pub fn conversations_db_path() -> PathBuf {
    std::env::var("CONVERSATIONS_DB_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data/conversations.db"))
}

pub fn user_prompts_path() -> PathBuf {
    std::env::var("USER_PROMPTS_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data/user_prompts.json"))
}

/// Retention window for the reaper; not in the spec's variable table, but
/// ambient configuration following the same typed-getter style.
pub fn job_retention() -> Duration {
    Duration::from_secs(parse_or("JOB_RETENTION_SECS", 86_400))
}

fn parse_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name).ok().and_then(|s| s.parse().ok()).unwrap_or(default)
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
