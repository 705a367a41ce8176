// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Transport to the remote model. [`LlmClient`] is the seam tests substitute
//! a fake for; [`AnthropicClient`] is the concrete transport used in
//! production, against the Anthropic Messages API.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::GatewayError;

/// One completion call to a remote generative model.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, GatewayError>;
}

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

pub struct AnthropicClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl AnthropicClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>, max_tokens: u32, timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { http, api_key: api_key.into(), model: model.into(), max_tokens }
    }
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
}

#[derive(Deserialize)]
struct ApiErrorEnvelope {
    error: ApiError,
}

#[async_trait]
impl LlmClient for AnthropicClient {
    async fn complete(&self, prompt: &str) -> Result<String, GatewayError> {
        let body = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            messages: vec![Message { role: "user", content: prompt }],
        };

        let response = self
            .http
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if status.is_success() {
            let parsed: MessagesResponse =
                response.json().await.map_err(|e| GatewayError::Transient(e.to_string()))?;
            let text = parsed.content.into_iter().map(|b| b.text).collect::<String>();
            return Ok(text);
        }

        let retry_after_ms = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok())
            .map(|secs| secs * 1000);

        let envelope = response.json::<ApiErrorEnvelope>().await.ok();
        let message = envelope.map(|e| e.error.message).unwrap_or_else(|| status.to_string());

        Err(classify_status(status.as_u16(), message, retry_after_ms))
    }
}

fn map_transport_error(err: reqwest::Error) -> GatewayError {
    if err.is_timeout() {
        GatewayError::Timeout
    } else {
        GatewayError::Transient(err.to_string())
    }
}

fn classify_status(status: u16, message: String, retry_after_ms: Option<u64>) -> GatewayError {
    match status {
        401 | 403 => GatewayError::Auth,
        402 => GatewayError::Quota,
        429 => GatewayError::RateLimit { retry_after_ms },
        400 | 404 | 422 => GatewayError::Invalid(message),
        500..=599 => GatewayError::Transient(message),
        _ => GatewayError::Transient(message),
    }
}

/// A scripted [`LlmClient`] for tests: returns a fixed sequence of results,
/// one per call, repeating the last entry once exhausted.
#[cfg(any(test, feature = "test-support"))]
pub struct FakeLlmClient {
    responses: parking_lot::Mutex<std::collections::VecDeque<Result<String, GatewayError>>>,
    calls: std::sync::atomic::AtomicUsize,
}

#[cfg(any(test, feature = "test-support"))]
impl FakeLlmClient {
    pub fn new(responses: Vec<Result<String, GatewayError>>) -> Self {
        Self {
            responses: parking_lot::Mutex::new(responses.into()),
            calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(any(test, feature = "test-support"))]
#[async_trait]
impl LlmClient for FakeLlmClient {
    async fn complete(&self, _prompt: &str) -> Result<String, GatewayError> {
        self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        let mut responses = self.responses.lock();
        if responses.len() > 1 {
            responses.pop_front().unwrap_or(Ok(String::new()))
        } else {
            responses.front().cloned().unwrap_or(Ok(String::new()))
        }
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
