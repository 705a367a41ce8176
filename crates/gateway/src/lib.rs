// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

//! patentloom-gateway: the serialized, retrying, length-aware adapter to
//! the remote generative model.

pub mod client;
pub mod error;
pub mod gateway;
pub mod redact;

pub use client::{AnthropicClient, LlmClient};
#[cfg(any(test, feature = "test-support"))]
pub use client::FakeLlmClient;
pub use error::GatewayError;
pub use gateway::{LlmGateway, DEFAULT_MAX_OUTPUT_LENGTH, DEFAULT_RETRY_ATTEMPTS, DEFAULT_RETRY_DELAY};
pub use redact::redact;
