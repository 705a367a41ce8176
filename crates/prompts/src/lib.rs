// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! patentloom-prompts: the Prompt Assembly & Substitution Engine.
//!
//! Resolves, for each role and round, the prompt text to send to the
//! model: a user-custom prompt with dynamic marker expansion if one is
//! set, otherwise a template-backed default, with context compressed to
//! fit a configured budget.

pub mod descriptor;
pub mod engine;
pub mod error;
pub mod registry;
pub mod template;
pub mod user_prompts;

pub use descriptor::TemplateDescriptor;
pub use engine::{PromptEngine, DYNAMIC_MARKER};
pub use error::PromptError;
pub use registry::{PromptTemplate, TemplateRegistry, TemplateRole};
pub use user_prompts::{UserPromptRecord, UserPromptStore};
