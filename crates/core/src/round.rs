// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Round records: one writer-or-modifier/reviewer pair per iteration.

use serde::{Deserialize, Serialize};

/// Which phase produced a given prompt/response pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Round 1 only: first-draft generation from scratch.
    Writer,
    /// Rounds 2..N: revision given the previous draft and review.
    Modifier,
    /// Every round: critique of the current draft.
    Reviewer,
}

crate::simple_display! {
    Role {
        Writer => "writer",
        Modifier => "modifier",
        Reviewer => "reviewer",
    }
}

impl Role {
    /// The role that produces the draft for round `index` (1-based).
    pub fn drafting_role_for(index: u32) -> Role {
        if index <= 1 {
            Role::Writer
        } else {
            Role::Modifier
        }
    }
}

/// A single persisted dialogue turn against the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Round {
    pub job_id: String,
    pub index: u32,
    pub role: Role,
    pub prompt: String,
    pub response: String,
    pub timestamp_ms: u64,
    pub duration_ms: u64,
}

impl Round {
    pub fn new(
        job_id: impl Into<String>,
        index: u32,
        role: Role,
        prompt: impl Into<String>,
        response: impl Into<String>,
        timestamp_ms: u64,
        duration_ms: u64,
    ) -> Self {
        Self {
            job_id: job_id.into(),
            index,
            role,
            prompt: prompt.into(),
            response: response.into(),
            timestamp_ms,
            duration_ms,
        }
    }
}

/// The two (or one, for round 1) records that make up one round's view,
/// as returned by the Conversation Store's `round()` query.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoundView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub writer: Option<Round>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier: Option<Round>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewer: Option<Round>,
}

#[cfg(test)]
#[path = "round_tests.rs"]
mod tests;
