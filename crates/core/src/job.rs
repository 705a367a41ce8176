// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job identifier and state.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier for a draft-generation job.
    pub struct JobId("job-");
}

/// Input mode selecting how the first-round context is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Code,
    Idea,
}

crate::simple_display! {
    Mode {
        Code => "code",
        Idea => "idea",
    }
}

/// The caller-supplied request that becomes a [`Job`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobInput {
    pub mode: Mode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idea_text: Option<String>,
    pub iterations: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
}

/// Minimum/maximum allowed value of [`JobInput::iterations`].
pub const MIN_ITERATIONS: u32 = 1;
pub const MAX_ITERATIONS: u32 = 10;

/// Status of a job. Once terminal (`Completed`/`Failed`/`Cancelled`),
/// a job's `status`, `progress`, `result`, and `error` never change again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Running,
    Completed,
    Failed,
    Cancelled,
}

crate::simple_display! {
    JobStatus {
        Queued => "queued",
        Running => "running",
        Completed => "completed",
        Failed => "failed",
        Cancelled => "cancelled",
    }
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled)
    }
}

/// Result payload attached to a `Completed` job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobResult {
    pub output_path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docx_path: Option<PathBuf>,
    pub iterations: u32,
    pub last_review: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_used: Option<String>,
    pub task_id: JobId,
}

/// Cooperative cancellation flag shared between the Job Manager and the
/// worker executing a job. Checked at the enumerated safe points in
/// `pl-engine`'s iteration loop; never forcibly interrupts an in-flight
/// LLM call.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// A job instance, as tracked by the Job Manager.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub input: JobInput,
    pub status: JobStatus,
    /// Monotone non-decreasing while running; 100 iff `status == Completed`.
    pub progress: u8,
    pub message: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<JobResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Which worker pool slot is (or was) executing this job.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker_slot: Option<u32>,
    #[serde(skip)]
    pub cancel: CancelToken,
}

impl Job {
    pub fn new(input: JobInput, created_at: DateTime<Utc>) -> Self {
        Self {
            id: JobId::new(),
            input,
            status: JobStatus::Queued,
            progress: 0,
            message: "已排队".to_string(),
            created_at,
            started_at: None,
            finished_at: None,
            result: None,
            error: None,
            worker_slot: None,
            cancel: CancelToken::new(),
        }
    }

    /// True once the job has reached a state from which no further field
    /// mutation is permitted (spec §3 invariant).
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

#[cfg(any(test, feature = "test-support"))]
pub struct JobBuilder {
    mode: Mode,
    iterations: u32,
    idea_text: Option<String>,
}

#[cfg(any(test, feature = "test-support"))]
impl Default for JobBuilder {
    fn default() -> Self {
        Self { mode: Mode::Idea, iterations: 1, idea_text: Some("a new idea".to_string()) }
    }
}

#[cfg(any(test, feature = "test-support"))]
impl JobBuilder {
    pub fn iterations(mut self, n: u32) -> Self {
        self.iterations = n;
        self
    }

    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn build(self) -> Job {
        Job::new(
            JobInput {
                mode: self.mode,
                project_path: None,
                idea_text: self.idea_text,
                iterations: self.iterations,
                output_name: None,
                template_id: None,
            },
            Utc::now(),
        )
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
