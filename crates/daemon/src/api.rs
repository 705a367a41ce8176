// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! External API (thin): typed request/response handlers matching the
//! HTTP/JSON contract in spec §6, without any actual transport. Wiring
//! these onto a real listener (axum, warp, ...) is out of scope.

use std::sync::Arc;
use std::time::Duration;

use patentloom_core::{JobId, JobInput, JobStatus, Mode};
use patentloom_prompts::{TemplateDescriptor, TemplateRegistry, UserPromptStore};
use patentloom_storage::{ConversationStore, StorageError};
use serde::{Deserialize, Serialize};

use crate::job_manager::{CancelOutcome, JobManager, JobManagerError};

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateRequest {
    pub mode: Mode,
    #[serde(default, rename = "projectPath")]
    pub project_path: Option<std::path::PathBuf>,
    #[serde(default, rename = "ideaText")]
    pub idea_text: Option<String>,
    pub iterations: u32,
    #[serde(default, rename = "outputName")]
    pub output_name: Option<String>,
    #[serde(default, rename = "templateId")]
    pub template_id: Option<String>,
}

impl From<GenerateRequest> for JobInput {
    fn from(req: GenerateRequest) -> Self {
        JobInput {
            mode: req.mode,
            project_path: req.project_path,
            idea_text: req.idea_text,
            iterations: req.iterations,
            output_name: req.output_name,
            template_id: req.template_id,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub ok: bool,
    pub message: String,
}

impl ErrorBody {
    fn from(err: &JobManagerError) -> Self {
        Self { ok: false, message: err.to_string() }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerateResponse {
    pub ok: bool,
    pub iterations: u32,
    #[serde(rename = "outputPath")]
    pub output_path: String,
    #[serde(rename = "lastReviewPreview")]
    pub last_review_preview: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerateAsyncResponse {
    pub ok: bool,
    #[serde(rename = "taskId")]
    pub task_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskResponse {
    pub status: JobStatus,
    pub progress: u8,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<patentloom_core::JobResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct TemplatesResponse {
    pub ok: bool,
    pub templates: Vec<TemplateDescriptor>,
    pub default_template_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserPromptsStats {
    #[serde(rename = "writerLength")]
    pub writer_length: usize,
    #[serde(rename = "reviewerLength")]
    pub reviewer_length: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserPromptsData {
    pub prompts: UserPromptsBody,
    pub stats: UserPromptsStats,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserPromptsBody {
    pub writer: String,
    pub reviewer: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserPromptsResponse {
    pub success: bool,
    pub data: UserPromptsData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SetUserPromptsRequest {
    pub writer: String,
    pub reviewer: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoundsResponse {
    pub success: bool,
    pub data: Vec<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoundResponse {
    pub success: bool,
    pub data: patentloom_core::RoundView,
}

/// Binds the four subsystems the thin API surface forwards to.
pub struct ApiHandlers {
    jobs: Arc<JobManager>,
    store: Arc<ConversationStore>,
    templates: Arc<TemplateRegistry>,
    user_prompts: Arc<UserPromptStore>,
    clock: patentloom_core::SystemClock,
}

impl ApiHandlers {
    pub fn new(
        jobs: Arc<JobManager>,
        store: Arc<ConversationStore>,
        templates: Arc<TemplateRegistry>,
        user_prompts: Arc<UserPromptStore>,
    ) -> Self {
        Self { jobs, store, templates, user_prompts, clock: patentloom_core::SystemClock }
    }

    /// `POST /api/generate`: synchronous, polls the submitted job to a
    /// terminal state before returning.
    pub async fn generate(&self, req: GenerateRequest) -> Result<GenerateResponse, ErrorBody> {
        let job_id = self.jobs.submit(req.into()).map_err(|e| ErrorBody::from(&e))?;
        let job = self.wait_for_terminal(&job_id).await;

        match (job.status, job.result) {
            (JobStatus::Completed, Some(result)) => Ok(GenerateResponse {
                ok: true,
                iterations: result.iterations,
                output_path: result.output_path.display().to_string(),
                last_review_preview: preview(&result.last_review),
            }),
            _ => Err(ErrorBody {
                ok: false,
                message: job.error.unwrap_or_else(|| "job did not complete".to_string()),
            }),
        }
    }

    /// `POST /api/generate/async`: returns immediately with the task id.
    pub fn generate_async(&self, req: GenerateRequest) -> Result<GenerateAsyncResponse, ErrorBody> {
        let job_id = self.jobs.submit(req.into()).map_err(|e| ErrorBody::from(&e))?;
        Ok(GenerateAsyncResponse { ok: true, task_id: job_id.to_string() })
    }

    /// `GET /api/tasks/{id}`.
    pub fn get_task(&self, job_id: &JobId) -> Result<TaskResponse, ErrorBody> {
        let job = self.jobs.get(job_id).map_err(|e| ErrorBody::from(&e))?;
        Ok(TaskResponse {
            status: job.status,
            progress: job.progress,
            message: job.message,
            result: job.result,
            error: job.error,
            created_at: job.created_at,
        })
    }

    /// `POST /api/tasks/{id}/cancel`.
    pub fn cancel_task(&self, job_id: &JobId) -> Result<OkResponse, ErrorBody> {
        match self.jobs.cancel(job_id) {
            Ok(CancelOutcome::Cancelled | CancelOutcome::Late) => Ok(OkResponse { ok: true }),
            Err(e) => Err(ErrorBody::from(&e)),
        }
    }

    /// `GET /api/templates/`.
    pub fn list_templates(&self) -> TemplatesResponse {
        let templates = self.templates.descriptors();
        let default_template_id = templates
            .iter()
            .find(|t| t.is_default)
            .map(|t| t.id.clone())
            .unwrap_or_else(|| "writer/base_prompt".to_string());
        TemplatesResponse { ok: true, templates, default_template_id }
    }

    /// `GET /api/user/prompts`.
    pub fn get_user_prompts(&self) -> UserPromptsResponse {
        let record = self.user_prompts.get();
        UserPromptsResponse {
            success: true,
            data: UserPromptsData {
                stats: UserPromptsStats {
                    writer_length: record.writer_prompt.chars().count(),
                    reviewer_length: record.reviewer_prompt.chars().count(),
                },
                prompts: UserPromptsBody { writer: record.writer_prompt, reviewer: record.reviewer_prompt },
            },
        }
    }

    /// `POST /api/user/prompts`.
    pub fn set_user_prompts(&self, req: SetUserPromptsRequest) -> Result<SuccessResponse, ErrorBody> {
        self.user_prompts
            .set(req.writer, req.reviewer, &self.clock)
            .map(|()| SuccessResponse { success: true })
            .map_err(|e| ErrorBody { ok: false, message: e.to_string() })
    }

    /// `GET /api/conversations/tasks/{id}/rounds`.
    pub fn rounds_for(&self, job_id: &JobId) -> Result<RoundsResponse, ErrorBody> {
        self.store
            .rounds_for(job_id.as_str())
            .map(|data| RoundsResponse { success: true, data })
            .map_err(|e| storage_error_body(&e))
    }

    /// `GET /api/conversations/tasks/{id}/rounds/{i}`.
    pub fn round(&self, job_id: &JobId, index: u32) -> Result<RoundResponse, ErrorBody> {
        self.store
            .round(job_id.as_str(), index)
            .map(|data| RoundResponse { success: true, data })
            .map_err(|e| storage_error_body(&e))
    }

    async fn wait_for_terminal(&self, job_id: &JobId) -> patentloom_core::Job {
        loop {
            // unwrap_or-style fallback: the job was just submitted by this
            // same call, so a `NotFound` here would indicate a logic bug,
            // not a condition callers need to handle separately.
            if let Ok(job) = self.jobs.get(job_id) {
                if job.is_terminal() {
                    return job;
                }
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    }
}

fn preview(text: &str) -> String {
    const PREVIEW_CHARS: usize = 200;
    if text.chars().count() <= PREVIEW_CHARS {
        text.to_string()
    } else {
        text.chars().take(PREVIEW_CHARS).collect()
    }
}

fn storage_error_body(err: &StorageError) -> ErrorBody {
    ErrorBody { ok: false, message: err.to_string() }
}

#[cfg(test)]
#[path = "api_tests.rs"]
mod tests;
