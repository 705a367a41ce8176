// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Iteration Engine: drives the writer/modifier/reviewer round state
//! machine for a single job (spec §4.2).

use std::path::{Path, PathBuf};
use std::sync::Arc;

use patentloom_core::{CancelToken, Clock, JobId, Mode, Role, Round};
use patentloom_gateway::LlmGateway;
use patentloom_prompts::PromptEngine;
use patentloom_storage::ConversationStore;

use crate::error::EngineError;

/// Progress callback: `(percent_complete, message)`.
pub type ProgressCallback<'a> = dyn Fn(u8, &str) + Send + Sync + 'a;

/// Outcome of a completed run, independent of any downstream document
/// rendering the caller may layer on top.
#[derive(Debug, Clone)]
pub struct IterationResult {
    pub output_path: PathBuf,
    pub iterations: u32,
    pub last_review: String,
}

/// Drives the writer/modifier/reviewer loop for one job: builds each round's
/// prompt, calls the model through the gateway, persists the round, and
/// reports progress after every completed round.
pub struct IterationEngine<C: Clock> {
    prompts: Arc<PromptEngine>,
    gateway: Arc<LlmGateway>,
    store: Arc<ConversationStore>,
    output_dir: PathBuf,
    clock: C,
}

impl<C: Clock> IterationEngine<C> {
    pub fn new(
        prompts: Arc<PromptEngine>,
        gateway: Arc<LlmGateway>,
        store: Arc<ConversationStore>,
        output_dir: impl Into<PathBuf>,
        clock: C,
    ) -> Self {
        Self { prompts, gateway, store, output_dir: output_dir.into(), clock }
    }

    /// Run `iterations` writer/modifier + reviewer rounds over `context`,
    /// reporting progress through `progress_cb` and honoring `cancel` at
    /// each safe point. The final draft is written to
    /// `<output_name|timestamp>.md` under the configured output directory.
    ///
    /// A non-retryable model error aborts the run: no output file is
    /// written, and any previously-existing output file at that path is
    /// left untouched.
    #[allow(clippy::too_many_arguments)]
    pub async fn run(
        &self,
        job_id: &JobId,
        mode: Mode,
        context: &str,
        iterations: u32,
        output_name: Option<&str>,
        template_id: Option<&str>,
        progress_cb: &ProgressCallback<'_>,
        cancel: &CancelToken,
    ) -> Result<IterationResult, EngineError> {
        self.store.register_task(job_id.as_str(), mode, iterations)?;

        let round_share = 100u32 / iterations.max(1);
        let mut previous_draft: Option<String> = None;
        let mut previous_review: Option<String> = None;
        let mut last_review = String::new();

        for index in 1..=iterations {
            if cancel.is_cancelled() {
                return Err(EngineError::Cancelled);
            }

            let draft_role = Role::drafting_role_for(index);
            let draft = self
                .run_phase(
                    job_id,
                    draft_role,
                    index,
                    iterations,
                    context,
                    previous_draft.as_deref(),
                    previous_review.as_deref(),
                    None,
                    template_id,
                    cancel,
                )
                .await?;

            if cancel.is_cancelled() {
                return Err(EngineError::Cancelled);
            }

            let review = self
                .run_phase(
                    job_id,
                    Role::Reviewer,
                    index,
                    iterations,
                    context,
                    None,
                    None,
                    Some(draft.as_str()),
                    template_id,
                    cancel,
                )
                .await?;

            // The terminal 100 is reserved for the status transition to
            // `Completed`; the last round reports 99 so a concurrent
            // reader never observes progress == 100 before that transition.
            let completed = (index * round_share).min(99);
            progress_cb(completed as u8, &format!("第 {index}/{iterations} 轮已完成"));

            previous_draft = Some(draft);
            previous_review = Some(review.clone());
            last_review = review;
        }

        let final_draft = previous_draft.unwrap_or_default();
        let output_path = self.write_output(output_name, &final_draft)?;

        Ok(IterationResult { output_path, iterations, last_review })
    }

    #[allow(clippy::too_many_arguments)]
    async fn run_phase(
        &self,
        job_id: &JobId,
        role: Role,
        index: u32,
        total: u32,
        context: &str,
        previous_draft: Option<&str>,
        previous_review: Option<&str>,
        current_draft: Option<&str>,
        template_id: Option<&str>,
        cancel: &CancelToken,
    ) -> Result<String, EngineError> {
        let prompt = self.prompts.build(
            role,
            index,
            total,
            context,
            previous_draft,
            previous_review,
            current_draft,
            template_id,
        )?;

        let started = self.clock.now();
        let response = self.gateway.call(role, index, &prompt).await?;
        let duration_ms = self.clock.now().saturating_duration_since(started).as_millis() as u64;

        if cancel.is_cancelled() {
            return Err(EngineError::Cancelled);
        }

        let round = Round::new(job_id.as_str(), index, role, prompt, response.clone(), self.clock.epoch_ms(), duration_ms);
        self.store.log_round(&round)?;

        Ok(response)
    }

    fn write_output(&self, output_name: Option<&str>, draft: &str) -> Result<PathBuf, EngineError> {
        std::fs::create_dir_all(&self.output_dir)?;
        let file_name = match output_name {
            Some(name) => format!("{name}.md"),
            None => format!("{}.md", self.clock.epoch_ms()),
        };
        let path: PathBuf = Path::new(&self.output_dir).join(file_name);
        std::fs::write(&path, draft)?;
        Ok(path)
    }
}

#[cfg(test)]
#[path = "iteration_tests.rs"]
mod tests;
