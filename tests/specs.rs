// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workspace-level black-box scenarios: each test exercises the full
//! assembled stack (Prompt Engine, LLM Gateway, Iteration Engine, Job
//! Manager, external API) the way a caller would, without reaching into
//! any single crate's internals.

use std::sync::Arc;
use std::time::Duration;

use assert_cmd::Command;
use patentloom_core::{FakeClock, JobStatus, Mode, SystemClock};
use patentloom_daemon::api::{ApiHandlers, GenerateRequest, SetUserPromptsRequest};
use patentloom_daemon::JobManager;
use patentloom_engine::IterationEngine;
use patentloom_gateway::{FakeLlmClient, GatewayError, LlmGateway};
use patentloom_prompts::{PromptEngine, TemplateRegistry, UserPromptStore, DEFAULT_MAX_INPUT_LENGTH};
use patentloom_storage::ConversationStore;
use tempfile::{tempdir, TempDir};

struct Stack {
    handlers: ApiHandlers,
    _dir: TempDir,
}

fn build_stack(responses: Vec<Result<String, GatewayError>>, max_input_length: usize) -> Stack {
    let dir = tempdir().expect("tempdir");
    let clock = FakeClock::new();
    let registry = Arc::new(TemplateRegistry::load(dir.path().join("prompts")));
    let user_prompts = Arc::new(
        UserPromptStore::open(dir.path().join("user_prompts.json"), &clock).expect("open user prompts"),
    );
    let prompts = Arc::new(PromptEngine::new(registry.clone(), user_prompts.clone(), max_input_length));
    let client = Arc::new(FakeLlmClient::new(responses));
    let gateway = Arc::new(LlmGateway::new(client));
    let store = Arc::new(ConversationStore::open_in_memory().expect("open store"));
    let engine = Arc::new(IterationEngine::new(
        prompts,
        gateway,
        store.clone(),
        dir.path().join("drafts"),
        SystemClock,
    ));
    let jobs = Arc::new(JobManager::new(engine, 3, 10, Duration::from_secs(30)));
    let handlers = ApiHandlers::new(jobs, store, registry, user_prompts);
    Stack { handlers, _dir: dir }
}

fn idea_request(text: &str, iterations: u32) -> GenerateRequest {
    GenerateRequest {
        mode: Mode::Idea,
        project_path: None,
        idea_text: Some(text.to_string()),
        iterations,
        output_name: None,
        template_id: None,
    }
}

async fn poll_until_terminal(
    stack: &Stack,
    task_id: &str,
) -> patentloom_daemon::api::TaskResponse {
    let job_id = patentloom_core::JobId::from_string(task_id);
    loop {
        let task = stack.handlers.get_task(&job_id).expect("task exists");
        if matches!(task.status, JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled) {
            return task;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

/// Scenario 1: synchronous idea run, single round.
#[tokio::test]
async fn scenario_synchronous_idea_run_single_round() {
    let stack = build_stack(
        vec![
            Ok("a cache eviction policy draft".to_string()),
            Ok("this looks sound".to_string()),
        ],
        DEFAULT_MAX_INPUT_LENGTH,
    );
    let response = stack
        .handlers
        .generate(idea_request(
            "A new cache eviction policy based on access recency weighted by key size.",
            1,
        ))
        .await
        .expect("generate succeeds");

    assert!(response.ok);
    assert_eq!(response.iterations, 1);
    assert!(response.output_path.ends_with(".md"));
    assert!(!response.last_review_preview.is_empty());
    let contents = std::fs::read_to_string(&response.output_path).expect("read output");
    assert!(contents.contains("a cache eviction policy draft"));
}

/// Scenario 2: async code run, three rounds.
#[tokio::test]
async fn scenario_async_code_run_three_rounds() {
    let stack = build_stack(
        vec![
            Ok("draft 1".to_string()),
            Ok("review 1, needs work".to_string()),
            Ok("draft 2".to_string()),
            Ok("review 2, needs work".to_string()),
            Ok("draft 3".to_string()),
            Ok("review 3, looks good".to_string()),
        ],
        DEFAULT_MAX_INPUT_LENGTH,
    );
    let project = tempdir().expect("tempdir");
    std::fs::write(project.path().join("main.rs"), "fn main() {}\n").expect("write source");

    let submitted = stack
        .handlers
        .generate_async(GenerateRequest {
            mode: Mode::Code,
            project_path: Some(project.path().to_path_buf()),
            idea_text: None,
            iterations: 3,
            output_name: None,
            template_id: None,
        })
        .expect("submit succeeds");
    assert!(submitted.ok);

    let task = poll_until_terminal(&stack, &submitted.task_id).await;
    assert_eq!(task.status, JobStatus::Completed);
    assert_eq!(task.progress, 100);
    let result = task.result.expect("completed job carries a result");
    assert_eq!(result.iterations, 3);

    let job_id = patentloom_core::JobId::from_string(&submitted.task_id);
    let rounds = stack.handlers.rounds_for(&job_id).expect("rounds exist");
    assert_eq!(rounds.data, vec![1, 2, 3]);

    let round_two = stack.handlers.round(&job_id, 2).expect("round exists");
    assert!(round_two.data.modifier.is_some());
    assert!(round_two.data.reviewer.is_some());
}

/// Scenario 3: cancellation mid-run.
#[tokio::test]
async fn scenario_cancellation_mid_run() {
    let responses: Vec<Result<String, GatewayError>> =
        (0..40).map(|i| Ok(format!("response {i}"))).collect();
    let stack = build_stack(responses, DEFAULT_MAX_INPUT_LENGTH);

    let submitted = stack
        .handlers
        .generate_async(idea_request("a long-running idea", 10))
        .expect("submit succeeds");
    let job_id = patentloom_core::JobId::from_string(&submitted.task_id);

    loop {
        let task = stack.handlers.get_task(&job_id).expect("task exists");
        if task.progress > 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
    stack.handlers.cancel_task(&job_id).expect("cancel succeeds");

    let task = poll_until_terminal(&stack, &submitted.task_id).await;
    assert_eq!(task.status, JobStatus::Cancelled);
    assert!(task.progress < 100);

    let rounds = stack.handlers.rounds_for(&job_id).expect("rounds exist");
    assert!(rounds.data.len() < 10);
}

/// Scenario 4: custom prompt with the `</text>` marker.
#[tokio::test]
async fn scenario_custom_prompt_marker_substitution_is_exact() {
    let stack = build_stack(
        vec![
            Ok("draft one text".to_string()),
            Ok("review one".to_string()),
            Ok("draft two text".to_string()),
            Ok("review two".to_string()),
        ],
        DEFAULT_MAX_INPUT_LENGTH,
    );
    stack
        .handlers
        .set_user_prompts(SetUserPromptsRequest {
            writer: "Rewrite the draft below:\n</text>\nEnd.".to_string(),
            reviewer: String::new(),
        })
        .expect("set succeeds");

    let submitted = stack.handlers.generate_async(idea_request("an idea", 2)).expect("submit succeeds");
    let job_id = patentloom_core::JobId::from_string(&submitted.task_id);
    poll_until_terminal(&stack, &submitted.task_id).await;

    let round_two = stack.handlers.round(&job_id, 2).expect("round exists");
    let modifier = round_two.data.modifier.expect("round 2 has a modifier record");
    assert_eq!(modifier.prompt, "Rewrite the draft below:\ndraft one text\nEnd.");
}

/// Scenario 5: oversize context is compressed to fit, or fails with
/// `PromptTooLarge` if compression is not enough.
#[tokio::test]
async fn scenario_oversize_context_is_compressed_then_succeeds() {
    let stack = build_stack(vec![Ok("draft".to_string()), Ok("review".to_string())], 500);
    let oversize_idea = "x".repeat(700);

    let response = stack.handlers.generate(idea_request(&oversize_idea, 1)).await.expect("generate succeeds");
    assert!(response.ok);
}

#[tokio::test]
async fn scenario_oversize_context_still_too_large_after_compression_fails() {
    let stack = build_stack(vec![Ok("draft".to_string()), Ok("review".to_string())], 10);
    let oversize_idea = "x".repeat(10_000);

    let result = stack.handlers.generate(idea_request(&oversize_idea, 1)).await;
    assert!(result.is_err());
}

/// Scenario 6: three rate-limit errors then success, retried transparently.
#[tokio::test]
async fn scenario_rate_limit_retried_then_succeeds() {
    let stack = build_stack(
        vec![
            Err(GatewayError::RateLimit { retry_after_ms: Some(1) }),
            Err(GatewayError::RateLimit { retry_after_ms: Some(1) }),
            Err(GatewayError::RateLimit { retry_after_ms: Some(1) }),
            Ok("draft after retries".to_string()),
            Ok("looks good".to_string()),
        ],
        DEFAULT_MAX_INPUT_LENGTH,
    );
    let response = stack.handlers.generate(idea_request("an idea", 1)).await.expect("generate succeeds");
    assert!(response.ok);
}

/// Property: progress never decreases and terminal status maps to 100%
/// iff the job completed.
#[tokio::test]
async fn property_progress_is_monotone_and_completion_implies_full_progress() {
    let stack = build_stack(
        vec![
            Ok("draft 1".to_string()),
            Ok("review 1".to_string()),
            Ok("draft 2".to_string()),
            Ok("review 2".to_string()),
        ],
        DEFAULT_MAX_INPUT_LENGTH,
    );
    let submitted = stack.handlers.generate_async(idea_request("an idea", 2)).expect("submit succeeds");
    let job_id = patentloom_core::JobId::from_string(&submitted.task_id);

    let mut last_progress = 0u8;
    loop {
        let task = stack.handlers.get_task(&job_id).expect("task exists");
        assert!(task.progress >= last_progress);
        last_progress = task.progress;
        if matches!(task.status, JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled) {
            assert_eq!(task.status == JobStatus::Completed, task.progress == 100);
            break;
        }
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
}

/// Property: subsequent `cancel` on a terminal job does not change status.
#[tokio::test]
async fn property_cancel_is_idempotent_on_terminal_jobs() {
    let stack = build_stack(vec![Ok("draft".to_string()), Ok("review".to_string())], DEFAULT_MAX_INPUT_LENGTH);
    let submitted = stack.handlers.generate_async(idea_request("an idea", 1)).expect("submit succeeds");
    let task = poll_until_terminal(&stack, &submitted.task_id).await;
    assert_eq!(task.status, JobStatus::Completed);

    let job_id = patentloom_core::JobId::from_string(&submitted.task_id);
    stack.handlers.cancel_task(&job_id).expect("cancel on terminal job is accepted");
    let task_after = stack.handlers.get_task(&job_id).expect("task exists");
    assert_eq!(task_after.status, JobStatus::Completed);
}

/// Boundary: empty `ideaText` in idea mode is rejected as invalid.
#[tokio::test]
async fn boundary_empty_idea_text_is_invalid() {
    let stack = build_stack(vec![], DEFAULT_MAX_INPUT_LENGTH);
    let result = stack.handlers.generate_async(idea_request("", 1));
    assert!(result.is_err());
}

/// Boundary: submitting beyond worker capacity and queue capacity yields
/// `QueueFull`.
#[tokio::test]
async fn boundary_queue_full_when_workers_and_queue_are_saturated() {
    let dir = tempdir().expect("tempdir");
    let clock = FakeClock::new();
    let registry = Arc::new(TemplateRegistry::load(dir.path().join("prompts")));
    let user_prompts = Arc::new(
        UserPromptStore::open(dir.path().join("user_prompts.json"), &clock).expect("open user prompts"),
    );
    let prompts = Arc::new(PromptEngine::new(registry, user_prompts, DEFAULT_MAX_INPUT_LENGTH));
    let client = Arc::new(FakeLlmClient::new(vec![]));
    let gateway = Arc::new(LlmGateway::new(client));
    let store = Arc::new(ConversationStore::open_in_memory().expect("open store"));
    let engine = Arc::new(IterationEngine::new(
        prompts,
        gateway,
        store,
        dir.path().join("drafts"),
        SystemClock,
    ));
    // Zero workers: every submission sits in the queue forever, so a
    // 1-slot queue fills on the second submission.
    let jobs = JobManager::new(engine, 0, 1, Duration::from_secs(30));

    let first = jobs.submit(patentloom_core::JobBuilder::default().mode(Mode::Idea).build().input);
    assert!(first.is_ok());
    let second = jobs.submit(patentloom_core::JobBuilder::default().mode(Mode::Idea).build().input);
    assert!(matches!(second, Err(patentloom_daemon::JobManagerError::QueueFull)));
}

/// The daemon binary exits non-zero when required configuration is absent.
#[test]
fn binary_exits_nonzero_on_missing_api_key() {
    let mut cmd = Command::cargo_bin("patentloomd").expect("binary builds");
    cmd.env_remove("ANTHROPIC_API_KEY");
    cmd.assert().failure();
}
