use std::sync::Arc;

use patentloom_core::{JobBuilder, Mode, SystemClock};
use patentloom_gateway::{FakeLlmClient, LlmGateway};
use patentloom_prompts::{PromptEngine, TemplateRegistry, UserPromptStore, DEFAULT_MAX_INPUT_LENGTH};
use patentloom_storage::ConversationStore;
use tempfile::tempdir;

use super::*;
use crate::job_manager::{CancelOutcome, JobManager};

#[tokio::test]
async fn sweep_removes_terminal_jobs_past_retention() {
    let dir = tempdir().expect("tempdir");
    let clock = patentloom_core::FakeClock::new();
    let registry = Arc::new(TemplateRegistry::load(dir.path().join("prompts")));
    let user_prompts =
        Arc::new(UserPromptStore::open(dir.path().join("user_prompts.json"), &clock).expect("open"));
    let prompts = Arc::new(PromptEngine::new(registry, user_prompts, DEFAULT_MAX_INPUT_LENGTH));
    let gateway = Arc::new(LlmGateway::new(Arc::new(FakeLlmClient::new(vec![]))));
    let store = Arc::new(ConversationStore::open_in_memory().expect("open store"));
    let engine = Arc::new(patentloom_engine::IterationEngine::new(
        prompts,
        gateway,
        store,
        dir.path().join("drafts"),
        SystemClock,
    ));
    let manager = Arc::new(JobManager::new(engine, 0, 10, Duration::from_secs(30)));

    let job = JobBuilder::default().mode(Mode::Idea).build();
    let job_id = manager.submit(job.input).expect("submit");
    assert_eq!(manager.cancel(&job_id).expect("cancel"), CancelOutcome::Cancelled);

    spawn_with_interval(manager.clone(), Duration::from_millis(0), Duration::from_millis(5));
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(manager.get(&job_id).is_err());
}
