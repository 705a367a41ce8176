use std::time::Duration;

use tempfile::tempdir;

use super::*;

fn config_in(dir: &std::path::Path) -> Config {
    Config {
        anthropic_api_key: "test-key".to_string(),
        anthropic_model: "claude-3-5-sonnet-20241022".to_string(),
        anthropic_max_tokens: 4096,
        host: "127.0.0.1".to_string(),
        port: 8081,
        max_workers: 1,
        queue_capacity: 10,
        task_timeout: Duration::from_secs(30),
        llm_timeout: Duration::from_secs(30),
        retry_attempts: 1,
        retry_delay: Duration::from_millis(1),
        max_input_length: 1000,
        max_output_length: 1000,
        output_dir: dir.join("output"),
        prompts_dir: dir.join("prompts"),
        conversations_db_path: dir.join("data/conversations.db"),
        user_prompts_path: dir.join("data/user_prompts.json"),
        job_retention: Duration::from_secs(60),
    }
}

#[test]
fn startup_creates_directories_and_writes_pid() {
    let dir = tempdir().expect("tempdir");
    let config = config_in(dir.path());
    let _guard = startup(&config).expect("startup succeeds");

    assert!(config.output_dir.is_dir());
    assert!(config.prompts_dir.is_dir());
    assert!(config.conversations_db_path.parent().expect("parent").is_dir());

    let lock_contents = std::fs::read_to_string(lock_path_for(&config)).expect("read lock");
    assert_eq!(lock_contents.trim(), std::process::id().to_string());
}

#[test]
fn second_startup_against_the_same_tree_fails() {
    let dir = tempdir().expect("tempdir");
    let config = config_in(dir.path());
    let _guard = startup(&config).expect("first startup succeeds");

    let err = startup(&config).expect_err("second startup is rejected");
    assert!(matches!(err, LifecycleError::AlreadyRunning(_)));
}

#[test]
fn lock_is_released_when_guard_drops() {
    let dir = tempdir().expect("tempdir");
    let config = config_in(dir.path());
    {
        let _guard = startup(&config).expect("first startup succeeds");
    }
    let _guard = startup(&config).expect("startup succeeds after the first guard dropped");
}
