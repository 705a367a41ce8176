// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Entry point: assembles the full stack from environment configuration
//! and runs as a single long-running server (spec §6 CLI surface).

use std::sync::Arc;

use anyhow::Context;
use patentloom_core::SystemClock;
use patentloom_daemon::{lifecycle, ApiHandlers, Config, JobManager};
use patentloom_engine::IterationEngine;
use patentloom_gateway::{AnthropicClient, LlmGateway};
use patentloom_prompts::{PromptEngine, TemplateRegistry, UserPromptStore};
use patentloom_storage::ConversationStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(err) = run().await {
        tracing::error!(error = %err, "startup failed");
        eprintln!("patentloomd: {err:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    let config = Config::from_env().context("loading configuration")?;
    let guard = lifecycle::startup(&config).context("daemon startup")?;

    let registry = Arc::new(TemplateRegistry::load(config.prompts_dir.clone()));
    let user_prompts = Arc::new(
        UserPromptStore::open(config.user_prompts_path.clone(), &SystemClock)
            .context("loading user prompt overrides")?,
    );
    let prompts = Arc::new(PromptEngine::new(registry.clone(), user_prompts.clone(), config.max_input_length));

    let client = Arc::new(AnthropicClient::new(
        config.anthropic_api_key.clone(),
        config.anthropic_model.clone(),
        config.anthropic_max_tokens,
        config.llm_timeout,
    ));
    let gateway = Arc::new(
        LlmGateway::new(client).with_limits(config.retry_attempts, config.retry_delay, config.max_output_length),
    );

    let store = Arc::new(ConversationStore::open(&config.conversations_db_path).context("opening conversation store")?);

    let engine = Arc::new(IterationEngine::new(
        prompts,
        gateway,
        store.clone(),
        config.output_dir.clone(),
        SystemClock,
    ));

    let jobs = Arc::new(JobManager::new(engine, config.max_workers, config.queue_capacity, config.task_timeout));
    patentloom_daemon::reaper::spawn(jobs.clone(), config.job_retention);

    let _handlers = ApiHandlers::new(jobs, store, registry, user_prompts);

    tracing::info!(host = %config.host, port = config.port, "patentloomd ready");
    tokio::signal::ctrl_c().await.context("waiting for shutdown signal")?;
    tracing::info!("shutting down");
    drop(guard);
    Ok(())
}
