// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job Manager: bounded worker pool, submission, polling, cancellation
//! (spec §4.1).

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use parking_lot::RwLock;
use patentloom_core::{
    CancelToken, ErrorKind, Job, JobId, JobInput, JobResult, JobStatus, Mode, SystemClock,
};
use patentloom_engine::{summarize, EngineError, IterationEngine, SummaryLimits};
use tokio::sync::{mpsc, Mutex as AsyncMutex};

use crate::validator::{self, ValidationError};

#[derive(Debug, Clone, thiserror::Error)]
pub enum JobManagerError {
    #[error("{0}")]
    Invalid(String),
    #[error("queue is full")]
    QueueFull,
    #[error("job not found")]
    NotFound,
}

impl JobManagerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            JobManagerError::Invalid(_) => ErrorKind::Invalid,
            JobManagerError::QueueFull => ErrorKind::QueueFull,
            JobManagerError::NotFound => ErrorKind::NotFound,
        }
    }
}

impl From<ValidationError> for JobManagerError {
    fn from(err: ValidationError) -> Self {
        JobManagerError::Invalid(err.0)
    }
}

/// Outcome of a `cancel` call (spec §4.1: idempotent, "late" if terminal).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    Cancelled,
    Late,
}

#[derive(Debug, Clone)]
pub struct Statistics {
    pub queued: usize,
    pub running: usize,
    pub completed: usize,
    pub failed: usize,
    pub cancelled: usize,
    pub queue_depth: usize,
    pub worker_busy: usize,
    pub worker_capacity: usize,
}

/// Bounded worker pool over the Iteration Engine. `submit`/`get`/`cancel`
/// never block beyond the job table lock; execution happens on the worker
/// task loops spawned by `new`.
pub struct JobManager {
    jobs: Arc<RwLock<HashMap<JobId, Job>>>,
    sender: mpsc::Sender<JobId>,
    queue_depth: Arc<AtomicUsize>,
    worker_busy: Arc<AtomicUsize>,
    worker_capacity: usize,
}

impl JobManager {
    pub fn new(
        engine: Arc<IterationEngine<SystemClock>>,
        worker_capacity: usize,
        queue_capacity: usize,
        task_timeout: Duration,
    ) -> Self {
        let jobs: Arc<RwLock<HashMap<JobId, Job>>> = Arc::new(RwLock::new(HashMap::new()));
        let (sender, receiver) = mpsc::channel(queue_capacity);
        let receiver = Arc::new(AsyncMutex::new(receiver));
        let queue_depth = Arc::new(AtomicUsize::new(0));
        let worker_busy = Arc::new(AtomicUsize::new(0));

        for slot in 0..worker_capacity as u32 {
            tokio::spawn(worker_loop(
                slot,
                receiver.clone(),
                jobs.clone(),
                engine.clone(),
                queue_depth.clone(),
                worker_busy.clone(),
                task_timeout,
            ));
        }

        Self { jobs, sender, queue_depth, worker_busy, worker_capacity }
    }

    pub fn submit(&self, input: JobInput) -> Result<JobId, JobManagerError> {
        validator::validate(&input)?;
        let job = Job::new(input, Utc::now());
        let job_id = job.id;

        self.jobs.write().insert(job_id, job);
        match self.sender.try_send(job_id) {
            Ok(()) => {
                self.queue_depth.fetch_add(1, Ordering::SeqCst);
                tracing::info!(%job_id, "job submitted");
                Ok(job_id)
            }
            Err(_) => {
                self.jobs.write().remove(&job_id);
                tracing::warn!(%job_id, "queue full, job rejected");
                Err(JobManagerError::QueueFull)
            }
        }
    }

    pub fn get(&self, job_id: &JobId) -> Result<Job, JobManagerError> {
        self.jobs.read().get(job_id).cloned().ok_or(JobManagerError::NotFound)
    }

    pub fn cancel(&self, job_id: &JobId) -> Result<CancelOutcome, JobManagerError> {
        let mut jobs = self.jobs.write();
        let job = jobs.get_mut(job_id).ok_or(JobManagerError::NotFound)?;

        if job.is_terminal() {
            return Ok(CancelOutcome::Late);
        }

        job.cancel.cancel();
        if job.status == JobStatus::Queued {
            job.status = JobStatus::Cancelled;
            job.message = "任务已取消".to_string();
            job.finished_at = Some(Utc::now());
        }
        tracing::info!(%job_id, "cancel requested");
        Ok(CancelOutcome::Cancelled)
    }

    pub fn statistics(&self) -> Statistics {
        let jobs = self.jobs.read();
        let mut stats = Statistics {
            queued: 0,
            running: 0,
            completed: 0,
            failed: 0,
            cancelled: 0,
            queue_depth: self.queue_depth.load(Ordering::SeqCst),
            worker_busy: self.worker_busy.load(Ordering::SeqCst),
            worker_capacity: self.worker_capacity,
        };
        for job in jobs.values() {
            match job.status {
                JobStatus::Queued => stats.queued += 1,
                JobStatus::Running => stats.running += 1,
                JobStatus::Completed => stats.completed += 1,
                JobStatus::Failed => stats.failed += 1,
                JobStatus::Cancelled => stats.cancelled += 1,
            }
        }
        stats
    }

    /// Remove finished jobs older than `retention` (spec §4.1: the reaper).
    pub fn reap(&self, retention: Duration, now: chrono::DateTime<Utc>) -> usize {
        let mut jobs = self.jobs.write();
        let before = jobs.len();
        jobs.retain(|_, job| match job.finished_at {
            Some(finished_at) => {
                let age = now.signed_duration_since(finished_at);
                age.to_std().map(|age| age < retention).unwrap_or(true)
            }
            None => true,
        });
        before - jobs.len()
    }
}

#[allow(clippy::too_many_arguments)]
async fn worker_loop(
    slot: u32,
    receiver: Arc<AsyncMutex<mpsc::Receiver<JobId>>>,
    jobs: Arc<RwLock<HashMap<JobId, Job>>>,
    engine: Arc<IterationEngine<SystemClock>>,
    queue_depth: Arc<AtomicUsize>,
    worker_busy: Arc<AtomicUsize>,
    task_timeout: Duration,
) {
    loop {
        let job_id = {
            let mut receiver = receiver.lock().await;
            match receiver.recv().await {
                Some(id) => id,
                None => return,
            }
        };
        queue_depth.fetch_sub(1, Ordering::SeqCst);

        let Some((input, cancel)) = start_job(&jobs, &job_id, slot) else { continue };
        worker_busy.fetch_add(1, Ordering::SeqCst);

        let outcome = run_job(&engine, &jobs, &job_id, &input, &cancel, task_timeout).await;
        finish_job(&jobs, &job_id, &input, outcome);

        worker_busy.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Transition a queued job to `running`, unless it was cancelled while
/// still queued (in which case there is nothing to run).
fn start_job(
    jobs: &Arc<RwLock<HashMap<JobId, Job>>>,
    job_id: &JobId,
    slot: u32,
) -> Option<(JobInput, CancelToken)> {
    let mut jobs = jobs.write();
    let job = jobs.get_mut(job_id)?;
    if job.is_terminal() {
        return None;
    }
    job.status = JobStatus::Running;
    job.started_at = Some(Utc::now());
    job.worker_slot = Some(slot);
    Some((job.input.clone(), job.cancel.clone()))
}

enum JobOutcome {
    Completed(JobResult),
    Cancelled,
    Failed(String),
}

async fn run_job(
    engine: &Arc<IterationEngine<SystemClock>>,
    jobs: &Arc<RwLock<HashMap<JobId, Job>>>,
    job_id: &JobId,
    input: &JobInput,
    cancel: &CancelToken,
    task_timeout: Duration,
) -> JobOutcome {
    let context = match build_context(input).await {
        Ok(context) => context,
        Err(err) => return JobOutcome::Failed(err.to_string()),
    };

    let progress_jobs = jobs.clone();
    let progress_job_id = *job_id;
    // Updates are coalesced: only the latest progress/message is visible to
    // pollers, since the callback simply overwrites the job's fields.
    let progress_cb = move |pct: u8, msg: &str| {
        let mut jobs = progress_jobs.write();
        if let Some(job) = jobs.get_mut(&progress_job_id) {
            if !job.is_terminal() {
                job.progress = job.progress.max(pct);
                job.message = msg.to_string();
            }
        }
    };

    let run = engine.run(
        job_id,
        input.mode,
        &context,
        input.iterations,
        input.output_name.as_deref(),
        input.template_id.as_deref(),
        &progress_cb,
        cancel,
    );

    match tokio::time::timeout(task_timeout, run).await {
        Ok(Ok(result)) => JobOutcome::Completed(JobResult {
            output_path: result.output_path,
            docx_path: None,
            iterations: result.iterations,
            last_review: result.last_review,
            template_used: input.template_id.clone(),
            task_id: *job_id,
        }),
        Ok(Err(EngineError::Cancelled)) => JobOutcome::Cancelled,
        Ok(Err(err)) => JobOutcome::Failed(err.to_string()),
        Err(_elapsed) => {
            cancel.cancel();
            JobOutcome::Failed("TimeoutError".to_string())
        }
    }
}

async fn build_context(input: &JobInput) -> Result<String, EngineError> {
    match input.mode {
        Mode::Idea => Ok(input.idea_text.clone().unwrap_or_default()),
        Mode::Code => {
            let project_path = input.project_path.clone().unwrap_or_else(|| Path::new(".").to_path_buf());
            tokio::task::spawn_blocking(move || summarize(&project_path, SummaryLimits::default()))
                .await
                .map_err(|_| EngineError::Io(std::io::Error::other("summarizer task panicked")))?
        }
    }
}

fn finish_job(
    jobs: &Arc<RwLock<HashMap<JobId, Job>>>,
    job_id: &JobId,
    _input: &JobInput,
    outcome: JobOutcome,
) {
    let mut jobs = jobs.write();
    let Some(job) = jobs.get_mut(job_id) else { return };
    if job.is_terminal() {
        return;
    }
    job.finished_at = Some(Utc::now());
    match outcome {
        JobOutcome::Completed(result) => {
            job.status = JobStatus::Completed;
            job.progress = 100;
            job.message = "已完成".to_string();
            job.result = Some(result);
        }
        JobOutcome::Cancelled => {
            job.status = JobStatus::Cancelled;
            job.message = "任务已取消".to_string();
        }
        JobOutcome::Failed(reason) => {
            job.status = JobStatus::Failed;
            job.message = "任务失败".to_string();
            job.error = Some(reason);
        }
    }
    tracing::info!(%job_id, status = %job.status, "job finished");
}

#[cfg(test)]
#[path = "job_manager_tests.rs"]
mod tests;
