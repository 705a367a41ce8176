// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Background reaper: periodically removes terminal jobs past their
//! retention window (spec §4.1). Running and queued jobs are never reaped.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use crate::job_manager::JobManager;

pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Spawn the reaper loop. Runs until the process exits; there is no
/// explicit shutdown handle since the daemon is a single long-running
/// process (spec §1 Non-goals: no horizontal scale-out, single process).
pub fn spawn(manager: Arc<JobManager>, retention: Duration) {
    spawn_with_interval(manager, retention, DEFAULT_SWEEP_INTERVAL)
}

fn spawn_with_interval(manager: Arc<JobManager>, retention: Duration, sweep_interval: Duration) {
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(sweep_interval).await;
            let removed = manager.reap(retention, Utc::now());
            if removed > 0 {
                tracing::info!(removed, "reaper swept terminal jobs");
            }
        }
    });
}

#[cfg(test)]
#[path = "reaper_tests.rs"]
mod tests;
