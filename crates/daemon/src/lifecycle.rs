// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon startup: directory creation, exclusive lock file, logging install.

use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use fs2::FileExt;

use crate::config::Config;

#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error("another instance is already running (lock held at {0})")]
    AlreadyRunning(PathBuf),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Holds the exclusive lock for the process lifetime; dropping it releases
/// the lock (the teacher's `startup`/`cleanup_on_failure` split, simplified
/// to RAII since this workspace has no WAL/snapshot state to reconcile).
pub struct StartupGuard {
    _lock_file: File,
}

/// Create required directories, install the tracing subscriber, and take
/// the exclusive lock that prevents two daemons sharing one state tree.
pub fn startup(config: &Config) -> Result<StartupGuard, LifecycleError> {
    install_tracing();

    std::fs::create_dir_all(&config.output_dir)?;
    std::fs::create_dir_all(&config.prompts_dir)?;
    if let Some(parent) = config.conversations_db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    if let Some(parent) = config.user_prompts_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let lock_path = lock_path_for(config);
    let lock_file = std::fs::OpenOptions::new().write(true).create(true).truncate(false).open(&lock_path)?;
    lock_file.try_lock_exclusive().map_err(|_| LifecycleError::AlreadyRunning(lock_path.clone()))?;

    let mut lock_file = lock_file;
    lock_file.set_len(0)?;
    writeln!(lock_file, "{}", std::process::id())?;

    Ok(StartupGuard { _lock_file: lock_file })
}

fn lock_path_for(config: &Config) -> PathBuf {
    config
        .conversations_db_path
        .parent()
        .map(|dir| dir.join("patentloom.lock"))
        .unwrap_or_else(|| PathBuf::from("patentloom.lock"))
}

fn install_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .try_init();
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
