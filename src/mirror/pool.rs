//! Bounded worker pool for transcoder processes.
//!
//! Every worker thread runs one external process at a time, so the pool size
//! is also the ceiling on concurrent transcoder processes.

use super::paths::ConversionJob;
use crate::config::MAX_POOL_SIZE;
use alac_av::{ExecMode, TranscodeCommand};
use anyhow::{Context, Result};
use rayon::prelude::*;
use tracing::{info, warn};

/// Clamp a requested pool size into `1..=MAX_POOL_SIZE`.
pub fn effective_pool_size(requested: usize) -> usize {
    requested.clamp(1, MAX_POOL_SIZE)
}

/// Result of one conversion job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Converted,
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct JobOutcome {
    pub job: ConversionJob,
    pub status: JobStatus,
}

impl JobOutcome {
    pub fn is_converted(&self) -> bool {
        self.status == JobStatus::Converted
    }
}

/// Pool settings.
#[derive(Debug, Clone, Copy)]
pub struct PoolConfig {
    /// Requested size; clamped by [`effective_pool_size`].
    pub size: usize,
    pub mode: ExecMode,
}

/// Fixed-size pool that runs batches of transcode commands.
pub struct WorkerPool {
    pool: rayon::ThreadPool,
    size: usize,
    mode: ExecMode,
}

impl WorkerPool {
    pub fn new(config: PoolConfig) -> Result<Self> {
        let size = effective_pool_size(config.size);
        if size != config.size {
            warn!("Requested pool size {} adjusted to {}", config.size, size);
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(size)
            .thread_name(|i| format!("alac-worker-{i}"))
            .build()
            .context("Failed to build worker pool")?;

        Ok(Self {
            pool,
            size,
            mode: config.mode,
        })
    }

    /// Number of worker threads.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn mode(&self) -> ExecMode {
        self.mode
    }

    /// Run every command of a batch and block until all have finished.
    ///
    /// Failures are logged and reported in the returned outcomes; they never
    /// abort the batch. Outcomes keep the order of `commands`.
    pub fn run_batch(&self, commands: Vec<TranscodeCommand>) -> Vec<JobOutcome> {
        if commands.is_empty() {
            return Vec::new();
        }

        let mode = self.mode;
        self.pool
            .install(|| commands.par_iter().map(|cmd| run_job(cmd, mode)).collect())
    }
}

fn run_job(cmd: &TranscodeCommand, mode: ExecMode) -> JobOutcome {
    let job = ConversionJob {
        source: cmd.source().to_path_buf(),
        dest: cmd.dest().to_path_buf(),
    };

    let status = match cmd.run(mode) {
        Ok(_) => {
            info!("Converted {:?}", job.dest);
            JobStatus::Converted
        }
        Err(e) => {
            warn!("Conversion of {:?} failed: {}", job.source, e);
            JobStatus::Failed(e.to_string())
        }
    };

    JobOutcome { job, status }
}
