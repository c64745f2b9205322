//! Mirror dispatcher.
//!
//! Consumes scanner records one directory at a time: creates the mirrored
//! directories, builds one transcode command per matching file and runs the
//! directory's batch on the worker pool before moving on.

use super::paths::{ConversionJob, MirrorLayout, MirrorPathError};
use super::pool::{JobOutcome, PoolConfig, WorkerPool};
use crate::scanner::DirectoryRecord;
use alac_av::TranscodeCommand;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Everything the dispatcher needs for one run.
#[derive(Debug, Clone)]
pub struct DispatchOptions {
    pub source_base: PathBuf,
    pub target_root: PathBuf,
    /// Source extension without the leading dot.
    pub extension: String,
    /// Transcoder executable.
    pub ffmpeg: PathBuf,
    pub pool: PoolConfig,
    pub overwrite: bool,
    pub keep_base_name: bool,
    /// Log the plan without touching the filesystem or running jobs.
    pub dry_run: bool,
}

/// Work derived from a single [`DirectoryRecord`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryPlan {
    pub mirrored_dir: PathBuf,
    pub subdirectories: Vec<PathBuf>,
    pub jobs: Vec<ConversionJob>,
}

/// Totals for a run. Only used for logging; it never affects the exit code.
#[derive(Debug, Default)]
pub struct DispatchReport {
    pub directories: usize,
    pub skipped_records: usize,
    pub submitted: usize,
    pub converted: usize,
    pub failed: usize,
    pub outcomes: Vec<JobOutcome>,
}

impl DispatchReport {
    fn record_outcomes(&mut self, outcomes: Vec<JobOutcome>) {
        for outcome in &outcomes {
            if outcome.is_converted() {
                self.converted += 1;
            } else {
                self.failed += 1;
            }
        }
        self.outcomes.extend(outcomes);
    }
}

pub struct Dispatcher {
    options: DispatchOptions,
    layout: MirrorLayout,
    pool: WorkerPool,
}

impl Dispatcher {
    pub fn new(options: DispatchOptions) -> Result<Self> {
        let layout = MirrorLayout::new(
            &options.source_base,
            &options.target_root,
            options.keep_base_name,
        )?;
        let pool = WorkerPool::new(options.pool)?;

        debug!(
            "Mirroring {:?} into {:?} with {} workers ({} mode)",
            options.source_base,
            layout.mirror_base(),
            pool.size(),
            pool.mode()
        );

        Ok(Self {
            options,
            layout,
            pool,
        })
    }

    pub fn pool_size(&self) -> usize {
        self.pool.size()
    }

    /// Compute the mirrored directories and jobs for one record.
    pub fn plan_record(
        &self,
        record: &DirectoryRecord,
    ) -> Result<DirectoryPlan, MirrorPathError> {
        let mirrored_dir = self.layout.mirror_dir(&record.root)?;

        let subdirectories = record
            .subdirectories
            .iter()
            .map(|name| mirrored_dir.join(name))
            .collect();

        let mut jobs = Vec::with_capacity(record.files.len());
        for name in &record.files {
            match self
                .layout
                .job(&record.root, &mirrored_dir, name, &self.options.extension)
            {
                Ok(job) => jobs.push(job),
                Err(e) => warn!("Skipping {:?}: {}", record.root.join(name), e),
            }
        }

        Ok(DirectoryPlan {
            mirrored_dir,
            subdirectories,
            jobs,
        })
    }

    /// Process every record in order, waiting for each directory's batch.
    ///
    /// # Errors
    ///
    /// Fails if a mirrored directory cannot be created. Conversion failures
    /// are logged and counted instead.
    pub fn run(&self, records: &[DirectoryRecord]) -> Result<DispatchReport> {
        let mut report = DispatchReport::default();

        for record in records {
            debug!("Working on {:?}: {:?}", record.root, record);

            let plan = match self.plan_record(record) {
                Ok(plan) => plan,
                Err(e) => {
                    warn!("Skipping record: {}", e);
                    report.skipped_records += 1;
                    continue;
                }
            };

            if self.options.dry_run {
                info!("[DRY RUN] Would create {:?}", plan.mirrored_dir);
            } else {
                create_dir(&plan.mirrored_dir)?;
                for subdir in &plan.subdirectories {
                    create_dir(subdir)?;
                }
            }
            report.directories += 1;

            if plan.jobs.is_empty() {
                continue;
            }

            let commands: Vec<TranscodeCommand> = plan
                .jobs
                .iter()
                .map(|job| {
                    info!("Will convert: {:?} to: {:?}", job.source, job.dest);
                    TranscodeCommand::new(&self.options.ffmpeg, &job.source, &job.dest)
                        .overwrite(self.options.overwrite)
                })
                .collect();

            report.submitted += commands.len();

            if self.options.dry_run {
                continue;
            }

            let outcomes = self.pool.run_batch(commands);
            report.record_outcomes(outcomes);
        }

        if self.options.dry_run {
            info!(
                "[DRY RUN] {} directories, {} conversions planned",
                report.directories, report.submitted
            );
        } else {
            info!(
                "Done: {} directories mirrored, {} converted, {} failed",
                report.directories, report.converted, report.failed
            );
        }

        Ok(report)
    }
}

fn create_dir(path: &Path) -> Result<()> {
    debug!("Creating dir: {:?}", path);
    std::fs::create_dir_all(path)
        .with_context(|| format!("Failed to create directory {:?}", path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::scan_tree;
    use alac_av::ExecMode;
    use std::fs;
    use tempfile::tempdir;

    fn options(base: &Path, target: &Path) -> DispatchOptions {
        DispatchOptions {
            source_base: base.to_path_buf(),
            target_root: target.to_path_buf(),
            extension: "flac".to_string(),
            ffmpeg: PathBuf::from("nonexistent_transcoder_12345"),
            pool: PoolConfig {
                size: 4,
                mode: ExecMode::Argv,
            },
            overwrite: true,
            keep_base_name: false,
            dry_run: false,
        }
    }

    fn sample_tree(root: &Path) -> PathBuf {
        let base = root.join("base");
        fs::create_dir_all(base.join("album1")).unwrap();
        fs::create_dir_all(base.join("album2/sub")).unwrap();
        fs::create_dir_all(base.join("empty")).unwrap();
        fs::write(base.join("album1/track1.flac"), b"").unwrap();
        fs::write(base.join("album1/notes.txt"), b"").unwrap();
        fs::write(base.join("album2/sub/track2.flac"), b"").unwrap();
        base
    }

    #[test]
    fn test_plan_record() {
        let dir = tempdir().unwrap();
        let base = sample_tree(dir.path());
        let target = dir.path().join("out");
        let dispatcher = Dispatcher::new(options(&base, &target)).unwrap();

        let record = DirectoryRecord {
            root: base.join("album1"),
            subdirectories: vec!["disc1".into()],
            files: vec!["track1.flac".into()],
        };
        let plan = dispatcher.plan_record(&record).unwrap();

        assert_eq!(plan.mirrored_dir, target.join("album1"));
        assert_eq!(plan.subdirectories, vec![target.join("album1/disc1")]);
        assert_eq!(
            plan.jobs,
            vec![ConversionJob {
                source: base.join("album1/track1.flac"),
                dest: target.join("album1/track1.m4a"),
            }]
        );
    }

    #[test]
    fn test_run_mirrors_every_directory() {
        let dir = tempdir().unwrap();
        let base = sample_tree(dir.path());
        let target = dir.path().join("out");

        let records = scan_tree(&base, "flac").unwrap();
        let dispatcher = Dispatcher::new(options(&base, &target)).unwrap();
        let report = dispatcher.run(&records).unwrap();

        assert!(target.join("album1").is_dir());
        assert!(target.join("album2/sub").is_dir());
        assert!(target.join("empty").is_dir());
        assert!(!target.join("album1/notes.txt").exists());
        assert_eq!(report.directories, 5);
        assert_eq!(report.submitted, 2);
        // The transcoder does not exist, so both jobs fail without aborting.
        assert_eq!(report.failed, 2);
        assert_eq!(report.converted, 0);

        let mut dests: Vec<PathBuf> = report
            .outcomes
            .iter()
            .map(|o| o.job.dest.clone())
            .collect();
        dests.sort();
        assert_eq!(
            dests,
            vec![target.join("album1/track1.m4a"), target.join("album2/sub/track2.m4a")]
        );
    }

    #[test]
    fn test_run_twice_is_idempotent_for_directories() {
        let dir = tempdir().unwrap();
        let base = sample_tree(dir.path());
        let target = dir.path().join("out");

        let records = scan_tree(&base, "flac").unwrap();
        let dispatcher = Dispatcher::new(options(&base, &target)).unwrap();
        dispatcher.run(&records).unwrap();
        let second = dispatcher.run(&records).unwrap();
        assert_eq!(second.submitted, 2);
    }

    #[test]
    fn test_dry_run_touches_nothing() {
        let dir = tempdir().unwrap();
        let base = sample_tree(dir.path());
        let target = dir.path().join("out");

        let mut opts = options(&base, &target);
        opts.dry_run = true;
        let records = scan_tree(&base, "flac").unwrap();
        let report = Dispatcher::new(opts).unwrap().run(&records).unwrap();

        assert!(!target.exists());
        assert_eq!(report.submitted, 2);
        assert!(report.outcomes.is_empty());
    }

    #[test]
    fn test_keep_base_name_nests_mirror() {
        let dir = tempdir().unwrap();
        let base = sample_tree(dir.path());
        let target = dir.path().join("out");

        let mut opts = options(&base, &target);
        opts.keep_base_name = true;
        let records = scan_tree(&base, "flac").unwrap();
        Dispatcher::new(opts).unwrap().run(&records).unwrap();

        assert!(target.join("base/album2/sub").is_dir());
    }

    #[test]
    fn test_record_outside_base_is_skipped() {
        let dir = tempdir().unwrap();
        let base = sample_tree(dir.path());
        let target = dir.path().join("out");
        let dispatcher = Dispatcher::new(options(&base, &target)).unwrap();

        let stray = DirectoryRecord {
            root: dir.path().join("elsewhere"),
            subdirectories: Vec::new(),
            files: Vec::new(),
        };
        let report = dispatcher.run(&[stray]).unwrap();
        assert_eq!(report.skipped_records, 1);
        assert_eq!(report.directories, 0);
    }

    #[test]
    fn test_directory_creation_failure_aborts() {
        let dir = tempdir().unwrap();
        let base = sample_tree(dir.path());
        let target = dir.path().join("out");
        // A regular file where the mirror root should be.
        fs::write(&target, b"").unwrap();

        let records = scan_tree(&base, "flac").unwrap();
        let result = Dispatcher::new(options(&base, &target)).unwrap().run(&records);
        assert!(result.is_err());
    }

    #[test]
    fn test_oversized_pool_is_clamped() {
        let dir = tempdir().unwrap();
        let base = sample_tree(dir.path());
        let mut opts = options(&base, &dir.path().join("out"));
        opts.pool.size = 50;
        assert_eq!(Dispatcher::new(opts).unwrap().pool_size(), 15);
    }
}
