//! Batch runner
//!
//! Tests share no mutable state, so a batch is a queue of independent jobs
//! drained by worker threads. Each target gets its own copy of the base
//! environment. An interrupt from any worker stops the queue and is returned
//! to the caller; every other failure is recorded in that target's report.

use crate::config::environment::Environment;
use crate::config::types::{HarnessError, Result};
use crate::factory::{build_test, factory_for};
use crate::kernel::signal::interrupt_requested;
use crate::pipeline::{TestOutcome, TestReport};
use chrono::{DateTime, Utc};
use crossbeam_channel::unbounded;
use log::{debug, info, warn};
use serde::Serialize;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use walkdir::WalkDir;

/// Reports of one batch, in input order.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub passed: usize,
    pub unverified: usize,
    pub failed: usize,
    pub reports: Vec<TestReport>,
}

impl BatchReport {
    fn from_reports(started_at: DateTime<Utc>, reports: Vec<TestReport>) -> Self {
        let mut batch = Self {
            started_at,
            finished_at: Utc::now(),
            passed: 0,
            unverified: 0,
            failed: 0,
            reports,
        };
        for report in &batch.reports {
            match report.outcome {
                TestOutcome::Passed => batch.passed += 1,
                TestOutcome::Unverified { .. } => batch.unverified += 1,
                TestOutcome::Failed { .. } => batch.failed += 1,
            }
        }
        batch
    }

    pub fn total(&self) -> usize {
        self.reports.len()
    }
}

/// Collect test targets: files are taken as given when a factory accepts
/// them, directories are walked in sorted order.
pub fn discover_targets<P: AsRef<Path>>(paths: &[P]) -> Vec<String> {
    let mut targets = Vec::new();
    for path in paths {
        let path = path.as_ref();
        if path.is_file() {
            let name = path.display().to_string();
            if factory_for(&name).is_some() {
                targets.push(name);
            }
            continue;
        }

        for entry in WalkDir::new(path).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("skipping unreadable entry: {}", e);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let name = entry.path().display().to_string();
            if factory_for(&name).is_some() {
                targets.push(name);
            }
        }
    }
    targets
}

/// Build and run the test of one target.
pub fn run_target(base: &Environment, target: &str) -> Result<TestReport> {
    match build_test(base, target) {
        None => Ok(TestReport::construction_failed(
            target,
            &HarnessError::Config(format!("no test factory for {}", target)),
        )),
        Some(Err(e)) if e.is_interrupt() => Err(e),
        Some(Err(e)) => {
            warn!("{}: cannot build test: {}", target, e);
            Ok(TestReport::construction_failed(target, &e))
        }
        Some(Ok(mut test)) => test.run(),
    }
}

/// Run every target with up to `jobs` tests in flight.
pub fn run_batch(targets: &[String], base: &Environment, jobs: usize) -> Result<BatchReport> {
    let started_at = Utc::now();
    let jobs = jobs.max(1);
    info!("running {} tests with {} workers", targets.len(), jobs);

    let (job_tx, job_rx) = unbounded::<(usize, String)>();
    for (index, target) in targets.iter().enumerate() {
        job_tx
            .send((index, target.clone()))
            .map_err(|e| HarnessError::Process(format!("job queue closed: {}", e)))?;
    }
    drop(job_tx);

    let (done_tx, done_rx) = unbounded::<(usize, Result<TestReport>)>();
    let stop = AtomicBool::new(false);

    thread::scope(|scope| {
        for worker in 0..jobs {
            let job_rx = job_rx.clone();
            let done_tx = done_tx.clone();
            let stop = &stop;
            scope.spawn(move || {
                for (index, target) in job_rx.iter() {
                    if stop.load(Ordering::SeqCst) || interrupt_requested() {
                        break;
                    }
                    debug!("worker {}: {}", worker, target);
                    let outcome = run_target(base, &target);
                    if matches!(outcome, Err(HarnessError::Interrupted)) {
                        stop.store(true, Ordering::SeqCst);
                    }
                    if done_tx.send((index, outcome)).is_err() {
                        break;
                    }
                }
            });
        }
    });
    drop(done_tx);

    let mut slots: Vec<Option<TestReport>> = vec![None; targets.len()];
    let mut interrupted = false;
    for (index, outcome) in done_rx.iter() {
        match outcome {
            Ok(report) => slots[index] = Some(report),
            Err(HarnessError::Interrupted) => interrupted = true,
            Err(e) => slots[index] = Some(TestReport::construction_failed(&targets[index], &e)),
        }
    }

    if interrupted || interrupt_requested() {
        warn!("batch interrupted");
        return Err(HarnessError::Interrupted);
    }

    let reports = slots.into_iter().flatten().collect();
    Ok(BatchReport::from_reports(started_at, reports))
}
