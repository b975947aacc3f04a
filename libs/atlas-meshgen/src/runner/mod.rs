//! # Runners
//!
//! Sequential and worker-pool execution of region tasks behind one call.
//! Both call [`run_region_task`] for every task, so switching modes never
//! changes what a task does.
//!
//! A panic inside a task is caught and turned into a
//! [`TaskOutcome::Failed`](crate::task::TaskOutcome::Failed) report; the
//! rest of the batch keeps running.

use crate::config::Execution;
use crate::error::{MeshGenError, MeshGenResult};
use crate::task::{run_region_task, RegionTask, TaskContext, TaskReport};
use config::constants::PROGRESS_REPORT_INTERVAL;
use rayon::prelude::*;
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{info, warn};


/// Runs every task and returns one report per task, in task order.
///
/// # Errors
///
/// Returns [`MeshGenError::ThreadPool`] if the worker pool cannot be built.
/// Per-task failures never surface here.
pub fn run_tasks(
    tasks: &[RegionTask],
    ctx: &TaskContext<'_>,
    execution: &Execution,
) -> MeshGenResult<Vec<TaskReport>> {
    match execution {
        Execution::Sequential => run_sequential(tasks, ctx),
        Execution::Parallel { .. } => run_parallel(tasks, ctx, execution.worker_threads()),
    }
}

/// Runs tasks one at a time on a single worker thread.
///
/// The data-parallel passes inside a task (mask building, label scans) run
/// on that same thread.
pub fn run_sequential(tasks: &[RegionTask], ctx: &TaskContext<'_>) -> MeshGenResult<Vec<TaskReport>> {
    let pool = build_pool(1)?;
    let progress = Progress::new(tasks.len());
    Ok(pool.install(|| {
        tasks
            .iter()
            .map(|task| {
                let report = run_guarded(task, ctx);
                progress.tick();
                report
            })
            .collect()
    }))
}

/// Runs tasks on a dedicated pool of `threads` workers.
pub fn run_parallel(
    tasks: &[RegionTask],
    ctx: &TaskContext<'_>,
    threads: usize,
) -> MeshGenResult<Vec<TaskReport>> {
    let pool = build_pool(threads)?;
    info!(threads, tasks = tasks.len(), "starting worker pool");

    let progress = Progress::new(tasks.len());
    Ok(pool.install(|| {
        tasks
            .par_iter()
            .map(|task| {
                let report = run_guarded(task, ctx);
                progress.tick();
                report
            })
            .collect()
    }))
}

fn build_pool(threads: usize) -> MeshGenResult<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|i| format!("meshgen-{i}"))
        .build()
        .map_err(|e| MeshGenError::ThreadPool {
            message: e.to_string(),
        })
}

/// Calls the worker, converting a panic into a failed report.
fn run_guarded(task: &RegionTask, ctx: &TaskContext<'_>) -> TaskReport {
    match catch_unwind(AssertUnwindSafe(|| run_region_task(task, ctx))) {
        Ok(report) => report,
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            warn!(
                structure_id = task.structure_id,
                acronym = %task.acronym,
                %message,
                "task for {} panicked",
                task.tag()
            );
            TaskReport::failed(task, message)
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Completed-task counter logging every few tasks.
struct Progress {
    total: usize,
    done: AtomicUsize,
}

impl Progress {
    fn new(total: usize) -> Self {
        Self {
            total,
            done: AtomicUsize::new(0),
        }
    }

    fn tick(&self) {
        let done = self.done.fetch_add(1, Ordering::Relaxed) + 1;
        if done % PROGRESS_REPORT_INTERVAL == 0 || done == self.total {
            info!(done, total = self.total, "meshed {done} of {} structures", self.total);
        }
    }
}
