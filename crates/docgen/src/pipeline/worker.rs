use super::{Pipeline, PipelineConfig, RunSummary};
use crate::report::DocumentStore;
use crate::roster::{Roster, RosterError, RosterLoader};
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::task::JoinHandle;

#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    #[error(transparent)]
    Roster(#[from] RosterError),
    #[error("report run aborted: {0}")]
    Panicked(#[from] tokio::task::JoinError),
}

/// Admits one report run at a time for an output directory.
#[derive(Debug, Clone, Default)]
pub struct RunGate {
    busy: Arc<AtomicBool>,
}

impl RunGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_acquire(&self) -> Option<RunGuard> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RunGuard {
                busy: self.busy.clone(),
            })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Held for the lifetime of a run; releases the gate on drop.
#[derive(Debug)]
pub struct RunGuard {
    busy: Arc<AtomicBool>,
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

/// Completion signal for a run started on the blocking pool.
#[derive(Debug)]
pub struct RunHandle {
    inner: JoinHandle<Result<RunSummary, RosterError>>,
}

impl Future for RunHandle {
    type Output = Result<RunSummary, WorkerError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.inner).poll(cx).map(|result| match result {
            Ok(run) => run.map_err(WorkerError::from),
            Err(join) => Err(WorkerError::from(join)),
        })
    }
}

/// Runs the pipeline over an already loaded roster on the blocking pool.
///
/// Must be called from within a tokio runtime.
pub fn spawn_run(
    store: Arc<dyn DocumentStore>,
    config: PipelineConfig,
    roster: Roster,
) -> RunHandle {
    let inner = tokio::task::spawn_blocking(move || {
        Ok(Pipeline::new(store.as_ref(), config).run(&roster))
    });
    RunHandle { inner }
}

/// Loads the roster exports and runs the pipeline, both on the blocking pool.
///
/// The guard travels with the run and frees the gate once it finishes,
/// whether it completes, fails to load or panics, even if the caller stops
/// waiting on the handle.
pub fn spawn_guarded_run(
    guard: RunGuard,
    store: Arc<dyn DocumentStore>,
    config: PipelineConfig,
    roster_paths: Vec<PathBuf>,
) -> RunHandle {
    let inner = tokio::task::spawn_blocking(move || {
        let _guard = guard;
        let roster = RosterLoader::from_paths(&roster_paths)?;
        Ok(Pipeline::new(store.as_ref(), config).run(&roster))
    });
    RunHandle { inner }
}
