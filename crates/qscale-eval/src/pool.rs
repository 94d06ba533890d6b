//! Bounded fan-out/fan-in over tokio tasks.
//!
//! One pool is built per stage at startup and shared by every event. The
//! semaphore caps how many items of that stage run at once across all
//! events; a permit is taken before each task is spawned.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, warn};

pub const DEFAULT_ANSWER_CONCURRENCY: usize = 50;
pub const DEFAULT_FACTOR_CONCURRENCY: usize = 10;

#[derive(Debug, Clone)]
pub struct WorkerPool {
    stage: &'static str,
    size: usize,
    permits: Arc<Semaphore>,
}

impl WorkerPool {
    /// A size of zero is treated as one.
    pub fn new(stage: &'static str, size: usize) -> Self {
        let size = size.max(1);
        Self {
            stage,
            size,
            permits: Arc::new(Semaphore::new(size)),
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Run `work` once per input and wait for every task to finish.
    ///
    /// Results come back in completion order; `work` should return
    /// something that identifies its input. A task that panics is logged
    /// and contributes no result.
    pub async fn run_all<T, R, F>(&self, inputs: Vec<T>, work: F) -> Vec<R>
    where
        T: Send + 'static,
        R: Send + 'static,
        F: Fn(T) -> R + Send + Sync + 'static,
    {
        let submitted = inputs.len();
        let work = Arc::new(work);
        let mut tasks = JoinSet::new();

        for input in inputs {
            let permit = match Arc::clone(&self.permits).acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    error!(stage = self.stage, "worker pool closed, not submitting remaining tasks");
                    break;
                }
            };
            let work = Arc::clone(&work);
            tasks.spawn(async move {
                let result = work(input);
                drop(permit);
                result
            });
        }

        let mut results = Vec::with_capacity(submitted);
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(result) => results.push(result),
                Err(e) => warn!(stage = self.stage, error = %e, "worker task did not complete"),
            }
        }

        if results.len() != submitted {
            warn!(
                stage = self.stage,
                submitted,
                completed = results.len(),
                "worker pool finished with missing results"
            );
        }
        results
    }
}
