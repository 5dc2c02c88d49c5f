//! Fixed pool of worker threads draining the command queue
//!
//! This module provides the `WorkerPool` struct, which owns the worker
//! threads for the lifetime of the server.
//!
//! # Architecture
//!
//! ```text
//! WorkerPool
//!     ├── Arc<CommandQueue>            (shared with the producer)
//!     ├── TransactionExecutor<S>       (cloned into every worker)
//!     │   └── Arc<S: AccountStore>     (per-account locks)
//!     └── Arc<RequestLogger>           (serialized appends)
//! ```
//!
//! Workers are identical and keep no state between commands: dequeue
//! (blocking), execute, append the record, repeat. A worker exits only when
//! the queue is closed and empty, so shutdown never drops accepted work.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{error, info};

use super::executor::TransactionExecutor;
use super::queue::CommandQueue;
use super::traits::AccountStore;
use crate::io::RequestLogger;
use crate::types::LedgerError;

/// Summary returned once every worker has exited
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolReport {
    /// Number of workers that were running
    pub workers: usize,
    /// Commands executed across all workers
    pub executed: u64,
}

/// Running set of worker threads
#[derive(Debug)]
pub struct WorkerPool {
    queue: Arc<CommandQueue>,
    handles: Vec<JoinHandle<()>>,
    executed: Arc<AtomicU64>,
}

impl WorkerPool {
    /// Spawn `num_workers` threads draining `queue`
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::IoError` if a thread cannot be spawned. Workers
    /// started before the failure are shut down first.
    pub fn start<S>(
        num_workers: usize,
        queue: Arc<CommandQueue>,
        executor: TransactionExecutor<S>,
        logger: Arc<RequestLogger>,
    ) -> Result<Self, LedgerError>
    where
        S: AccountStore + 'static,
    {
        let mut pool = WorkerPool {
            queue: Arc::clone(&queue),
            handles: Vec::with_capacity(num_workers),
            executed: Arc::new(AtomicU64::new(0)),
        };

        for index in 0..num_workers {
            let queue = Arc::clone(&queue);
            let executor = executor.clone();
            let logger = Arc::clone(&logger);
            let executed = Arc::clone(&pool.executed);

            let spawned = thread::Builder::new()
                .name(format!("worker-{index}"))
                .spawn(move || run_worker(&queue, &executor, &logger, &executed));

            match spawned {
                Ok(handle) => pool.handles.push(handle),
                Err(e) => {
                    // Already-running workers would otherwise block forever
                    let _ = pool.shutdown();
                    return Err(LedgerError::IoError {
                        message: format!("failed to spawn worker {index}: {e}"),
                    });
                }
            }
        }

        info!(workers = num_workers, "worker pool started");
        Ok(pool)
    }

    pub fn num_workers(&self) -> usize {
        self.handles.len()
    }

    /// Commands executed so far
    pub fn executed(&self) -> u64 {
        self.executed.load(Ordering::Acquire)
    }

    /// Close the queue and wait for every worker to drain it and exit
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::WorkerPanicked` for the first worker that
    /// panicked. All workers are joined regardless.
    pub fn shutdown(self) -> Result<PoolReport, LedgerError> {
        self.queue.close();

        let workers = self.handles.len();
        let mut first_panic = None;
        for (index, handle) in self.handles.into_iter().enumerate() {
            if handle.join().is_err() {
                error!(worker = index, "worker panicked");
                first_panic.get_or_insert(index);
            }
        }

        debug_assert!(
            first_panic.is_some() || self.queue.is_empty(),
            "workers exited with commands still queued"
        );

        if let Some(worker) = first_panic {
            return Err(LedgerError::WorkerPanicked { worker });
        }

        let executed = self.executed.load(Ordering::Acquire);
        info!(workers, executed, "worker pool stopped");
        Ok(PoolReport { workers, executed })
    }
}

fn run_worker<S: AccountStore>(
    queue: &CommandQueue,
    executor: &TransactionExecutor<S>,
    logger: &RequestLogger,
    executed: &AtomicU64,
) {
    while let Some(command) = queue.dequeue() {
        let record = executor.execute(&command);
        if let Err(e) = logger.append(&record) {
            error!(id = record.id, error = %e, "failed to write request log");
        }
        executed.fetch_add(1, Ordering::Release);
    }
}
