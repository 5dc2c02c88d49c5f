//! Core concurrency engine
//!
//! This module contains the components that run requests in parallel:
//! - `traits` - Account store abstraction used by the executor
//! - `bank` - In-memory store with one lock per account
//! - `queue` - Blocking FIFO between the producer and the workers
//! - `executor` - Locking protocol and commit/abort logic
//! - `worker_pool` - Fixed set of threads draining the queue

pub mod bank;
pub mod executor;
pub mod queue;
pub mod traits;
pub mod worker_pool;

pub use bank::Bank;
pub use executor::TransactionExecutor;
pub use queue::CommandQueue;
pub use traits::{AccountStore, BalanceSlot};
pub use worker_pool::{PoolReport, WorkerPool};
