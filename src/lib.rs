//! Concurrent Ledger Server Library
//! # Overview
//!
//! This library provides an in-memory ledger of numbered accounts served by a
//! pool of worker threads. Operators submit balance checks and multi-account
//! transfers; each accepted request gets an id immediately and is executed
//! asynchronously, with its outcome appended to a request log.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (Account, Command, LogRecord, LedgerError)
//! - [`cli`] - CLI arguments parsing
//! - [`core`] - Concurrency components:
//!   - [`core::bank`] - Account store with one lock per account
//!   - [`core::queue`] - Blocking FIFO of accepted commands
//!   - [`core::executor`] - Ordered locking and all-or-nothing transfers
//!   - [`core::worker_pool`] - Worker threads draining the queue
//! - [`io`] - Request parsing, the request log, and balance CSV files
//! - [`server`] - Producer loop tying everything together
//!
//! # Requests
//!
//! - **CHECK**: Report the balance of one account
//! - **TRANS**: Apply signed amounts to up to ten accounts, all or nothing
//! - **HELP**: Print the supported requests
//! - **END**: Stop accepting input, finish queued work, and exit
//!
//! # Guarantees
//!
//! - Every accepted request is executed exactly once and logged exactly once
//! - A transfer that would leave any account negative changes nothing and
//!   reports the lowest such account
//! - Workers lock accounts in ascending order, so transfers never deadlock

// Module declarations
pub mod cli;
pub mod core;
pub mod io;
pub mod server;
pub mod types;

pub use core::{Bank, CommandQueue, TransactionExecutor, WorkerPool};
pub use server::{Server, ServerConfig, ServerReport};
pub use types::{
    Account, AccountId, Balance, Command, CommandKind, LedgerError, LogRecord, Outcome,
    RequestId, TransferOperands,
};
