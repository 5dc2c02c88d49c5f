//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `account`: Account identifiers, balances, and snapshots
//! - `command`: Parsed requests, queued commands, and transfer operands
//! - `record`: Execution outcomes and request log records
//! - `error`: Error types for the ledger server

pub mod account;
pub mod command;
pub mod error;
pub mod record;

pub use account::{Account, AccountId, Balance};
pub use command::{
    Command, CommandKind, Request, RequestId, Timestamp, TransferOperand, TransferOperands,
};
pub use error::LedgerError;
pub use record::{LogRecord, Outcome};
