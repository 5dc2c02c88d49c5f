//! Request log records
//!
//! One [`LogRecord`] is produced per completed command. Its `Display`
//! implementation is the exact line written to the request log, without the
//! trailing newline.

use std::fmt;

use super::account::{AccountId, Balance};
use super::command::{RequestId, Timestamp};

/// Result of executing a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Balance read by a check
    Balance(Balance),

    /// Transfer applied to every account
    Committed,

    /// Transfer aborted; carries the lowest-numbered account that would have
    /// gone negative
    InsufficientFunds(AccountId),
}

/// Immutable record of one completed request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogRecord {
    pub id: RequestId,
    pub outcome: Outcome,
    /// Arrival time, captured at enqueue
    pub start: Timestamp,
    /// Completion time, captured by the executor
    pub end: Timestamp,
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.outcome {
            Outcome::Balance(balance) => write!(f, "{} BAL {}", self.id, balance)?,
            Outcome::Committed => write!(f, "{} OK", self.id)?,
            Outcome::InsufficientFunds(account) => write!(f, "{} ISF {}", self.id, account)?,
        }
        write!(f, " TIME {} {}", self.start, self.end)
    }
}
